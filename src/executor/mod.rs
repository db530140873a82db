mod descriptors;
mod evaluator;
mod jobs;
mod launcher;
mod redirect;
mod status;

pub use descriptors::{pipe, DescriptorTriple, Slot};
pub use evaluator::{Evaluator, Outcome};
pub use jobs::{FinishedJob, Job, JobTable};
pub use launcher::{Launched, Launcher, ProcessLauncher};
pub use redirect::RedirectHandler;
pub use status::ExitStatus;
