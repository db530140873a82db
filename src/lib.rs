pub mod ast;
pub mod config;
pub mod error;
pub mod executor;

pub use ast::{ExpressionNode, RedirectKind};
pub use config::{ConfigError, ConfigLoader, EvalConfig};
pub use error::EvalError;
pub use executor::{DescriptorTriple, Evaluator, ExitStatus, Outcome};
