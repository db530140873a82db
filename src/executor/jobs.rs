use nix::unistd::Pid;
use crate::error::EvalError;
use super::launcher::Launcher;
use super::status::ExitStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub job: Job,
    pub status: ExitStatus,
}

/// Background children launched by one evaluator and not yet reaped.
///
/// Only pids recorded here are ever waited on.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pid: Pid, command: String) {
        log::info!("[{}] {}", pid, command);
        self.jobs.push(Job { pid, command });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Collects every job that has already terminated, without blocking.
    ///
    /// A job whose pid can no longer be waited on is dropped from the table
    /// and the error is returned alongside.
    pub fn reap_finished<L: Launcher + ?Sized>(
        &mut self,
        launcher: &mut L,
    ) -> (Vec<FinishedJob>, Vec<EvalError>) {
        let mut finished = Vec::new();
        let mut errors = Vec::new();
        let mut running = Vec::with_capacity(self.jobs.len());

        for job in self.jobs.drain(..) {
            match launcher.try_wait(job.pid) {
                Ok(None) => running.push(job),
                Ok(Some(status)) => {
                    log::info!("[{}] done (status {}) {}", job.pid, status, job.command);
                    finished.push(FinishedJob { job, status });
                }
                Err(err) => errors.push(err),
            }
        }

        self.jobs = running;
        (finished, errors)
    }

    /// Blocks until every recorded job has terminated.
    pub fn wait_all<L: Launcher + ?Sized>(
        &mut self,
        launcher: &mut L,
    ) -> (Vec<FinishedJob>, Vec<EvalError>) {
        let mut finished = Vec::new();
        let mut errors = Vec::new();

        for job in self.jobs.drain(..) {
            match launcher.wait(job.pid) {
                Ok(status) => {
                    log::info!("[{}] done (status {}) {}", job.pid, status, job.command);
                    finished.push(FinishedJob { job, status });
                }
                Err(err) => errors.push(err),
            }
        }

        (finished, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::RecordingLauncher;

    #[test]
    fn test_reap_keeps_running_jobs() {
        let mut launcher = RecordingLauncher::new();
        let mut jobs = JobTable::new();
        jobs.push(Pid::from_raw(100), "sleep 10".to_string());
        jobs.push(Pid::from_raw(101), "true".to_string());
        launcher.finish(Pid::from_raw(101), ExitStatus::SUCCESS);

        let (finished, errors) = jobs.reap_finished(&mut launcher);
        assert!(errors.is_empty());
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].job.command, "true");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs.iter().next().unwrap().pid, Pid::from_raw(100));
    }

    #[test]
    fn test_wait_all_empties_table() {
        let mut launcher = RecordingLauncher::new();
        let mut jobs = JobTable::new();
        jobs.push(Pid::from_raw(200), "a".to_string());
        jobs.push(Pid::from_raw(201), "b".to_string());

        let (finished, errors) = jobs.wait_all(&mut launcher);
        assert!(errors.is_empty());
        assert_eq!(finished.len(), 2);
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_unwaitable_job_is_dropped() {
        let mut launcher = RecordingLauncher::new();
        let mut jobs = JobTable::new();
        jobs.push(Pid::from_raw(300), "lost".to_string());
        launcher.lose(Pid::from_raw(300));

        let (finished, errors) = jobs.reap_finished(&mut launcher);
        assert!(finished.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(jobs.is_empty());
    }
}
