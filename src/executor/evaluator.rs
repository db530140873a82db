use crate::ast::{ExpressionNode, RedirectKind};
use crate::config::EvalConfig;
use crate::error::EvalError;
use super::descriptors::{pipe, DescriptorTriple, Slot};
use super::jobs::{FinishedJob, JobTable};
use super::launcher::{Launched, Launcher, ProcessLauncher};
use super::redirect::RedirectHandler;
use super::status::ExitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(ExitStatus),
    /// The root was `Empty`: the shell loop should stop.
    EndOfInput,
}

/// Walks an expression tree, running every simple command through its
/// [`Launcher`].
pub struct Evaluator<L: Launcher = ProcessLauncher> {
    launcher: L,
    jobs: JobTable,
    config: EvalConfig,
}

impl Evaluator<ProcessLauncher> {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        let launcher = ProcessLauncher::new(config.exec_failure_status);
        Evaluator::with_launcher(launcher, config)
    }
}

impl Default for Evaluator<ProcessLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> Evaluator<L> {
    pub fn with_launcher(launcher: L, config: EvalConfig) -> Self {
        Evaluator {
            launcher,
            jobs: JobTable::new(),
            config,
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Evaluates `root` with the standard descriptors {0, 1, 2}.
    pub fn evaluate(&mut self, root: &ExpressionNode) -> Outcome {
        self.evaluate_with(root, DescriptorTriple::standard())
    }

    /// Evaluates `root` under a caller-supplied redirection context. Every
    /// descriptor in `descriptors` is released by the time this returns.
    pub fn evaluate_with(&mut self, root: &ExpressionNode, descriptors: DescriptorTriple) -> Outcome {
        if self.config.reap_background {
            self.reap_jobs();
        }
        if let ExpressionNode::Empty = root {
            log::debug!("end of input");
            return Outcome::EndOfInput;
        }
        Outcome::Status(self.eval(root, descriptors, false))
    }

    /// Reaps background jobs that have already finished.
    pub fn reap_jobs(&mut self) -> Vec<FinishedJob> {
        let (finished, errors) = self.jobs.reap_finished(&mut self.launcher);
        for err in &errors {
            self.report(err);
        }
        finished
    }

    /// Blocks until every background job has finished.
    pub fn wait_jobs(&mut self) -> Vec<FinishedJob> {
        let (finished, errors) = self.jobs.wait_all(&mut self.launcher);
        for err in &errors {
            self.report(err);
        }
        finished
    }

    fn eval(&mut self, node: &ExpressionNode, descriptors: DescriptorTriple, background: bool) -> ExitStatus {
        log::debug!("evaluating {} (background: {})", node.kind_name(), background);
        match node {
            ExpressionNode::Empty => ExitStatus::SUCCESS,
            ExpressionNode::Simple(argv) => self.exec_simple(argv, descriptors, background),
            ExpressionNode::Redirect { kind, file, node } => {
                self.exec_redirect(*kind, file, node, descriptors, background)
            }
            ExpressionNode::Background(node) => self.eval(node, descriptors, true),
            ExpressionNode::Sequence(left, right) => {
                self.eval(left, descriptors.clone(), false);
                self.eval(right, descriptors, background)
            }
            ExpressionNode::SequenceAnd(left, right) => {
                let status = self.eval(left, descriptors.clone(), false);
                if !status.is_success() {
                    return status;
                }
                self.eval(right, descriptors, background)
            }
            ExpressionNode::SequenceOr(left, right) => {
                let status = self.eval(left, descriptors.clone(), false);
                if status.is_success() {
                    return status;
                }
                self.eval(right, descriptors, false)
            }
            ExpressionNode::Pipe(left, right) => self.exec_pipe(left, right, descriptors, background),
        }
    }

    fn exec_simple(&mut self, argv: &[String], descriptors: DescriptorTriple, background: bool) -> ExitStatus {
        match self.launcher.launch(argv, descriptors, background) {
            Ok(Launched::Finished(status)) => status,
            Ok(Launched::Background(pid)) => {
                self.jobs.push(pid, argv.join(" "));
                ExitStatus::SUCCESS
            }
            Err(err) => self.report(&err),
        }
    }

    fn exec_redirect(
        &mut self,
        kind: RedirectKind,
        file: &str,
        node: &ExpressionNode,
        mut descriptors: DescriptorTriple,
        background: bool,
    ) -> ExitStatus {
        if let Err(err) = RedirectHandler::resolve(kind, file, &mut descriptors) {
            return self.report(&err);
        }
        self.eval(node, descriptors, background)
    }

    fn exec_pipe(
        &mut self,
        left: &ExpressionNode,
        right: &ExpressionNode,
        descriptors: DescriptorTriple,
        background: bool,
    ) -> ExitStatus {
        let (read_end, write_end) = match pipe() {
            Ok(ends) => ends,
            Err(errno) => return self.report(&EvalError::Pipe(errno)),
        };

        // The left triple is the only holder of the write end, so it is
        // closed once the left side has launched and the reader sees EOF.
        let writer = descriptors.clone().with(Slot::Stdout, write_end);
        self.eval(left, writer, true);

        let reader = descriptors.with(Slot::Stdin, read_end);
        self.eval(right, reader, background)
    }

    fn report(&self, err: &EvalError) -> ExitStatus {
        log::debug!("evaluation failed: {:?}", err);
        eprintln!("{}: {}", self.config.name, err);
        ExitStatus::FAILURE
    }
}
