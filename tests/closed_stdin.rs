//! Runs in its own test binary: the process closes its own stdin, which
//! would disturb any test sharing it.

#![cfg(target_os = "linux")]

use std::fs::read_to_string;
use nix::fcntl::{fcntl, FcntlArg};
use nix::unistd::close;
use shelltree_rs::{Evaluator, ExitStatus, ExpressionNode, Outcome, RedirectKind};

fn cmd(argv: &[&str]) -> ExpressionNode {
    ExpressionNode::simple(argv.iter().copied())
}

#[test]
fn test_opened_descriptors_never_take_standard_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let piped = dir.path().join("piped");
    let _ = close(libc::STDIN_FILENO);

    let mut evaluator = Evaluator::new();
    // The lowest free number is now 0; the output file must not land there
    // and turn into the child's stdin.
    let report_stdin = cmd(&["sh", "-c", "if [ -e /proc/self/fd/0 ]; then echo open; else echo closed; fi"]);
    let tree = ExpressionNode::redirect(RedirectKind::Out, out.to_str().unwrap(), report_stdin);
    assert_eq!(evaluator.evaluate(&tree), Outcome::Status(ExitStatus::SUCCESS));
    assert_eq!(read_to_string(&out).unwrap(), "closed\n");

    let tree = ExpressionNode::redirect(
        RedirectKind::Out,
        piped.to_str().unwrap(),
        ExpressionNode::pipe(cmd(&["echo", "through"]), cmd(&["cat"])),
    );
    assert_eq!(evaluator.evaluate(&tree), Outcome::Status(ExitStatus::SUCCESS));
    assert_eq!(read_to_string(&piped).unwrap(), "through\n");

    evaluator.wait_jobs();
    assert!(fcntl(libc::STDIN_FILENO, FcntlArg::F_GETFD).is_err());
}
