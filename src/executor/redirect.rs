use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::OwnedFd;
use crate::ast::RedirectKind;
use crate::error::EvalError;
use super::descriptors::{above_standard, DescriptorTriple, Slot};

pub struct RedirectHandler;

impl RedirectHandler {
    /// Opens `file` as `kind` requires and points the matching slot(s) of
    /// `descriptors` at it.
    ///
    /// On failure `descriptors` is left untouched.
    pub fn resolve(
        kind: RedirectKind,
        file: &str,
        descriptors: &mut DescriptorTriple,
    ) -> Result<(), EvalError> {
        let fd = Self::open(kind, file)?;
        match kind {
            RedirectKind::In => descriptors.redirect(Slot::Stdin, fd),
            RedirectKind::Out | RedirectKind::Append => descriptors.redirect(Slot::Stdout, fd),
            RedirectKind::Err => descriptors.redirect(Slot::Stderr, fd),
            RedirectKind::ErrOut => descriptors.redirect_out_err(fd),
        }
        Ok(())
    }

    // std opens with O_CLOEXEC and mode 0666 (before umask).
    fn open(kind: RedirectKind, file: &str) -> Result<OwnedFd, EvalError> {
        let opened = match kind {
            RedirectKind::In => File::open(file),
            RedirectKind::Out | RedirectKind::Err | RedirectKind::ErrOut => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(file),
            RedirectKind::Append => OpenOptions::new().append(true).create(true).open(file),
        };
        opened
            .map(OwnedFd::from)
            .and_then(|fd| above_standard(fd).map_err(io::Error::from))
            .map_err(|source| EvalError::Redirect {
                path: file.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};
    use std::io::Write;
    use std::os::fd::FromRawFd;
    use super::*;

    fn file_at(descriptors: &DescriptorTriple, slot: Slot) -> File {
        let fd = nix::unistd::dup(descriptors.raw(slot)).unwrap();
        unsafe { File::from_raw_fd(fd) }
    }

    #[test]
    fn test_redirect_in_sets_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        write(&path, "hello world\n").unwrap();

        let mut descriptors = DescriptorTriple::standard();
        RedirectHandler::resolve(RedirectKind::In, path.to_str().unwrap(), &mut descriptors).unwrap();
        assert_ne!(descriptors.raw(Slot::Stdin), 0);
        assert_eq!(descriptors.raw(Slot::Stdout), 1);
        assert_eq!(descriptors.raw(Slot::Stderr), 2);

        let mut content = String::new();
        std::io::Read::read_to_string(&mut file_at(&descriptors, Slot::Stdin), &mut content).unwrap();
        assert_eq!(content, "hello world\n");
    }

    #[test]
    fn test_redirect_out_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write(&path, "old content that is long\n").unwrap();

        let mut descriptors = DescriptorTriple::standard();
        RedirectHandler::resolve(RedirectKind::Out, path.to_str().unwrap(), &mut descriptors).unwrap();
        assert_eq!(descriptors.raw(Slot::Stderr), 2);
        file_at(&descriptors, Slot::Stdout).write_all(b"new\n").unwrap();
        drop(descriptors);

        assert_eq!(read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_redirect_append_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        write(&path, "first\n").unwrap();

        let mut descriptors = DescriptorTriple::standard();
        RedirectHandler::resolve(RedirectKind::Append, path.to_str().unwrap(), &mut descriptors).unwrap();
        file_at(&descriptors, Slot::Stdout).write_all(b"second\n").unwrap();
        drop(descriptors);

        assert_eq!(read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_redirect_err_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("err.txt");

        let mut descriptors = DescriptorTriple::standard();
        RedirectHandler::resolve(RedirectKind::Err, path.to_str().unwrap(), &mut descriptors).unwrap();
        assert_eq!(descriptors.raw(Slot::Stdout), 1);
        assert_ne!(descriptors.raw(Slot::Stderr), 2);
        assert!(path.exists());
    }

    #[test]
    fn test_redirect_err_out_shares_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.txt");

        let mut descriptors = DescriptorTriple::standard();
        RedirectHandler::resolve(RedirectKind::ErrOut, path.to_str().unwrap(), &mut descriptors).unwrap();
        assert_ne!(descriptors.raw(Slot::Stdout), 1);
        assert_eq!(descriptors.raw(Slot::Stdout), descriptors.raw(Slot::Stderr));
    }

    #[test]
    fn test_missing_input_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let path = path.to_str().unwrap();

        let mut descriptors = DescriptorTriple::standard();
        let err = RedirectHandler::resolve(RedirectKind::In, path, &mut descriptors).unwrap_err();
        assert!(matches!(err, EvalError::Redirect { .. }));
        assert!(err.to_string().starts_with(path));
        assert!(descriptors.is_standard());
    }
}
