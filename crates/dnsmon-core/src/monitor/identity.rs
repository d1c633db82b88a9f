use std::path::Path;

/// Identity of the file currently behind a path
///
/// Two identities differ when the path was pointed at a new file, for
/// example by writing a temporary file and renaming it over the original.
/// Symlinks are followed, matching what the OS watch itself does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    /// Identity of the file at `path`, or `None` if nothing is there
    #[cfg(unix)]
    pub(crate) fn of(path: &Path) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    // No stable file id without extra dependencies; replacement is then
    // detected from remove/rename notifications only.
    #[cfg(not(unix))]
    pub(crate) fn of(_path: &Path) -> Option<Self> {
        None
    }
}
