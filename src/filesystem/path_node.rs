use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::LexicalPathExt;
use crate::filesystem::{Children, FileWalker, Selector, WalkOptions};

/// What a validated path points at, following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("regular file")]
    File,
    #[display("directory")]
    Directory,
    #[display("{_0}")]
    Other(&'static str),
}

/// One existing file or directory, identified by its path string.
///
/// Nodes never cache anything about the filesystem. Navigation and listing
/// always go back to the host, so a node is only a snapshot of the fact that
/// the path existed when it was constructed.
#[derive(Clone, PartialEq, Eq, Hash, Display)]
#[display("{path}")]
pub struct PathNode {
    path: String,
}

impl PathNode {
    /// Wraps `path` after checking that it is a string naming an existing
    /// file or directory.
    pub fn validate(path: impl AsRef<OsStr>) -> Result<Self, PathNodeError> {
        let path = as_unicode(path.as_ref())?;
        let as_path = Path::new(path);
        if !as_path.is_file() && !as_path.is_dir() {
            return PathNotFoundSnafu { path }.fail();
        }

        Ok(Self {
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Navigates to an adjacent node: `.` is this node, `..` its lexical
    /// parent and anything else must be an entry of this directory.
    pub fn resolve(&self, selector: impl AsRef<OsStr>) -> Result<Self, PathNodeError> {
        let selector = Selector::parse(selector.as_ref())?;
        self.resolve_selector(&selector)
    }

    pub fn resolve_selector(&self, selector: &Selector) -> Result<Self, PathNodeError> {
        match selector {
            Selector::Current => Ok(self.clone()),
            Selector::Parent => Self::validate(self.path.lexical_parent()),
            Selector::Entry(name) => {
                let joined = self.path.join_entry(name);
                if self.has_entry(name)? {
                    debug!("Resolved entry '{}' of {}", name, self.path);
                    Self::validate(joined)
                } else {
                    EntryNotFoundSnafu { path: joined }.fail()
                }
            }
        }
    }

    /// Lazily lists the immediate children. Every call opens a fresh listing.
    pub fn children(&self) -> Result<Children, PathNodeError> {
        Children::open(self)
    }

    /// Streams every regular file beneath this node. With default options the
    /// stream aborts on the first entry that is neither a file nor a directory.
    pub fn enumerate_files(&self) -> FileWalker {
        FileWalker::new(self.clone(), WalkOptions::default())
    }

    pub fn kind(&self) -> Result<NodeKind, PathNodeError> {
        let metadata = fs::metadata(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PathNodeError::PathNotFound {
                    path: self.path.clone(),
                }
            } else {
                PathNodeError::Metadata {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let file_type = metadata.file_type();
        Ok(if file_type.is_file() {
            NodeKind::File
        } else if file_type.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::Other(describe_special(&file_type))
        })
    }

    pub fn is_dir(&self) -> bool {
        self.as_path().is_dir()
    }

    fn has_entry(&self, name: &str) -> Result<bool, PathNodeError> {
        let entries = fs::read_dir(&self.path).context(ListingSnafu { path: &self.path })?;
        for entry in entries {
            let entry = entry.context(ListingSnafu { path: &self.path })?;
            if entry.file_name() == OsStr::new(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Debug for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathNode('{}')", self.path)
    }
}

impl AsRef<Path> for PathNode {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

pub(crate) fn as_unicode(value: &OsStr) -> Result<&str, PathNodeError> {
    value.to_str().ok_or_else(|| PathNodeError::TypeMismatch {
        found: "non-UTF-8 OS string",
        value: value.to_string_lossy().into_owned(),
    })
}

#[cfg(unix)]
pub(crate) fn describe_special(file_type: &fs::FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_fifo() {
        "named pipe"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else {
        "special file"
    }
}

#[cfg(not(unix))]
pub(crate) fn describe_special(_file_type: &fs::FileType) -> &'static str {
    "special file"
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PathNodeError {
    #[snafu(display("file or directory can't be a '{}' value: {}", found, value))]
    TypeMismatch { found: &'static str, value: String },
    #[snafu(display("The system cannot find the path specified: {}", path))]
    PathNotFound { path: String },
    #[snafu(display("The system cannot find the entry specified: {}", path))]
    EntryNotFound { path: String },
    #[snafu(display("Failed to list directory {}", path))]
    Listing { path: String, source: io::Error },
    #[snafu(display("Failed to read metadata of {}", path))]
    Metadata { path: String, source: io::Error },
}
