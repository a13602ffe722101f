use std::fs;

use derive_more::Display;
use snafu::{Report, Snafu};
use tracing::{debug, warn};

use crate::filesystem::path_node::describe_special;
use crate::filesystem::{Children, NodeKind, PathNode, PathNodeError};

/// What enumeration does with an entry it cannot classify as a regular file or
/// a directory (special files, dangling symlinks, entries that vanished or
/// could not be inspected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum EntryPolicy {
    #[default]
    #[display("abort")]
    Abort,
    #[display("skip")]
    Skip,
}

impl EntryPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "abort" => Some(EntryPolicy::Abort),
            "skip" => Some(EntryPolicy::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOptions {
    pub entry_policy: EntryPolicy,
    /// Deepest directory level that may be entered, the root being level 0.
    pub max_depth: Option<usize>,
}

struct OpenListing {
    children: Children,
    depth: usize,
}

/// Depth-first, pre-order stream of every regular file under a root node.
///
/// Directories are kept on an explicit stack of open listings, so nesting depth
/// is bounded by memory rather than the call stack. The stream ends after the
/// first error.
pub struct FileWalker {
    root: Option<PathNode>,
    stack: Vec<OpenListing>,
    options: WalkOptions,
    finished: bool,
}

impl FileWalker {
    pub fn new(root: PathNode, options: WalkOptions) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
            options,
            finished: false,
        }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    fn advance(&mut self) -> Result<Option<PathNode>, WalkError> {
        if let Some(root) = self.root.take() {
            match root.kind()? {
                NodeKind::File => return Ok(Some(root)),
                NodeKind::Directory => self.descend(root, 0)?,
                kind @ NodeKind::Other(_) => self.reject(WalkError::UnsupportedEntry {
                    path: root.to_string(),
                    kind,
                })?,
            }
        }

        loop {
            let Some(listing) = self.stack.last_mut() else {
                return Ok(None);
            };
            let depth = listing.depth;
            let Some(child) = listing.children.next() else {
                debug!("Leaving directory {}", listing.children.dir());
                self.stack.pop();
                continue;
            };

            let child = match child {
                Ok(child) => child,
                Err(error @ PathNodeError::Listing { .. }) => return Err(error.into()),
                Err(PathNodeError::PathNotFound { path }) => {
                    self.reject(classify_missing(path))?;
                    continue;
                }
                Err(error) => {
                    self.reject(error.into())?;
                    continue;
                }
            };

            match child.kind() {
                Ok(NodeKind::File) => return Ok(Some(child)),
                Ok(NodeKind::Directory) => self.descend(child, depth + 1)?,
                Ok(kind @ NodeKind::Other(_)) => self.reject(WalkError::UnsupportedEntry {
                    path: child.to_string(),
                    kind,
                })?,
                Err(error) => self.reject(error.into())?,
            }
        }
    }

    fn descend(&mut self, dir: PathNode, depth: usize) -> Result<(), WalkError> {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return DepthLimitExceededSnafu {
                    path: dir.to_string(),
                    limit,
                }
                .fail();
            }
        }

        debug!("Entering directory {} at depth {}", dir, depth);
        let children = dir.children()?;
        self.stack.push(OpenListing { children, depth });
        Ok(())
    }

    fn reject(&self, error: WalkError) -> Result<(), WalkError> {
        let policy = self.options.entry_policy;
        match policy {
            EntryPolicy::Abort => Err(error),
            EntryPolicy::Skip => {
                warn!("Entry policy '{}': {}", policy, Report::from_error(error));
                Ok(())
            }
        }
    }
}

/// Explains why a listed entry did not validate as a file or directory.
fn classify_missing(path: String) -> WalkError {
    let kind = match (fs::metadata(&path), fs::symlink_metadata(&path)) {
        (Ok(metadata), _) => NodeKind::Other(describe_special(&metadata.file_type())),
        (Err(_), Ok(link)) if link.file_type().is_symlink() => {
            NodeKind::Other("dangling symlink")
        }
        _ => {
            return WalkError::Node {
                source: PathNodeError::PathNotFound { path },
            };
        }
    };
    WalkError::UnsupportedEntry { path, kind }
}

impl Iterator for FileWalker {
    type Item = Result<PathNode, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.advance() {
            Ok(Some(file)) => Some(Ok(file)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                self.stack.clear();
                Some(Err(error))
            }
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WalkError {
    #[snafu(context(false), display("Filesystem query failed during enumeration"))]
    Node { source: PathNodeError },
    #[snafu(display("Cannot enumerate {}: it is a {}", path, kind))]
    UnsupportedEntry { path: String, kind: NodeKind },
    #[snafu(display(
        "Directory {} lies deeper than the maximum depth of {}",
        path,
        limit
    ))]
    DepthLimitExceeded { path: String, limit: usize },
}
