use std::fs::{self, ReadDir};

use snafu::ResultExt;

use crate::ext::LexicalPathExt;
use crate::filesystem::path_node::{ListingSnafu, as_unicode};
use crate::filesystem::{PathNode, PathNodeError};

/// One pass over a directory listing, yielding a validated node per entry in
/// the order the host returns them.
///
/// The directory handle is held for the lifetime of the iterator and closed
/// when it is dropped.
pub struct Children {
    dir: String,
    entries: ReadDir,
}

impl Children {
    pub(crate) fn open(node: &PathNode) -> Result<Self, PathNodeError> {
        let entries = fs::read_dir(node.path()).context(ListingSnafu { path: node.path() })?;
        Ok(Self {
            dir: node.path().to_string(),
            entries,
        })
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }
}

impl Iterator for Children {
    type Item = Result<PathNode, PathNodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.entries.next()? {
            Ok(entry) => entry,
            Err(source) => {
                return Some(Err(source).context(ListingSnafu {
                    path: self.dir.as_str(),
                }));
            }
        };

        let file_name = entry.file_name();
        let child = as_unicode(&file_name)
            .map(|name| self.dir.join_entry(name))
            .and_then(PathNode::validate);
        Some(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::collections::HashSet;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;

    fn names(children: Children) -> HashSet<String> {
        children
            .map(|child| {
                let child = child.expect("Failed to read child");
                child
                    .as_path()
                    .file_name()
                    .and_then(|name| name.to_str())
                    .expect("child has a file name")
                    .to_string()
            })
            .collect()
    }

    #[fixture]
    fn dir() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("one")).expect("Failed to create file");
        File::create(temp_dir.path().join("two")).expect("Failed to create file");
        fs::create_dir(temp_dir.path().join("nested")).expect("Failed to create dir");
        temp_dir
    }

    #[rstest]
    fn test_children_yields_every_entry(dir: TempDir) {
        let node = PathNode::validate(dir.path()).unwrap();

        let expected: HashSet<String> = ["one", "two", "nested"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names(node.children().unwrap()), expected);
    }

    #[rstest]
    fn test_children_paths_are_joined_to_parent(dir: TempDir) {
        let node = PathNode::validate(dir.path()).unwrap();

        for child in node.children().unwrap() {
            let child = child.unwrap();
            assert_eq!(child.as_path().parent(), Some(Path::new(node.path())));
        }
    }

    #[rstest]
    fn test_children_is_restartable_and_sees_new_entries(dir: TempDir) {
        let node = PathNode::validate(dir.path()).unwrap();
        assert_eq!(node.children().unwrap().count(), 3);

        File::create(dir.path().join("three")).expect("Failed to create file");

        assert_eq!(node.children().unwrap().count(), 4);
    }

    #[test]
    fn test_children_of_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let node = PathNode::validate(temp_dir.path()).unwrap();

        assert_eq!(node.children().unwrap().count(), 0);
    }

    #[rstest]
    fn test_children_of_file_fails_as_a_whole(dir: TempDir) {
        let node = PathNode::validate(dir.path().join("one")).unwrap();

        assert!(matches!(
            node.children(),
            Err(PathNodeError::Listing { .. })
        ));
    }

    #[rstest]
    fn test_children_of_removed_directory_fails(dir: TempDir) {
        let node = PathNode::validate(dir.path().join("nested")).unwrap();
        fs::remove_dir(node.as_path()).unwrap();

        assert!(node.children().is_err());
    }

    #[cfg(unix)]
    #[rstest]
    fn test_dangling_symlink_is_yielded_as_path_not_found(dir: TempDir) {
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link"))
            .expect("Failed to create symlink");
        let node = PathNode::validate(dir.path()).unwrap();

        let failures: Vec<_> = node
            .children()
            .unwrap()
            .filter_map(Result::err)
            .collect();

        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], PathNodeError::PathNotFound { .. }));
    }

    #[cfg(unix)]
    #[rstest]
    fn test_non_unicode_name_is_yielded_as_type_mismatch(dir: TempDir) {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        File::create(dir.path().join(OsStr::from_bytes(b"bad\xff")))
            .expect("Failed to create non-UTF-8 file");
        let node = PathNode::validate(dir.path()).unwrap();

        let (valid, failures): (Vec<_>, Vec<_>) =
            node.children().unwrap().partition(Result::is_ok);

        assert_eq!(valid.len(), 3);
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            Err(PathNodeError::TypeMismatch { ref value, .. }) if value.starts_with("bad")
        ));
    }
}
