use std::ffi::{OsStr, OsString};
use std::io::Write;

use colored::Colorize;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::application::application::{ApplicationError, NodeSnafu, OutputSnafu, WalkSnafu};
use crate::filesystem::{PathNode, WalkOptions};

/// Streams every regular file under `path` to `out`, one line each, as the
/// walker reaches it.
pub fn list_files(
    path: &OsStr,
    options: WalkOptions,
    out: &mut impl Write,
) -> Result<usize, ApplicationError> {
    let root = PathNode::validate(path).context(NodeSnafu)?;
    debug!("Enumerating files under {:?} with {:?}", root, options);

    let mut count = 0;
    for file in root.enumerate_files().with_options(options) {
        let file = file.context(WalkSnafu)?;
        writeln!(out, "{file}").context(OutputSnafu)?;
        count += 1;
    }

    info!("Enumerated {} files under {}", count, root);
    Ok(count)
}

/// Writes the immediate children of `path`, highlighting directories when
/// `colorize` is set.
pub fn list_children(
    path: &OsStr,
    colorize: bool,
    out: &mut impl Write,
) -> Result<usize, ApplicationError> {
    let dir = PathNode::validate(path).context(NodeSnafu)?;
    colored::control::set_override(colorize);
    let written = write_children(&dir, out);
    colored::control::unset_override();
    written
}

fn write_children(dir: &PathNode, out: &mut impl Write) -> Result<usize, ApplicationError> {
    let mut count = 0;
    for child in dir.children().context(NodeSnafu)? {
        let child = child.context(NodeSnafu)?;
        if child.is_dir() {
            writeln!(out, "{}", child.path().blue().bold()).context(OutputSnafu)?;
        } else {
            writeln!(out, "{child}").context(OutputSnafu)?;
        }
        count += 1;
    }
    Ok(count)
}

/// Applies `selectors` one after another starting at `path` and writes the
/// debug form of the node reached.
pub fn show_node(
    path: &OsStr,
    selectors: &[OsString],
    out: &mut impl Write,
) -> Result<PathNode, ApplicationError> {
    let mut node = PathNode::validate(path).context(NodeSnafu)?;
    for selector in selectors {
        node = node.resolve(selector).context(NodeSnafu)?;
        debug!("Moved to {:?}", node);
    }

    writeln!(out, "{node:?}").context(OutputSnafu)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{EntryPolicy, PathNodeError};
    use rstest::*;
    use std::collections::HashSet;
    use std::fs::{self, File};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // colour override is process wide
    static COLOR_OVERRIDE: Mutex<()> = Mutex::new(());

    fn utf8(path: &Path) -> String {
        path.to_str().expect("temp paths are valid UTF-8").to_string()
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .expect("output is UTF-8")
            .lines()
            .map(String::from)
            .collect()
    }

    #[fixture]
    fn tree() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        File::create(temp_dir.path().join("a")).expect("Failed to create file");
        File::create(temp_dir.path().join("b")).expect("Failed to create file");
        fs::create_dir(temp_dir.path().join("c")).expect("Failed to create dir");
        File::create(temp_dir.path().join("c").join("d")).expect("Failed to create file");
        temp_dir
    }

    #[rstest]
    fn test_list_files_writes_one_plain_line_per_file(tree: TempDir) {
        let mut out = Vec::new();

        let count =
            list_files(tree.path().as_os_str(), WalkOptions::default(), &mut out).unwrap();

        let expected: HashSet<String> = [
            tree.path().join("a"),
            tree.path().join("b"),
            tree.path().join("c").join("d"),
        ]
        .iter()
        .map(|path| utf8(path))
        .collect();
        let written = lines(out);
        assert_eq!(count, 3);
        assert_eq!(written.len(), 3);
        assert_eq!(written.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[rstest]
    fn test_list_files_of_missing_root_fails(tree: TempDir) {
        let mut out = Vec::new();
        let missing = tree.path().join("missing");

        let result = list_files(missing.as_os_str(), WalkOptions::default(), &mut out);

        assert!(matches!(
            result,
            Err(ApplicationError::NodeError {
                source: PathNodeError::PathNotFound { .. }
            })
        ));
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[rstest]
    fn test_list_files_reports_walk_errors(tree: TempDir) {
        std::os::unix::fs::symlink(tree.path().join("void"), tree.path().join("c").join("link"))
            .expect("Failed to create symlink");
        let mut out = Vec::new();

        let aborted = list_files(tree.path().as_os_str(), WalkOptions::default(), &mut out);
        assert!(matches!(aborted, Err(ApplicationError::WalkError { .. })));

        let options = WalkOptions {
            entry_policy: EntryPolicy::Skip,
            ..WalkOptions::default()
        };
        let skipped = list_files(tree.path().as_os_str(), options, &mut Vec::new());
        assert_eq!(skipped.unwrap(), 3);
    }

    #[rstest]
    fn test_list_children_without_color(tree: TempDir) {
        let _guard = COLOR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = Vec::new();

        let count = list_children(tree.path().as_os_str(), false, &mut out).unwrap();

        let expected: HashSet<String> = ["a", "b", "c"]
            .iter()
            .map(|name| utf8(&tree.path().join(name)))
            .collect();
        assert_eq!(count, 3);
        assert_eq!(lines(out).into_iter().collect::<HashSet<_>>(), expected);
    }

    #[rstest]
    fn test_list_children_highlights_directories(tree: TempDir) {
        let _guard = COLOR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = Vec::new();

        list_children(tree.path().as_os_str(), true, &mut out).unwrap();

        let written = lines(out);
        let directory = utf8(&tree.path().join("c"));
        let file = utf8(&tree.path().join("a"));
        assert!(written.iter().any(|line| line.contains(&directory) && line.contains('\u{1b}')));
        assert!(written.contains(&file));
    }

    #[rstest]
    fn test_show_node_navigates_selectors(tree: TempDir) {
        let mut out = Vec::new();
        let selectors: Vec<OsString> = ["c", "d", "..", "."].iter().map(OsString::from).collect();

        let node = show_node(tree.path().as_os_str(), &selectors, &mut out).unwrap();

        let expected = utf8(&tree.path().join("c"));
        assert_eq!(node.path(), expected);
        assert_eq!(lines(out), vec![format!("PathNode('{expected}')")]);
    }

    #[rstest]
    fn test_show_node_unknown_entry(tree: TempDir) {
        let selectors = vec![OsString::from("nope")];

        let result = show_node(tree.path().as_os_str(), &selectors, &mut Vec::new());

        assert!(matches!(
            result,
            Err(ApplicationError::NodeError {
                source: PathNodeError::EntryNotFound { .. }
            })
        ));
    }
}
