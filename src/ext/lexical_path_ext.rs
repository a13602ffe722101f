use std::path::{Component, Path};

const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// Directory-name of `path`, computed without touching the filesystem.
///
/// A single relative component has `.` as its parent and a root is its own
/// parent. Paths ending in `.` or `..` climb one more level instead of
/// dropping that component.
pub fn lexical_parent(path: &str) -> String {
    let as_path = Path::new(path);
    match as_path.components().next_back() {
        // a trailing `.` survives `components` only when it is the whole path
        Some(Component::CurDir) => return PARENT_DIR.to_string(),
        Some(Component::ParentDir) => return join_entry(path, PARENT_DIR),
        _ => {}
    }

    match as_path.parent() {
        None => path.to_string(),
        Some(parent) if parent.as_os_str().is_empty() => CURRENT_DIR.to_string(),
        Some(parent) => parent.to_string_lossy().into_owned(),
    }
}

/// Joins a directory path and one entry name with the host separator.
pub fn join_entry(path: &str, name: &str) -> String {
    // both halves are valid Unicode, so the lossy conversion never replaces anything
    Path::new(path).join(name).to_string_lossy().into_owned()
}

pub trait LexicalPathExt {
    fn lexical_parent(&self) -> String;
    fn join_entry(&self, name: &str) -> String;
}

impl LexicalPathExt for str {
    fn lexical_parent(&self) -> String {
        lexical_parent(self)
    }

    fn join_entry(&self, name: &str) -> String {
        join_entry(self, name)
    }
}

impl LexicalPathExt for String {
    fn lexical_parent(&self) -> String {
        lexical_parent(self)
    }

    fn join_entry(&self, name: &str) -> String {
        join_entry(self, name)
    }
}
