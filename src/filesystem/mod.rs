//! Navigable view over a filesystem subtree.
//!
//! A [`PathNode`] wraps one validated path. Navigation, listing and
//! enumeration always query the live filesystem; nothing is cached between
//! calls.

mod children;
mod path_node;
mod selector;
mod walker;

pub use children::Children;
pub use path_node::{NodeKind, PathNode, PathNodeError};
pub use selector::Selector;
pub use walker::{EntryPolicy, FileWalker, WalkError, WalkOptions};
