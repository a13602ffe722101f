use std::ffi::OsStr;

use derive_more::Display;

use crate::filesystem::PathNodeError;
use crate::filesystem::path_node::as_unicode;

const CURRENT: &str = ".";
const PARENT: &str = "..";

/// A step from one node to an adjacent one.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Selector {
    #[display(".")]
    Current,
    #[display("..")]
    Parent,
    #[display("{_0}")]
    Entry(String),
}

impl Selector {
    pub fn parse(value: &OsStr) -> Result<Self, PathNodeError> {
        Ok(Self::from(as_unicode(value)?))
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        match value {
            CURRENT => Selector::Current,
            PARENT => Selector::Parent,
            name => Selector::Entry(name.to_string()),
        }
    }
}
