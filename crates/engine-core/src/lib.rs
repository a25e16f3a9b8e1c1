pub mod cache;
pub mod catalog;
pub mod chain;
pub mod emitter;
pub mod error;
pub mod lookup;
pub mod paginate;
pub mod projection;
pub mod table;
pub mod translate;

use std::fmt;

/// Identifies one remote operation of one table, e.g. `azuredevops_build.list_builds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub table: &'static str,
    pub name: &'static str,
}

impl Operation {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Operation { table, name }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}
