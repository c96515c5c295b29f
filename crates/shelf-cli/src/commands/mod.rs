//! CLI command implementations

pub(crate) mod common;
pub(crate) mod run;
pub(crate) mod test;
pub(crate) mod validate;
