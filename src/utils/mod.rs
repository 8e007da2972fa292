//! Small shared utilities.

pub mod exec;
