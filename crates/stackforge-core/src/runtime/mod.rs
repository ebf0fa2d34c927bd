//! Detection of the tools a generated project needs to run
//!
//! Purely advisory: generation never depends on what is installed.

pub mod check;

pub use check::{check_docker, check_node, check_npm, check_runtimes, RuntimeInfo};
