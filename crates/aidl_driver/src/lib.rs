//! The `aidl` command: argument parsing, the check/preprocess/dump-api
//! tasks and diagnostic rendering.

pub mod cli;
pub mod report;
pub mod tasks;
