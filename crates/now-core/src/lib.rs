//! Core task engine for the `now` command-line tracker.
//!
//! Every command loads the whole [`task::TaskList`] through
//! [`storage::TaskStore`], works on it in memory and, when it changed
//! something, writes the whole list back.

pub mod config;
pub mod due;
pub mod markdown;
pub mod storage;
pub mod task;
pub mod task_ops;
pub mod views;
