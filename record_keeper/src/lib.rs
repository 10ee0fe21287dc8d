//! Record Keeper - Core Library
//!
//! A contact book and a task tracker, each an in-memory collection backed by
//! a single JSON file.

pub mod cli;
pub mod commands;
pub mod contacts;
pub mod error;
pub mod settings;
pub mod shell;
pub mod store;
pub mod tasks;
pub mod telemetry;

pub use contacts::{Contact, ContactBook, ContactDraft};
pub use error::StoreError;
pub use store::{PersistPolicy, Record, RecordStore};
pub use tasks::{Task, TaskList, TaskPatch, TaskStatus};
