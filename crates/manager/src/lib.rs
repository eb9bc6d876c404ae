//! # Nebula Manager
//!
//! Component F (spec §4.F): the workflow CRUD cache, bot→workflow index,
//! event dispatch, and execution/debug/schedule orchestration sitting on
//! top of [`nebula_execution`], [`nebula_debug`], and [`nebula_storage`].

pub mod config;
pub mod error;
pub mod manager;
pub mod schedule;
pub mod translate;

pub use config::{ManagerConfig, StorageBackend};
pub use error::ManagerError;
pub use manager::WorkflowManager;
pub use translate::execution_result_to_record;
