//! Persistence Adapter (spec §4.G, §6): the narrow CRUD boundary the
//! Manager talks to, plus the field-name translation rules between a
//! [`nebula_workflow::Workflow`] and the store's record shape, plus the
//! in-memory reference backend.

pub mod adapter;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod record;
pub mod translate;

pub use adapter::PersistenceAdapter;
pub use error::StorageError;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use record::{ExecutionRecord, SortOrder, WorkflowRecord};
pub use translate::{record_to_workflow, workflow_to_record};
