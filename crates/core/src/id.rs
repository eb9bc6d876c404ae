//! Unique identifiers for workflow entities.
//!
//! Each identifier is a [`domain-key`](https://crates.io/crates/domain-key)
//! `Uuid<D>` wrapper parameterized by a distinct domain marker, so a
//! `NodeId` can never be passed where an `EdgeId` is expected. All ID types
//! are `Copy` (16 bytes), serialize as UUID strings, and round-trip through
//! `FromStr`/`Display`.

use domain_key::define_uuid;

pub use domain_key::UuidParseError;

define_uuid!(WorkflowIdDomain => WorkflowId);
define_uuid!(NodeIdDomain => NodeId);
define_uuid!(EdgeIdDomain => EdgeId);
define_uuid!(ExecutionIdDomain => ExecutionId);
