//! The default backing-store engine: an in-process implementation of
//! [`metadata_backend::MetadataStore`], plus the `BackendKind` connection
//! selector (spec §6).

pub mod memory;
pub mod unimplemented;

pub use memory::MemoryStore;
pub use unimplemented::BackendKind;
