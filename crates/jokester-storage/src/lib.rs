//! Store adapters for Jokester.
//!
//! Both adapters implement [`Repository`] and hand rows back as untyped JSON so
//! the service layer can validate them.

pub mod memory;
pub mod mysql;

pub use jokester_core::repository::{ReadRepository, Repository};
pub use jokester_core::StorageError;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
