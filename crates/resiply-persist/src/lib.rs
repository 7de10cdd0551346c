pub mod builder;
pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod slot;
pub mod store;

pub use builder::{StoreBuilder, StorageKind};
pub use error::{PersistError, Result};
pub use file::FileStore;
pub use keys::StorageKey;
pub use memory::MemoryStore;
pub use slot::JsonSlot;
pub use store::LocalStore;
