//! Key-value store adapters.
//!
//! [`FileStore`] persists across runs and backs the durable slot;
//! [`MemoryStore`] lives only as long as the process and backs the session
//! slot.

mod atomic_io;
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
