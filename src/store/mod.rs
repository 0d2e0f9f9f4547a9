pub mod memory;
pub mod records;
pub mod traits;

pub use memory::MemoryStore;
pub use records::{ClientRecord, ProgressPhoto};
pub use traits::{MediaStore, RecordStore};
