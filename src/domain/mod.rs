mod store;
mod value;

pub use store::{MemoryKey, StoreError, ValueStore};
pub use value::{TypedValue, ValueItem, ValueKind};
