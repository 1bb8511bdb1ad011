pub mod facade;
pub mod store;

pub use facade::{CacheFacade, CacheTtl};
pub use store::MemoryCacheStore;
