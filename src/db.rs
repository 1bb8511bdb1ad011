pub mod store;
pub use store::{CatalogStore, SalesStore, TenancyStore};
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub use memory_store::MemoryStore;
