pub mod auth;
pub mod tenant_filter;
pub mod category_hierarchy;
pub mod category_service;
pub mod product_service;
pub mod modifier_service;
pub mod order_service;
pub mod invoice_service;
pub mod tenancy_service;

pub use auth::AuthService;
pub use category_service::CategoryService;
pub use invoice_service::InvoiceService;
pub use modifier_service::ModifierService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use tenancy_service::TenantService;

#[cfg(test)]
pub mod test_support;
