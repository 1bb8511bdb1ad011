pub mod catalog;
pub mod identity;
pub mod sales;
pub mod tenancy;
