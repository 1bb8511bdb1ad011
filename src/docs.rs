// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_me,

        // --- Catalog: categorias ---
        handlers::catalog::create_category,
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::get_category_depth,

        // --- Catalog: produtos ---
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::set_product_status,
        handlers::catalog::delete_product,

        // --- Catalog: modificadores ---
        handlers::catalog::create_modifier,
        handlers::catalog::list_modifiers,
        handlers::catalog::get_modifier,
        handlers::catalog::update_modifier,
        handlers::catalog::delete_modifier,

        // --- Sales ---
        handlers::sales::create_order,
        handlers::sales::list_orders,
        handlers::sales::get_order,
        handlers::sales::create_invoice,
        handlers::sales::list_invoices,
        handlers::sales::get_invoice,

        // --- Tenancy ---
        handlers::tenancy::create_chain,
        handlers::tenancy::list_chains,
        handlers::tenancy::get_chain,
        handlers::tenancy::update_chain,
    ),
    components(
        schemas(
            // --- Identity ---
            models::identity::CallerIdentity,
            models::identity::RoleAssignment,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::CategoryDetail,
            models::catalog::CategoryDepth,
            models::catalog::NewCategory,
            models::catalog::CategoryChanges,
            models::catalog::ProductStatus,
            models::catalog::Product,
            models::catalog::ProductDetail,
            models::catalog::NewProduct,
            models::catalog::ProductChanges,
            models::catalog::ProductStatusChange,
            models::catalog::Modifier,
            models::catalog::NewModifier,
            models::catalog::ModifierChanges,

            // --- Sales ---
            models::sales::OrderStatus,
            models::sales::PaymentMethod,
            models::sales::Order,
            models::sales::OrderItem,
            models::sales::OrderDetail,
            models::sales::NewOrder,
            models::sales::NewOrderItem,
            models::sales::Invoice,
            models::sales::NewInvoice,

            // --- Tenancy ---
            models::tenancy::ChainStatus,
            models::tenancy::Chain,
            models::tenancy::Store,
            models::tenancy::NewChain,
            models::tenancy::ChainChanges,
        )
    ),
    tags(
        (name = "Users", description = "Identidade do usuário autenticado"),
        (name = "Catalog", description = "Categorias (até 3 níveis), produtos e modificadores"),
        (name = "Sales", description = "Pedidos e notas (hóa đơn)"),
        (name = "Tenancy", description = "Redes (chuỗi) e lojas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
