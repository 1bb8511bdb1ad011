//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod cache;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, `info`
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let catalog_routes = Router::new()
        .route("/categories"
               ,post(handlers::catalog::create_category)
               .get(handlers::catalog::list_categories)
        )
        .route("/categories/{id}"
               ,get(handlers::catalog::get_category)
               .patch(handlers::catalog::update_category)
               .delete(handlers::catalog::delete_category)
        )
        .route("/categories/{id}/depth", get(handlers::catalog::get_category_depth))
        .route("/products"
               ,post(handlers::catalog::create_product)
               .get(handlers::catalog::list_products)
        )
        .route("/products/{id}"
               ,get(handlers::catalog::get_product)
               .patch(handlers::catalog::update_product)
               .delete(handlers::catalog::delete_product)
        )
        .route("/products/{id}/status", patch(handlers::catalog::set_product_status))
        .route("/modifiers"
               ,post(handlers::catalog::create_modifier)
               .get(handlers::catalog::list_modifiers)
        )
        .route("/modifiers/{id}"
               ,get(handlers::catalog::get_modifier)
               .patch(handlers::catalog::update_modifier)
               .delete(handlers::catalog::delete_modifier)
        );

    let sales_routes = Router::new()
        .route("/orders"
               ,post(handlers::sales::create_order)
               .get(handlers::sales::list_orders)
        )
        .route("/orders/{id}", get(handlers::sales::get_order))
        .route("/orders/{id}/invoice", post(handlers::sales::create_invoice))
        .route("/invoices", get(handlers::sales::list_invoices))
        .route("/invoices/{id}", get(handlers::sales::get_invoice));

    let tenancy_routes = Router::new()
        .route("/chains"
               ,post(handlers::tenancy::create_chain)
               .get(handlers::tenancy::list_chains)
        )
        .route("/chains/{id}"
               ,get(handlers::tenancy::get_chain)
               .patch(handlers::tenancy::update_chain)
        );

    // Tudo sob /api exige token, exceto o health
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .merge(catalog_routes)
        .merge(sales_routes)
        .merge(tenancy_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
