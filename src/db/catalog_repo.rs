// src/db/catalog_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::{AppError, EntityKind},
    db::store::CatalogStore,
    models::catalog::{
        Category, CategoryDetail, CategoryQuery, Modifier, ModifierQuery, Product, ProductDetail,
        ProductQuery,
    },
    services::tenant_filter::TenantFilter,
};

// Linha crua da tabela `modifiers` (opções em texto JSON)
#[derive(Debug, FromRow)]
struct ModifierRow {
    id: Uuid,
    name: String,
    options: String,
    chain_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ModifierRow> for Modifier {
    type Error = AppError;

    fn try_from(row: ModifierRow) -> Result<Self, Self::Error> {
        let options: Vec<String> = serde_json::from_str(&row.options)
            .map_err(|e| anyhow::anyhow!("Opções inválidas no modificador {}: {}", row.id, e))?;
        Ok(Modifier {
            id: row.id,
            name: row.name,
            options,
            chain_id: row.chain_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn serialize_options(modifier: &Modifier) -> Result<String, AppError> {
    serde_json::to_string(&modifier.options).map_err(|e| anyhow::Error::from(e).into())
}

fn search_term(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
}

// Repositório do catálogo (categorias, produtos, modificadores) no PostgreSQL
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    // ---
    // Categorias
    // ---

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_category_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, AppError> {
        let Some(category) = self.find_category(id).await? else {
            return Ok(None);
        };

        let parent = match category.parent_id {
            Some(parent_id) => self.find_category(parent_id).await?,
            None => None,
        };

        let children = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE parent_id = $1 ORDER BY name ASC",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let product_count = self.count_products_in_category(id).await?;

        Ok(Some(CategoryDetail {
            category,
            parent,
            children,
            product_count,
        }))
    }

    async fn list_categories(
        &self,
        filter: &TenantFilter,
        query: &CategoryQuery,
    ) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE ($1::uuid IS NULL OR chain_id IS NULL OR chain_id = $1)
              AND ($2::uuid IS NULL OR parent_id = $2)
              AND (NOT $3::boolean OR parent_id IS NULL)
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')
            ORDER BY name ASC
            "#,
        )
            .bind(filter.chain_id)
            .bind(query.parent_id)
            .bind(query.roots_only)
            .bind(search_term(&query.search))
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn list_child_category_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn insert_category(&self, category: &Category) -> Result<Category, AppError> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description, parent_id, chain_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.parent_id)
            .bind(category.chain_id)
            .bind(category.created_at)
            .bind(category.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn save_category(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, description = $3, parent_id = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.parent_id)
            .bind(category.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::not_found(EntityKind::Category, category.id))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Produtos
    // ---

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn find_product_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, AppError> {
        let Some(product) = self.find_product(id).await? else {
            return Ok(None);
        };

        let category = self
            .find_category(product.category_id)
            .await?
            .ok_or(AppError::not_found(EntityKind::Category, product.category_id))?;

        let rows = sqlx::query_as::<_, ModifierRow>(
            r#"
            SELECT m.* FROM modifiers m
            JOIN product_modifiers pm ON pm.modifier_id = m.id
            WHERE pm.product_id = $1
            ORDER BY m.name ASC
            "#,
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let modifiers = rows
            .into_iter()
            .map(Modifier::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProductDetail {
            product,
            category,
            modifiers,
        }))
    }

    async fn list_products(
        &self,
        filter: &TenantFilter,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::uuid IS NULL OR chain_id IS NULL OR chain_id = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::product_status IS NULL OR status = $3)
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')
            ORDER BY name ASC
            "#,
        )
            .bind(filter.chain_id)
            .bind(query.category_id)
            .bind(query.status)
            .bind(search_term(&query.search))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn insert_product(
        &self,
        product: &Product,
        modifier_ids: &[Uuid],
    ) -> Result<Product, AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o produto
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, price, description, image_url, category_id, chain_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(&product.image_url)
            .bind(product.category_id)
            .bind(product.chain_id)
            .bind(product.status)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        // 3. Vincula os modificadores (inserção em massa com UNNEST)
        if !modifier_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO product_modifiers (product_id, modifier_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
                .bind(created.id)
                .bind(modifier_ids)
                .execute(&mut *tx)
                .await?;
        }

        // 4. Commit
        tx.commit().await?;
        Ok(created)
    }

    async fn save_product(
        &self,
        product: &Product,
        modifier_ids: Option<&[Uuid]>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, price = $3, description = $4, image_url = $5,
                category_id = $6, status = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(&product.image_url)
            .bind(product.category_id)
            .bind(product.status)
            .bind(product.updated_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::not_found(EntityKind::Product, product.id))?;

        if let Some(modifier_ids) = modifier_ids {
            sqlx::query("DELETE FROM product_modifiers WHERE product_id = $1")
                .bind(product.id)
                .execute(&mut *tx)
                .await?;

            if !modifier_ids.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO product_modifiers (product_id, modifier_id)
                    SELECT $1, unnest($2::uuid[])
                    ON CONFLICT DO NOTHING
                    "#,
                )
                    .bind(product.id)
                    .bind(modifier_ids)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn count_order_items_for_product(&self, product_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn delete_product_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        // Tudo ou nada: se qualquer DELETE falhar, o drop do `tx` faz rollback
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_modifiers WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM recipes WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Modificadores
    // ---

    async fn find_modifier(&self, id: Uuid) -> Result<Option<Modifier>, AppError> {
        sqlx::query_as::<_, ModifierRow>("SELECT * FROM modifiers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Modifier::try_from)
            .transpose()
    }

    async fn list_modifiers(
        &self,
        filter: &TenantFilter,
        query: &ModifierQuery,
    ) -> Result<Vec<Modifier>, AppError> {
        let rows = sqlx::query_as::<_, ModifierRow>(
            r#"
            SELECT * FROM modifiers
            WHERE ($1::uuid IS NULL OR chain_id IS NULL OR chain_id = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY name ASC
            "#,
        )
            .bind(filter.chain_id)
            .bind(search_term(&query.search))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Modifier::try_from).collect()
    }

    async fn insert_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError> {
        let row = sqlx::query_as::<_, ModifierRow>(
            r#"
            INSERT INTO modifiers (id, name, options, chain_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(modifier.id)
            .bind(&modifier.name)
            .bind(serialize_options(modifier)?)
            .bind(modifier.chain_id)
            .bind(modifier.created_at)
            .bind(modifier.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Modifier::try_from(row)
    }

    async fn save_modifier(&self, modifier: &Modifier) -> Result<Modifier, AppError> {
        let row = sqlx::query_as::<_, ModifierRow>(
            r#"
            UPDATE modifiers
            SET name = $2, options = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(modifier.id)
            .bind(&modifier.name)
            .bind(serialize_options(modifier)?)
            .bind(modifier.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::not_found(EntityKind::Modifier, modifier.id))?;
        Modifier::try_from(row)
    }

    async fn count_products_for_modifier(&self, modifier_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_modifiers WHERE modifier_id = $1",
        )
            .bind(modifier_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_modifier(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM modifiers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
