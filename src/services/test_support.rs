// src/services/test_support.rs

//! Fixtures compartilhadas pelos testes dos serviços.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    cache::{CacheFacade, MemoryCacheStore},
    models::{
        catalog::{Category, Modifier, Product, ProductStatus},
        sales::{Order, OrderStatus},
        identity::{CallerIdentity, RoleAssignment, SUPER_ADMIN_ROLE},
        tenancy::Store,
    },
};

pub fn category(name: &str, parent_id: Option<Uuid>, chain_id: Option<Uuid>) -> Category {
    let now = Utc::now();
    Category {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        parent_id,
        chain_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn product(name: &str, price: i64, category_id: Uuid, chain_id: Option<Uuid>) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        price: Decimal::from(price),
        description: None,
        image_url: None,
        category_id,
        chain_id,
        status: ProductStatus::Visible,
        created_at: now,
        updated_at: now,
    }
}

pub fn modifier(name: &str, options: &[&str], chain_id: Option<Uuid>) -> Modifier {
    let now = Utc::now();
    Modifier {
        id: Uuid::new_v4(),
        name: name.into(),
        options: options.iter().map(|option| option.to_string()).collect(),
        chain_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn store(chain_id: Option<Uuid>) -> Store {
    let now = Utc::now();
    Store {
        id: Uuid::new_v4(),
        chain_id,
        name: "TCH Nguyễn Huệ".into(),
        code: format!("S-{}", Uuid::new_v4().simple()),
        address: None,
        phone: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn order(chain_id: Option<Uuid>, store_id: Uuid, subtotal: Decimal) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        chain_id,
        store_id,
        user_id: None,
        status: OrderStatus::Pending,
        subtotal,
        created_at: now,
        updated_at: now,
    }
}

pub fn identity(chain_id: Option<Uuid>, store_id: Option<Uuid>) -> CallerIdentity {
    CallerIdentity {
        id: Uuid::new_v4(),
        username: "nv01".into(),
        email: "nv01@pos.vn".into(),
        chain_id,
        store_id,
        roles: vec![],
        permissions: vec!["*".into()],
    }
}

pub fn super_admin() -> CallerIdentity {
    let mut identity = identity(None, None);
    identity.roles.push(RoleAssignment {
        code: SUPER_ADMIN_ROLE.into(),
        level: 100,
        chain_id: None,
        store_id: None,
    });
    identity
}

pub fn cache() -> CacheFacade {
    CacheFacade::new(
        Arc::new(MemoryCacheStore::new()),
        Duration::from_secs(60),
        Duration::from_secs(600),
    )
}
