//! Seed the database with demo marketplace data.
//!
//! Creates two users (a seller and a buyer), a store with a handful of
//! products, and a small knowledge graph: the seller and buyer as `Person`
//! entities plus a witnessed `BuyAction` between them.
//!
//! All demo users share the password `mercantia-demo`. Seeding is
//! idempotent on email and slug: rerunning skips rows that already exist.
//!
//! # Usage
//!
//! ```bash
//! mercantia seed
//! ```

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{UserError, hash_password};

const DEMO_PASSWORD: &str = "mercantia-demo";

struct DemoProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: i64,
    inventory: i32,
    category: &'static str,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Ceramic Mug",
        slug: "ceramic-mug",
        description: "Hand-thrown stoneware mug, 350ml",
        price: 4500,
        inventory: 24,
        category: "kitchen",
    },
    DemoProduct {
        name: "Linen Tea Towel",
        slug: "linen-tea-towel",
        description: "Washed linen towel, natural dye",
        price: 2900,
        inventory: 40,
        category: "kitchen",
    },
    DemoProduct {
        name: "Walnut Serving Board",
        slug: "walnut-serving-board",
        description: "Solid walnut board, oil finish",
        price: 12900,
        inventory: 8,
        category: "kitchen",
    },
];

/// Seed demo data.
///
/// # Errors
///
/// Returns `UserError` if the database URL is missing or a query fails.
pub async fn run() -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let database_url = super::migrate::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let seller_id = ensure_user(&pool, "seller@mercantia.test", "Ana Oliveira").await?;
    let buyer_id = ensure_user(&pool, "buyer@mercantia.test", "Bruno Costa").await?;

    let store_id = ensure_store(&pool, seller_id).await?;
    for product in DEMO_PRODUCTS {
        ensure_product(&pool, store_id, product).await?;
    }

    let seller_entity = ensure_entity(&pool, "Person", "Ana Oliveira", Some(seller_id)).await?;
    let buyer_entity = ensure_entity(&pool, "Person", "Bruno Costa", Some(buyer_id)).await?;
    seed_relation(&pool, buyer_entity, seller_entity).await?;

    tracing::info!("Seed complete! Demo login: buyer@mercantia.test / {DEMO_PASSWORD}");
    Ok(())
}

async fn ensure_user(pool: &PgPool, email: &str, name: &str) -> Result<Uuid, UserError> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        tracing::info!("User {email} already exists, skipping");
        return Ok(id);
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password_hash, full_name) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created user {email}");
    Ok(id)
}

async fn ensure_store(pool: &PgPool, owner_id: Uuid) -> Result<Uuid, UserError> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM stores WHERE user_id = $1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        tracing::info!("Demo store already exists, skipping");
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO stores (user_id, name, slug, description, email) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(owner_id)
    .bind("Casa Aberta")
    .bind("casa-aberta")
    .bind("Handmade homewares from small Brazilian workshops")
    .bind("hello@casa-aberta.test")
    .fetch_one(pool)
    .await?;

    tracing::info!("Created demo store");
    Ok(id)
}

async fn ensure_product(
    pool: &PgPool,
    store_id: Uuid,
    product: &DemoProduct,
) -> Result<(), UserError> {
    let result = sqlx::query(
        "INSERT INTO products \
             (store_id, name, slug, description, price, inventory, category) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (store_id, slug) DO NOTHING",
    )
    .bind(store_id)
    .bind(product.name)
    .bind(product.slug)
    .bind(product.description)
    .bind(product.price)
    .bind(product.inventory)
    .bind(product.category)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!("Created product {}", product.slug);
    }
    Ok(())
}

async fn ensure_entity(
    pool: &PgPool,
    entity_type: &str,
    name: &str,
    created_by: Option<Uuid>,
) -> Result<Uuid, UserError> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM entities \
         WHERE entity_type = $1 AND properties->>'name' = $2",
    )
    .bind(entity_type)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO entities (entity_type, properties, trust_score, created_by) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(entity_type)
    .bind(json!({ "name": name }))
    .bind(75_i32)
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created {entity_type} entity for {name}");
    Ok(id)
}

async fn seed_relation(pool: &PgPool, agent_id: Uuid, object_id: Uuid) -> Result<(), UserError> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM relations WHERE agent_id = $1 AND object_id = $2",
    )
    .bind(agent_id)
    .bind(object_id)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        tracing::info!("Demo relation already exists, skipping");
        return Ok(());
    }

    let relation_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO relations (relation_type, agent_id, object_id, context, trust_score) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind("BuyAction")
    .bind(agent_id)
    .bind(object_id)
    .bind(json!({ "channel": "demo" }))
    .bind(80_i32)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO proofs (relation_id, proof_type, url) \
         VALUES ($1, $2, $3)",
    )
    .bind(relation_id)
    .bind("receipt")
    .bind("https://mercantia.test/receipts/demo-1")
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO witnesses (relation_id, entity_id) \
         VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(relation_id)
    .bind(object_id)
    .execute(pool)
    .await?;

    tracing::info!("Created demo relation with proof and witness");
    Ok(())
}
