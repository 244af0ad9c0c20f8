use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(&pool, "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user_with_role(&pool, "user@example.com", "user123", "user").await?;
    ensure_customer(&pool, user_id).await?;

    let collection_id = ensure_collection(&pool, "Apparel").await?;
    seed_products(&pool, collection_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_customer(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let customer_id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, user_id) VALUES ($1, $2)")
        .bind(customer_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO carts (id, customer_id) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .execute(pool)
        .await?;

    println!("Ensured customer profile for {user_id}");
    Ok(customer_id)
}

async fn ensure_collection(pool: &sqlx::PgPool, title: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM collections WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO collections (id, title) VALUES ($1, $2)")
        .bind(id)
        .bind(title)
        .execute(pool)
        .await?;

    println!("Ensured collection {title}");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, collection_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Wool Sweater", "wool-sweater", "Heavy knit for cold days", "199.99", 50),
        ("Linen Shirt", "linen-shirt", "Light summer shirt", "89.50", 100),
        ("Denim Jacket", "denim-jacket", "Classic cut", "259.00", 30),
        ("Canvas Tote", "canvas-tote", "Everyday carry", "39.90", 200),
    ];

    for (title, slug, desc, price, inventory) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, title, slug, description, unit_price, inventory, collection_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(slug)
        .bind(desc)
        .bind(price.parse::<Decimal>()?)
        .bind(inventory)
        .bind(collection_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
