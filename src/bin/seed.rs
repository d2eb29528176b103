use topup_store_api::{
    config::AppConfig,
    db::create_pool,
    services::auth_service,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    auth_service::ensure_admin_account(&pool, &config).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (name, category, uc_amount, price in minor units)
    let products: [(&str, &str, Option<i32>, i64); 6] = [
        ("60 UC", "uc", Some(60), 9900),
        ("325 UC", "uc", Some(325), 49900),
        ("660 UC", "uc", Some(660), 99900),
        ("1800 UC", "uc", Some(1800), 249900),
        ("Royale Pass", "bundle", None, 119900),
        ("Starter Pack", "bundle", None, 29900),
    ];

    for (name, category, uc_amount, price) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, uc_amount, price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category)
        .bind(uc_amount)
        .bind(price)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
