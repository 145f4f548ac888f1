//! # Seed Tool
//!
//! Populates a database with a demo catalog and, optionally, an admin user.
//!
//! ```text
//! cargo run -p emporium-api --bin seed -- --db ./emporium.db \
//!     --admin-username admin --admin-password 'change-me-please'
//! ```
//!
//! Products are only inserted into an empty catalog, so re-running is safe.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use emporium_api::auth::hash_password;
use emporium_core::validation::{validate_email, validate_password, validate_username};
use emporium_core::{Product, Role};
use emporium_db::{new_id, Database, DbConfig, DbError};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed an Emporium database with demo data")]
struct Args {
    /// SQLite database file (created if missing)
    #[arg(long, env = "EMPORIUM_DATABASE__PATH", default_value = "./emporium.db")]
    db: PathBuf,

    /// How many demo products to insert (max: size of the demo catalog)
    #[arg(long, default_value_t = DEMO_CATALOG.len())]
    products: usize,

    /// Create an admin account with this username
    #[arg(long, requires = "admin_password")]
    admin_username: Option<String>,

    /// Password for the admin account
    #[arg(long, env = "EMPORIUM_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Email for the admin account (default: <username>@emporium.local)
    #[arg(long)]
    admin_email: Option<String>,
}

/// (name, description, price in cents, stock)
const DEMO_CATALOG: &[(&str, &str, i64, i64)] = &[
    ("Ceramic Mug", "12oz stoneware mug", 1250, 40),
    ("Cast Iron Teapot", "1.2L, enamel lined", 4599, 8),
    ("Loose Leaf Sampler", "Six 25g tins", 2400, 25),
    ("Bamboo Tray", "Serving tray, 40x28cm", 1899, 15),
    ("Linen Napkins", "Set of four", 2200, 30),
    ("Pour-Over Kettle", "Gooseneck, 1L", 5400, 5),
    ("Glass Tumbler", "300ml, double wall", 900, 60),
    ("Tea Strainer", "Stainless steel", 650, 100),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    emporium_api::init_tracing("info,emporium_db=info");

    let args = Args::parse();

    let db = Database::new(DbConfig::new(&args.db))
        .await
        .with_context(|| format!("Failed to open {}", args.db.display()))?;

    seed_products(&db, args.products).await?;

    if let (Some(username), Some(password)) = (&args.admin_username, &args.admin_password) {
        let email = args
            .admin_email
            .clone()
            .unwrap_or_else(|| format!("{}@emporium.local", username));
        seed_admin(&db, username, password, &email).await?;
    }

    db.close().await;
    info!("Seeding complete");
    Ok(())
}

async fn seed_products(db: &Database, count: usize) -> anyhow::Result<()> {
    let existing = db.products().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping products");
        return Ok(());
    }

    let now = Utc::now();
    for &(name, description, price_cents, stock) in DEMO_CATALOG.iter().take(count) {
        db.products()
            .insert(&Product {
                id: new_id(),
                name: name.to_string(),
                description: Some(description.to_string()),
                price_cents,
                stock,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    info!(count = count.min(DEMO_CATALOG.len()), "Demo products inserted");
    Ok(())
}

async fn seed_admin(db: &Database, username: &str, password: &str, email: &str) -> anyhow::Result<()> {
    validate_username(username)?;
    validate_password(password)?;
    validate_email(email)?;

    let hash = hash_password(password)?;
    match db.users().create(username, email, &hash, Role::Admin).await {
        Ok(user) => {
            info!(username = %user.username, "Admin user created");
            Ok(())
        }
        Err(err @ DbError::UniqueViolation { .. }) => {
            warn!(error = %err, "Admin user not created");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
