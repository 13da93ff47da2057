//! # Seed Data Generator
//!
//! Creates the test user and a small sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Default database, default test user
//! cargo run -p drops-db --bin seed
//!
//! # Custom database and credentials
//! cargo run -p drops-db --bin seed -- --db ./data/drops.db --email me@example.com --password secret
//! ```
//!
//! Without `--db` the path comes from `DROPS_DB_PATH` (default `./drops.db`).
//!
//! Both steps are idempotent: an existing user with the same email and a
//! non-empty catalog are left untouched.

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use drops_core::{Category, NewReleaseImage, Offer, Release, Style};
use drops_db::{Database, DbConfig};

const DEFAULT_EMAIL: &str = "test@drops.dev";
const DEFAULT_PASSWORD: &str = "password";

/// (category, brand, [(name, sku, gender, color, days from today, usd)])
type SampleStyle = (
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str, &'static str, &'static str, Option<i64>, f64)],
);

/// Sample catalog: past, upcoming and unscheduled releases across brands.
const SAMPLE: &[SampleStyle] = &[
    (
        "Sneakers",
        "nike",
        &[
            ("Air Jordan 1 Chicago", "AJ1-555088-101", "m", "white/varsity red", Some(-120), 180.0),
            ("Air Max 1 Patta", "AM1-DH1348-004", "u", "black/white", Some(14), 160.0),
            ("Dunk Low Panda", "DD1391-100", "f", "white/black", None, 110.0),
        ],
    ),
    (
        "Sneakers",
        "adidas",
        &[
            ("Samba OG", "B75806", "u", "cloud white/core black", Some(-30), 100.0),
            ("Yeezy Boost 350 V2", "YZY-HQ6316", "m", "onyx", Some(45), 230.0),
        ],
    ),
    (
        "Apparel",
        "stussy",
        &[("Basic Logo Hoodie", "STU-118447", "u", "heather grey", Some(7), 130.0)],
    ),
];

const OFFERS: &[(&str, bool, &str)] = &[
    ("live", false, "worldwide"),
    ("raffle", true, "eu"),
    ("closed", false, "pickup"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;
    let mut email = String::from(DEFAULT_EMAIL);
    let mut password = String::from(DEFAULT_PASSWORD);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if i + 1 < args.len() {
                    email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Drop Catalog Seed");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: $DROPS_DB_PATH or ./drops.db)");
                println!("  -e, --email <EMAIL>      Test user email (default: {})", DEFAULT_EMAIL);
                println!("  -p, --password <PASS>    Test user password (default: {})", DEFAULT_PASSWORD);
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("🌱 Drop Catalog Seed");
    println!("====================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Test user
    match db.users().get_by_email(&email).await? {
        Some(existing) => {
            warn!(email = %email, "User already exists, skipping");
            println!("⚠ User {} already exists ({})", existing.email, existing.id);
        }
        None => {
            let username = email.split('@').next().unwrap_or("test").to_string();
            let user = db.users().insert(&email, &username, &password).await?;
            info!(id = %user.id, "Test user created");
            println!("✓ Created user {} ({})", user.email, user.id);
        }
    }

    // Sample catalog
    let existing = db.catalog().count_releases().await?;
    if existing > 0 {
        warn!(existing, "Catalog not empty, skipping sample releases");
        println!("⚠ Database already has {} releases", existing);
        println!("  Skipping sample catalog to avoid duplicates.");
    } else {
        let seeded = seed_catalog(&db).await?;
        println!("✓ Created {} sample releases", seeded);
    }

    println!();
    println!("Totals:");
    println!("  Users:    {}", db.users().count().await?);
    println!("  Releases: {}", db.catalog().count_releases().await?);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,drops=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Inserts the sample catalog and returns the number of releases created.
async fn seed_catalog(db: &Database) -> Result<usize, Box<dyn std::error::Error>> {
    let catalog = db.catalog();
    let today = Utc::now().date_naive();
    let mut categories: Vec<Category> = Vec::new();
    let mut seeded = 0;

    for (category_name, brand, releases) in SAMPLE {
        let category = match categories.iter().find(|c| c.name == *category_name) {
            Some(category) => category.clone(),
            None => {
                let category = Category {
                    id: Uuid::new_v4().to_string(),
                    name: category_name.to_string(),
                };
                catalog.insert_category(&category).await?;
                categories.push(category.clone());
                category
            }
        };

        let style = Style {
            id: Uuid::new_v4().to_string(),
            brand: brand.to_string(),
            category_id: Some(category.id),
        };
        catalog.insert_style(&style).await?;

        for (name, sku, gender, color, days, usd) in releases.iter() {
            let now = Utc::now();
            let release = Release {
                id: Uuid::new_v4().to_string(),
                slug: slugify(name),
                name: name.to_string(),
                sku: sku.to_string(),
                gender: gender.to_string(),
                color: color.to_string(),
                release_date: days.map(|d| today + Duration::days(d)),
                price_eur: Some((usd * 0.92).round()),
                price_gbp: Some((usd * 0.79).round()),
                price_usd: Some(*usd),
                hidden_dashboard: false,
                style_id: Some(style.id.clone()),
                created_at: now,
                updated_at: now,
            };
            catalog.insert_release(&release).await?;

            let (status, raffle, shipping) = OFFERS[seeded % OFFERS.len()];
            catalog
                .insert_offer(&Offer {
                    id: Uuid::new_v4().to_string(),
                    release_id: release.id.clone(),
                    status: status.to_string(),
                    raffle,
                    shipping: shipping.to_string(),
                })
                .await?;

            db.releases()
                .create_images(
                    &release.id,
                    &[NewReleaseImage::new(format!(
                        "https://images.drops.dev/{}.jpg",
                        release.slug
                    ))],
                )
                .await?;

            seeded += 1;
        }
    }

    info!(seeded, "Sample catalog created");
    Ok(seeded)
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
