//! # Seed Data Generator
//!
//! Populates the catalog with keyboard accessories for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./keyshop_dev.db
//! cargo run -p keyshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p keyshop-db --bin seed -- --db ./data/keyshop.db
//!
//! # Repeat the catalog N times (for paging tests)
//! cargo run -p keyshop-db --bin seed -- --copies 5
//! ```
//!
//! ## Generated Catalog
//! Six categories (keycaps, switches, cases, cables, deskmats, tools), each
//! product with one to three images and a stock level that leaves some
//! products sold out, so the `in_stock` filter has something to do.

use std::env;
use std::time::Instant;

use anyhow::Context;
use keyshop_core::Money;
use keyshop_db::{Database, DbConfig, NewProduct};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (category, [(name, price in cents, description)])
const CATALOG: &[(&str, &[(&str, i64, &str)])] = &[
    (
        "Keycaps",
        &[
            ("GMK Olivia++ Base Kit", 129_00, "Doubleshot ABS, Cherry profile, pink and cream."),
            ("PBT Blank Keycap Set", 34_99, "Dye-sub ready blanks in OEM profile."),
            ("Keycap Set", 24_99, "Everyday PBT set for 60% and 65% boards."),
            ("Artisan Resin Escape Key", 45_00, "Hand-cast resin, one of a kind."),
        ],
    ),
    (
        "Switches",
        &[
            ("Gateron Yellow (x70)", 19_90, "Linear, 50g, factory lubed."),
            ("Holy Panda (x36)", 59_00, "Tactile, pronounced bump."),
            ("Kailh Box Jade (x70)", 38_50, "Clicky, crisp and loud."),
        ],
    ),
    (
        "Cases",
        &[
            ("Aluminium 65% Case", 149_00, "CNC aluminium, gasket mount."),
            ("Acrylic 60% Case", 59_90, "Frosted acrylic stack case."),
        ],
    ),
    (
        "Cables",
        &[
            ("Coiled Aviator Cable", 45_00, "USB-C, detachable GX16 connector."),
            ("Braided USB-C Cable", 12_99, "1.8m, paracord sleeve."),
        ],
    ),
    (
        "Deskmats",
        &[
            ("Topographic Deskmat", 29_00, "900x400mm, stitched edges."),
            ("Écume Deskmat", 32_00, "Wave print, 900x400mm."),
        ],
    ),
    (
        "Tools",
        &[
            ("Switch Puller", 4_50, "Stainless steel."),
            ("Lube Station", 18_00, "Holds 30 switches."),
            ("Krytox 205g0 (5ml)", 9_99, "Switch lube."),
        ],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,keyshop=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./keyshop_dev.db");
    let mut copies: usize = 1;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--copies" | "-c" => {
                if i + 1 < args.len() {
                    copies = args[i + 1].parse().unwrap_or(1).max(1);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Keyshop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./keyshop_dev.db)");
                println!("  -c, --copies <N>     Insert the catalog N times (default: 1)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(db = %db_path, copies, "Seeding catalog");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products; delete the file to regenerate"
        );
        return Ok(());
    }

    let start = Instant::now();
    let mut generated = 0usize;

    for (category_name, products) in CATALOG {
        let category = db
            .categories()
            .insert(category_name)
            .await
            .with_context(|| format!("inserting category {category_name}"))?;

        for copy in 0..copies {
            for (index, (name, cents, description)) in products.iter().enumerate() {
                let seed = generated + index;
                let name = if copy == 0 {
                    name.to_string()
                } else {
                    format!("{name} #{}", copy + 1)
                };

                let product = db
                    .products()
                    .insert(&NewProduct {
                        name,
                        description: Some(description.to_string()),
                        price: Money::from_cents(*cents),
                        // Every fifth product is sold out.
                        stock: if seed % 5 == 4 { 0 } else { (seed % 40 + 1) as i64 },
                        category_id: Some(category.id),
                    })
                    .await?;

                for image in 0..(seed % 3 + 1) {
                    db.media()
                        .attach(product.id, &format!("products/{}-{}.jpg", product.id, image))
                        .await?;
                }
            }
            generated += products.len();
        }
    }

    info!(
        generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    let keycaps = db.products().search_by_name("keycap", 10).await?;
    info!(results = keycaps.len(), "Search 'keycap'");

    db.close().await;
    Ok(())
}
