//! # keyshop-db: Catalog Database Layer for Keyshop
//!
//! SQLite storage for the product catalog that the storefront API serves.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Keyshop Data Flow                                │
//! │                                                                         │
//! │  GET /api/products?page=2                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    keyshop-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │    │    │
//! │  │   │               │    │ ProductRepo   │    │ 001_catalog  │    │    │
//! │  │   │ SqlitePool    │◄───│ CategoryRepo  │    │ 002_indexes  │    │    │
//! │  │   │               │    │ MediaRepo     │    │              │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                SQLite file (KEYSHOP_DB_PATH)                    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keyshop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("keyshop.db")).await?;
//! let newest = db.products().list_active_page(1, 12).await?;
//! let total = db.products().count_active().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::media::{MediaRecord, MediaRepository};
pub use repository::product::{NewProduct, ProductRecord, ProductRepository};
