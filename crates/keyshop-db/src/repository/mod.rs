//! # Repository Module
//!
//! Catalog repositories. Each one wraps a clone of the pool and keeps its
//! SQL in one place.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │  state.db.products().list_active_page(page, limit)              │
//! │       ▼                                                                 │
//! │  ProductRepository ─── list / filter / search / CRUD                    │
//! │  CategoryRepository ── filter controls, category names                  │
//! │  MediaRepository ───── image paths (many per product)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod category;
pub mod media;
pub mod product;
