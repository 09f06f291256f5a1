//! # Product Source
//!
//! The HTTP JSON collaborator that serves the catalog. The engines talk to
//! it through the [`ProductSource`] trait so tests can substitute a scripted
//! source.
//!
//! | Method        | Endpoint                                   |
//! |---------------|--------------------------------------------|
//! | `fetch_page`  | `GET /api/products?page=P&limit=L`         |
//! | `filter`      | `GET /api/products/filter?category=&...`   |
//! | `search`      | `GET /api/products/search?q=`              |
//! | `categories`  | `GET /api/categories`                      |

use async_trait::async_trait;
use keyshop_core::{CatalogPage, Category, FilterCriteria, FilteredProducts, SearchHit};

use crate::error::ClientResult;

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpProductSource;

#[async_trait]
pub trait ProductSource: Send + Sync {
    /// One page of active products, newest first. `page` is 1-based.
    async fn fetch_page(&self, page: u32, limit: u32) -> ClientResult<CatalogPage>;

    /// The complete set matching every option that is set in `criteria`.
    async fn filter(&self, criteria: &FilterCriteria) -> ClientResult<FilteredProducts>;

    /// Products whose name contains `query`.
    async fn search(&self, query: &str) -> ClientResult<Vec<SearchHit>>;

    async fn categories(&self) -> ClientResult<Vec<Category>>;
}
