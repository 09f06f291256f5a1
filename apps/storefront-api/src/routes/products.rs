//! Product listing, filtering, search and detail.
//!
//! Query parameters are read as strings and interpreted leniently: a
//! missing, empty or unparsable `page`/`limit`/`category` falls back to its
//! default. Only a malformed price bound is rejected with 400, since
//! silently ignoring it would widen the result set.

use axum::extract::{Path, Query, State};
use axum::Json;
use keyshop_core::validation::{validate_filter_range, validate_search_query};
use keyshop_core::{
    CatalogPage, FilterCriteria, FilteredProducts, Money, ProductSummary, SearchHit,
    ValidationError, CATALOG_PAGE_SIZE,
};
use serde::Deserialize;
use tracing::debug;

use super::with_images;
use crate::error::{ApiError, ApiResult};
use crate::SharedState;

/// Upper bound for `limit` on the paged listing.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Rows returned by the search endpoint.
pub const SEARCH_RESULT_LIMIT: u32 = 10;

// =============================================================================
// GET /api/products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

impl PageParams {
    fn page(&self) -> u32 {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    fn limit(&self) -> u32 {
        parse_positive(self.limit.as_deref())
            .unwrap_or(CATALOG_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<CatalogPage>> {
    let page = params.page();
    let limit = params.limit();

    let repo = state.db.products();
    let records = repo.list_active_page(page, limit).await?;
    let total = repo.count_active().await?.max(0) as u64;
    let pages = total.div_ceil(u64::from(limit)) as u32;

    let products = with_images(&state, records).await?;
    debug!(page, limit, total, returned = products.len(), "Served catalog page");

    Ok(Json(CatalogPage {
        products,
        total,
        page,
        pages,
    }))
}

// =============================================================================
// GET /api/products/filter
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    category: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
    in_stock: Option<String>,
}

impl FilterParams {
    /// Builds criteria. Empty strings and category `0` mean "not set".
    pub fn to_criteria(&self) -> ApiResult<FilterCriteria> {
        let category = self
            .category
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);

        let criteria = FilterCriteria {
            category,
            min_price: parse_price(self.min_price.as_deref())?,
            max_price: parse_price(self.max_price.as_deref())?,
            in_stock: matches!(
                self.in_stock.as_deref().map(str::trim),
                Some("true" | "1" | "on" | "yes")
            ),
        };
        validate_filter_range(&criteria)?;
        Ok(criteria)
    }
}

fn parse_price(raw: Option<&str>) -> ApiResult<Option<Money>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(Money::parse_decimal(value)?)),
    }
}

pub async fn filter(
    State(state): State<SharedState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<FilteredProducts>> {
    let criteria = params.to_criteria()?;

    let records = state.db.products().filter(&criteria).await?;
    let products = with_images(&state, records).await?;
    debug!(?criteria, matched = products.len(), "Served filter");

    Ok(Json(FilteredProducts {
        total: products.len() as u64,
        products,
    }))
}

// =============================================================================
// GET /api/products/search
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    let query = match validate_search_query(&params.q) {
        Ok(query) => query,
        Err(ValidationError::Required { .. } | ValidationError::TooShort { .. }) => {
            return Ok(Json(Vec::new()));
        }
        Err(e) => return Err(e.into()),
    };

    let records = state
        .db
        .products()
        .search_by_name(query, SEARCH_RESULT_LIMIT)
        .await?;
    let hits: Vec<SearchHit> = with_images(&state, records)
        .await?
        .into_iter()
        .map(|p| SearchHit {
            image: p.primary_image().map(str::to_string),
            id: p.id,
            name: p.name,
            price: p.price,
            category: p.category,
        })
        .collect();

    debug!(query = %query, hits = hits.len(), "Served search");
    Ok(Json(hits))
}

// =============================================================================
// GET /api/products/{id}
// =============================================================================

pub async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductSummary>> {
    let not_found = || ApiError::NotFound(format!("Product {id}"));
    let numeric: i64 = id.trim().parse().map_err(|_| not_found())?;

    let record = state
        .db
        .products()
        .get_active_by_id(numeric)
        .await?
        .ok_or_else(not_found)?;

    let product = with_images(&state, vec![record])
        .await?
        .into_iter()
        .next()
        .ok_or_else(not_found)?;
    Ok(Json(product))
}
