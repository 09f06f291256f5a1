//! Scripted [`ProductSource`] that records every call.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use keyshop_core::{
    CatalogPage, Category, FilterCriteria, FilteredProducts, Money, ProductId, ProductSummary,
    SearchHit,
};

use super::ProductSource;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SourceCall {
    Page { page: u32, limit: u32 },
    Filter(FilterCriteria),
    Search(String),
    Categories,
}

#[derive(Default)]
pub(crate) struct MockProductSource {
    pages: Mutex<HashMap<u32, CatalogPage>>,
    filtered: Mutex<Vec<ProductSummary>>,
    hits: Mutex<HashMap<String, Vec<SearchHit>>>,
    categories: Mutex<Vec<Category>>,
    failures: Mutex<u32>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<SourceCall>>,
}

pub(crate) fn product(id: &str, name: &str, cents: i64) -> ProductSummary {
    ProductSummary {
        id: ProductId::from(id),
        name: name.to_string(),
        description: None,
        price: Money::from_cents(cents),
        stock: 5,
        category: None,
        images: Vec::new(),
    }
}

impl MockProductSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page: u32, pages: u32, products: Vec<ProductSummary>) -> Self {
        let total = products.len() as u64;
        self.pages.lock().unwrap().insert(
            page,
            CatalogPage {
                products,
                total,
                page,
                pages,
            },
        );
        self
    }

    pub fn with_filtered(self, products: Vec<ProductSummary>) -> Self {
        *self.filtered.lock().unwrap() = products;
        self
    }

    pub fn with_hits(self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.hits.lock().unwrap().insert(query.to_string(), hits);
        self
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        *self.categories.lock().unwrap() = categories;
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    /// The next `n` calls fail with a connection error.
    pub fn fail_next(&self, n: u32) {
        *self.failures.lock().unwrap() = n;
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: SourceCall) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(ClientError::ConnectionFailed("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductSource for MockProductSource {
    async fn fetch_page(&self, page: u32, limit: u32) -> ClientResult<CatalogPage> {
        self.answer(SourceCall::Page { page, limit }).await?;
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or(CatalogPage {
                page,
                ..Default::default()
            }))
    }

    async fn filter(&self, criteria: &FilterCriteria) -> ClientResult<FilteredProducts> {
        self.answer(SourceCall::Filter(criteria.clone())).await?;
        let products = self.filtered.lock().unwrap().clone();
        Ok(FilteredProducts {
            total: products.len() as u64,
            products,
        })
    }

    async fn search(&self, query: &str) -> ClientResult<Vec<SearchHit>> {
        self.answer(SourceCall::Search(query.to_string())).await?;
        Ok(self
            .hits
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.answer(SourceCall::Categories).await?;
        Ok(self.categories.lock().unwrap().clone())
    }
}
