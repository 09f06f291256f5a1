//! HTTP route handlers.

pub mod categories;
pub mod health;
pub mod products;

use keyshop_core::ProductSummary;
use keyshop_db::ProductRecord;

use crate::error::ApiResult;
use crate::AppState;

/// Turns product rows into wire summaries with public image URLs, loading
/// the media for every row in one query.
pub(crate) async fn with_images(
    state: &AppState,
    records: Vec<ProductRecord>,
) -> ApiResult<Vec<ProductSummary>> {
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    let mut paths = state.db.media().paths_for_products(&ids).await?;

    Ok(records
        .into_iter()
        .map(|record| {
            let images = paths
                .remove(&record.id)
                .unwrap_or_default()
                .iter()
                .map(|path| state.media_url(path))
                .collect();
            record.into_summary(images)
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use keyshop_core::Money;
    use keyshop_db::{Database, DbConfig, NewProduct};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::{router, AppState};

    /// In-memory catalog:
    ///
    /// | id | name               | price  | stock | category | images |
    /// |----|--------------------|--------|-------|----------|--------|
    /// | 1  | Keycap Set         | 24.99  | 10    | Keycaps  | 2      |
    /// | 2  | Artisan Escape Key | 45.00  | 0     | Keycaps  | 0      |
    /// | 3  | Coiled Cable       | 45.00  | 3     | Cables   | 1      |
    /// | 4  | Switch Puller      | 4.50   | 7     | none     | 0      |
    pub async fn seeded_app() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let keycaps = db.categories().insert("Keycaps").await.unwrap();
        let cables = db.categories().insert("Cables").await.unwrap();

        let rows = [
            ("Keycap Set", 2499, 10, Some(keycaps.id)),
            ("Artisan Escape Key", 4500, 0, Some(keycaps.id)),
            ("Coiled Cable", 4500, 3, Some(cables.id)),
            ("Switch Puller", 450, 7, None),
        ];
        for (name, cents, stock, category_id) in rows {
            db.products()
                .insert(&NewProduct {
                    name: name.to_string(),
                    description: Some(format!("{name} description")),
                    price: Money::from_cents(cents),
                    stock,
                    category_id,
                })
                .await
                .unwrap();
        }
        db.media().attach(1, "products/1-0.jpg").await.unwrap();
        db.media().attach(1, "products/1-1.jpg").await.unwrap();
        db.media().attach(3, "products/3-0.jpg").await.unwrap();

        let state = Arc::new(AppState::new(db.clone(), "/uploads/"));
        (router(state), db)
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
