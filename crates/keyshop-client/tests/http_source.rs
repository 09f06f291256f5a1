//! HttpProductSource against the real storefront API router on a local port.

use std::sync::Arc;

use keyshop_client::{
    CatalogSyncEngine, ClientConfig, ClientError, HttpProductSource, MemoryStore, ProductSource,
};
use keyshop_core::{FilterCriteria, Money};
use keyshop_db::{Database, DbConfig, NewProduct};
use keyshop_storefront_api::{router, AppState};
use tokio::net::TcpListener;

/// Serves a catalog of `count` products (ids 1..=count, every third one
/// sold out) and returns the base URL.
async fn serve_catalog(count: i64) -> String {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let switches = db.categories().insert("Switches").await.unwrap();
    for i in 1..=count {
        let product = db
            .products()
            .insert(&NewProduct {
                name: format!("Switch Pack {i}"),
                description: None,
                price: Money::from_cents(1000 + i * 100),
                stock: if i % 3 == 0 { 0 } else { 5 },
                category_id: Some(switches.id),
            })
            .await
            .unwrap();
        db.media()
            .attach(product.id, &format!("products/{}.jpg", product.id))
            .await
            .unwrap();
    }

    let app = router(Arc::new(AppState::new(db, "/uploads/")));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn source_for(base_url: String) -> HttpProductSource {
    let mut config = ClientConfig::default();
    config.source.base_url = base_url;
    HttpProductSource::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_page_decodes_server_response() {
    let source = source_for(serve_catalog(14).await);

    let page = source.fetch_page(1, 12).await.unwrap();
    assert_eq!(page.total, 14);
    assert_eq!(page.pages, 2);
    assert_eq!(page.products.len(), 12);
    assert_eq!(page.products[0].id.as_str(), "14");
    assert_eq!(page.products[0].price, Money::from_cents(2400));
    assert_eq!(page.products[0].primary_image(), Some("/uploads/products/14.jpg"));
}

#[tokio::test]
async fn test_filter_search_and_categories() {
    let source = source_for(serve_catalog(6).await);

    let filtered = source
        .filter(&FilterCriteria {
            in_stock: true,
            max_price: Some(Money::from_cents(1500)),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = filtered.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["5", "4", "2", "1"]);

    let hits = source.search("pack 1").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Switch Pack 1");

    let categories = source.categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Switches");
}

#[tokio::test]
async fn test_engine_pages_through_live_catalog() {
    let base_url = serve_catalog(14).await;
    let engine = CatalogSyncEngine::new(
        Arc::new(source_for(base_url)),
        Arc::new(MemoryStore::new()),
        12,
    );

    assert_eq!(engine.load_more().await.unwrap(), 12);
    assert!(engine.has_more());
    assert_eq!(engine.load_more().await.unwrap(), 2);
    assert!(!engine.has_more());
    assert_eq!(engine.len(), 14);
    assert!(matches!(engine.load_more().await, Err(ClientError::Exhausted)));
}

#[tokio::test]
async fn test_not_found_is_not_retryable() {
    let base_url = serve_catalog(1).await;
    let mut config = ClientConfig::default();
    config.source.base_url = format!("{base_url}/missing-prefix");
    config.source.max_retries = 3;
    let source = HttpProductSource::new(&config).unwrap();

    let err = source.fetch_page(1, 12).await.unwrap_err();
    assert!(matches!(err, ClientError::HttpStatus { status: 404, .. }));
    assert!(!err.is_retryable());
}
