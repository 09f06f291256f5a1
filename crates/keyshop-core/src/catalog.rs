//! # Displayed Product Set
//!
//! Bookkeeping for the product grid: which products are on screen, in what
//! order, and in which layout. The Catalog Sync Engine in `keyshop-client`
//! drives this set from network responses; everything here is synchronous.
//!
//! ## Set Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  seed (server-rendered cards)                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌───────────────┐  append_unique(page)   ┌───────────────┐             │
//! │  │ items + ids   │ ─────────────────────► │ items + ids   │  ids grow   │
//! │  └───────┬───────┘                        └───────────────┘             │
//! │          │ replace_all(filtered)                                        │
//! │          ▼                                                              │
//! │  ┌───────────────┐   ids cleared, then rebuilt from the response        │
//! │  │ items + ids   │                                                      │
//! │  └───────┬───────┘                                                      │
//! │          │ sort(order) / set_view_mode(mode)                            │
//! │          ▼                                                              │
//! │  same ids, new order or layout (no fetch)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! No id appears twice in `items`, and `ids` is exactly the set of ids in
//! `items`.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ProductId, ProductSummary, SortOrder, ViewMode};

/// Grid cards cut descriptions to this many characters.
pub const GRID_DESCRIPTION_LIMIT: usize = 120;

// =============================================================================
// Displayed Product Set
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct DisplayedProductSet {
    items: Vec<ProductSummary>,
    ids: HashSet<ProductId>,
    view_mode: ViewMode,
}

impl DisplayedProductSet {
    pub fn new(view_mode: ViewMode) -> Self {
        DisplayedProductSet {
            items: Vec::new(),
            ids: HashSet::new(),
            view_mode,
        }
    }

    /// Appends every product whose id is not already displayed, in response
    /// order. Returns how many were appended.
    pub fn append_unique<I>(&mut self, products: I) -> usize
    where
        I: IntoIterator<Item = ProductSummary>,
    {
        let before = self.items.len();
        for product in products {
            if self.ids.insert(product.id.clone()) {
                self.items.push(product);
            }
        }
        self.items.len() - before
    }

    /// Replaces the whole set, clearing duplicate tracking first.
    ///
    /// Duplicates inside `products` itself are still collapsed to their
    /// first occurrence.
    pub fn replace_all<I>(&mut self, products: I) -> usize
    where
        I: IntoIterator<Item = ProductSummary>,
    {
        self.items.clear();
        self.ids.clear();
        self.append_unique(products)
    }

    /// Stable client-side reorder. No product enters or leaves the set.
    pub fn sort(&mut self, order: SortOrder) {
        match order {
            SortOrder::PriceAsc => self.items.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => self.items.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Name => self.items.sort_by_cached_key(|p| fold_for_sort(&p.name)),
            SortOrder::Newest => self.items.sort_by(|a, b| newest_first(&a.id, &b.id)),
        }
    }

    #[inline]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Changes the layout of every card. Data and order are untouched.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    #[inline]
    pub fn items(&self) -> &[ProductSummary] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in display order.
    pub fn ids_in_order(&self) -> Vec<ProductId> {
        self.items.iter().map(|p| p.id.clone()).collect()
    }

    /// Renders every product into a card for the current view mode.
    pub fn cards(&self) -> Vec<ProductCard> {
        self.items
            .iter()
            .map(|p| ProductCard::render(p, self.view_mode))
            .collect()
    }
}

/// Descending numeric id. Non-numeric ids sort after numeric ones and keep
/// their display order among themselves.
fn newest_first(a: &ProductId, b: &ProductId) -> Ordering {
    match (a.numeric(), b.numeric()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive, accent-folded sort key: `"Écran"` sorts with `"ecran"`.
pub fn fold_for_sort(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ß' => out.push_str("ss"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Product Card
// =============================================================================

/// What a grid cell shows for one product.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub category: Option<String>,
    /// Empty means the placeholder glyph is shown.
    pub images: Vec<String>,
    /// Full text in `full` layout, cut to 120 characters plus `...` in `grid`.
    pub description: String,
    pub purchasable: bool,
    pub layout: ViewMode,
}

impl ProductCard {
    pub fn render(product: &ProductSummary, layout: ViewMode) -> Self {
        let description = product.description.as_deref().unwrap_or_default();
        let description = match layout {
            ViewMode::Full => description.to_string(),
            ViewMode::Grid => truncate_description(description),
        };

        ProductCard {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            images: product.images.clone(),
            description,
            purchasable: product.in_stock(),
            layout,
        }
    }
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= GRID_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(GRID_DESCRIPTION_LIMIT).collect();
    cut.push_str("...");
    cut
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(id: &str, name: &str, cents: i64) -> ProductSummary {
        ProductSummary {
            id: id.into(),
            name: name.to_string(),
            description: None,
            price: Money::from_cents(cents),
            stock: 1,
            category: None,
            images: Vec::new(),
        }
    }

    fn names(set: &DisplayedProductSet) -> Vec<&str> {
        set.items().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_append_skips_already_displayed() {
        let mut set = DisplayedProductSet::default();
        assert_eq!(set.append_unique(vec![product("3", "A", 1), product("2", "B", 1)]), 2);
        assert_eq!(set.append_unique(vec![product("2", "B", 1), product("1", "C", 1)]), 1);

        assert_eq!(set.len(), 3);
        assert_eq!(names(&set), vec!["A", "B", "C"]);
        assert!(set.contains("2"));
    }

    #[test]
    fn test_replace_all_clears_tracking() {
        let mut set = DisplayedProductSet::default();
        set.append_unique(vec![product("3", "A", 1), product("2", "B", 1)]);
        set.replace_all(vec![product("9", "Z", 1), product("9", "Z again", 1)]);

        assert_eq!(names(&set), vec!["Z"]);
        assert!(!set.contains("3"));

        set.append_unique(vec![product("3", "A", 1)]);
        assert!(set.contains("3"));
    }

    #[test]
    fn test_sort_price_asc() {
        let mut set = DisplayedProductSet::default();
        set.append_unique(vec![
            product("1", "thirty", 30_00),
            product("2", "ten", 10_00),
            product("3", "twenty", 20_00),
        ]);
        set.sort(SortOrder::PriceAsc);
        assert_eq!(names(&set), vec!["ten", "twenty", "thirty"]);
    }

    #[test]
    fn test_sort_price_desc_is_stable() {
        let mut set = DisplayedProductSet::default();
        set.append_unique(vec![
            product("1", "first", 10_00),
            product("2", "big", 50_00),
            product("3", "second", 10_00),
        ]);
        set.sort(SortOrder::PriceDesc);
        assert_eq!(names(&set), vec!["big", "first", "second"]);
    }

    #[test]
    fn test_sort_name_folds_case_and_accents() {
        let mut set = DisplayedProductSet::default();
        set.append_unique(vec![
            product("1", "switches", 1),
            product("2", "Écran", 1),
            product("3", "Cable", 1),
            product("4", "deskmat", 1),
        ]);
        set.sort(SortOrder::Name);
        assert_eq!(names(&set), vec!["Cable", "deskmat", "Écran", "switches"]);
    }

    #[test]
    fn test_sort_newest_by_numeric_id() {
        let mut set = DisplayedProductSet::default();
        set.append_unique(vec![
            product("9", "nine", 1),
            product("10", "ten", 1),
            product("2", "two", 1),
        ]);
        set.sort(SortOrder::Newest);
        assert_eq!(names(&set), vec!["ten", "nine", "two"]);
    }

    #[test]
    fn test_view_mode_changes_cards_only() {
        let mut set = DisplayedProductSet::new(ViewMode::Grid);
        let mut long = product("1", "Long", 1);
        long.description = Some("x".repeat(130));
        set.append_unique(vec![long, product("2", "Short", 1)]);

        let grid = set.cards();
        assert_eq!(grid[0].description.chars().count(), 123);
        assert!(grid[0].description.ends_with("..."));

        let order_before = set.ids_in_order();
        set.set_view_mode(ViewMode::Full);
        let full = set.cards();
        assert_eq!(full[0].description.len(), 130);
        assert!(full.iter().all(|c| c.layout == ViewMode::Full));
        assert_eq!(set.ids_in_order(), order_before);
    }

    #[test]
    fn test_out_of_stock_card_not_purchasable() {
        let mut sold_out = product("1", "Sold Out Switches", 1);
        sold_out.stock = 0;
        assert!(!ProductCard::render(&sold_out, ViewMode::Grid).purchasable);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_append_unique_never_duplicates(
            pages in prop::collection::vec(prop::collection::vec(0u16..40, 0..12), 0..10),
            filtered in prop::option::of(prop::collection::vec(0u16..40, 0..12)),
        ) {
            let mut set = DisplayedProductSet::default();
            for page in &pages {
                let before = set.len();
                let added = set.append_unique(page.iter().map(|id| product(&id.to_string(), "p", 1)));
                prop_assert_eq!(set.len(), before + added);
            }
            if let Some(ids) = &filtered {
                set.replace_all(ids.iter().map(|id| product(&id.to_string(), "p", 1)));
            }

            let ids = set.ids_in_order();
            let unique: HashSet<_> = ids.iter().cloned().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert!(ids.iter().all(|id| set.contains(id.as_str())));
        }
    }
}
