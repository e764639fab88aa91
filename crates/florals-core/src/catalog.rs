//! # Catalog
//!
//! Static, in-memory product list with the shop page's lookup, filter,
//! sort and pagination rules.
//!
//! ## Shop Query Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductFilters                                                         │
//! │    category ──► search text ──► min/max base price ──► in stock         │
//! │                                                            │            │
//! │                                                            ▼            │
//! │                                    sort (name|price|rating|createdAt)   │
//! │                                                            │            │
//! │                                                            ▼            │
//! │                                           Page { data, total, ... }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::base_price;
use crate::types::{Category, Product, Size};

/// Default page size of the shop grid.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// (id, name, description, image)
pub const CATEGORIES: [(&str, &str, &str, &str); 8] = [
    (
        "sympathy-and-condolence",
        "Sympathy and Condolence",
        "Beautiful flowers to express sympathy and condolences",
        "/arrangements-in-vases-boxes/flower30.jpeg",
    ),
    (
        "love-and-romance",
        "Love and Romance",
        "Flowers to celebrate love and romance",
        "/arrangements-in-vases-boxes/flower20.jpeg",
    ),
    (
        "birthday",
        "Birthday",
        "Fresh and vibrant flowers perfect for birthdays",
        "/arrangements-in-vases-boxes/flower40.JPG",
    ),
    (
        "everyday",
        "Everyday",
        "Lovely flowers to brighten everyday moments",
        "/bouquets/bouquet-flower9.jpeg",
    ),
    (
        "congratulations",
        "Congratulations",
        "Elegant flowers to celebrate achievements",
        "/bouquets/bouquet-flower5.jpeg",
    ),
    (
        "event-and-decor",
        "Event and Decor",
        "Beautiful arrangements for events and decorations",
        "/arrangements-in-vases-boxes/flower39.jpeg",
    ),
    (
        "get-well-soon",
        "Get Well Soon",
        "Thoughtful flowers to brighten someone's recovery",
        "/arrangements-in-vases-boxes/flower13.jpeg",
    ),
    (
        "bridal",
        "Bridal",
        "Elegant floral arrangements perfect for weddings",
        "/Fresh-Flower/fresh-flower1.jpg",
    ),
];

/// All browsing categories.
pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(id, name, description, image)| Category {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            image: image.to_string(),
            slug: id.to_string(),
        })
        .collect()
}

// =============================================================================
// Filters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Name,
    Price,
    Rating,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Shop page query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    /// Category id or display name.
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub min_price: Option<Money>,
    #[serde(default)]
    pub max_price: Option<Money>,
    /// `Some(true)` keeps only in-stock products.
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl ProductFilters {
    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !category_matches(&product.category, category) {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = base_price(product) else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }

        if self.in_stock == Some(true) && !product.in_stock {
            return false;
        }

        true
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ord = match self.sort_by {
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            // unpriced products sort after priced ones
            SortBy::Price => match (base_price(a), base_price(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortBy::Rating => a.rating.total_cmp(&b.rating),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

fn category_matches(product_category: &str, wanted: &str) -> bool {
    let wanted = wanted.trim();
    if product_category.eq_ignore_ascii_case(wanted) {
        return true;
    }
    CATEGORIES
        .iter()
        .any(|(id, name, _, _)| *id == product_category && name.eq_ignore_ascii_case(wanted))
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only product list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Random access by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Like [`Catalog::get`] but `ProductNotFound` when missing.
    pub fn require(&self, id: &str) -> CoreResult<&Product> {
        self.get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    /// Products of a category (id or display name).
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category_matches(&p.category, category))
            .collect()
    }

    /// Highest-rated in-stock products, for the home page.
    pub fn featured(&self, limit: usize) -> Vec<&Product> {
        let mut featured: Vec<&Product> = self.products.iter().filter(|p| p.in_stock).collect();
        featured.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        featured.truncate(limit);
        featured
    }

    /// Filters, sorts and paginates. `page` is 1-based; 0 is treated as 1.
    /// A `limit` of 0 uses [`DEFAULT_PAGE_SIZE`].
    pub fn search(&self, filters: &ProductFilters, page: u32, limit: u32) -> Page<Product> {
        let page = page.max(1);
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };

        let mut matched: Vec<&Product> = self.products.iter().filter(|p| filters.matches(p)).collect();
        matched.sort_by(|a, b| filters.compare(a, b));

        let total = matched.len();
        let total_pages = total.div_ceil(limit as usize) as u32;
        let start = (page as usize - 1).saturating_mul(limit as usize);

        let data = matched
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();

        Page {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// The shop's starting assortment.
    pub fn seeded() -> Self {
        let day = |d: u32| -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0)
                .single()
                .unwrap_or_default()
        };

        let products = vec![
            flower(
                "red-rose-bouquet",
                "Classic Red Rose Bouquet",
                "Two dozen long-stem red roses wrapped in kraft paper",
                "love-and-romance",
                Pricing::Sized(&[(Size::Small, 45000), (Size::Medium, 65000), (Size::Large, 90000), (Size::ExtraLarge, 120000)]),
                24,
                4.9,
                &["roses", "valentine", "bestseller"],
                day(1),
            ),
            flower(
                "pink-peony-bouquet",
                "Pink Peony Bouquet",
                "Soft pink peonies with eucalyptus",
                "love-and-romance",
                Pricing::Sized(&[(Size::Small, 38000), (Size::Large, 72000)]),
                12,
                4.7,
                &["peonies", "pink"],
                day(2),
            ),
            flower(
                "sunshine-birthday-box",
                "Sunshine Birthday Box",
                "Sunflowers and yellow roses in a keepsake box",
                "birthday",
                Pricing::Flat(35000),
                30,
                4.6,
                &["sunflowers", "box"],
                day(3),
            ),
            flower(
                "white-lily-wreath",
                "White Lily Wreath",
                "Standing wreath of white lilies and chrysanthemums",
                "sympathy-and-condolence",
                Pricing::Sized(&[(Size::Medium, 110000), (Size::Large, 150000)]),
                5,
                4.8,
                &["lilies", "wreath", "funeral"],
                day(4),
            ),
            flower(
                "everyday-mixed-posy",
                "Everyday Mixed Posy",
                "A hand-tied posy of the florist's seasonal picks",
                "everyday",
                Pricing::Flat(15000),
                60,
                4.3,
                &["seasonal", "posy"],
                day(5),
            ),
            flower(
                "graduation-orchid",
                "Graduation Orchid",
                "Potted white phalaenopsis orchid with gold ribbon",
                "congratulations",
                Pricing::Flat(28000),
                0,
                4.5,
                &["orchid", "potted"],
                day(6),
            ),
            flower(
                "event-centrepiece",
                "Event Centrepiece",
                "Low table centrepiece in the colours of your event",
                "event-and-decor",
                Pricing::Sized(&[(Size::Small, 25000), (Size::Medium, 40000), (Size::Large, 60000)]),
                40,
                4.2,
                &["centrepiece", "table"],
                day(7),
            ),
            flower(
                "get-well-tulips",
                "Get Well Tulips",
                "Bright tulips in a glass vase",
                "get-well-soon",
                Pricing::Flat(22000),
                18,
                4.4,
                &["tulips", "vase"],
                day(8),
            ),
            flower(
                "bridal-cascade",
                "Bridal Cascade Bouquet",
                "Cascading bouquet of white roses, orchids and trailing ivy",
                "bridal",
                Pricing::Sized(&[(Size::Medium, 180000), (Size::Large, 240000), (Size::ExtraLarge, 320000)]),
                3,
                5.0,
                &["wedding", "roses", "orchids"],
                day(9),
            ),
            flower(
                "bridesmaid-posy",
                "Bridesmaid Posy",
                "Matching posy for the bridal party",
                "bridal",
                Pricing::Flat(30000),
                20,
                4.6,
                &["wedding", "posy"],
                day(10),
            ),
        ];

        Catalog::new(products)
    }
}

enum Pricing {
    Flat(i64),
    Sized(&'static [(Size, i64)]),
}

#[allow(clippy::too_many_arguments)]
fn flower(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    pricing: Pricing,
    stock: i64,
    rating: f32,
    tags: &[&str],
    created_at: DateTime<Utc>,
) -> Product {
    let (price, prices) = match pricing {
        Pricing::Flat(minor) => (Some(Money::from_minor(minor)), BTreeMap::new()),
        Pricing::Sized(table) => (
            None,
            table
                .iter()
                .map(|(size, minor)| (*size, Money::from_minor(*minor)))
                .collect(),
        ),
    };

    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        prices,
        original_price: None,
        image: format!("/products/{}.jpeg", id),
        category: category.to_string(),
        in_stock: stock > 0,
        stock,
        rating,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at,
        updated_at: created_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(page: &Page<Product>) -> Vec<&str> {
        page.data.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_catalog_is_priced() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.all().iter().all(|p| base_price(p).is_some()));
        assert!(catalog
            .all()
            .iter()
            .all(|p| CATEGORIES.iter().any(|(id, ..)| *id == p.category)));
    }

    #[test]
    fn test_get_and_require() {
        let catalog = Catalog::seeded();
        assert!(catalog.get("bridal-cascade").is_some());
        assert!(catalog.get("plastic-fern").is_none());
        assert!(matches!(
            catalog.require("plastic-fern"),
            Err(CoreError::ProductNotFound(ref id)) if id == "plastic-fern"
        ));
    }

    #[test]
    fn test_category_by_id_or_name() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.by_category("bridal").len(), 2);
        assert_eq!(catalog.by_category("Love and Romance").len(), 2);
    }

    #[test]
    fn test_default_sort_is_name_ascending() {
        let catalog = Catalog::seeded();
        let page = catalog.search(&ProductFilters::default(), 1, 100);
        let names: Vec<String> = page.data.iter().map(|p| p.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(page.total, 10);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_search_text_and_stock() {
        let catalog = Catalog::seeded();
        let filters = ProductFilters {
            search: Some("ORCHID".to_string()),
            ..Default::default()
        };
        let page = catalog.search(&filters, 1, 12);
        assert_eq!(ids(&page), vec!["bridal-cascade", "graduation-orchid"]);

        let in_stock = ProductFilters {
            in_stock: Some(true),
            ..filters
        };
        assert_eq!(ids(&catalog.search(&in_stock, 1, 12)), vec!["bridal-cascade"]);
    }

    #[test]
    fn test_price_range_uses_base_price() {
        let catalog = Catalog::seeded();
        let filters = ProductFilters {
            min_price: Some(Money::from_major(300)),
            max_price: Some(Money::from_major(400)),
            sort_by: SortBy::Price,
            ..Default::default()
        };
        // peony base price is its small size, 380.00
        assert_eq!(
            ids(&catalog.search(&filters, 1, 12)),
            vec!["bridesmaid-posy", "sunshine-birthday-box", "pink-peony-bouquet"]
        );
    }

    #[test]
    fn test_sort_rating_desc() {
        let catalog = Catalog::seeded();
        let filters = ProductFilters {
            sort_by: SortBy::Rating,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let page = catalog.search(&filters, 1, 2);
        assert_eq!(ids(&page), vec!["bridal-cascade", "red-rose-bouquet"]);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_pagination() {
        let catalog = Catalog::seeded();
        let filters = ProductFilters {
            sort_by: SortBy::CreatedAt,
            ..Default::default()
        };
        let page = catalog.search(&filters, 3, 4);
        assert_eq!(ids(&page), vec!["bridal-cascade", "bridesmaid-posy"]);

        let past_end = catalog.search(&filters, 9, 4);
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total, 10);

        let zero = catalog.search(&filters, 0, 0);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_featured_skips_out_of_stock() {
        let catalog = Catalog::seeded();
        let featured = catalog.featured(3);
        assert_eq!(featured.len(), 3);
        assert_eq!(featured[0].id, "bridal-cascade");
        assert!(featured.iter().all(|p| p.in_stock));
    }

    #[test]
    fn test_categories() {
        let cats = categories();
        assert_eq!(cats.len(), 8);
        assert_eq!(cats[2].slug, "birthday");
    }
}
