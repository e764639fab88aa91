//! # Catalog Commands
//!
//! Read-only product browsing.

use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use florals_core::catalog::{categories, Page, ProductFilters};
use florals_core::validation::validate_search_query;
use florals_core::{Category, Product};

/// Shop grid query.
///
/// ## Behavior
/// - `page` defaults to 1
/// - `limit` defaults to the configured page size
/// - Search text is trimmed and capped at 100 characters
pub fn list_products(
    state: &AppState,
    mut filters: ProductFilters,
    page: Option<u32>,
    limit: Option<u32>,
) -> ApiResult<Page<Product>> {
    if let Some(search) = filters.search.take() {
        let search = validate_search_query(&search).map_err(|e| ApiError::validation(e.to_string()))?;
        filters.search = Some(search).filter(|s| !s.is_empty());
    }

    if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
        if min > max {
            return Err(ApiError::validation("minPrice must not exceed maxPrice"));
        }
    }

    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(state.config.page_size);
    debug!(?filters, page, limit, "list_products command");

    Ok(state.catalog.search(&filters, page, limit))
}

/// One product by id.
pub fn get_product(state: &AppState, product_id: &str) -> ApiResult<Product> {
    debug!(product_id = %product_id, "get_product command");
    Ok(state.catalog.require(product_id)?.clone())
}

/// All browsing categories.
pub fn list_categories() -> Vec<Category> {
    categories()
}

/// Highest-rated in-stock products.
pub fn featured_products(state: &AppState, limit: usize) -> Vec<Product> {
    state.catalog.featured(limit).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use florals_core::Money;

    #[tokio::test]
    async fn test_list_uses_configured_page_size() {
        let mut state = AppState::in_memory().await.unwrap();
        state.config.page_size = 4;

        let page = list_products(&state, ProductFilters::default(), None, None).unwrap();
        assert_eq!(page.limit, 4);
        assert_eq!(page.data.len(), 4);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_blank_search_is_ignored() {
        let state = AppState::in_memory().await.unwrap();
        let filters = ProductFilters {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let page = list_products(&state, filters, None, Some(100)).unwrap();
        assert_eq!(page.total, state.catalog.len());
    }

    #[tokio::test]
    async fn test_inverted_price_range_rejected() {
        let state = AppState::in_memory().await.unwrap();
        let filters = ProductFilters {
            min_price: Some(Money::from_major(500)),
            max_price: Some(Money::from_major(100)),
            ..Default::default()
        };
        let err = list_products(&state, filters, None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_get_product() {
        let state = AppState::in_memory().await.unwrap();
        assert_eq!(get_product(&state, "bridal-cascade").unwrap().name, "Bridal Cascade Bouquet");
        assert_eq!(get_product(&state, "silk-fern").unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_list_categories() {
        assert_eq!(list_categories().len(), 8);
    }
}
