//! # Order Commands
//!
//! Lookup of placed orders for the confirmation page and order history.

use tracing::debug;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::AppState;
use florals_core::Order;

/// One order by id.
pub async fn get_order(state: &AppState, order_id: &str) -> ApiResult<Order> {
    debug!(order_id = %order_id, "get_order command");
    Ok(state.db.orders().require(order_id).await?)
}

/// One order by its customer-facing number, e.g. `BB-LXK2M9QZ-4FJ0A`.
pub async fn find_order(state: &AppState, order_number: &str) -> ApiResult<Order> {
    debug!(order_number = %order_number, "find_order command");
    state
        .db
        .orders()
        .find_by_number(order_number.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_number))
}

/// One order by id, else by order number.
///
/// Only a missing id falls through to the number lookup; any other error is
/// returned as is.
pub async fn lookup_order(state: &AppState, id_or_number: &str) -> ApiResult<Order> {
    match get_order(state, id_or_number).await {
        Err(e) if e.code == ErrorCode::NotFound => find_order(state, id_or_number).await,
        other => other,
    }
}

/// All orders, newest first.
pub async fn list_orders(state: &AppState) -> ApiResult<Vec<Order>> {
    debug!("list_orders command");
    Ok(state.db.orders().list().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::checkout::{checkout_summary, place_order, PlaceOrderRequest};
    use florals_core::checkout::PaymentConfirmation;
    use florals_core::ShippingAddress;

    async fn placed(state: &AppState, product_id: &str) -> Order {
        add_to_cart(state, product_id, None, None).await.unwrap();
        let total = checkout_summary(state).await.total;
        place_order(
            state,
            PlaceOrderRequest {
                shipping_address: ShippingAddress {
                    first_name: "Yaw".to_string(),
                    last_name: "Owusu".to_string(),
                    email: "yaw@example.com".to_string(),
                    phone: "0271234567".to_string(),
                    address: "22 Cantonments Road".to_string(),
                    city: "Accra".to_string(),
                    state: None,
                    zip_code: "GA-031".to_string(),
                    country: "Ghana".to_string(),
                },
                payment: PaymentConfirmation::new(format!("ref-{}", product_id), total),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_and_find() {
        let state = AppState::in_memory().await.unwrap();
        let order = placed(&state, "get-well-tulips").await;

        assert_eq!(get_order(&state, &order.id).await.unwrap(), order);
        let lower = order.order_number.to_lowercase();
        assert_eq!(find_order(&state, &lower).await.unwrap().id, order.id);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let state = AppState::in_memory().await.unwrap();
        assert_eq!(get_order(&state, "nope").await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            find_order(&state, "BB-0-00000").await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_lookup_by_id_or_number() {
        let state = AppState::in_memory().await.unwrap();
        let order = placed(&state, "get-well-tulips").await;

        assert_eq!(lookup_order(&state, &order.id).await.unwrap().id, order.id);
        assert_eq!(lookup_order(&state, &order.order_number).await.unwrap().id, order.id);
        assert_eq!(
            lookup_order(&state, "BB-0-00000").await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_lookup_propagates_storage_errors() {
        let state = AppState::in_memory().await.unwrap();
        state.db.inner().close().await;

        let err = lookup_order(&state, "BB-0-00000").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn test_list_orders() {
        let state = AppState::in_memory().await.unwrap();
        assert!(list_orders(&state).await.unwrap().is_empty());

        placed(&state, "get-well-tulips").await;
        placed(&state, "bridesmaid-posy").await;
        assert_eq!(list_orders(&state).await.unwrap().len(), 2);
    }
}
