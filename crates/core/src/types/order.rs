//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{IceCreamId, OrderId};
use super::login::Login;
use super::validation::ValidationError;

/// One line of an order.
///
/// The ice-cream id is a plain reference; it is not checked against the
/// stored products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPosition {
    #[serde(alias = "icecream_id")]
    pub ice_cream_id: IceCreamId,
    pub quantity: u32,
}

/// A placed order. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_login: Login,
    pub created_at: DateTime<Utc>,
    pub positions: Vec<OrderPosition>,
}

impl Order {
    /// Check the positions of a new order.
    ///
    /// An empty list is accepted.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ZeroQuantity` for the first position with a
    /// zero quantity.
    pub fn validate_positions(positions: &[OrderPosition]) -> Result<(), ValidationError> {
        positions
            .iter()
            .position(|p| p.quantity == 0)
            .map_or(Ok(()), |index| Err(ValidationError::ZeroQuantity { index }))
    }

    /// Total number of items across all positions.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.positions.iter().map(|p| u64::from(p.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn position(id: i64, quantity: u32) -> OrderPosition {
        OrderPosition {
            ice_cream_id: IceCreamId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_validate_positions() {
        assert!(Order::validate_positions(&[]).is_ok());
        assert!(Order::validate_positions(&[position(1, 2), position(2, 3)]).is_ok());
        assert_eq!(
            Order::validate_positions(&[position(1, 2), position(2, 0)]),
            Err(ValidationError::ZeroQuantity { index: 1 })
        );
    }

    #[test]
    fn test_negative_quantity_is_rejected_by_type() {
        let result = serde_json::from_str::<OrderPosition>(r#"{"ice_cream_id":1,"quantity":-2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_accepts_icecream_id_alias() {
        let p: OrderPosition = serde_json::from_str(r#"{"icecream_id":4,"quantity":1}"#).unwrap();
        assert_eq!(p, position(4, 1));
    }

    #[test]
    fn test_order_json_round_trip_keeps_positions() {
        let order = Order {
            id: OrderId::new(1),
            user_login: Login::parse("bestboss").unwrap(),
            created_at: DateTime::parse_from_rfc3339("2021-11-11T11:11:11Z")
                .unwrap()
                .with_timezone(&Utc),
            positions: vec![position(1, 2), position(2, 3)],
        };

        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
        assert_eq!(back.item_count(), 5);
    }
}
