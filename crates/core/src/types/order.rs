//! Order payloads, loose decoding, and list filtering.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::{OrderId, UserId};
use super::price::Price;
use super::status::OrderStatus;

/// An order as listed by `/orders/` and friends.
///
/// The admin listing additionally carries the owning `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

const ID_KEYS: &[&str] = &["id", "ID", "order_id", "OrderID", "Order_id"];
const STATUS_KEYS: &[&str] = &["status", "Status"];
const TOTAL_KEYS: &[&str] = &["total_price", "TotalPrice", "total"];
const CREATED_KEYS: &[&str] = &["created_at", "CreatedAt", "created"];
const USER_KEYS: &[&str] = &["user_id", "User_id", "UserID"];

fn first<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| raw.get(key).filter(|v| !v.is_null()))
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Order {
    /// Decode an order from whatever shape an admin listing endpoint sent.
    ///
    /// Field names are looked up under several spellings. Missing or
    /// unusable values fall back: the ID to `position + 1`, the total to
    /// zero, the status to empty, and the creation time to `now`.
    #[must_use]
    pub fn from_loose(raw: &Value, position: usize, now: DateTime<Utc>) -> Self {
        let fallback_id = i64::try_from(position).map_or(i64::MAX, |p| p.saturating_add(1));
        let id = first(raw, ID_KEYS).and_then(as_i64).unwrap_or(fallback_id);

        let status = match first(raw, STATUS_KEYS) {
            Some(Value::String(s)) => OrderStatus::from(s.as_str()),
            Some(other) => OrderStatus::from(other.to_string()),
            None => OrderStatus::from(String::new()),
        };

        let total_price = match first(raw, TOTAL_KEYS) {
            Some(v @ Value::Number(_)) => {
                serde_json::from_value::<Price>(v.clone()).unwrap_or(Price::ZERO)
            }
            Some(Value::String(s)) => s.trim().parse::<Price>().unwrap_or(Price::ZERO),
            _ => Price::ZERO,
        };

        let created_at = first(raw, CREATED_KEYS)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<DateTime<Utc>>().ok())
            .unwrap_or(now);

        let user_id = first(raw, USER_KEYS).and_then(as_i64).map(UserId::new);

        Self {
            id: OrderId::new(id),
            status,
            total_price,
            created_at,
            user_id,
        }
    }
}

/// Status filter for order lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Whether an order passes the filter.
    #[must_use]
    pub fn matches(&self, status: &OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Filter orders by status and a free-text query, then sort by status.
///
/// The query is matched against the order ID and the status text. Orders
/// are ordered pending → canceled with unknown statuses last; the sort is
/// stable so equal statuses keep their listing order.
#[must_use]
pub fn filter_orders(orders: &[Order], filter: &StatusFilter, query: &str) -> Vec<Order> {
    let query = query.trim().to_lowercase();
    let mut list: Vec<Order> = orders
        .iter()
        .filter(|o| filter.matches(&o.status))
        .filter(|o| {
            query.is_empty()
                || o.id.to_string().contains(&query)
                || o.status.as_str().to_lowercase().contains(&query)
        })
        .cloned()
        .collect();
    list.sort_by_key(|o| o.status.rank());
    list
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn order(id: i64, status: &str) -> Order {
        Order {
            id: OrderId::new(id),
            status: OrderStatus::from(status),
            total_price: Price::from_rubles(100),
            created_at: now(),
            user_id: None,
        }
    }

    #[test]
    fn test_deserialize_backend_order() {
        let order: Order = serde_json::from_str(
            r#"{"id":5,"status":"pending","total_price":1500,"created_at":"2025-02-10T09:30:00.123456+03:00"}"#,
        )
        .unwrap();
        assert_eq!(order.id, OrderId::new(5));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            order.created_at,
            Utc.with_ymd_and_hms(2025, 2, 10, 6, 30, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn test_from_loose_alternate_keys() {
        let raw = json!({
            "ID": "17",
            "Status": "Shipped",
            "TotalPrice": "2400",
            "CreatedAt": "2025-01-02T03:04:05Z",
            "User_id": 3
        });
        let order = Order::from_loose(&raw, 0, now());
        assert_eq!(order.id, OrderId::new(17));
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total_price, Price::from_rubles(2400));
        assert_eq!(order.created_at, Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(order.user_id, Some(UserId::new(3)));
    }

    #[test]
    fn test_from_loose_fallbacks() {
        let raw = json!({"order_id": null, "total": "lots", "created": 12});
        let order = Order::from_loose(&raw, 4, now());
        assert_eq!(order.id, OrderId::new(5));
        assert_eq!(order.total_price, Price::ZERO);
        assert_eq!(order.created_at, now());
        assert_eq!(order.status, OrderStatus::Other(String::new()));
        assert_eq!(order.user_id, None);
    }

    #[test]
    fn test_filter_by_status_and_sort() {
        let orders = vec![
            order(1, "completed"),
            order(2, "pending"),
            order(3, "mystery"),
            order(4, "pending"),
            order(5, "canceled"),
        ];
        let all = filter_orders(&orders, &StatusFilter::All, "");
        let ids: Vec<i64> = all.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 4, 1, 5, 3]);

        let pending = filter_orders(&orders, &StatusFilter::Only(OrderStatus::Pending), "");
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_filter_query_matches_id_or_status() {
        let orders = vec![order(12, "shipped"), order(31, "pending"), order(7, "shipping")];
        let by_id = filter_orders(&orders, &StatusFilter::All, "1");
        let ids: Vec<i64> = by_id.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![31, 12]);

        let by_status = filter_orders(&orders, &StatusFilter::All, " SHIP ");
        let ids: Vec<i64> = by_status.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![7, 12]);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "shipped".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(OrderStatus::Shipped)
        );
        assert!("ship".parse::<StatusFilter>().is_err());
    }
}
