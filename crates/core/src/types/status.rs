//! Status enums shared with the storefront backend.
//!
//! The backend stores both order status and account role as free text.
//! The client speaks a closed set of values and matches them exactly
//! (ignoring case and surrounding whitespace). Anything else is kept
//! verbatim in an `Other` variant so it can be displayed and round-tripped,
//! but it is never guessed into one of the known categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipping,
    Shipped,
    Completed,
    Canceled,
    /// A value outside the known set, preserved as sent.
    Other(String),
}

impl OrderStatus {
    /// Every known status, in display and sort order.
    pub const KNOWN: [Self; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Shipping,
        Self::Shipped,
        Self::Completed,
        Self::Canceled,
    ];

    /// The wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// Position in the status ordering; unknown values sort last.
    #[must_use]
    pub fn rank(&self) -> usize {
        Self::KNOWN
            .iter()
            .position(|known| known == self)
            .unwrap_or(Self::KNOWN.len())
    }

    /// Whether a customer may still cancel the order.
    ///
    /// Only orders that have not left the warehouse can be canceled.
    /// Unrecognized statuses are never cancellable.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether this is one of the known statuses.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::KNOWN
            .into_iter()
            .find(|known| known.as_str() == normalized)
            .unwrap_or(Self::Other(raw))
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Strict parse for user input: only the known statuses are accepted.
impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s) {
            Self::Other(_) => Err(format!(
                "invalid order status: {s} (expected one of: {})",
                Self::KNOWN.map(|k| k.as_str().to_owned()).join(", ")
            )),
            known => Ok(known),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// A shopper.
    #[default]
    User,
    /// Store administrator: manages products, all orders, and settings.
    Admin,
    /// A role this client does not know about.
    Other(String),
}

impl Role {
    /// The wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the role grants the admin surface.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Self::User,
            "admin" => Self::Admin,
            _ => Self::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s} (expected user or admin)")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_exact_match_ignores_case() {
        assert_eq!(OrderStatus::from(" Shipped "), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from("CANCELED"), OrderStatus::Canceled);
    }

    #[test]
    fn test_status_does_not_guess_from_substrings() {
        let status = OrderStatus::from("shipped-partially");
        assert_eq!(status, OrderStatus::Other("shipped-partially".to_owned()));
        assert!(!status.is_cancellable());
        assert_eq!(status.rank(), OrderStatus::KNOWN.len());
    }

    #[test]
    fn test_status_serde_round_trips_unknown_verbatim() {
        let status: OrderStatus = serde_json::from_str("\"Отправлен\"").unwrap();
        assert_eq!(status.as_str(), "Отправлен");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Отправлен\"");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Canceled).unwrap(),
            "\"canceled\""
        );
    }

    #[test]
    fn test_cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipping.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Completed.is_cancellable());
        assert!(!OrderStatus::Canceled.is_cancellable());
    }

    #[test]
    fn test_status_rank_order() {
        let ranks: Vec<usize> = OrderStatus::KNOWN.iter().map(OrderStatus::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_status_from_str_is_strict() {
        assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Other("manager".to_owned()));
        assert!(!role.is_admin());
        assert!("manager".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }
}
