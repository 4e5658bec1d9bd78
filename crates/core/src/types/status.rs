//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// ```text
/// pending ──► shipped ──► completed
///    │
///    └──────► canceled
/// ```
///
/// `shipped` and `completed` orders can no longer be canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed but not yet shipped.
    #[default]
    Pending,
    /// Handed to the carrier.
    Shipped,
    /// Delivered.
    Completed,
    /// Canceled before shipping.
    Canceled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Shipped, Self::Completed, Self::Canceled];

    /// Whether an order in this status may still be canceled.
    ///
    /// Canceling an already canceled order is allowed and leaves it unchanged.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        matches!(self, Self::Pending | Self::Canceled)
    }

    /// The lowercase wire and storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!("Must be one of: pending, shipped, completed, canceled (got {s:?}).")
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_can_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Canceled.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Completed.can_cancel());
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert!("Pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).unwrap(),
            "\"shipped\""
        );
        let status: OrderStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(status, OrderStatus::Canceled);
    }
}
