//! Status and role enums.
//!
//! Each enum maps to a Postgres enum type of the same snake_case name and
//! serializes with the same spelling on the wire.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown enum spelling.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order fulfillment status, advanced by the baker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Orders the baker still has to act on.
    #[must_use]
    pub const fn is_pending_work(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Preparing)
    }

    /// Message shown to the customer when an order moves into this status.
    ///
    /// Moving an order back to `pending` does not notify anyone.
    #[must_use]
    pub const fn customer_message(self) -> Option<&'static str> {
        match self {
            Self::Pending => None,
            Self::Confirmed => Some("Your order has been confirmed!"),
            Self::Preparing => Some("Your order is being prepared"),
            Self::Ready => Some("Your order is ready!"),
            Self::OutForDelivery => Some("Your order is out for delivery"),
            Self::Delivered => Some("Your order has been delivered!"),
            Self::Cancelled => Some("Your order has been cancelled"),
        }
    }

    /// Comma separated list of every valid spelling, for error messages.
    #[must_use]
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("order status", s))
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseStatusError::new("payment status", s)),
        }
    }
}

/// Kind of marketplace account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Customer,
    Baker,
}

impl UserType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Baker => "baker",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "baker" => Ok(Self::Baker),
            _ => Err(ParseStatusError::new("user type", s)),
        }
    }
}

/// Severity of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "notification_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Can also manage other admin accounts.
    SuperAdmin,
    #[default]
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseStatusError::new("admin role", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_spelling() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_pending_work() {
        assert!(OrderStatus::Pending.is_pending_work());
        assert!(OrderStatus::Preparing.is_pending_work());
        assert!(!OrderStatus::Ready.is_pending_work());
        assert!(!OrderStatus::Delivered.is_pending_work());
    }

    #[test]
    fn test_valid_values_lists_every_status() {
        assert_eq!(
            OrderStatus::valid_values(),
            "pending, confirmed, preparing, ready, out_for_delivery, delivered, cancelled"
        );
    }

    #[test]
    fn test_customer_messages() {
        assert_eq!(
            OrderStatus::Delivered.customer_message(),
            Some("Your order has been delivered!")
        );
        assert_eq!(
            OrderStatus::OutForDelivery.customer_message(),
            Some("Your order is out for delivery")
        );
        assert_eq!(OrderStatus::Pending.customer_message(), None);
    }

    #[test]
    fn test_admin_role_parse() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        let err = "viewer".parse::<AdminRole>().unwrap_err();
        assert_eq!(err.to_string(), "invalid admin role: viewer");
    }

    #[test]
    fn test_payment_and_user_type_parse() {
        assert_eq!("completed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Completed);
        assert_eq!("baker".parse::<UserType>().unwrap(), UserType::Baker);
        assert!("admin".parse::<UserType>().is_err());
    }
}
