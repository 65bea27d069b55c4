use crate::{BookingId, BookingStatus, UserId, UserRole};
use jiff::Timestamp;
use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A booking as listed in the admin bookings grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    pub id: BookingId,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub provider_email: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub status: BookingStatus,
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// One month of revenue. Rows produced from loosely shaped backend data get
/// `id` derived from the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub id: String,
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProvider {
    pub name: String,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub active_providers: u64,
    pub total_bookings: u64,
    pub completed_bookings: u64,
    #[serde(default)]
    pub monthly_revenue: BTreeMap<String, f64>,
    #[serde(default)]
    pub top_providers: Vec<TopProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    pub received_at: Timestamp,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn has_admin_access(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn booking_accepts_sparse_rows() {
        let booking: BookingItem = serde_json::from_value(serde_json::json!({
            "id": 7,
            "status": "CONFIRMED",
            "price": 42.5,
            "date": "2025-03-01",
        }))
        .unwrap();
        assert_eq!(booking.id, BookingId(7));
        assert_eq!(booking.price, Some(dec!(42.5)));
        assert_eq!(booking.date, Some(jiff::civil::date(2025, 3, 1)));
        assert_eq!(booking.client_email, None);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<AdminUser>(serde_json::json!({
            "id": 1,
            "email": "x@y.fr",
            "role": "ROOT",
        }));
        assert!(result.is_err());
    }
}
