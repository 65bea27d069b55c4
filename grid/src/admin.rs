//! Grid bindings for the admin API resources: row impls, typed filters and
//! the endpoints' parameter conventions.

use jiff::civil::Date;
use payloads::responses::{
    AdminUser, BookingItem, NotificationItem, RevenuePoint, TopProvider,
};
use payloads::{BookingStatus, UserRole};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::mapper::{PageQuery, QueryParams, sort_param};
use crate::model::{Cell, GridRow, RowKey};
use crate::normalize::RowMapper;

pub const BOOKINGS_ENDPOINT: &str = "admin/bookings";
pub const USERS_ENDPOINT: &str = "admin/users";
pub const REVENUE_ENDPOINT: &str = "admin/stats/revenue";
pub const NOTIFICATIONS_ENDPOINT: &str = "admin/notifications";

impl GridRow for BookingItem {
    fn row_key(&self) -> RowKey {
        RowKey::Int(self.id.0)
    }

    fn cell(&self, field: &str) -> Cell {
        match field {
            "id" => Cell::from(self.id.0),
            "clientEmail" => Cell::from_option(self.client_email.as_deref()),
            "providerEmail" => Cell::from_option(self.provider_email.as_deref()),
            "serviceName" => Cell::from_option(self.service_name.as_deref()),
            "price" => Cell::from_option(self.price.and_then(|p| p.to_f64())),
            "date" => Cell::from_option(self.date.map(|d| d.to_string())),
            "status" => Cell::from(self.status.label()),
            _ => Cell::Empty,
        }
    }
}

impl GridRow for AdminUser {
    fn row_key(&self) -> RowKey {
        RowKey::Int(self.id.0)
    }

    fn cell(&self, field: &str) -> Cell {
        match field {
            "id" => Cell::from(self.id.0),
            "email" => Cell::from(self.email.as_str()),
            "phone" => Cell::from_option(self.phone.as_deref()),
            "role" => Cell::from(self.role.label()),
            "createdAt" => Cell::from_option(self.created_at.map(|t| t.to_string())),
            "active" => Cell::from_option(
                self.active.map(|active| if active { "Actif" } else { "Inactif" }),
            ),
            _ => Cell::Empty,
        }
    }
}

impl GridRow for RevenuePoint {
    fn row_key(&self) -> RowKey {
        RowKey::Str(self.id.clone())
    }

    fn cell(&self, field: &str) -> Cell {
        match field {
            "id" => Cell::from(self.id.as_str()),
            "month" => Cell::from(self.month.as_str()),
            "value" => Cell::from(self.value),
            _ => Cell::Empty,
        }
    }
}

impl GridRow for TopProvider {
    fn row_key(&self) -> RowKey {
        RowKey::Str(self.name.clone())
    }

    fn cell(&self, field: &str) -> Cell {
        match field {
            "name" => Cell::from(self.name.as_str()),
            "completed" => Cell::from(self.completed),
            _ => Cell::Empty,
        }
    }
}

impl GridRow for NotificationItem {
    fn row_key(&self) -> RowKey {
        RowKey::Str(self.id.clone())
    }

    fn cell(&self, field: &str) -> Cell {
        match field {
            "id" => Cell::from(self.id.as_str()),
            "title" => Cell::from_option(self.title.as_deref()),
            "body" => Cell::from(self.body.as_str()),
            "receivedAt" => Cell::from(self.received_at.to_string()),
            "read" => Cell::from(if self.read { "Lue" } else { "Non lue" }),
            _ => Cell::Empty,
        }
    }
}

/// Filters accepted by the bookings endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
}

impl BookingsFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Query string of the bookings endpoint, which takes a single `date` and
/// numeric participant ids.
pub fn bookings_params(query: &PageQuery<BookingsFilter>) -> QueryParams {
    let mut params = query.base_params();
    params.push_opt("sort", sort_param(&query.sort));
    if let Some(filter) = &query.filter {
        params.push_opt("status", filter.status);
        params.push_opt("providerId", filter.provider_id);
        params.push_opt("clientId", filter.client_id);
        params.push_opt("date", filter.date);
    }
    params.push_opt("search", query.search.as_deref());
    params
}

/// Filters accepted by the users endpoint, sent through the default mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Coerce loosely shaped revenue entries: the month may sit under `month`
/// or `key`, the amount under `value`, `amount` or `total`, possibly as a
/// string.
pub fn revenue_rows() -> RowMapper<RevenuePoint> {
    Arc::new(|value: Value| match value {
        Value::Object(record) => Some(revenue_point(&record)),
        other => {
            tracing::warn!("Skipping revenue entry that is not a record: {other}");
            None
        }
    })
}

fn revenue_point(record: &Map<String, Value>) -> RevenuePoint {
    let month = match record.get("month").or_else(|| record.get("key")) {
        Some(Value::String(month)) => month.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let value = ["value", "amount", "total"]
        .iter()
        .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
        .and_then(|raw| match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|value| value.is_finite())
        .unwrap_or(0.0);
    let id = match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ if !month.is_empty() => month.clone(),
        _ => format!("{month}-{value}"),
    };
    RevenuePoint { id, month, value }
}
