//! Seeded in-memory admin backend.
//!
//! The dataset is deterministic so tests can assert on exact pages:
//!
//! - 30 bookings over 4 providers and 6 clients, listed as
//!   `{content, totalElements}`;
//! - 12 users, listed as a bare array with an `X-Total-Count` header;
//! - 12 months of revenue, listed as `{data, total}`, some entries in the
//!   legacy `{key, amount}` shape;
//! - 3 notifications, listed as `{items}` without any total.
//!
//! [`MockBackend`] also records every request it receives and can be told
//! to fail or slow down, which is what the grid tests use to observe the
//! parameters sent and the failure handling.

use jiff::Timestamp;
use jiff::civil::{Date, date};
use payloads::responses::{
    AdminStatsResponse, AdminUser, BookingItem, NotificationItem,
    TopProvider,
};
use payloads::{BookingId, BookingStatus, UserId, UserRole};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const ADMIN_EMAIL: &str = "admin@almawash.fr";
pub const ADMIN_PASSWORD: &str = "admin-password";
/// Bearer token handed out on login and required by every admin route.
pub const TEST_TOKEN: &str = "test-token";

pub const BOOKING_COUNT: usize = 30;

const PROVIDERS: [(i64, &str); 4] = [
    (101, "karim.provider@almawash.fr"),
    (102, "lea.provider@almawash.fr"),
    (103, "marc.provider@almawash.fr"),
    (104, "sofia.provider@almawash.fr"),
];

const CLIENTS: [(i64, &str); 6] = [
    (201, "alice.smith@example.com"),
    (202, "bruno.martin@example.com"),
    (203, "chloe.smith@example.com"),
    (204, "david.bernard@example.com"),
    (205, "emma.petit@example.com"),
    (206, "farid.roux@example.com"),
];

const SERVICES: [&str; 5] = [
    "Lavage extérieur",
    "Lavage complet",
    "Nettoyage intérieur",
    "Lustrage",
    "Rénovation des jantes",
];

/// A booking plus the participant ids the listing can be filtered on.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBooking {
    pub item: BookingItem,
    pub provider_id: i64,
    pub client_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub bookings: Vec<StoredBooking>,
    pub users: Vec<AdminUser>,
    pub revenue: Vec<Value>,
    pub notifications: Vec<NotificationItem>,
}

impl Dataset {
    pub fn seeded() -> Self {
        Self {
            bookings: seed_bookings(),
            users: seed_users(),
            revenue: seed_revenue(),
            notifications: seed_notifications(),
        }
    }

    pub fn booking(&self, id: BookingId) -> Option<&StoredBooking> {
        self.bookings.iter().find(|booking| booking.item.id == id)
    }

    pub fn global_stats(&self) -> AdminStatsResponse {
        let count = |status: BookingStatus| {
            self.bookings
                .iter()
                .filter(|booking| booking.item.status == status)
                .count() as u64
        };
        let monthly_revenue = self
            .revenue
            .iter()
            .filter_map(|entry| {
                let month = entry.get("month").or_else(|| entry.get("key"))?;
                let value = entry.get("value").or_else(|| entry.get("amount"))?;
                let value = match value {
                    Value::String(s) => s.parse().ok()?,
                    other => other.as_f64()?,
                };
                Some((month.as_str()?.to_owned(), value))
            })
            .collect();
        let mut completed: BTreeMap<&str, u64> = BTreeMap::new();
        for booking in &self.bookings {
            if booking.item.status == BookingStatus::Completed
                && let Some(email) = booking.item.provider_email.as_deref()
            {
                *completed.entry(email).or_default() += 1;
            }
        }
        let mut top_providers: Vec<TopProvider> = completed
            .into_iter()
            .map(|(name, completed)| TopProvider {
                name: name.to_owned(),
                completed,
            })
            .collect();
        top_providers.sort_by(|a, b| b.completed.cmp(&a.completed));
        AdminStatsResponse {
            total_users: self.users.len() as u64,
            active_providers: self
                .users
                .iter()
                .filter(|user| {
                    user.role == UserRole::Provider && user.active == Some(true)
                })
                .count() as u64,
            total_bookings: self.bookings.len() as u64,
            completed_bookings: count(BookingStatus::Completed),
            monthly_revenue,
            top_providers,
        }
    }
}

fn seed_bookings() -> Vec<StoredBooking> {
    (1..=BOOKING_COUNT as i64)
        .map(|id| {
            let index = (id - 1) as usize;
            let (provider_id, provider_email) = PROVIDERS[index % PROVIDERS.len()];
            let (client_id, client_email) = CLIENTS[index % CLIENTS.len()];
            StoredBooking {
                item: BookingItem {
                    id: BookingId(id),
                    client_email: Some(client_email.to_owned()),
                    provider_email: Some(provider_email.to_owned()),
                    service_name: Some(SERVICES[index % SERVICES.len()].to_owned()),
                    price: Some(Decimal::new(1990 + 500 * (id % 7), 2)),
                    status: BookingStatus::ALL[index % BookingStatus::ALL.len()],
                    date: Some(booking_date(index)),
                },
                provider_id,
                client_id,
            }
        })
        .collect()
}

fn booking_date(index: usize) -> Date {
    date(2025, 1 + (index / 10) as i8, 1 + (index % 10) as i8 * 2)
}

fn seed_users() -> Vec<AdminUser> {
    let created_at = |day: i64| -> Option<Timestamp> {
        Timestamp::from_second(1_735_689_600 + day * 86_400).ok()
    };
    let mut users = vec![AdminUser {
        id: UserId(1),
        email: ADMIN_EMAIL.to_owned(),
        phone: Some("+33 1 23 45 67 89".to_owned()),
        role: UserRole::Admin,
        created_at: created_at(0),
        active: Some(true),
    }];
    users.extend(PROVIDERS.iter().enumerate().map(|(i, (id, email))| AdminUser {
        id: UserId(*id),
        email: (*email).to_owned(),
        phone: Some(format!("+33 6 00 00 01 0{i}")),
        role: UserRole::Provider,
        created_at: created_at(1 + i as i64),
        // the last provider is suspended
        active: Some(i + 1 < PROVIDERS.len()),
    }));
    users.extend(CLIENTS.iter().enumerate().map(|(i, (id, email))| AdminUser {
        id: UserId(*id),
        email: (*email).to_owned(),
        phone: None,
        role: UserRole::Client,
        created_at: created_at(10 + i as i64),
        active: Some(true),
    }));
    users.push(AdminUser {
        id: UserId(300),
        email: "support@almawash.fr".to_owned(),
        phone: None,
        role: UserRole::Admin,
        created_at: None,
        active: None,
    });
    users
}

fn seed_revenue() -> Vec<Value> {
    (1..=12)
        .map(|month| {
            let key = format!("2025-{month:02}");
            let value = 1000.0 + 125.5 * f64::from(month);
            if month % 4 == 0 {
                json!({"key": key, "amount": value.to_string()})
            } else {
                json!({"month": key, "value": value})
            }
        })
        .collect()
}

fn seed_notifications() -> Vec<NotificationItem> {
    let at = |second: i64| Timestamp::from_second(second).unwrap_or_default();
    vec![
        NotificationItem {
            id: "n-1".into(),
            title: Some("Nouvelle réservation".into()),
            body: "Réservation #30 en attente de confirmation".into(),
            received_at: at(1_740_000_000),
            read: false,
        },
        NotificationItem {
            id: "n-2".into(),
            title: None,
            body: "Le prestataire sofia.provider@almawash.fr a été suspendu".into(),
            received_at: at(1_739_000_000),
            read: true,
        },
        NotificationItem {
            id: "n-3".into(),
            title: Some("Paiement reçu".into()),
            body: "Paiement de la réservation #12 reçu".into(),
            received_at: at(1_738_000_000),
            read: true,
        },
    ]
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.param(key).is_some()
    }
}

/// An error the backend has been told to answer every admin request with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedFailure {
    pub status: u16,
    pub message: Option<String>,
}

#[derive(Debug)]
pub(crate) struct BackendState {
    pub(crate) dataset: Dataset,
    pub(crate) requests: Vec<RecordedRequest>,
    pub(crate) failure: Option<InjectedFailure>,
    pub(crate) latency: Option<Duration>,
    pub(crate) next_user_id: i64,
}

/// Shared handle on the mock backend's state.
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Dataset::seeded())
    }
}

impl MockBackend {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                dataset,
                requests: Vec::new(),
                failure: None,
                latency: None,
                next_user_id: 1000,
            })),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests received for one path, e.g. `/api/admin/bookings`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Answer every admin request with `status` until [`Self::recover`].
    pub fn fail_with(&self, status: u16, message: Option<&str>) {
        self.lock().failure = Some(InjectedFailure {
            status,
            message: message.map(str::to_owned),
        });
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Delay every admin response.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    pub fn dataset(&self) -> Dataset {
        self.lock().dataset.clone()
    }
}

/// Query string of a listing request.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListQuery(pub(crate) Vec<(String, String)>);

impl ListQuery {
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    fn page(&self) -> usize {
        self.get("page").and_then(|p| p.parse().ok()).unwrap_or(0)
    }

    fn size(&self) -> Option<usize> {
        self.get("size")
            .and_then(|s| s.parse().ok())
            .filter(|size| *size > 0)
    }

    /// `(field, descending)` from `sort=<field>,<direction>`.
    fn sort(&self) -> Option<(&str, bool)> {
        let sort = self.get("sort")?;
        let (field, direction) = sort.split_once(',').unwrap_or((sort, "asc"));
        Some((field, direction.eq_ignore_ascii_case("desc")))
    }

    fn search(&self) -> Option<String> {
        self.get("search")
            .map(|search| search.trim().to_lowercase())
            .filter(|search| !search.is_empty())
    }
}

/// One page of a listing plus the number of matching rows.
pub(crate) struct Listing<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) total: usize,
}

fn paginate<T: Clone>(items: Vec<T>, query: &ListQuery) -> Listing<T> {
    let total = items.len();
    let rows = match query.size() {
        Some(size) => items
            .into_iter()
            .skip(query.page() * size)
            .take(size)
            .collect(),
        None => items,
    };
    Listing { rows, total }
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| value.to_lowercase().contains(needle))
}

fn compare_bookings(a: &BookingItem, b: &BookingItem, field: &str) -> Ordering {
    match field {
        "date" => a.date.cmp(&b.date),
        "price" => a.price.cmp(&b.price),
        "status" => a.status.to_string().cmp(&b.status.to_string()),
        "clientEmail" => a.client_email.cmp(&b.client_email),
        "providerEmail" => a.provider_email.cmp(&b.provider_email),
        "serviceName" => a.service_name.cmp(&b.service_name),
        _ => a.id.cmp(&b.id),
    }
}

fn compare_users(a: &AdminUser, b: &AdminUser, field: &str) -> Ordering {
    match field {
        "email" => a.email.cmp(&b.email),
        "role" => a.role.to_string().cmp(&b.role.to_string()),
        "createdAt" => a.created_at.cmp(&b.created_at),
        _ => a.id.cmp(&b.id),
    }
}

impl Dataset {
    pub(crate) fn list_bookings(&self, query: &ListQuery) -> Listing<BookingItem> {
        let status = query.get("status").and_then(BookingStatus::parse);
        let provider_id: Option<i64> =
            query.get("providerId").and_then(|id| id.parse().ok());
        let client_id: Option<i64> =
            query.get("clientId").and_then(|id| id.parse().ok());
        let day = query.get("date").and_then(|day| day.parse::<Date>().ok());
        let search = query.search();

        let mut items: Vec<BookingItem> = self
            .bookings
            .iter()
            .filter(|b| status.is_none_or(|status| b.item.status == status))
            .filter(|b| provider_id.is_none_or(|id| b.provider_id == id))
            .filter(|b| client_id.is_none_or(|id| b.client_id == id))
            .filter(|b| day.is_none_or(|day| b.item.date == Some(day)))
            .filter(|b| {
                search.as_deref().is_none_or(|needle| {
                    contains(b.item.client_email.as_deref(), needle)
                        || contains(b.item.provider_email.as_deref(), needle)
                        || contains(b.item.service_name.as_deref(), needle)
                })
            })
            .map(|b| b.item.clone())
            .collect();
        if let Some((field, descending)) = query.sort() {
            items.sort_by(|a, b| {
                let ordering = compare_bookings(a, b, field);
                if descending { ordering.reverse() } else { ordering }
            });
        }
        paginate(items, query)
    }

    pub(crate) fn list_users(&self, query: &ListQuery) -> Listing<AdminUser> {
        let role = query.get("role").and_then(UserRole::parse);
        let active = query.get("active").and_then(|a| a.parse::<bool>().ok());
        let search = query.search();

        let mut users: Vec<AdminUser> = self
            .users
            .iter()
            .filter(|user| role.is_none_or(|role| user.role == role))
            .filter(|user| {
                active.is_none_or(|active| user.active.unwrap_or(true) == active)
            })
            .filter(|user| {
                search.as_deref().is_none_or(|needle| {
                    contains(Some(&user.email), needle)
                        || contains(user.phone.as_deref(), needle)
                })
            })
            .cloned()
            .collect();
        if let Some((field, descending)) = query.sort() {
            users.sort_by(|a, b| {
                let ordering = compare_users(a, b, field);
                if descending { ordering.reverse() } else { ordering }
            });
        }
        paginate(users, query)
    }

    pub(crate) fn list_revenue(&self, query: &ListQuery) -> Listing<Value> {
        paginate(self.revenue.clone(), query)
    }

    pub(crate) fn list_notifications(
        &self,
        query: &ListQuery,
    ) -> Listing<NotificationItem> {
        paginate(self.notifications.clone(), query)
    }

    /// Flag one notification as read. `false` when the id is unknown.
    pub(crate) fn mark_notification_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.read = true;
                true
            }
            None => false,
        }
    }
}
