pub mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{
    APIClient, ApiErrorBody, ClientError, RawPage, TOTAL_COUNT_HEADER,
    UnauthorizedHook,
};

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(transparent)]
pub struct BookingId(pub i64);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Lifecycle of a booking as reported by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[display("PENDING")]
    Pending,
    #[display("CONFIRMED")]
    Confirmed,
    #[display("COMPLETED")]
    Completed,
    #[display("DECLINED")]
    Declined,
    #[display("CANCELLED")]
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Declined,
        Self::Cancelled,
    ];

    /// French label shown in the admin screens.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Confirmed => "Confirmée",
            Self::Completed => "Terminée",
            Self::Declined => "Refusée",
            Self::Cancelled => "Annulée",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == value)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[display("ADMIN")]
    Admin,
    #[display("PROVIDER")]
    Provider,
    #[default]
    #[display("CLIENT")]
    Client,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [Self::Admin, Self::Provider, Self::Client];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrateur",
            Self::Provider => "Prestataire",
            Self::Client => "Client",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.to_string() == value)
    }
}
