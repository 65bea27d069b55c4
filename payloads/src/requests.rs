use crate::{BookingStatus, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EMAIL_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Body for creating or updating an admin-managed user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl AdminUserRequest {
    /// Client-side checks mirrored from the backend, keyed by field name so
    /// they can be displayed next to the offending input.
    pub fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(("email", "L'adresse e-mail est obligatoire"));
        } else if email.len() > EMAIL_MAX_LEN || !is_plausible_email(email) {
            errors.push(("email", "Adresse e-mail invalide"));
        }
        if let Some(phone) = &self.phone
            && !phone.trim().is_empty()
            && !phone
                .trim()
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '.'))
        {
            errors.push(("phone", "Numéro de téléphone invalide"));
        }
        errors
    }

    /// [`Self::validate`] in the shape of a 422 body's `errors` map.
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        self.validate()
            .into_iter()
            .map(|(field, message)| (field.to_owned(), message.to_owned()))
            .collect()
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
