mod bookings;
mod login;
mod notifications;
mod revenue;
mod user_form;
mod users;

pub use bookings::BookingsPage;
pub use login::LoginPage;
pub use notifications::NotificationsPage;
pub use revenue::RevenuePage;
pub use users::UsersPage;

use payloads::ClientError;

use crate::contexts::toast::ToastHandle;

/// Surface a failed mutation outside a form. Field errors are warnings, a
/// 401 is left to the session hook.
fn report_mutation_error(toasts: &ToastHandle, error: &ClientError) {
    if let Some(message) = error.field_errors().and_then(|errors| errors.values().next()) {
        toasts.warning(message.clone());
        return;
    }
    match error {
        ClientError::Unauthorized | ClientError::Cancelled => {}
        other => toasts.error(other.to_string()),
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
