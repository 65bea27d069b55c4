//! HTTP surface of the mock admin backend, mirroring the routes the admin
//! front-end consumes.

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{
    HttpRequest, HttpResponse, ResponseError, body::BoxBody,
    dev::HttpServiceFactory, delete, get, post, put, web,
};
use payloads::requests::{
    AdminUserRequest, LoginCredentials, UpdateBookingStatus,
};
use payloads::responses::{AdminUser, AuthTokens, UserProfile};
use payloads::{
    ApiErrorBody, BookingId, BookingStatus, TOTAL_COUNT_HEADER, UserId,
    UserRole,
};
use serde_json::json;
use std::collections::BTreeMap;

use crate::mock::{
    ADMIN_EMAIL, ADMIN_PASSWORD, ListQuery, MockBackend, RecordedRequest,
    TEST_TOKEN,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn api_services() -> impl HttpServiceFactory {
    web::scope("/api")
        .service(health_check)
        .service(login)
        .service(current_user)
        .service(list_bookings)
        .service(update_booking_status)
        .service(delete_booking)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(global_stats)
        .service(revenue)
        .service(notifications)
        .service(mark_notification_read)
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Authentification requise")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, String>,
    },
    #[error("{}", .message.as_deref().unwrap_or("Erreur interne"))]
    Injected { status: u16, message: Option<String> },
}

impl ResponseError for MockError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Injected { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut response = HttpResponse::build(status);
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.insert_header((REQUEST_ID_HEADER, value));
        }
        // An injected failure without a message answers with an empty body,
        // like a proxy would.
        if let Self::Injected { message: None, .. } = self {
            return response.finish();
        }
        let errors = match self {
            Self::Validation { errors, .. } => errors.clone(),
            _ => BTreeMap::new(),
        };
        response.json(ApiErrorBody {
            timestamp: Some(jiff::Timestamp::now().to_string()),
            status: Some(status.as_u16()),
            error: status.canonical_reason().map(str::to_owned),
            message: Some(self.to_string()),
            errors,
            ..ApiErrorBody::default()
        })
    }
}

fn parse_query(req: &HttpRequest) -> ListQuery {
    match web::Query::<Vec<(String, String)>>::from_query(req.query_string()) {
        Ok(query) => ListQuery(query.into_inner()),
        Err(e) => {
            tracing::warn!("Unparseable query string: {e}");
            ListQuery::default()
        }
    }
}

fn is_authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == TEST_TOKEN)
}

impl MockBackend {
    /// Record the request, apply the configured latency, then check the
    /// bearer token and any injected failure.
    async fn admit(&self, req: &HttpRequest) -> Result<ListQuery, MockError> {
        let query = parse_query(req);
        let latency = {
            let mut state = self.lock();
            state.requests.push(RecordedRequest {
                method: req.method().to_string(),
                path: req.path().to_owned(),
                query: query.0.clone(),
            });
            state.latency
        };
        if let Some(latency) = latency {
            actix_web::rt::time::sleep(latency).await;
        }
        if !is_authorized(req) {
            return Err(MockError::Unauthorized);
        }
        if let Some(failure) = self.lock().failure.clone() {
            return Err(MockError::Injected {
                status: failure.status,
                message: failure.message,
            });
        }
        Ok(query)
    }
}

#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("healthy")
}

#[tracing::instrument(skip(credentials), fields(email = %credentials.email))]
#[post("/auth/login")]
pub async fn login(
    credentials: web::Json<LoginCredentials>,
) -> Result<HttpResponse, MockError> {
    if credentials.email != ADMIN_EMAIL || credentials.password != ADMIN_PASSWORD
    {
        return Err(MockError::Unauthorized);
    }
    Ok(HttpResponse::Ok().json(AuthTokens {
        access_token: TEST_TOKEN.to_owned(),
        refresh_token: Some(format!("refresh-{}", uuid::Uuid::new_v4())),
    }))
}

#[tracing::instrument(skip(req, backend))]
#[get("/auth/me")]
pub async fn current_user(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    Ok(HttpResponse::Ok().json(UserProfile {
        id: UserId(1),
        email: ADMIN_EMAIL.to_owned(),
        phone: None,
        role: UserRole::Admin,
        first_name: Some("Admin".to_owned()),
        last_name: Some("Alma Wash".to_owned()),
    }))
}

#[tracing::instrument(skip(req, backend))]
#[get("/admin/bookings")]
pub async fn list_bookings(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    let query = backend.admit(&req).await?;
    let listing = backend.lock().dataset.list_bookings(&query);
    Ok(HttpResponse::Ok().json(json!({
        "content": listing.rows,
        "totalElements": listing.total,
    })))
}

#[tracing::instrument(skip(req, backend, details))]
#[put("/admin/bookings/{id}")]
pub async fn update_booking_status(
    req: HttpRequest,
    path: web::Path<i64>,
    details: web::Json<UpdateBookingStatus>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    let id = BookingId(path.into_inner());
    let mut state = backend.lock();
    let booking = state
        .dataset
        .bookings
        .iter_mut()
        .find(|booking| booking.item.id == id)
        .ok_or_else(|| MockError::NotFound(format!("Réservation {id} introuvable")))?;
    if matches!(
        booking.item.status,
        BookingStatus::Completed | BookingStatus::Cancelled
    ) && booking.item.status != details.status
    {
        return Err(MockError::Validation {
            message: "Transition de statut invalide".to_owned(),
            errors: BTreeMap::from([(
                "status".to_owned(),
                format!(
                    "Une réservation {} ne peut plus changer de statut",
                    booking.item.status.label().to_lowercase()
                ),
            )]),
        });
    }
    booking.item.status = details.status;
    Ok(HttpResponse::Ok().json(&booking.item))
}

#[tracing::instrument(skip(req, backend))]
#[delete("/admin/bookings/{id}")]
pub async fn delete_booking(
    req: HttpRequest,
    path: web::Path<i64>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    let id = BookingId(path.into_inner());
    let mut state = backend.lock();
    let before = state.dataset.bookings.len();
    state.dataset.bookings.retain(|booking| booking.item.id != id);
    if state.dataset.bookings.len() == before {
        return Err(MockError::NotFound(format!("Réservation {id} introuvable")));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(skip(req, backend))]
#[get("/admin/users")]
pub async fn list_users(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    let query = backend.admit(&req).await?;
    let listing = backend.lock().dataset.list_users(&query);
    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, listing.total.to_string()))
        .json(listing.rows))
}

fn validate_user(details: &AdminUserRequest) -> Result<(), MockError> {
    let errors = details.validation_errors();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(MockError::Validation {
            message: "Données invalides".to_owned(),
            errors,
        })
    }
}

#[tracing::instrument(skip(req, backend, details))]
#[post("/admin/users")]
pub async fn create_user(
    req: HttpRequest,
    details: web::Json<AdminUserRequest>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    validate_user(&details)?;
    let mut state = backend.lock();
    let email = details.email.trim().to_lowercase();
    if state.dataset.users.iter().any(|user| user.email == email) {
        return Err(MockError::Conflict(format!(
            "Un compte existe déjà pour {email}"
        )));
    }
    state.next_user_id += 1;
    let user = AdminUser {
        id: UserId(state.next_user_id),
        email,
        phone: details.phone.clone().filter(|phone| !phone.trim().is_empty()),
        role: details.role,
        created_at: Some(jiff::Timestamp::now()),
        active: Some(details.active.unwrap_or(true)),
    };
    state.dataset.users.push(user.clone());
    Ok(HttpResponse::Created().json(user))
}

#[tracing::instrument(skip(req, backend, details))]
#[put("/admin/users/{id}")]
pub async fn update_user(
    req: HttpRequest,
    path: web::Path<i64>,
    details: web::Json<AdminUserRequest>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    validate_user(&details)?;
    let id = UserId(path.into_inner());
    let mut state = backend.lock();
    let user = state
        .dataset
        .users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or_else(|| MockError::NotFound(format!("Utilisateur {id} introuvable")))?;
    user.email = details.email.trim().to_lowercase();
    user.phone = details.phone.clone().filter(|phone| !phone.trim().is_empty());
    user.role = details.role;
    if let Some(active) = details.active {
        user.active = Some(active);
    }
    Ok(HttpResponse::Ok().json(&*user))
}

#[tracing::instrument(skip(req, backend))]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    req: HttpRequest,
    path: web::Path<i64>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    let id = UserId(path.into_inner());
    let mut state = backend.lock();
    let before = state.dataset.users.len();
    state.dataset.users.retain(|user| user.id != id);
    if state.dataset.users.len() == before {
        return Err(MockError::NotFound(format!("Utilisateur {id} introuvable")));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(skip(req, backend))]
#[get("/admin/stats/global")]
pub async fn global_stats(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    let stats = backend.lock().dataset.global_stats();
    Ok(HttpResponse::Ok().json(stats))
}

#[tracing::instrument(skip(req, backend))]
#[get("/admin/stats/revenue")]
pub async fn revenue(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    let query = backend.admit(&req).await?;
    let listing = backend.lock().dataset.list_revenue(&query);
    Ok(HttpResponse::Ok().json(json!({
        "data": listing.rows,
        "total": listing.total,
    })))
}

#[tracing::instrument(skip(req, backend))]
#[get("/admin/notifications")]
pub async fn notifications(
    req: HttpRequest,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    let query = backend.admit(&req).await?;
    let listing = backend.lock().dataset.list_notifications(&query);
    Ok(HttpResponse::Ok().json(json!({ "items": listing.rows })))
}

#[tracing::instrument(skip(req, backend))]
#[post("/admin/notifications/{id}/read")]
pub async fn mark_notification_read(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<MockBackend>,
) -> Result<HttpResponse, MockError> {
    backend.admit(&req).await?;
    let id = path.into_inner();
    if !backend.lock().dataset.mark_notification_read(&id) {
        return Err(MockError::NotFound(format!("Notification {id} introuvable")));
    }
    Ok(HttpResponse::NoContent().finish())
}
