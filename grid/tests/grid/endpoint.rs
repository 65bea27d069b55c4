use grid::admin::{
    BOOKINGS_ENDPOINT, BookingsFilter, NOTIFICATIONS_ENDPOINT, REVENUE_ENDPOINT,
    USERS_ENDPOINT, UsersFilter, bookings_params, revenue_rows,
};
use grid::notify::Level;
use grid::{
    EndpointFetcher, GridController, GridDeps, GridOptions, SortItem,
    deserialize_rows,
};
use payloads::requests::{AdminUserRequest, UpdateBookingStatus};
use payloads::responses::{AdminUser, BookingItem, NotificationItem};
use payloads::{BookingId, BookingStatus, ClientError, UserRole};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use test_helpers::{assert_status_code, spawn_app};

use crate::helpers::{drain, loaded, notifier};

#[tokio::test]
async fn bookings_grid_loads_first_page() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher = EndpointFetcher::new(app.admin_client(), BOOKINGS_ENDPOINT);
    let deps = GridDeps::<BookingItem, BookingsFilter>::new(
        fetcher,
        deserialize_rows(),
    )
    .mapper(bookings_params);
    let grid = GridController::mount(
        deps,
        GridOptions::default().sort(vec![SortItem::desc("id")]),
    );
    let snapshot = loaded(&mut grid.subscribe()).await?;

    assert_eq!(snapshot.total, 30);
    let ids: Vec<i64> = snapshot.rows.iter().map(|row| row.id.0).collect();
    assert_eq!(ids, (21..=30).rev().collect::<Vec<_>>());

    let requests = app.backend.requests_to("/api/admin/bookings");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].param("page"), Some("0"));
    assert_eq!(requests[0].param("size"), Some("10"));
    assert_eq!(requests[0].param("sort"), Some("id,desc"));
    assert!(!requests[0].has_param("status"));
    Ok(())
}

#[tokio::test]
async fn bookings_filter_reaches_backend() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher = EndpointFetcher::new(app.admin_client(), BOOKINGS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(fetcher, deserialize_rows())
            .mapper(bookings_params),
        GridOptions::default(),
    );
    let mut snapshots = grid.subscribe();
    loaded(&mut snapshots).await?;

    grid.set_filter(Some(BookingsFilter {
        status: Some(BookingStatus::Pending),
        ..BookingsFilter::default()
    }));
    let snapshot = loaded(&mut snapshots).await?;

    assert_eq!(snapshot.total, 6);
    assert!(
        snapshot
            .rows
            .iter()
            .all(|row| row.status == BookingStatus::Pending)
    );
    let last = app.backend.requests_to("/api/admin/bookings");
    assert_eq!(last.len(), 2);
    assert_eq!(last[1].param("status"), Some("PENDING"));
    Ok(())
}

#[tokio::test]
async fn users_total_comes_from_header() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher = EndpointFetcher::new(app.admin_client(), USERS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<AdminUser, UsersFilter>::new(fetcher, deserialize_rows()),
        GridOptions::default().filter(UsersFilter {
            role: Some(UserRole::Provider),
            active: None,
        }),
    );
    let snapshot = loaded(&mut grid.subscribe()).await?;

    assert_eq!(snapshot.total, 4);
    assert_eq!(snapshot.rows.len(), 4);
    assert!(snapshot.rows.iter().all(|user| user.role == UserRole::Provider));

    let requests = app.backend.requests_to("/api/admin/users");
    assert_eq!(requests[0].param("role"), Some("PROVIDER"));
    assert!(!requests[0].has_param("active"));
    Ok(())
}

#[tokio::test]
async fn revenue_rows_are_coerced() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher = EndpointFetcher::new(app.admin_client(), REVENUE_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<_, ()>::new(fetcher, revenue_rows()),
        GridOptions::default().page_size(5),
    );
    let snapshot = loaded(&mut grid.subscribe()).await?;

    assert_eq!(snapshot.total, 12);
    assert_eq!(snapshot.rows.len(), 5);
    assert!(snapshot.rows.iter().all(|point| !point.month.is_empty()));
    assert!(snapshot.rows.iter().all(|point| point.value > 0.0));
    Ok(())
}

#[tokio::test]
async fn total_falls_back_to_row_count() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher =
        EndpointFetcher::new(app.admin_client(), NOTIFICATIONS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<NotificationItem, ()>::new(fetcher, deserialize_rows()),
        GridOptions::default(),
    );
    let snapshot = loaded(&mut grid.subscribe()).await?;

    assert_eq!(snapshot.rows.len(), 3);
    assert_eq!(snapshot.total, 3);
    Ok(())
}

#[tokio::test]
async fn backend_failure_keeps_rows_and_notifies() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (notifier, mut notifications) = notifier();
    let fetcher = EndpointFetcher::new(app.admin_client(), BOOKINGS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(fetcher, deserialize_rows())
            .mapper(bookings_params)
            .notifier(notifier),
        GridOptions::default(),
    );
    let mut snapshots = grid.subscribe();
    loaded(&mut snapshots).await?;

    app.backend.fail_with(503, Some("Maintenance en cours"));
    grid.update_pagination(|p| p.with_page(1));
    let snapshot = loaded(&mut snapshots).await?;

    assert_eq!(snapshot.rows.len(), 10);
    assert_eq!(snapshot.rows[0].id, BookingId(1));
    assert_eq!(snapshot.total, 30);
    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].level, Level::Error);
    assert_eq!(received[0].message, "Maintenance en cours");

    app.backend.recover();
    grid.refresh();
    let snapshot = loaded(&mut snapshots).await?;
    assert_eq!(snapshot.rows[0].id, BookingId(11));
    Ok(())
}

#[tokio::test]
async fn unauthorized_is_left_to_the_session_hook() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let expired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&expired);
    let client = payloads::APIClient::new(app.address()).on_unauthorized(
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let (notifier, mut notifications) = notifier();
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(
            EndpointFetcher::new(client, BOOKINGS_ENDPOINT),
            deserialize_rows(),
        )
        .notifier(notifier),
        GridOptions::default(),
    );
    let snapshot = loaded(&mut grid.subscribe()).await?;

    assert!(snapshot.rows.is_empty());
    assert_eq!(expired.load(Ordering::SeqCst), 1);
    assert!(drain(&mut notifications).is_empty());
    Ok(())
}

#[tokio::test]
async fn search_is_debounced_against_backend() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let fetcher = EndpointFetcher::new(app.admin_client(), BOOKINGS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(fetcher, deserialize_rows())
            .mapper(bookings_params),
        GridOptions::default().debounce(Duration::from_millis(50)),
    );
    let mut snapshots = grid.subscribe();
    loaded(&mut snapshots).await?;

    grid.set_search(Some("s"));
    grid.set_search(Some("sm"));
    grid.set_search(Some(" SMITH "));
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| !s.loading && s.total == 10),
    )
    .await??
    .clone();

    assert_eq!(snapshot.search.as_deref(), Some("SMITH"));
    let requests = app.backend.requests_to("/api/admin/bookings");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].param("search"), Some("SMITH"));
    Ok(())
}

#[tokio::test]
async fn refresh_after_mutation() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.login_admin().await?;
    let fetcher = EndpointFetcher::new(app.client.clone(), BOOKINGS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(fetcher, deserialize_rows())
            .mapper(bookings_params),
        GridOptions::default(),
    );
    let mut snapshots = grid.subscribe();
    loaded(&mut snapshots).await?;

    // booking 3 is completed and cannot go back to pending
    let result = app
        .client
        .update_booking_status(
            BookingId(3),
            &UpdateBookingStatus {
                status: BookingStatus::Pending,
            },
        )
        .await;
    assert_status_code(result, StatusCode::UNPROCESSABLE_ENTITY);
    let error = app
        .client
        .update_booking_status(
            BookingId(3),
            &UpdateBookingStatus {
                status: BookingStatus::Pending,
            },
        )
        .await
        .expect_err("completed bookings are final");
    assert!(matches!(error, ClientError::Validation(..)));
    assert!(error.field_errors().is_some_and(|e| e.contains_key("status")));

    app.client.delete_booking(BookingId(1)).await?;
    grid.refresh();
    let snapshot = loaded(&mut snapshots).await?;
    assert_eq!(snapshot.total, 29);
    assert_eq!(snapshot.rows[0].id, BookingId(2));
    Ok(())
}

#[tokio::test]
async fn slow_page_is_superseded_by_the_next_one() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.set_latency(Some(Duration::from_millis(300)));
    let fetcher = EndpointFetcher::new(app.admin_client(), BOOKINGS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<BookingItem, BookingsFilter>::new(fetcher, deserialize_rows())
            .mapper(bookings_params),
        GridOptions::default(),
    );
    let mut snapshots = grid.subscribe();

    tokio::time::sleep(Duration::from_millis(50)).await;
    grid.update_pagination(|p| p.with_page(2));
    let snapshot = loaded(&mut snapshots).await?;

    assert_eq!(snapshot.pagination.page, 2);
    assert_eq!(snapshot.rows[0].id, BookingId(21));
    assert_eq!(snapshot.total, 30);
    Ok(())
}

#[tokio::test]
async fn created_user_shows_up_after_refresh() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let client = app.admin_client();
    let fetcher = EndpointFetcher::new(client.clone(), USERS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<AdminUser, UsersFilter>::new(fetcher, deserialize_rows()),
        GridOptions::default()
            .page_size(50)
            .sort(vec![SortItem::desc("id")]),
    );
    let mut snapshots = grid.subscribe();
    let before = loaded(&mut snapshots).await?;

    let invalid = AdminUserRequest {
        email: "pas-une-adresse".into(),
        phone: Some("06-12".into()),
        role: UserRole::Client,
        active: None,
    };
    let error = client
        .create_user(&invalid)
        .await
        .expect_err("invalid fields are rejected");
    assert!(matches!(
        error,
        ClientError::Validation(StatusCode::UNPROCESSABLE_ENTITY, _)
    ));
    assert_eq!(error.field_errors(), Some(&invalid.validation_errors()));

    let created = client
        .create_user(&AdminUserRequest {
            email: " Nina.Client@Example.com ".into(),
            phone: Some("+33 6 11 22 33 44".into()),
            role: UserRole::Client,
            active: None,
        })
        .await?;
    assert_eq!(created.email, "nina.client@example.com");
    assert_eq!(created.active, Some(true));

    let duplicate = client
        .create_user(&AdminUserRequest {
            email: "nina.client@example.com".into(),
            phone: None,
            role: UserRole::Client,
            active: None,
        })
        .await;
    assert_status_code(duplicate, StatusCode::CONFLICT);

    grid.refresh();
    let after = loaded(&mut snapshots).await?;
    assert_eq!(after.total, before.total + 1);
    assert_eq!(after.rows[0].id, created.id);

    client
        .update_user(
            created.id,
            &AdminUserRequest {
                email: created.email.clone(),
                phone: created.phone.clone(),
                role: UserRole::Provider,
                active: Some(false),
            },
        )
        .await?;
    grid.set_filter(Some(UsersFilter {
        role: Some(UserRole::Provider),
        active: Some(false),
    }));
    let suspended = loaded(&mut snapshots).await?;
    assert!(suspended.rows.iter().any(|user| user.id == created.id));
    Ok(())
}

#[tokio::test]
async fn notification_read_flag_survives_refresh() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let client = app.admin_client();
    let fetcher = EndpointFetcher::new(client.clone(), NOTIFICATIONS_ENDPOINT);
    let grid = GridController::mount(
        GridDeps::<NotificationItem, ()>::new(fetcher, deserialize_rows()),
        GridOptions::default(),
    );
    let mut snapshots = grid.subscribe();
    let snapshot = loaded(&mut snapshots).await?;
    let unread: Vec<&str> = snapshot
        .rows
        .iter()
        .filter(|item| !item.read)
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(unread, ["n-1"]);

    client.mark_notification_read("n-1").await?;
    grid.refresh();
    let snapshot = loaded(&mut snapshots).await?;
    assert!(snapshot.rows.iter().all(|item| item.read));
    assert_eq!(
        app.backend.requests_to("/api/admin/notifications/n-1/read").len(),
        1
    );

    let missing = client.mark_notification_read("n-404").await;
    assert_status_code(missing, StatusCode::NOT_FOUND);
    Ok(())
}
