use grid::notify::{LOAD_ERROR_MESSAGE, Level};
use grid::{GridController, GridDeps, GridOptions, SortItem, identity_rows};
use payloads::{ApiErrorBody, ClientError};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::advance;

use crate::helpers::{FetchLog, ScriptedFetcher, drain, flush, ids, notifier};

type Grid = GridController<Value, Value>;

fn mount(options: GridOptions<Value>) -> (Grid, FetchLog) {
    let (fetcher, log) = ScriptedFetcher::new();
    let grid = Grid::mount(GridDeps::new(fetcher, identity_rows()), options);
    (grid, log)
}

#[tokio::test(start_paused = true)]
async fn mount_fetches_first_page_then_follows_pagination() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default().page_size(10));
    flush().await;
    assert_eq!(log.count(), 1);
    let first = log.params(0);
    assert_eq!(first.get("page"), Some("0"));
    assert_eq!(first.get("size"), Some("10"));
    assert!(grid.snapshot().loading);

    log.respond_rows(0, &[1, 2, 3], 30);
    flush().await;
    grid.update_pagination(|p| p.with_page(2));
    flush().await;

    assert_eq!(log.count(), 2);
    let second = log.params(1);
    assert_eq!(second.get("page"), Some("2"));
    assert_eq!(second.get("size"), Some("10"));
    assert!(!second.contains_key("sort"));
    assert!(!second.contains_key("search"));

    let snapshot = grid.snapshot();
    assert!(snapshot.sort.is_empty());
    assert_eq!(snapshot.filter, None);
    assert_eq!(snapshot.search, None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn committed_page_is_published() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    let mut snapshots = grid.subscribe();
    flush().await;

    log.respond_rows(0, &[1, 2, 3], 30);
    flush().await;

    assert!(snapshots.has_changed()?);
    let snapshot = snapshots.borrow_and_update().clone();
    assert_eq!(ids(&snapshot), vec![1, 2, 3]);
    assert_eq!(snapshot.total, 30);
    assert!(!snapshot.loading);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn search_burst_is_coalesced() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    flush().await;

    for input in ["a", "ab", "abc"] {
        grid.set_search(Some(input));
        flush().await;
        advance(Duration::from_millis(100)).await;
        flush().await;
    }
    assert_eq!(log.count(), 1);

    advance(Duration::from_millis(300)).await;
    flush().await;
    assert_eq!(log.count(), 2);
    assert_eq!(log.params(1).get("search"), Some("abc"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn trailing_space_does_not_refetch() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    flush().await;

    grid.set_search(Some("smith"));
    grid.set_search(Some("smith "));
    flush().await;
    advance(Duration::from_millis(400)).await;
    flush().await;

    assert_eq!(log.count(), 2);
    assert_eq!(log.params(1).get("search"), Some("smith"));

    advance(Duration::from_secs(5)).await;
    flush().await;
    assert_eq!(log.count(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn page_resets_when_query_changes() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    flush().await;

    grid.update_pagination(|p| p.with_page(3));
    grid.set_sort(vec![SortItem::desc("date")]);
    flush().await;
    assert_eq!(grid.snapshot().pagination.page, 0);
    assert_eq!(log.last_params().get("page"), Some("0"));
    assert_eq!(log.last_params().get("sort"), Some("date,desc"));

    grid.update_pagination(|p| p.with_page(3));
    grid.set_filter(Some(json!({"status": "PENDING"})));
    flush().await;
    assert_eq!(grid.snapshot().pagination.page, 0);
    assert_eq!(log.last_params().get("status"), Some("PENDING"));

    grid.update_pagination(|p| p.with_page(3));
    grid.set_search(Some("lavage"));
    assert_eq!(grid.snapshot().pagination.page, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn equal_filter_is_ignored() -> anyhow::Result<()> {
    let (grid, log) = mount(
        GridOptions::default().filter(json!({"status": "COMPLETED", "providerId": 4})),
    );
    flush().await;
    grid.update_pagination(|p| p.with_page(1));
    flush().await;
    let count = log.count();

    grid.update_filter(|_| Some(json!({"providerId": 4, "status": "COMPLETED"})));
    flush().await;

    assert_eq!(log.count(), count);
    assert_eq!(grid.snapshot().pagination.page, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn latest_request_wins() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    flush().await;
    grid.refresh();
    flush().await;
    assert_eq!(log.count(), 2);

    assert!(log.respond_rows(1, &[20, 21], 2));
    flush().await;
    // the first request was aborted when the second one was issued
    assert!(!log.respond_rows(0, &[10], 1));
    flush().await;

    assert_eq!(ids(&grid.snapshot()), vec![20, 21]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_silent() -> anyhow::Result<()> {
    let (notifier, mut notifications) = notifier();
    let (fetcher, log) = ScriptedFetcher::new();
    let grid = Grid::mount(
        GridDeps::new(fetcher, identity_rows()).notifier(notifier),
        GridOptions::default(),
    );
    flush().await;

    grid.update_pagination(|p| p.with_page(1));
    flush().await;

    assert_eq!(log.count(), 2);
    assert!(drain(&mut notifications).is_empty());
    assert!(grid.snapshot().loading);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_rows_and_notifies() -> anyhow::Result<()> {
    let (notifier, mut notifications) = notifier();
    let (fetcher, log) = ScriptedFetcher::new();
    let grid = Grid::mount(
        GridDeps::new(fetcher, identity_rows()).notifier(notifier),
        GridOptions::default(),
    );
    flush().await;
    log.respond_rows(0, &[1, 2], 2);
    flush().await;

    grid.refresh();
    flush().await;
    log.respond(1, Err(ClientError::Timeout));
    flush().await;

    let snapshot = grid.snapshot();
    assert_eq!(ids(&snapshot), vec![1, 2]);
    assert_eq!(snapshot.total, 2);
    assert!(!snapshot.loading);

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].level, Level::Error);
    assert_eq!(received[0].message, LOAD_ERROR_MESSAGE);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn validation_failure_is_not_toasted() -> anyhow::Result<()> {
    let (notifier, mut notifications) = notifier();
    let (fetcher, log) = ScriptedFetcher::new();
    let grid = Grid::mount(
        GridDeps::new(fetcher, identity_rows()).notifier(notifier),
        GridOptions::default(),
    );
    flush().await;

    let body = ApiErrorBody::from_text(
        r#"{"message": "Filtre invalide", "errors": {"date": "Date invalide"}}"#,
    );
    log.respond(
        0,
        Err(ClientError::Validation(StatusCode::BAD_REQUEST, body)),
    );
    flush().await;

    let snapshot = grid.snapshot();
    assert_eq!(
        snapshot.field_errors.get("date").map(String::as_str),
        Some("Date invalide")
    );
    assert!(drain(&mut notifications).is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unmount_abandons_requests() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    flush().await;

    grid.set_search(Some("late"));
    grid.unmount();
    flush().await;
    assert!(!log.respond_rows(0, &[1], 1));

    grid.refresh();
    advance(Duration::from_secs(1)).await;
    flush().await;

    assert_eq!(log.count(), 1);
    assert!(grid.snapshot().rows.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_unmounts() -> anyhow::Result<()> {
    let (grid, log) = mount(GridOptions::default());
    let snapshots = grid.subscribe();
    flush().await;

    drop(grid);
    flush().await;

    assert!(!log.respond_rows(0, &[1], 1));
    assert!(snapshots.borrow().rows.is_empty());
    Ok(())
}
