use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use futures::channel::oneshot;
use grid::mapper::QueryParams;
use grid::notify::{ChannelNotifier, Notification};
use grid::{GridSnapshot, PageFetcher};
use payloads::{ClientError, RawPage};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

type Reply = oneshot::Sender<Result<RawPage, ClientError>>;

struct Call {
    params: QueryParams,
    reply: Option<Reply>,
}

/// A fetcher whose requests stay pending until the test answers them.
pub struct ScriptedFetcher {
    calls: Arc<Mutex<Vec<Call>>>,
}

/// Test-side handle on the requests a [`ScriptedFetcher`] received.
#[derive(Clone)]
pub struct FetchLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedFetcher {
    pub fn new() -> (Self, FetchLog) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            FetchLog { calls },
        )
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, params: QueryParams) -> Result<RawPage, ClientError> {
        let (reply, response) = oneshot::channel();
        self.calls.lock().unwrap().push(Call {
            params,
            reply: Some(reply),
        });
        response.await.unwrap_or(Err(ClientError::Cancelled))
    }
}

impl FetchLog {
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn params(&self, index: usize) -> QueryParams {
        self.calls.lock().unwrap()[index].params.clone()
    }

    pub fn last_params(&self) -> QueryParams {
        let calls = self.calls.lock().unwrap();
        calls.last().expect("no request was issued").params.clone()
    }

    /// Answer request `index`. Returns false if the request was abandoned.
    pub fn respond(
        &self,
        index: usize,
        result: Result<RawPage, ClientError>,
    ) -> bool {
        let reply = self.calls.lock().unwrap()[index].reply.take();
        match reply {
            Some(reply) => reply.send(result).is_ok(),
            None => false,
        }
    }

    pub fn respond_rows(&self, index: usize, ids: &[i64], total: u64) -> bool {
        self.respond(index, Ok(rows_body(ids, total)))
    }
}

pub fn rows_body(ids: &[i64], total: u64) -> RawPage {
    let content: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    RawPage::from_body(json!({"content": content, "totalElements": total}))
}

pub fn ids(snapshot: &GridSnapshot<Value, Value>) -> Vec<i64> {
    snapshot
        .rows
        .iter()
        .filter_map(|row| row["id"].as_i64())
        .collect()
}

/// Let spawned fetch and debounce tasks run.
pub async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn drain(receiver: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(Some(notification)) = receiver.try_next() {
        notifications.push(notification);
    }
    notifications
}

pub fn notifier() -> (Arc<ChannelNotifier>, UnboundedReceiver<Notification>) {
    let (notifier, receiver) = ChannelNotifier::new();
    (Arc::new(notifier), receiver)
}

/// Wait, in real time, for the grid to finish loading.
pub async fn loaded<T: Clone, F: Clone>(
    snapshots: &mut watch::Receiver<GridSnapshot<T, F>>,
) -> anyhow::Result<GridSnapshot<T, F>> {
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|snapshot| !snapshot.loading),
    )
    .await??
    .clone();
    Ok(snapshot)
}
