use futures::future::{AbortHandle, AbortRegistration, Abortable};
use payloads::ClientError;
use std::future::Future;

/// Holds the abort handle of the single request in flight for one grid.
///
/// Starting a request through the slot aborts the one before it. An aborted
/// request resolves to [`ClientError::Cancelled`].
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Option<AbortHandle>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the previous request and register a new one.
    pub fn supersede(&mut self) -> AbortRegistration {
        self.cancel();
        let (handle, registration) = AbortHandle::new_pair();
        self.current = Some(handle);
        registration
    }

    /// Abort the request in flight, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }

    /// Wrap `request` so that superseding or cancelling the slot stops it.
    pub fn wrap<Fut, T>(
        &mut self,
        request: Fut,
    ) -> impl Future<Output = Result<T, ClientError>> + use<Fut, T>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let registration = self.supersede();
        async move {
            match Abortable::new(request, registration).await {
                Ok(result) => result,
                Err(_aborted) => Err(ClientError::Cancelled),
            }
        }
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
