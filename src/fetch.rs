//! Loading/error/data state around a single service call.

use std::{
    future::Future,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::{error::ClientResult, response::ApiResult};

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Each instance owns its state; nothing is cached across instances.
///
/// With `immediate` set, [`UseApi::sync`] fires the request once per distinct
/// key, where the key stands for the parameters the request closes over.
/// Calling `sync` again with an equal key does nothing.
pub struct UseApi<T, K = ()> {
    state: Mutex<FetchState<T>>,
    mounted: AtomicBool,
    last_key: Mutex<Option<K>>,
    immediate: bool,
    executions: AtomicUsize,
}

impl<T, K> UseApi<T, K>
where
    T: Clone,
    K: PartialEq + Clone,
{
    pub fn new(immediate: bool) -> Self {
        Self {
            state: Mutex::new(FetchState {
                loading: immediate,
                ..FetchState::default()
            }),
            mounted: AtomicBool::new(true),
            last_key: Mutex::new(None),
            immediate,
            executions: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.state.lock().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.lock().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Number of times the request function has been invoked.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Runs the request and records its outcome. Both `{success:false}`
    /// replies and transport errors end up in `error` as a message.
    pub async fn execute<F, Fut>(&self, request: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<ApiResult<T>>>,
    {
        self.executions.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let outcome = request().await;

        if !self.mounted.load(Ordering::SeqCst) {
            tracing::trace!("fetch finished after unmount, result dropped");
            return None;
        }

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(Ok(data)) => {
                state.data = Some(data.clone());
                Some(data)
            }
            Ok(Err(failure)) => {
                state.error = Some(failure.message);
                None
            }
            Err(err) => {
                state.error = Some(err.to_string());
                None
            }
        }
    }

    /// Fires the request when running immediately and `key` differs from the
    /// key of the previous fire. Returns whether a request was made.
    pub async fn sync<F, Fut>(&self, key: &K, request: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<ApiResult<T>>>,
    {
        if !self.immediate {
            return false;
        }
        {
            let mut last_key = self.last_key.lock();
            if last_key.as_ref() == Some(key) {
                return false;
            }
            *last_key = Some(key.clone());
        }
        self.execute(request).await;
        true
    }

    pub fn reset(&self) {
        *self.state.lock() = FetchState::default();
    }

    /// Marks the owner as gone; results still in flight are discarded.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}
