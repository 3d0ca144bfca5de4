use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::prelude::*;

pub const REJECTION_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Expired windows are dropped once this many clients are tracked.
const PURGE_THRESHOLD: usize = 10_000;

/// Client IP, connections with an unknown peer share the `None` partition.
pub type Partition = Option<IpAddr>;

#[derive(Copy, Clone, Debug)]
struct Window {
    started_at: Instant,
    n_permits: u32,
}

/// Fixed-window request counter, partitioned by client.
pub struct Limiter {
    name: &'static str,
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<Partition, Window>>,
}

impl Limiter {
    pub fn new(name: &'static str, limit: u32, window: Duration) -> Self {
        Self { name, limit, window, windows: Mutex::default() }
    }

    /// Count the request, returns `false` when the partition has exhausted the current window.
    pub fn try_acquire(&self, partition: Partition, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() >= PURGE_THRESHOLD {
            windows.retain(|_, window| now.duration_since(window.started_at) < self.window);
        }
        let window = windows.entry(partition).or_insert(Window { started_at: now, n_permits: 0 });
        if now.duration_since(window.started_at) >= self.window {
            *window = Window { started_at: now, n_permits: 0 };
        }
        if window.n_permits >= self.limit {
            return false;
        }
        window.n_permits += 1;
        true
    }
}

/// Middleware rejecting requests over the limit with `429 Too Many Requests`.
pub async fn enforce(State(limiter): State<Arc<Limiter>>, request: Request, next: Next) -> Response {
    let partition = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    if limiter.try_acquire(partition, Instant::now()) {
        next.run(request).await
    } else {
        warn!(limiter = limiter.name, ?partition, "rejected");
        (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response()
    }
}
