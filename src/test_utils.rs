//! Scripted collaborators for tests.
//!
//! `ScriptedTransport` answers GETs from a route table and records every
//! URL it was asked for. Routes can be gated so a test decides exactly
//! when a response lands.

use crate::error::{TransportError, TransportResult};
use crate::services::{Response, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Holds a response back until opened.
#[derive(Clone)]
pub struct Gate {
    inner: Arc<GateInner>,
}

struct GateInner {
    open: AtomicBool,
    notify: Notify,
}

impl Gate {
    fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                open: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Releases every request waiting on this gate, now and later.
    pub fn open(&self) {
        self.inner.open.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    async fn wait(&self) {
        loop {
            // Register before checking the flag so an open() in between is not lost.
            let notified = self.inner.notify.notified();
            if self.inner.open.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

enum Reply {
    Respond(Response),
    Fail(String),
}

struct Route {
    pattern: String,
    reply: Reply,
    gate: Option<Gate>,
}

/// In-memory transport driven by a route table.
///
/// A request matches the most recently added route whose pattern is a
/// substring of the URL. Unmatched requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, reply: Reply, gate: Option<Gate>) {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Route {
                pattern: pattern.to_string(),
                reply,
                gate,
            });
    }

    /// Answers URLs containing `pattern` with `response`.
    pub fn respond(&self, pattern: &str, response: Response) {
        self.push(pattern, Reply::Respond(response), None);
    }

    /// Answers URLs containing `pattern` with a 200 JSON body.
    pub fn respond_json(&self, pattern: &str, body: &serde_json::Value) {
        self.respond(pattern, Response::ok(body.to_string()));
    }

    /// Answers URLs containing `pattern` with a 200 text body.
    pub fn respond_text(&self, pattern: &str, body: &str) {
        self.respond(pattern, Response::ok(body));
    }

    /// Like [`respond`](Self::respond) but held until the returned gate opens.
    #[must_use]
    pub fn respond_gated(&self, pattern: &str, response: Response) -> Gate {
        let gate = Gate::new();
        self.push(pattern, Reply::Respond(response), Some(gate.clone()));
        gate
    }

    /// Fails URLs containing `pattern` at the transport level.
    pub fn fail(&self, pattern: &str, reason: &str) {
        self.push(pattern, Reply::Fail(reason.to_string()), None);
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn requests_matching(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    fn lookup(&self, url: &str) -> (Option<TransportResult<Response>>, Option<Gate>) {
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.iter().rev().find(|r| url.contains(&r.pattern)) {
            Some(route) => {
                let result = match &route.reply {
                    Reply::Respond(response) => Ok(response.clone()),
                    Reply::Fail(reason) => Err(TransportError::Other {
                        url: url.to_string(),
                        reason: reason.clone(),
                    }),
                };
                (Some(result), route.gate.clone())
            }
            None => (None, None),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> TransportResult<Response> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let (result, gate) = self.lookup(url);
        if let Some(gate) = gate {
            gate.wait().await;
        }
        result.unwrap_or(Ok(Response {
            status: 404,
            body: Vec::new(),
        }))
    }
}

/// Waits up to `timeout` for the next message on `rx`.
pub async fn next_within<T>(rx: &mut mpsc::UnboundedReceiver<T>, timeout: Duration) -> Option<T> {
    tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
}
