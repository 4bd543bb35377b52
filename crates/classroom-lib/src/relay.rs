// ============================
// crates/classroom-lib/src/relay.rs
// ============================
//! Local relay transport.
//!
//! A process-global registry of named broadcast scopes, mirroring the
//! same-origin broadcast channel of the host environment: every context that
//! opens the same scope name receives what the others send, and never its
//! own messages. There is no delivery or cross-sender ordering guarantee;
//! a lagged receiver silently skips ahead.
use classroom_common::RelayMessage;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Relay-level frame: the origin tag keeps a sender's own messages out of
/// its receiver, like the host broadcast primitive does.
#[derive(Debug, Clone)]
struct Envelope {
    origin: u64,
    msg: RelayMessage,
}

static SCOPES: Lazy<DashMap<String, broadcast::Sender<Envelope>>> = Lazy::new(DashMap::new);
static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// One context's handle onto a named broadcast scope.
pub struct RelayChannel {
    origin: u64,
    scope: String,
    tx: Option<broadcast::Sender<Envelope>>,
}

impl RelayChannel {
    /// Join the scope with the given name, creating it on first open.
    pub fn open(scope: &str, capacity: usize) -> Self {
        let tx = SCOPES
            .entry(scope.to_string())
            .or_insert_with(|| broadcast::channel(capacity).0)
            .clone();
        debug!(scope, "relay scope opened");
        Self {
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
            scope: scope.to_string(),
            tx: Some(tx),
        }
    }

    /// Degraded transport for hosts without a broadcast primitive: sends go
    /// nowhere and the receiver never yields. Collaboration silently becomes
    /// single-user.
    pub fn disconnected() -> Self {
        Self {
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
            scope: String::new(),
            tx: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.tx.is_some()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Fire-and-forget: a send with no listeners (or no transport) is not an
    /// error.
    pub fn send(&self, msg: RelayMessage) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Envelope {
                origin: self.origin,
                msg,
            });
        }
    }

    /// Register for inbound messages from the other contexts in this scope.
    pub fn subscribe(&self) -> RelayReceiver {
        RelayReceiver {
            origin: self.origin,
            rx: self.tx.as_ref().map(|tx| tx.subscribe()),
        }
    }
}

/// Inbound side of a [`RelayChannel`].
pub struct RelayReceiver {
    origin: u64,
    rx: Option<broadcast::Receiver<Envelope>>,
}

impl RelayReceiver {
    /// Next message from a peer, or `None` once the transport is gone.
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(env) if env.origin != self.origin => return Some(env.msg),
                Ok(_) => continue, // own frame, filtered at the transport edge
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "relay receiver lagged, skipping ahead");
                    continue;
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
