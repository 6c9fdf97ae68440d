use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(skip)]
    pub seq: u64,
    pub message: String,
    pub kind: NoticeKind,
}

/// Transient status line. Showing a message replaces whatever is visible and
/// restarts the hide timer; there is no queue.
#[derive(Clone)]
pub struct Notifier {
    tx: Arc<watch::Sender<Option<Notice>>>,
    seq: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            seq: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    pub fn show(&self, message: impl Into<String>, kind: NoticeKind) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let notice = Notice {
            seq,
            message: message.into(),
            kind,
        };
        debug!("notice #{} ({:?}): {}", seq, kind, notice.message);
        self.tx.send_replace(Some(notice));

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no runtime available, notice #{} will not auto-hide", seq);
            return;
        };

        let tx = self.tx.clone();
        let ttl = self.ttl;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            tx.send_if_modified(|current| match current {
                Some(notice) if notice.seq == seq => {
                    *current = None;
                    true
                }
                _ => false,
            });
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, NoticeKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, NoticeKind::Error);
    }

    pub fn current(&self) -> Option<Notice> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.tx.subscribe()
    }
}
