use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::client::{ApiError, CafeClient};
use super::models::{DashboardStats, Machine, SessionRecord, Transaction, UserProfile};

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Everything the console shows, fetched together
#[derive(Debug, Clone)]
pub struct CafeSnapshot {
    pub active_sessions: Vec<SessionRecord>,
    /// All sessions, ended ones included
    pub session_history: Vec<SessionRecord>,
    pub stats: Option<DashboardStats>,
    pub machines: Vec<Machine>,
    pub profile: Option<UserProfile>,
    pub transactions: Vec<Transaction>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
impl CafeSnapshot {
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            active_sessions: Vec::new(),
            session_history: Vec::new(),
            stats: None,
            machines: Vec::new(),
            profile: None,
            transactions: Vec::new(),
            fetched_at,
        }
    }
}

/// Fetch a full snapshot.
///
/// The active session list is required; the remaining surfaces degrade to
/// empty when their endpoint fails.
pub async fn fetch_snapshot(client: &CafeClient) -> Result<CafeSnapshot, ApiError> {
    let (sessions, history, stats, machines, identity) = tokio::join!(
        client.active_sessions(),
        client.all_sessions(),
        client.dashboard_stats(),
        client.machines(),
        client.profile(),
    );
    let active_sessions = sessions?;

    let profile = match identity {
        Ok(identity) => match client.user(identity.id).await {
            Ok(full) => Some(full),
            Err(err) => {
                warn!(error = %err, "could not load balance, using identity only");
                Some(identity)
            }
        },
        Err(err) => {
            warn!(error = %err, "could not load profile");
            None
        }
    };

    let transactions = if profile.is_some() {
        client.transactions().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not load transactions");
            Vec::new()
        })
    } else {
        Vec::new()
    };

    Ok(CafeSnapshot {
        active_sessions,
        session_history: history.unwrap_or_else(|err| {
            warn!(error = %err, "could not load session history");
            Vec::new()
        }),
        stats: stats
            .map_err(|err| warn!(error = %err, "could not load dashboard stats"))
            .ok(),
        machines: machines.unwrap_or_else(|err| {
            warn!(error = %err, "could not load machines");
            Vec::new()
        }),
        profile,
        transactions,
        fetched_at: Utc::now(),
    })
}

/// Outcome of one background fetch
#[derive(Debug)]
pub enum RefreshMessage {
    Completed(Box<CafeSnapshot>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshCommand {
    Now,
    SetInterval(Duration),
}

/// Handle to the periodic refresh task. The task stops when the handle is
/// dropped or its update receiver goes away.
#[derive(Debug)]
pub struct RefreshHandle {
    commands: mpsc::UnboundedSender<RefreshCommand>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Spawn the task. The first fetch starts immediately.
    pub fn spawn<F, Fut>(
        period: Duration,
        fetch: F,
        updates: mpsc::UnboundedSender<RefreshMessage>,
    ) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<CafeSnapshot, ApiError>> + Send + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(refresh_loop(
            period.max(MIN_REFRESH_INTERVAL),
            fetch,
            command_rx,
            updates,
        ));
        Self { commands, task }
    }

    /// Fetch now instead of waiting for the next tick
    pub fn refresh_now(&self) -> bool {
        self.commands.send(RefreshCommand::Now).is_ok()
    }

    pub fn set_interval(&self, period: Duration) -> bool {
        self.commands
            .send(RefreshCommand::SetInterval(period.max(MIN_REFRESH_INTERVAL)))
            .is_ok()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn ticker(period: Duration, start: Instant) -> Interval {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn refresh_loop<F, Fut>(
    period: Duration,
    fetch: F,
    mut commands: mpsc::UnboundedReceiver<RefreshCommand>,
    updates: mpsc::UnboundedSender<RefreshMessage>,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<CafeSnapshot, ApiError>>,
{
    let mut schedule = interval(period);
    schedule.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = schedule.tick() => {}
            command = commands.recv() => match command {
                Some(RefreshCommand::Now) => schedule.reset(),
                Some(RefreshCommand::SetInterval(period)) => {
                    debug!(secs = period.as_secs(), "refresh interval changed");
                    schedule = ticker(period, Instant::now() + period);
                    continue;
                }
                None => break,
            },
        }

        let message = match fetch().await {
            Ok(snapshot) => RefreshMessage::Completed(Box::new(snapshot)),
            Err(err) if err.is_unauthorized() => {
                warn!(error = %err, "refresh rejected, token missing or expired");
                RefreshMessage::Failed(format!(
                    "{err}, check CAFE_TOKEN or CAFE_USERNAME/CAFE_PASSWORD"
                ))
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                RefreshMessage::Failed(err.to_string())
            }
        };

        if updates.send(message).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<Result<CafeSnapshot, ApiError>> + Send + 'static {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(CafeSnapshot::empty(Utc::now())))
        }
    }

    #[tokio::test]
    async fn test_first_fetch_is_immediate_and_manual_refresh_fetches_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle::spawn(
            Duration::from_secs(3600),
            counting_fetcher(calls.clone()),
            tx,
        );

        let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(matches!(first, RefreshMessage::Completed(_)));

        assert!(handle.refresh_now());
        let second = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(matches!(second, RefreshMessage::Completed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_fatal() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle::spawn(
            Duration::from_secs(3600),
            || async {
                Err(ApiError::Status {
                    status: 503,
                    message: "backend down".to_string(),
                })
            },
            tx,
        );

        match timeout(WAIT, rx.recv()).await.unwrap().unwrap() {
            RefreshMessage::Failed(message) => assert!(message.contains("backend down")),
            other => panic!("unexpected message: {other:?}"),
        }

        assert!(handle.refresh_now());
        let again = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(matches!(again, RefreshMessage::Failed(_)));
    }

    #[tokio::test]
    async fn test_rejected_token_mentions_sign_in() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = RefreshHandle::spawn(
            Duration::from_secs(3600),
            || async { Err(ApiError::Unauthenticated) },
            tx,
        );

        match timeout(WAIT, rx.recv()).await.unwrap().unwrap() {
            RefreshMessage::Failed(message) => {
                assert!(message.starts_with("not signed in"));
                assert!(message.contains("CAFE_TOKEN"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shorter_interval_takes_effect() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle::spawn(
            Duration::from_secs(3600),
            counting_fetcher(calls.clone()),
            tx,
        );
        timeout(WAIT, rx.recv()).await.unwrap().unwrap();

        // Clamped up to the minimum interval
        assert!(handle.set_interval(Duration::from_millis(1)));
        let next = timeout(MIN_REFRESH_INTERVAL + WAIT, rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(next, RefreshMessage::Completed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_closes_updates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle::spawn(
            Duration::from_secs(3600),
            counting_fetcher(calls.clone()),
            tx,
        );
        timeout(WAIT, rx.recv()).await.unwrap().unwrap();

        handle.shutdown();
        assert!(timeout(WAIT, rx.recv()).await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
