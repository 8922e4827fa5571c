//! Async driver for a [`SwapSession`].

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument};

use tokenswap_prices::CatalogLoader;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::metrics::SessionMetrics;
use crate::session::{Effect, Notice, SessionEvent, SessionSnapshot, SwapSession};

enum Command {
    Event {
        event: SessionEvent,
        reply: Option<oneshot::Sender<SessionSnapshot>>,
    },
    Shutdown,
}

/// Spawns sessions onto the current tokio runtime.
pub struct SessionRuntime;

impl SessionRuntime {
    /// Start a session task and kick off the initial catalog load.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: SessionConfig, loader: CatalogLoader) -> SessionHandle {
        let metrics = Arc::new(SessionMetrics::new());
        let session = SwapSession::with_metrics(&config, metrics.clone());

        let (command_tx, command_rx) = mpsc::channel(config.event_buffer);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (notice_tx, _) = broadcast::channel(config.notice_buffer);

        let driver = Driver {
            session,
            loader,
            snapshots: snapshot_tx,
            notices: notice_tx.clone(),
            tasks: JoinSet::new(),
        };
        let task = tokio::spawn(driver.run(command_rx));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            notices: notice_tx,
            metrics,
            task,
        }
    }
}

struct Driver {
    session: SwapSession,
    loader: CatalogLoader,
    snapshots: watch::Sender<SessionSnapshot>,
    notices: broadcast::Sender<Notice>,
    tasks: JoinSet<SessionEvent>,
}

impl Driver {
    #[instrument(skip_all, fields(source = %self.loader.source_name()))]
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("Session started");
        self.dispatch(vec![Effect::LoadCatalog]);

        loop {
            let (event, reply) = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Event { event, reply }) => (event, reply),
                    Some(Command::Shutdown) | None => break,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => match joined {
                    Ok(event) => (event, None),
                    Err(e) => {
                        error!(error = %e, "Background task failed");
                        continue;
                    }
                },
            };

            let effects = self.session.apply(event);
            let snapshot = self.session.snapshot();
            if let Some(reply) = reply {
                // The caller may have stopped waiting.
                let _ = reply.send(snapshot.clone());
            }
            self.snapshots.send_replace(snapshot);
            self.dispatch(effects);
        }

        let pending = self.tasks.len();
        self.tasks.abort_all();
        info!(pending, "Session stopped");
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadCatalog => {
                    let loader = self.loader.clone();
                    self.tasks.spawn(async move {
                        match loader.load().await {
                            Ok(catalog) => SessionEvent::CatalogLoaded(catalog),
                            Err(e) => SessionEvent::CatalogFailed(e),
                        }
                    });
                }
                Effect::ScheduleSettlement(ticket) => {
                    self.tasks.spawn(async move {
                        tokio::time::sleep(ticket.delay).await;
                        SessionEvent::SubmissionSettled(ticket.id)
                    });
                }
                Effect::Notify(notice) => {
                    // No subscribers is fine.
                    if self.notices.send(notice).is_err() {
                        debug!("Notice dropped without subscribers");
                    }
                }
            }
        }
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    notices: broadcast::Sender<Notice>,
    metrics: Arc<SessionMetrics>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue an event for the session.
    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.commands
            .send(Command::Event { event, reply: None })
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Apply an event and return the snapshot taken right after it.
    pub async fn apply(&self, event: SessionEvent) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Event {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// A receiver for notices published from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Shared session metrics.
    pub fn metrics(&self) -> Arc<SessionMetrics> {
        self.metrics.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok((*snapshot).clone())
    }

    /// Stop the session and wait for its task to finish.
    ///
    /// Pending loads and submissions are abandoned.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        // The task may already be gone; joining below reports how it ended.
        let _ = self.commands.send(Command::Shutdown).await;
        self.task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;
    use tokenswap_common::Symbol;
    use tokenswap_prices::{LoadError, StaticPriceSource};

    use super::*;
    use crate::config::SubmissionConfig;
    use crate::output::Output;
    use crate::state::SubmissionState;
    use crate::validator::ValidationState;

    fn config() -> SessionConfig {
        SessionConfig {
            submission: SubmissionConfig {
                seed: Some(42),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn prices() -> Arc<StaticPriceSource> {
        Arc::new(StaticPriceSource::with_prices([
            ("BTC", dec!(50000)),
            ("ETH", dec!(2500)),
            ("USDC", dec!(1)),
        ]))
    }

    fn spawn(source: Arc<StaticPriceSource>) -> SessionHandle {
        SessionRuntime::spawn(config(), CatalogLoader::new(source))
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_seeds_selection() {
        let handle = spawn(prices());

        let snapshot = handle.wait_for(|s| s.catalog_loaded).await.unwrap();

        assert_eq!(snapshot.symbols.len(), 3);
        assert_eq!(snapshot.selection.from, Some(Symbol::new("BTC")));
        assert_eq!(snapshot.selection.to, Some(Symbol::new("ETH")));
        assert_eq!(snapshot.validation, ValidationState::EmptyOrNonPositiveAmount);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_swap() {
        let handle = spawn(prices());
        let mut notices = handle.notices();
        handle.wait_for(|s| s.catalog_loaded).await.unwrap();

        handle.send(SessionEvent::SetAmount("2".into())).await.unwrap();
        let snapshot = handle
            .wait_for(|s| s.validation.is_valid())
            .await
            .unwrap();
        assert_eq!(snapshot.output, Output::Value(dec!(40)));

        handle.send(SessionEvent::Submit).await.unwrap();
        let snapshot = handle
            .wait_for(|s| s.submission == SubmissionState::Succeeded)
            .await
            .unwrap();
        assert_eq!(snapshot.selection.amount_text, "");
        assert_eq!(snapshot.selection.from, Some(Symbol::new("BTC")));

        loop {
            if let Notice::SwapSucceeded { .. } = notices.recv().await.unwrap() {
                break;
            }
        }
        assert_eq!(handle.metrics().snapshot().submissions_settled, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_settles_once() {
        let handle = spawn(prices());
        let mut notices = handle.notices();
        handle.wait_for(|s| s.catalog_loaded).await.unwrap();

        handle.send(SessionEvent::SetAmount("1".into())).await.unwrap();
        handle.send(SessionEvent::Submit).await.unwrap();
        handle.send(SessionEvent::Submit).await.unwrap();
        handle
            .wait_for(|s| s.submission == SubmissionState::Succeeded)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;

        let mut succeeded = 0;
        while let Ok(notice) = notices.try_recv() {
            if matches!(notice, Notice::SwapSucceeded { .. }) {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 1);

        let metrics = handle.metrics().snapshot();
        assert_eq!(metrics.submissions_accepted, 1);
        assert_eq!(metrics.submissions_rejected, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_submission_is_not_lost() {
        let handle = spawn(prices());
        handle.wait_for(|s| s.catalog_loaded).await.unwrap();

        handle.send(SessionEvent::SetAmount("1".into())).await.unwrap();
        handle.send(SessionEvent::Submit).await.unwrap();
        handle.send(SessionEvent::SwapDirection).await.unwrap();

        let snapshot = handle
            .wait_for(|s| s.submission == SubmissionState::Succeeded)
            .await
            .unwrap();

        assert_eq!(snapshot.selection.from, Some(Symbol::new("ETH")));
        assert_eq!(snapshot.selection.to, Some(Symbol::new("BTC")));
        assert_eq!(snapshot.selection.amount_text, "");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_input_before_catalog_arrives() {
        let source = Arc::new(
            StaticPriceSource::with_prices([("BTC", dec!(50000)), ("ETH", dec!(2500))])
                .with_delay(Duration::from_millis(500)),
        );
        let handle = spawn(source);

        handle.send(SessionEvent::SetAmount("3".into())).await.unwrap();
        let snapshot = handle
            .wait_for(|s| s.selection.amount_text == "3")
            .await
            .unwrap();
        assert!(!snapshot.catalog_loaded);
        assert_eq!(snapshot.validation, ValidationState::SameAsset);
        assert_eq!(snapshot.output, Output::Unavailable);

        let snapshot = handle.wait_for(|s| s.catalog_loaded).await.unwrap();
        assert_eq!(snapshot.selection.amount_text, "3");
        assert_eq!(snapshot.output, Output::Value(dec!(60)));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_is_published() {
        let source = Arc::new(StaticPriceSource::failing(LoadError::Parse(
            "not an array".into(),
        )));
        let handle = spawn(source);

        let snapshot = handle
            .wait_for(|s| s.load_error.is_some())
            .await
            .unwrap();

        assert!(!snapshot.catalog_loaded);
        assert!(snapshot.symbols.is_empty());
        assert_eq!(handle.metrics().snapshot().loads_failed, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_recovers_from_failure() {
        let source = Arc::new(StaticPriceSource::failing(LoadError::Parse("bad".into())));
        let handle = spawn(source.clone());
        handle.wait_for(|s| s.load_error.is_some()).await.unwrap();

        source.set_result(Ok(vec![
            tokenswap_prices::PriceRecord::new("ATOM", dec!(7)),
            tokenswap_prices::PriceRecord::new("OSMO", dec!(0.5)),
        ]));
        handle.send(SessionEvent::RefreshCatalog).await.unwrap();

        let snapshot = handle.wait_for(|s| s.catalog_loaded).await.unwrap();
        assert!(snapshot.load_error.is_none());
        assert_eq!(snapshot.selection.from, Some(Symbol::new("ATOM")));
        assert_eq!(source.fetch_count(), 2);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_returns_resulting_snapshot() {
        let handle = spawn(prices());
        handle.wait_for(|s| s.catalog_loaded).await.unwrap();

        let snapshot = handle
            .apply(SessionEvent::SetAmount("2".into()))
            .await
            .unwrap();

        assert_eq!(snapshot.selection.amount_text, "2");
        assert_eq!(snapshot.output, Output::Value(dec!(40)));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_shutdown_fails() {
        let handle = spawn(prices());
        let commands = handle.commands.clone();

        tokio_test::assert_ok!(handle.shutdown().await);

        assert!(commands
            .send(Command::Event {
                event: SessionEvent::Submit,
                reply: None,
            })
            .await
            .is_err());
    }
}
