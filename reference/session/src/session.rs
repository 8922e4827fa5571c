//! The swap session reducer.

use std::sync::Arc;

use serde::Serialize;
use tokenswap_common::{elapsed_ms, SubmissionId, Symbol};
use tokenswap_prices::{AssetCatalog, LoadError};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::metrics::SessionMetrics;
use crate::output::{compute_output, Output};
use crate::selection::SwapSelection;
use crate::sequencer::{SubmissionSequencer, SubmissionTicket};
use crate::state::SubmissionState;
use crate::validator::{validate, ValidationState};

/// Everything that can happen to a session.
///
/// User input and async completions arrive through the same enum so they are
/// applied in one sequence.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Pick the "from" asset.
    SelectFrom(String),
    /// Pick the "to" asset.
    SelectTo(String),
    /// Replace the typed amount.
    SetAmount(String),
    /// Exchange the two assets.
    SwapDirection,
    /// Ask for a submission.
    Submit,
    /// Fetch the catalog again.
    RefreshCatalog,
    /// A catalog load finished.
    CatalogLoaded(AssetCatalog),
    /// A catalog load failed.
    CatalogFailed(LoadError),
    /// A submission's delay elapsed.
    SubmissionSettled(SubmissionId),
}

/// Work the session asks its driver to do.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Start a catalog load and report back with `CatalogLoaded`/`CatalogFailed`.
    LoadCatalog,
    /// Wait out the ticket's delay and report back with `SubmissionSettled`.
    ScheduleSettlement(SubmissionTicket),
    /// Tell the presentation layer something happened.
    Notify(Notice),
}

/// One-shot notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// A submission completed.
    SwapSucceeded { id: SubmissionId, latency_ms: u64 },
    /// A catalog was applied.
    CatalogLoaded { symbols: usize },
    /// A catalog load failed.
    CatalogFailed { message: String },
}

/// Render-ready view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Bumped on every applied event.
    pub version: u64,
    pub symbols: Vec<Symbol>,
    pub catalog_loaded: bool,
    pub load_error: Option<String>,
    pub selection: SwapSelection,
    pub validation: ValidationState,
    pub output: Output,
    pub submission: SubmissionState,
}

impl SessionSnapshot {
    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.validation.is_valid() && self.submission.accepts_submission()
    }

    /// The single validation message to show, if any.
    pub fn error_message(&self) -> Option<&'static str> {
        self.validation.message()
    }
}

/// Owns the catalog, selection and submission state of one user session.
///
/// All mutation goes through [`apply`](Self::apply). Validation and output
/// are derived on demand from the current state, never stored.
pub struct SwapSession {
    catalog: AssetCatalog,
    catalog_loaded: bool,
    load_error: Option<LoadError>,
    selection: SwapSelection,
    sequencer: SubmissionSequencer,
    metrics: Arc<SessionMetrics>,
    version: u64,
}

impl SwapSession {
    /// Create a session with no catalog.
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_metrics(config, Arc::new(SessionMetrics::new()))
    }

    /// Create a session that reports into shared metrics.
    pub fn with_metrics(config: &SessionConfig, metrics: Arc<SessionMetrics>) -> Self {
        Self {
            catalog: AssetCatalog::empty(),
            catalog_loaded: false,
            load_error: None,
            selection: SwapSelection::default(),
            sequencer: SubmissionSequencer::new(&config.submission),
            metrics,
            version: 0,
        }
    }

    /// Apply one event and return the work it requires.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        self.version += 1;
        self.metrics.event_applied();
        self.sequencer.acknowledge();

        match event {
            SessionEvent::SelectFrom(text) => {
                let symbol = self.resolve(&text);
                self.selection.set_from(symbol, self.catalog.symbols());
                Vec::new()
            }
            SessionEvent::SelectTo(text) => {
                let symbol = self.resolve(&text);
                self.selection.set_to(symbol, self.catalog.symbols());
                Vec::new()
            }
            SessionEvent::SetAmount(text) => {
                self.selection.set_amount_text(text);
                Vec::new()
            }
            SessionEvent::SwapDirection => {
                self.selection.swap_direction();
                Vec::new()
            }
            SessionEvent::Submit => self.submit(),
            SessionEvent::RefreshCatalog => vec![Effect::LoadCatalog],
            SessionEvent::CatalogLoaded(catalog) => self.catalog_loaded(catalog),
            SessionEvent::CatalogFailed(error) => self.catalog_failed(error),
            SessionEvent::SubmissionSettled(id) => self.settled(id),
        }
    }

    /// Current validation.
    pub fn validation(&self) -> ValidationState {
        validate(&self.selection, &self.catalog)
    }

    /// Current output.
    pub fn output(&self) -> Output {
        compute_output(&self.selection, &self.catalog)
    }

    /// Current selection.
    pub fn selection(&self) -> &SwapSelection {
        &self.selection
    }

    /// Current catalog (empty until the first load succeeds).
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Current submission state.
    pub fn submission_state(&self) -> SubmissionState {
        self.sequencer.state()
    }

    /// The last load failure, if the most recent load failed.
    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// Shared metrics.
    pub fn metrics(&self) -> Arc<SessionMetrics> {
        self.metrics.clone()
    }

    /// Build a render-ready snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            symbols: self.catalog.symbols().to_vec(),
            catalog_loaded: self.catalog_loaded,
            load_error: self.load_error.as_ref().map(|e| e.to_string()),
            selection: self.selection.clone(),
            validation: self.validation(),
            output: self.output(),
            submission: self.sequencer.state(),
        }
    }

    fn resolve(&self, text: &str) -> Symbol {
        match self.catalog.find(text) {
            Some(symbol) => symbol.clone(),
            None => {
                warn!(symbol = text, "Selected symbol is not in the catalog");
                Symbol::new(text)
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        match self.sequencer.submit(self.validation()) {
            Ok(ticket) => {
                self.metrics.submission_accepted();
                info!(
                    submission_id = %ticket.id,
                    delay_ms = ticket.delay.as_millis() as u64,
                    "Swap submitted"
                );
                vec![Effect::ScheduleSettlement(ticket)]
            }
            Err(reason) => {
                self.metrics.submission_rejected();
                debug!(reason = %reason, "Submit ignored");
                Vec::new()
            }
        }
    }

    fn catalog_loaded(&mut self, catalog: AssetCatalog) -> Vec<Effect> {
        self.metrics.catalog_load(true);
        if !self.catalog_loaded {
            self.selection.on_catalog_loaded(&catalog);
        }
        self.catalog = catalog;
        self.catalog_loaded = true;
        self.load_error = None;

        info!(symbols = self.catalog.len(), "Catalog applied");
        vec![Effect::Notify(Notice::CatalogLoaded {
            symbols: self.catalog.len(),
        })]
    }

    fn catalog_failed(&mut self, error: LoadError) -> Vec<Effect> {
        self.metrics.catalog_load(false);
        warn!(error = %error, code = error.error_code(), "Catalog load failed");

        let message = error.to_string();
        self.load_error = Some(error);
        vec![Effect::Notify(Notice::CatalogFailed { message })]
    }

    fn settled(&mut self, id: SubmissionId) -> Vec<Effect> {
        let Some(ticket) = self.sequencer.complete(id) else {
            debug!(submission_id = %id, "Ignoring completion for a submission not in flight");
            return Vec::new();
        };

        self.metrics.submission_settled();
        self.selection.clear_amount();

        let latency_ms = elapsed_ms(ticket.submitted_at);
        info!(submission_id = %id, latency_ms, "Swap successful");
        vec![Effect::Notify(Notice::SwapSucceeded { id, latency_ms })]
    }
}
