//! Drives a running session from the terminal or a scenario.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tokenswap_common::Symbol;
use tokenswap_session::{
    Notice, SessionEvent, SessionHandle, SessionSnapshot, SubmissionState,
};

use crate::icons::IconResolver;
use crate::metrics::SimulationMetrics;
use crate::render::{render_form, render_notice, render_symbols};
use crate::scenario::{Expectation, Scenario, ScenarioStep, TokenRef};

/// Longest a scenario waits for a submission to complete.
const SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// How snapshots are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The rendered form.
    Form,
    /// One JSON snapshot per line.
    Json,
}

/// A line of interactive input.
#[derive(Debug, Clone)]
pub enum Input {
    Event(SessionEvent),
    List,
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  from <SYMBOL>    choose the token to pay with
  to <SYMBOL>      choose the token to receive
  amount <TEXT>    type an amount (empty clears it)
  swap             exchange the two tokens
  submit           submit the swap
  reload           fetch prices again
  list             list available tokens
  show             print the form
  help             show this help
  quit             exit";

/// Parse one line of interactive input. Blank lines yield `None`.
pub fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "from" | "to" if rest.is_empty() => {
            return Err(format!("'{command}' needs a token symbol"));
        }
        "from" => Input::Event(SessionEvent::SelectFrom(rest.to_string())),
        "to" => Input::Event(SessionEvent::SelectTo(rest.to_string())),
        "amount" => Input::Event(SessionEvent::SetAmount(rest.to_string())),
        "swap" => Input::Event(SessionEvent::SwapDirection),
        "submit" => Input::Event(SessionEvent::Submit),
        "reload" => Input::Event(SessionEvent::RefreshCatalog),
        "list" => Input::List,
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("Unknown command '{other}', try 'help'")),
    };

    Ok(Some(input))
}

/// Controls the simulator front end.
pub struct SwapController {
    handle: SessionHandle,
    icons: Arc<IconResolver>,
    metrics: Arc<Mutex<SimulationMetrics>>,
    mode: OutputMode,
    tasks: Vec<JoinHandle<()>>,
}

impl SwapController {
    /// Attach to a running session and start the render and notice tasks.
    pub fn new(handle: SessionHandle, icons: IconResolver, mode: OutputMode) -> Self {
        let icons = Arc::new(icons);
        let metrics = Arc::new(Mutex::new(SimulationMetrics::new()));

        let mut controller = Self {
            handle,
            icons,
            metrics,
            mode,
            tasks: Vec::new(),
        };
        controller.start_background_tasks();
        controller
    }

    fn start_background_tasks(&mut self) {
        let mut notices = self.handle.notices();
        let metrics = self.metrics.clone();
        let mode = self.mode;
        self.tasks.push(tokio::spawn(async move {
            loop {
                match notices.recv().await {
                    Ok(notice) => {
                        match &notice {
                            Notice::SwapSucceeded { id, latency_ms } => {
                                metrics.lock().record_swap(*latency_ms);
                                info!(submission_id = %id, latency_ms, "Swap completed");
                            }
                            Notice::CatalogLoaded { symbols } => {
                                debug!(symbols, "Catalog notice");
                            }
                            Notice::CatalogFailed { message } => {
                                warn!(error = %message, "Prices could not be loaded");
                            }
                        }
                        print_notice(&notice, mode);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notice listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        let mut snapshots = self.handle.subscribe();
        let icons = self.icons.clone();
        let mode = self.mode;
        self.tasks.push(tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.catalog_loaded {
                    icons.probe_all(&snapshot.symbols).await;
                }
                print_snapshot(&snapshot, &icons, mode);
            }
        }));
    }

    /// Wait for the first catalog load to finish, successfully or not.
    pub async fn wait_ready(&self) -> anyhow::Result<SessionSnapshot> {
        let snapshot = self
            .handle
            .wait_for(|s| s.catalog_loaded || s.load_error.is_some())
            .await?;

        match &snapshot.load_error {
            Some(error) if !snapshot.catalog_loaded => {
                warn!(error = %error, "Starting without prices");
            }
            _ => info!(symbols = snapshot.symbols.len(), "Prices loaded"),
        }

        Ok(snapshot)
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run_interactive(&self) -> anyhow::Result<()> {
        println!("{HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_input(&line) {
                Ok(None) => {}
                Ok(Some(Input::Event(event))) => {
                    self.handle.apply(event).await?;
                }
                Ok(Some(Input::List)) => {
                    println!("{}", render_symbols(&self.handle.snapshot().symbols));
                }
                Ok(Some(Input::Show)) => {
                    print_snapshot(&self.handle.snapshot(), &self.icons, self.mode);
                }
                Ok(Some(Input::Help)) => println!("{HELP}"),
                Ok(Some(Input::Quit)) => break,
                Err(message) => println!("{message}"),
            }
        }

        Ok(())
    }

    /// Run a scenario. Returns whether every expectation held.
    pub async fn run_scenario(&self, scenario: &Scenario) -> anyhow::Result<bool> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        let start = self.handle.snapshot();
        let original = (start.selection.from.clone(), start.selection.to.clone());
        let settled_before = self.handle.metrics().snapshot().submissions_settled;
        let mut current = start;
        let mut all_passed = true;

        for (index, step) in scenario.steps.iter().enumerate() {
            debug!(step = index, ?step, "Executing step");
            match step {
                ScenarioStep::SelectFrom(token) => {
                    let symbol = resolve_token(token, &current)?;
                    current = self.handle.apply(SessionEvent::SelectFrom(symbol)).await?;
                }
                ScenarioStep::SelectTo(token) => {
                    let symbol = resolve_token(token, &current)?;
                    current = self.handle.apply(SessionEvent::SelectTo(symbol)).await?;
                }
                ScenarioStep::Amount(text) => {
                    current = self.handle.apply(SessionEvent::SetAmount(text.clone())).await?;
                }
                ScenarioStep::SwapDirection => {
                    current = self.handle.apply(SessionEvent::SwapDirection).await?;
                }
                ScenarioStep::Submit => {
                    current = self.handle.apply(SessionEvent::Submit).await?;
                }
                ScenarioStep::AwaitSettlement => {
                    current = tokio::time::timeout(
                        SETTLEMENT_TIMEOUT,
                        self.handle
                            .wait_for(|s| s.submission == SubmissionState::Succeeded),
                    )
                    .await
                    .context("Timed out waiting for the submission to complete")??;
                }
                ScenarioStep::Wait { millis } => {
                    tokio::time::sleep(Duration::from_millis(*millis)).await;
                    current = self.handle.snapshot();
                }
                ScenarioStep::Expect(expectation) => {
                    let settled = self.handle.metrics().snapshot().submissions_settled
                        - settled_before;
                    let passed = check(expectation, &current, &original, settled);
                    self.metrics.lock().record_check(passed);

                    if passed {
                        debug!(step = index, ?expectation, "Expectation held");
                    } else {
                        all_passed = false;
                        warn!(
                            step = index,
                            ?expectation,
                            validation = ?current.validation,
                            submission = ?current.submission,
                            "Expectation failed"
                        );
                    }
                }
            }
        }

        info!(scenario = %scenario.name, passed = all_passed, "Scenario finished");
        Ok(all_passed)
    }

    /// Metrics summary line.
    pub fn summary(&self) -> String {
        self.metrics.lock().summary(&self.handle.metrics().snapshot())
    }

    /// Stop the background tasks and the session.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        for task in &self.tasks {
            task.abort();
        }
        self.handle.shutdown().await?;
        Ok(())
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, icons: &IconResolver, mode: OutputMode) {
    let text = match mode {
        OutputMode::Form => render_form(snapshot, icons),
        OutputMode::Json => match serde_json::to_string(snapshot) {
            Ok(json) => json + "\n",
            Err(e) => {
                warn!(error = %e, "Failed to serialize snapshot");
                return;
            }
        },
    };
    write_stdout(&text);
}

fn print_notice(notice: &Notice, mode: OutputMode) {
    if let Some(text) = notice_text(notice, mode) {
        write_stdout(&text);
    }
}

fn notice_text(notice: &Notice, mode: OutputMode) -> Option<String> {
    let message = render_notice(notice)?;
    match mode {
        OutputMode::Form => Some(format!("{message}\n")),
        OutputMode::Json => match serde_json::to_string(notice) {
            Ok(json) => Some(json + "\n"),
            Err(e) => {
                warn!(error = %e, "Failed to serialize notice");
                None
            }
        },
    }
}

fn write_stdout(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

fn resolve_token(token: &TokenRef, snapshot: &SessionSnapshot) -> anyhow::Result<String> {
    let symbol = match token {
        TokenRef::Index(i) => snapshot.symbols.get(*i).map(Symbol::to_string),
        TokenRef::CurrentFrom => snapshot.selection.from.as_ref().map(Symbol::to_string),
        TokenRef::CurrentTo => snapshot.selection.to.as_ref().map(Symbol::to_string),
        TokenRef::Named(name) => Some(name.clone()),
    };
    symbol.ok_or_else(|| anyhow::anyhow!("Cannot resolve token {:?}", token))
}

fn check(
    expectation: &Expectation,
    snapshot: &SessionSnapshot,
    original: &(Option<Symbol>, Option<Symbol>),
    settled: u64,
) -> bool {
    match expectation {
        Expectation::Validation(state) => snapshot.validation == *state,
        Expectation::Submission(state) => snapshot.submission == *state,
        Expectation::OutputAvailable => snapshot.output.is_available(),
        Expectation::AmountCleared => snapshot.selection.amount_text.is_empty(),
        Expectation::DistinctTokens => snapshot.selection.from != snapshot.selection.to,
        Expectation::OriginalPair => {
            snapshot.selection.from == original.0 && snapshot.selection.to == original.1
        }
        Expectation::CompletedSwaps(count) => settled == *count,
    }
}
