//! # Polling coordinator
//!
//! [`PollCoordinator`] drives one PLC endpoint through repeated poll cycles:
//!
//! ```text
//! Idle -> Listing -> Filtering -> Fetching -> Normalizing -> Published
//!            \____________\___________\______________\-----> Failed
//! ```
//!
//! Every successful cycle replaces the published [`PollResult`] entirely.
//! A failed cycle keeps the previous result, reports
//! [`PlcError::UpdateFailed`] and leaves reconnection to the next cycle.
//! Cycles never overlap; a second caller of [`PollCoordinator::refresh`]
//! waits for the running cycle to finish and then runs its own.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plccoms::{PlcComsClient, PollCoordinator, PollOptions, VariableFilter};
//!
//! #[tokio::main]
//! async fn main() -> plccoms::PlcResult<()> {
//!     let client = Arc::new(PlcComsClient::tcp("192.168.1.10", 5010));
//!     let options = PollOptions::new(VariableFilter::from_config("TEPLOTY", "TEST"));
//!     let coordinator = PollCoordinator::new(client, options);
//!
//!     let result = coordinator.first_refresh().await?;
//!     println!("{} variables", result.len());
//!
//!     coordinator.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::client::GenericPlcClient;
use crate::config::PlcConfig;
use crate::constants::{DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS};
use crate::diagnostics::DiagnosticsSnapshot;
use crate::error::{PlcError, PlcResult};
use crate::filter::VariableFilter;
use crate::transport::{PlcTransport, TcpTransport};
use crate::value::{normalize, PlcValue};

/// Per-cycle polling behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    pub filter: VariableFilter,
    pub scan_interval: Duration,
    /// Drop zero and empty values
    pub ignore_zero: bool,
    /// Log every raw and typed value at debug level
    pub detailed_logging: bool,
}

impl PollOptions {
    pub fn new(filter: VariableFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_ignore_zero(mut self, ignore_zero: bool) -> Self {
        self.ignore_zero = ignore_zero;
        self
    }

    pub fn with_detailed_logging(mut self, detailed: bool) -> Self {
        self.detailed_logging = detailed;
        self
    }

    /// The scan interval must be positive and at most one day.
    pub fn validate(&self) -> PlcResult<()> {
        if self.scan_interval.is_zero()
            || self.scan_interval > Duration::from_secs(MAX_SCAN_INTERVAL_SECS)
        {
            return Err(PlcError::configuration(format!(
                "scan_interval {:?} outside (0, {}s]",
                self.scan_interval, MAX_SCAN_INTERVAL_SECS
            )));
        }
        Ok(())
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            filter: VariableFilter::allow_all(),
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            ignore_zero: true,
            detailed_logging: false,
        }
    }
}

/// Where the most recent cycle is, or how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Listing,
    Filtering,
    Fetching,
    Normalizing,
    Published,
    Failed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Listing => "listing",
            CycleState::Filtering => "filtering",
            CycleState::Fetching => "fetching",
            CycleState::Normalizing => "normalizing",
            CycleState::Published => "published",
            CycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Typed values of one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResult {
    pub values: BTreeMap<String, PlcValue>,
    pub polled_at: DateTime<Utc>,
}

impl PollResult {
    pub fn new(values: BTreeMap<String, PlcValue>) -> Self {
        Self {
            values,
            polled_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&PlcValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PlcValue)> {
        self.values.iter()
    }

    /// What changed going from `previous` to `self`.
    pub fn diff(&self, previous: &PollResult) -> PollDiff {
        let mut diff = PollDiff::default();
        for (name, value) in &self.values {
            match previous.values.get(name) {
                None => diff.added.push(name.clone()),
                Some(old) if old != value => diff.changed.push(name.clone()),
                Some(_) => {}
            }
        }
        diff.removed = previous
            .values
            .keys()
            .filter(|name| !self.values.contains_key(*name))
            .cloned()
            .collect();
        diff
    }
}

/// Variable names added, removed and changed between two results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl PollDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Polling driver for one endpoint.
pub struct PollCoordinator<T: PlcTransport> {
    client: Arc<GenericPlcClient<T>>,
    options: watch::Sender<PollOptions>,
    data: watch::Sender<Arc<PollResult>>,
    state: watch::Sender<CycleState>,
    cycle: Mutex<()>,
    span: Span,
}

impl PollCoordinator<TcpTransport> {
    /// Build client and coordinator from configuration.
    pub fn from_config(config: &PlcConfig) -> Self {
        let client = GenericPlcClient::with_options(config.transport(), config.client_options());
        Self::new(Arc::new(client), config.poll_options())
    }
}

impl<T: PlcTransport> PollCoordinator<T> {
    pub fn new(client: Arc<GenericPlcClient<T>>, options: PollOptions) -> Self {
        let span = info_span!("plc_poll", endpoint = %client.endpoint());
        let (options, _) = watch::channel(options);
        let (data, _) = watch::channel(Arc::new(PollResult::empty()));
        let (state, _) = watch::channel(CycleState::Idle);
        Self {
            client,
            options,
            data,
            state,
            cycle: Mutex::new(()),
            span,
        }
    }

    pub fn client(&self) -> &Arc<GenericPlcClient<T>> {
        &self.client
    }

    pub fn options(&self) -> PollOptions {
        self.options.borrow().clone()
    }

    /// Replace the options used by subsequent cycles.
    ///
    /// Invalid options are rejected and the current ones stay in effect.
    pub fn update_options(&self, options: PollOptions) -> PlcResult<()> {
        if let Err(err) = options.validate() {
            warn!(parent: &self.span, error = %err, "Rejected polling options");
            return Err(err);
        }
        info!(
            parent: &self.span,
            filter = %options.filter,
            scan_interval_s = options.scan_interval.as_secs_f64(),
            ignore_zero = options.ignore_zero,
            detailed_logging = options.detailed_logging,
            "Polling options updated"
        );
        self.options.send_replace(options);
        Ok(())
    }

    pub fn state(&self) -> CycleState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    /// The last published result. Empty before the first successful cycle.
    pub fn current_data(&self) -> Arc<PollResult> {
        self.data.borrow().clone()
    }

    /// Receiver notified on every published result.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PollResult>> {
        self.data.subscribe()
    }

    /// Startup fetch. An error here means the endpoint is not ready.
    pub async fn first_refresh(&self) -> PlcResult<Arc<PollResult>> {
        info!(parent: &self.span, "Performing first refresh");
        if let Err(err) = self.client.connect().await {
            self.set_state(CycleState::Failed);
            let err = PlcError::update_failed(self.client.endpoint(), err);
            error!(parent: &self.span, error = %err, "PLC not ready");
            return Err(err);
        }
        self.refresh().await
    }

    /// Run one full cycle and publish its result.
    pub async fn refresh(&self) -> PlcResult<Arc<PollResult>> {
        let _cycle = self.cycle.lock().await;
        async {
            match self.poll_cycle().await {
                Ok(result) => Ok(self.publish(result)),
                Err(source) => {
                    self.set_state(CycleState::Failed);
                    let err = PlcError::update_failed(self.client.endpoint(), source);
                    error!(error = %err, "Poll cycle failed");
                    Err(err)
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Fetch `GETINFO:` and `EN:` and assemble a snapshot.
    pub async fn diagnostics(&self) -> PlcResult<DiagnosticsSnapshot> {
        async {
            let info = self.client.get_info().await?;
            let enabled = self.client.active_variable_count_raw().await?;
            let snapshot = DiagnosticsSnapshot::from_replies(info.as_slice(), Some(enabled.as_str()));
            debug!(lines = info.len(), "Diagnostics retrieved");
            Ok(snapshot)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Poll at the configured interval until `shutdown` completes.
    ///
    /// The first cycle starts one interval after the call; late ticks are
    /// delayed, never bunched. Shutdown abandons a running cycle and closes
    /// the connection before returning.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut options_rx = self.options.subscribe();
        let mut period = options_rx.borrow_and_update().scan_interval;
        let mut ticker = poll_ticker(period);

        info!(parent: &self.span, interval_s = period.as_secs_f64(), "Polling started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Ok(()) = options_rx.changed() => {
                    let next = options_rx.borrow_and_update().scan_interval;
                    if next != period {
                        debug!(parent: &self.span, interval_s = next.as_secs_f64(), "Scan interval changed");
                        period = next;
                        ticker = poll_ticker(period);
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            warn!(parent: &self.span, state = %self.state(), "Shutdown during poll cycle");
                            break;
                        }
                        // errors are logged and reported by refresh itself
                        _ = self.refresh() => {}
                    }
                }
            }
        }

        self.client.disconnect().await;
        self.set_state(CycleState::Idle);
        info!(parent: &self.span, "Polling stopped");
    }

    async fn poll_cycle(&self) -> PlcResult<PollResult> {
        let options = self.options();

        self.set_state(CycleState::Listing);
        let names = self.client.list_variables().await?;
        if names.is_empty() {
            warn!("PLC reported no variables");
            return Ok(PollResult::empty());
        }

        self.set_state(CycleState::Filtering);
        let selected = options.filter.apply(&names);
        if selected.is_empty() {
            warn!(
                include = ?options.filter.include(),
                exclude = ?options.filter.exclude(),
                discovered = names.len(),
                "No variables left after filtering"
            );
            return Ok(PollResult::empty());
        }
        debug!(discovered = names.len(), selected = selected.len(), "Variables selected");

        self.set_state(CycleState::Fetching);
        let raw = self.client.get_variables(&selected).await?;

        self.set_state(CycleState::Normalizing);
        let mut values = BTreeMap::new();
        for (name, raw_value) in raw {
            match normalize(&raw_value, options.ignore_zero) {
                Some(value) => {
                    if options.detailed_logging {
                        debug!(variable = %name, raw = %raw_value, value = %value, kind = value.type_name(), "Value");
                    }
                    values.insert(name, value);
                }
                None => {
                    if options.detailed_logging {
                        debug!(variable = %name, raw = %raw_value, "Suppressed zero value");
                    }
                }
            }
        }

        Ok(PollResult::new(values))
    }

    fn publish(&self, result: PollResult) -> Arc<PollResult> {
        let result = Arc::new(result);
        let previous = self.data.send_replace(result.clone());
        let diff = result.diff(&previous);
        if !diff.is_empty() {
            debug!(
                added = ?diff.added,
                removed = ?diff.removed,
                changed = diff.changed.len(),
                "Result changed"
            );
        }
        info!(variables = result.len(), "Poll cycle published");
        self.set_state(CycleState::Published);
        result
    }

    fn set_state(&self, state: CycleState) {
        self.state.send_replace(state);
    }
}

/// Ticker for `period`, clamped to `(0, MAX_SCAN_INTERVAL_SECS]`.
fn poll_ticker(period: Duration) -> Interval {
    let period = clamp_interval(period);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn clamp_interval(period: Duration) -> Duration {
    let max = Duration::from_secs(MAX_SCAN_INTERVAL_SECS);
    if period.is_zero() {
        let fallback = Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS);
        warn!(fallback_s = fallback.as_secs(), "Zero scan interval, using default");
        fallback
    } else if period > max {
        warn!(
            requested_s = period.as_secs(),
            max_s = MAX_SCAN_INTERVAL_SECS,
            "Scan interval too long, clamping"
        );
        max
    } else {
        period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;
    use crate::testing::FakePlc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coordinator(plc: FakePlc, options: PollOptions) -> PollCoordinator<FakePlc> {
        let client = GenericPlcClient::with_options(
            plc,
            ClientOptions::new()
                .with_command_timeout(Duration::from_millis(100))
                .with_list_line_timeout(Duration::from_millis(100)),
        );
        PollCoordinator::new(Arc::new(client), options)
    }

    fn three_variables(cmd: &str) -> Option<Vec<String>> {
        let reply: &[&str] = match cmd {
            "LIST:" => &["LIST:", "TEMP_ROOM,REAL", "TEMP_TEST,REAL", "POWER,INT", "LIST:"],
            "GET:TEMP_ROOM" => &["TEMP_ROOM,21.5"],
            "GET:TEMP_TEST" => &["TEMP_TEST,99.0"],
            "GET:POWER" => &["POWER,0"],
            _ => return None,
        };
        Some(reply.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_cycle_filters_and_suppresses() {
        let options = PollOptions::new(VariableFilter::from_config("", "TEST"));
        let coordinator = coordinator(FakePlc::new(three_variables), options);
        let mut updates = coordinator.subscribe();

        let result = coordinator.refresh().await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("TEMP_ROOM"), Some(&PlcValue::Float(21.5)));
        assert_eq!(coordinator.state(), CycleState::Published);
        assert_eq!(coordinator.current_data(), result);

        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), result);

        // excluded variable is never fetched
        let received = coordinator.client().transport().received();
        assert!(!received.contains(&"GET:TEMP_TEST".to_string()));
    }

    #[tokio::test]
    async fn test_zero_kept_when_suppression_disabled() {
        let options = PollOptions::new(VariableFilter::from_config("", "TEST")).with_ignore_zero(false);
        let coordinator = coordinator(FakePlc::new(three_variables), options);

        let result = coordinator.refresh().await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("POWER"), Some(&PlcValue::Int(0)));
    }

    #[tokio::test]
    async fn test_empty_list_publishes_empty_result() {
        let plc = FakePlc::new(|cmd| match cmd {
            "LIST:" => Some(vec!["LIST:".to_string(), "LIST:".to_string()]),
            _ => None,
        });
        let coordinator = coordinator(plc, PollOptions::default());

        let result = coordinator.refresh().await.unwrap();
        assert!(result.is_empty());
        assert_eq!(coordinator.state(), CycleState::Published);
    }

    #[tokio::test]
    async fn test_everything_filtered_publishes_empty_result() {
        let options = PollOptions::new(VariableFilter::from_config("HUMIDITY", ""));
        let coordinator = coordinator(FakePlc::new(three_variables), options);

        let result = coordinator.refresh().await.unwrap();
        assert!(result.is_empty());
        assert_eq!(coordinator.client().transport().received(), vec!["LIST:"]);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_result() {
        let fail = Arc::new(AtomicUsize::new(0));
        let flag = fail.clone();
        let plc = FakePlc::new(move |cmd| {
            if cmd == "GET:TEMP_ROOM" && flag.load(Ordering::SeqCst) > 0 {
                return None;
            }
            three_variables(cmd)
        });
        let coordinator = coordinator(plc, PollOptions::default());

        let first = coordinator.refresh().await.unwrap();
        assert_eq!(first.len(), 2);

        fail.store(1, Ordering::SeqCst);
        let err = coordinator.refresh().await.unwrap_err();
        match &err {
            PlcError::UpdateFailed { endpoint, source } => {
                assert_eq!(endpoint, "fake-plc:5010");
                assert!(source.is_timeout());
            }
            other => panic!("expected UpdateFailed, got {:?}", other),
        }
        assert!(err.is_connection_loss() || err.is_timeout());
        assert_eq!(coordinator.state(), CycleState::Failed);
        assert_eq!(coordinator.current_data(), first);
        assert!(!coordinator.client().is_connected());

        // next cycle reconnects lazily
        fail.store(0, Ordering::SeqCst);
        assert_eq!(coordinator.refresh().await.unwrap().len(), 2);
        assert_eq!(coordinator.client().transport().connect_count(), 2);
    }

    #[tokio::test]
    async fn test_first_refresh_fails_when_plc_silent() {
        let plc = FakePlc::new(|_| None);
        let coordinator = coordinator(plc, PollOptions::default());

        let err = coordinator.first_refresh().await.unwrap_err();
        assert!(matches!(err, PlcError::UpdateFailed { .. }));
        assert_eq!(coordinator.state(), CycleState::Failed);
        assert!(coordinator.current_data().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_do_not_overlap() {
        let plc = FakePlc::new(|cmd| {
            let reply: &[&str] = match cmd {
                "LIST:" => &["LIST:", "A,INT", "LIST:"],
                "GET:A" => &["A,1"],
                _ => return None,
            };
            Some(reply.iter().map(|s| s.to_string()).collect())
        })
        .with_delay(Duration::from_millis(10));
        let coordinator = coordinator(plc, PollOptions::default());

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(
            coordinator.client().transport().received(),
            vec!["LIST:", "GET:A", "LIST:", "GET:A"]
        );
    }

    #[tokio::test]
    async fn test_update_options_applies_to_next_cycle() {
        let coordinator = coordinator(FakePlc::new(three_variables), PollOptions::default());
        assert_eq!(coordinator.refresh().await.unwrap().len(), 2);

        coordinator
            .update_options(
                PollOptions::new(VariableFilter::from_config("ROOM", "")).with_ignore_zero(true),
            )
            .unwrap();
        let result = coordinator.refresh().await.unwrap();
        assert_eq!(result.values.keys().collect::<Vec<_>>(), vec!["TEMP_ROOM"]);
        assert_eq!(coordinator.options().filter.include(), &["ROOM".to_string()]);
    }

    #[tokio::test]
    async fn test_diagnostics_snapshot() {
        let plc = FakePlc::new(|cmd| {
            let reply: &[&str] = match cmd {
                "GETINFO:" => &[
                    "GETINFO:",
                    "GETINFO:VER_PLC,9.4",
                    "GETINFO:NETWORK,10.0.0.7",
                    "GETINFO:",
                ],
                "EN:" => &["EN:42"],
                _ => return None,
            };
            Some(reply.iter().map(|s| s.to_string()).collect())
        });
        let coordinator = coordinator(plc, PollOptions::default());

        let snapshot = coordinator.diagnostics().await.unwrap();
        assert_eq!(snapshot.plc_version.as_deref(), Some("9.4"));
        assert_eq!(snapshot.connected_clients, vec!["10.0.0.7"]);
        assert_eq!(snapshot.active_variables, Some(42));
    }

    #[tokio::test]
    async fn test_run_polls_until_shutdown() {
        let options = PollOptions::default().with_scan_interval(Duration::from_millis(40));
        let coordinator = coordinator(FakePlc::new(three_variables), options);

        coordinator
            .run(tokio::time::sleep(Duration::from_millis(230)))
            .await;

        let lists = coordinator
            .client()
            .transport()
            .received()
            .iter()
            .filter(|c| c.as_str() == "LIST:")
            .count();
        assert!(lists >= 2, "expected several cycles, got {}", lists);
        assert!(!coordinator.client().is_connected());
        assert_eq!(coordinator.state(), CycleState::Idle);
        assert_eq!(coordinator.current_data().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_abandons_running_cycle() {
        let plc = FakePlc::new(three_variables).with_delay(Duration::from_secs(5));
        let client = GenericPlcClient::with_options(
            plc,
            ClientOptions::new().with_command_timeout(Duration::from_secs(10)),
        );
        let coordinator = PollCoordinator::new(
            Arc::new(client),
            PollOptions::default().with_scan_interval(Duration::from_millis(20)),
        );

        let started = std::time::Instant::now();
        coordinator
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!coordinator.client().is_connected());
        assert!(coordinator.current_data().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_scan_interval_is_rejected() {
        let coordinator = coordinator(FakePlc::new(three_variables), PollOptions::default());

        let zero = PollOptions::default().with_scan_interval(Duration::ZERO);
        assert!(matches!(
            coordinator.update_options(zero),
            Err(PlcError::Configuration { .. })
        ));
        let huge = PollOptions::default().with_scan_interval(Duration::from_secs(u64::MAX));
        assert!(coordinator.update_options(huge).is_err());
        assert_eq!(coordinator.options(), PollOptions::default());
    }

    #[tokio::test]
    async fn test_run_survives_out_of_range_intervals() {
        for period in [Duration::ZERO, Duration::from_secs(u64::MAX)] {
            let options = PollOptions::default().with_scan_interval(period);
            let coordinator = coordinator(FakePlc::new(three_variables), options);

            coordinator
                .run(tokio::time::sleep(Duration::from_millis(20)))
                .await;
            assert_eq!(coordinator.state(), CycleState::Idle);
        }
    }

    #[test]
    fn test_clamp_interval() {
        assert_eq!(
            clamp_interval(Duration::ZERO),
            Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS)
        );
        assert_eq!(
            clamp_interval(Duration::from_secs(u64::MAX)),
            Duration::from_secs(MAX_SCAN_INTERVAL_SECS)
        );
        assert_eq!(clamp_interval(Duration::from_millis(40)), Duration::from_millis(40));
    }

    #[test]
    fn test_diff() {
        let previous = PollResult::new(BTreeMap::from([
            ("A".to_string(), PlcValue::Int(1)),
            ("B".to_string(), PlcValue::Bool(true)),
            ("C".to_string(), PlcValue::Float(2.5)),
        ]));
        let current = PollResult::new(BTreeMap::from([
            ("A".to_string(), PlcValue::Int(1)),
            ("B".to_string(), PlcValue::Bool(false)),
            ("D".to_string(), PlcValue::String("on".into())),
        ]));

        let diff = current.diff(&previous);
        assert_eq!(diff.added, vec!["D"]);
        assert_eq!(diff.removed, vec!["C"]);
        assert_eq!(diff.changed, vec!["B"]);
        assert!(current.diff(&current).is_empty());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(CycleState::Normalizing.to_string(), "normalizing");
        assert_eq!(
            serde_json::to_string(&CycleState::Published).unwrap(),
            "\"published\""
        );
    }
}
