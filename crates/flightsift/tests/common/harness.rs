//! Test harness for isolated scan runs.
//!
//! The `TestHarness` struct provides:
//! - A temporary directory holding the history file and config files
//! - A `ScanPipeline` built from a `Config` pointing at that history
//! - Helpers for scanning, forwarding and reopening the history

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use flightsift::pipeline::{forward_all, ForwardSummary, Forwarder, NoopProgress};
use flightsift::{
    Config, FlightsiftError, ForwardError, ForwardRequest, HistoryStore, RawMessage, ScanPipeline,
    ScanReport,
};

use super::builders::ConfigBuilder;

/// Forwarder that records what it was asked to send and can fail on demand.
#[derive(Default)]
pub struct RecordingForwarder {
    pub sent: Vec<String>,
    pub fail_on_call: Vec<usize>,
    calls: usize,
}

impl RecordingForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given zero-based calls.
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on_call: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Forwarder for RecordingForwarder {
    fn forward(&mut self, request: &ForwardRequest) -> Result<String, ForwardError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on_call.contains(&call) {
            return Err(ForwardError::Transport(format!("call {} refused", call)));
        }
        self.sent.push(request.label());
        Ok(format!("<forward-{}@flightsift.test>", call))
    }
}

/// Test harness providing an isolated history for integration tests.
pub struct TestHarness {
    temp_dir: TempDir,
    /// Path of the history file inside the temp dir.
    pub history_path: PathBuf,
    config: Config,
}

impl TestHarness {
    /// Default configuration with the history inside a fresh temp dir.
    pub fn new() -> Self {
        Self::with_config(|builder| builder)
    }

    /// Customize the configuration; the history path is always set by the
    /// harness.
    pub fn with_config(customize: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let history_path = temp_dir.path().join("state").join("processed_flights.json");
        let config = customize(ConfigBuilder::new())
            .history_file(&history_path)
            .build();

        Self {
            temp_dir,
            history_path,
            config,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write a file into the temp dir and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn pipeline(&self) -> ScanPipeline {
        ScanPipeline::from_config(&self.config).expect("Failed to build pipeline")
    }

    pub fn open_history(&self) -> HistoryStore {
        HistoryStore::open(&self.history_path).expect("Failed to open history")
    }

    /// Scan against the on-disk history without forwarding.
    pub fn scan(&self, messages: Vec<RawMessage>) -> ScanReport {
        let history = self.open_history();
        self.pipeline().scan(messages, &history, &NoopProgress)
    }

    /// Scan and forward everything, committing to the on-disk history.
    pub fn run(
        &self,
        messages: Vec<RawMessage>,
        forwarder: &mut RecordingForwarder,
    ) -> Result<(ScanReport, ForwardSummary), FlightsiftError> {
        let mut history = HistoryStore::open(&self.history_path)?;
        let report = self.pipeline().scan(messages, &history, &NoopProgress);
        let summary = forward_all(
            &report,
            &mut history,
            forwarder,
            self.config.forwarding.dry_run,
            &NoopProgress,
        )?;
        Ok((report, summary))
    }
}
