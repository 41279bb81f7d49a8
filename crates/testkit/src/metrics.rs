//! Standardized metrics collection and reporting for worldtests.
//!
//! Worldtests export a `metrics.json` per run so CI can track generation
//! throughput and quality over time, plus an optional newline-delimited
//! event log for debugging failed runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Overall test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations.
    Pass,
    /// Test failed.
    Fail,
    /// Test was skipped.
    Skip,
}

/// World generation performance and quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGenMetrics {
    /// Total chunks generated.
    pub chunks_generated: usize,
    /// Total tiles generated.
    pub tiles_generated: usize,
    /// Total objects spawned by decoration rules.
    pub objects_spawned: usize,
    /// Average generation time per chunk (microseconds).
    pub avg_gen_time_us: f64,
    /// Slowest chunk (microseconds).
    pub max_gen_time_us: u128,
    /// Chunks per second throughput.
    pub chunks_per_second: f64,
    /// Number of distinct terrain kinds observed.
    pub unique_terrains: usize,
}

/// Test execution bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration of the whole test (milliseconds).
    pub duration_ms: u128,
    /// Number of verification assertions performed.
    pub assertions: usize,
}

/// Top-level metrics report exported by a worldtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test identifier.
    pub test_name: String,
    /// Unix timestamp (seconds) when metrics were collected.
    pub timestamp: u64,
    /// Overall test result.
    pub result: TestResult,
    /// World generation metrics, when the test produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worldgen: Option<WorldGenMetrics>,
    /// Test execution bookkeeping.
    pub test_execution: TestExecutionMetrics,
}

/// Incremental builder for [`MetricsReport`].
pub struct MetricsReportBuilder {
    test_name: String,
    result: TestResult,
    worldgen: Option<WorldGenMetrics>,
}

impl MetricsReportBuilder {
    /// Start a report for the named test.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            result: TestResult::Pass,
            worldgen: None,
        }
    }

    /// Record the overall result.
    pub fn result(mut self, result: TestResult) -> Self {
        self.result = result;
        self
    }

    /// Attach world generation metrics.
    pub fn worldgen(mut self, metrics: WorldGenMetrics) -> Self {
        self.worldgen = Some(metrics);
        self
    }

    /// Finish the report with execution bookkeeping.
    pub fn build(self, duration_ms: u128, assertions: usize) -> MetricsReport {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        MetricsReport {
            test_name: self.test_name,
            timestamp,
            result: self.result,
            worldgen: self.worldgen,
            test_execution: TestExecutionMetrics {
                duration_ms,
                assertions,
            },
        }
    }
}

/// Writes a [`MetricsReport`] as pretty JSON for CI artifacts.
pub struct MetricsSink {
    file: File,
}

impl MetricsSink {
    /// Create a sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the report.
    pub fn write(&mut self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.file.write_all(json.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// One event captured during a worldtest run.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Monotonic sequence number within the run.
    pub sequence: u64,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON events to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}-{nanos}"))
    }

    #[test]
    fn metrics_sink_writes_report_json() {
        let path = temp_path("wildmere-metrics.json");
        let report = MetricsReportBuilder::new("unit")
            .result(TestResult::Pass)
            .worldgen(WorldGenMetrics {
                chunks_generated: 9,
                tiles_generated: 9 * 256,
                objects_spawned: 42,
                avg_gen_time_us: 120.5,
                max_gen_time_us: 900,
                chunks_per_second: 8300.0,
                unique_terrains: 5,
            })
            .build(17, 3);
        let mut sink = MetricsSink::create(&path).expect("sink create");
        sink.write(&report).expect("write succeeds");

        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("\"test_name\": \"unit\""));
        assert!(contents.contains("\"chunks_generated\": 9"));
        assert!(contents.contains("\"result\": \"pass\""));
    }

    #[test]
    fn jsonl_sink_appends_lines() {
        let path = temp_path("wildmere-events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for sequence in 0..3 {
            sink.write(&EventRecord {
                sequence,
                kind: "chunk",
                payload: "generated",
            })
            .expect("write succeeds");
        }
        let contents = fs::read_to_string(&path).expect("file readable");
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().all(|line| line.contains("\"chunk\"")));
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = MetricsReportBuilder::new("roundtrip").build(5, 1);
        let json = serde_json::to_string(&report).unwrap();
        let back: MetricsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.test_name, "roundtrip");
        assert_eq!(back.test_execution.duration_ms, 5);
        assert!(back.worldgen.is_none());
    }
}
