//! Comparison run progress reporting.
//!
//! Reports observable progress while `swat compare` loads, parses and
//! reconciles sources, so users see which file is being read and how many
//! keywords are left. Progress is emitted on **stderr** so stdout remains
//! parseable for scripts (JSON and CSV exports go to stdout).

use std::io::Write;

use clap::ValueEnum;

/// A single progress event for a comparison run.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Reading a source file from disk. Row count unknown.
    Loading { source: String },
    /// Parsing a source: n data lines processed out of total.
    Parsing { source: String, n: u64, total: u64 },
    /// Reconciling the keyword union: n keywords processed out of total.
    Comparing { n: u64, total: u64, fraction: f64 },
}

/// Reports run progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the pipeline between slices.
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "compare  1,500 / 3,000 keywords (50%)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Loading { source } => format!("load {}  reading...\n", source),
            ProgressEvent::Parsing { source, n, total } => format!(
                "parse {}  {} / {} rows\n",
                source,
                format_number(*n),
                format_number(*total)
            ),
            ProgressEvent::Comparing { n, total, fraction } => format!(
                "compare  {} / {} keywords ({:.0}%)\n",
                format_number(*n),
                format_number(*total),
                fraction * 100.0
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl JsonProgress {
    fn to_json(event: &ProgressEvent) -> serde_json::Value {
        match event {
            ProgressEvent::Loading { source } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "source": source
            }),
            ProgressEvent::Parsing { source, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "parsing",
                "source": source,
                "n": n,
                "total": total
            }),
            ProgressEvent::Comparing { n, total, fraction } => serde_json::json!({
                "event": "progress",
                "phase": "comparing",
                "n": n,
                "total": total,
                "fraction": fraction
            }),
        }
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        if let Ok(line) = serde_json::to_string(&Self::to_json(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it to the pipeline.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
