use std::collections::BTreeMap;
use std::time::Instant;

/// Stage names reported through [`PipelineLogger::timing`].
pub mod stage {
    pub const LOCATE: &str = "locate";
    pub const SKIN_MASK: &str = "skin_mask";
    pub const EXTRACT: &str = "extract";
    pub const CLASSIFY: &str = "classify";
    /// Whole per-face pipeline, skin mask through classification.
    pub const FACE: &str = "face";
}

/// Metric names reported through [`PipelineLogger::metric`].
pub mod metric {
    pub const FACES: &str = "faces";
    pub const HANDS: &str = "hands";
}

/// Observer for pipeline orchestration events.
///
/// Use cases report through this trait so callers choose where the
/// events go without touching the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-frame metric such as the number of hands found.
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Debug, Default)]
struct Series {
    values: Vec<f64>,
}

impl Series {
    fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.total() / self.values.len() as f64
        }
    }
}

/// Collects timings and metrics and logs a summary at the end of a run.
///
/// Progress is logged every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    start_time: Instant,
    total_frames: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            total_frames: 0,
            messages: Vec::new(),
        }
    }

    /// Average of every recorded duration for `stage`, in milliseconds.
    pub fn average_ms(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Series::average)
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|s| s.values.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|s| s.values.as_slice())
    }

    /// Formatted summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.total_frames;
        let mut lines = vec![format!(
            "Recognition summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (name, series) in &self.timings {
            lines.push(format!(
                "  {name:10}: avg {:6.2}ms  total {:7.0}ms  ({} samples)",
                series.average(),
                series.total(),
                series.values.len()
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1} per frame", series.average()));
        }
        if let Some(face_ms) = self.average_ms(stage::FACE) {
            lines.push(format!("  Per-face latency: {face_ms:.2}ms"));
        }
        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_frames = total;
        if total > 0 && (current % self.throttle_frames == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .values
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .values
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
