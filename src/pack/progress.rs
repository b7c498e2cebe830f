//! Run progress reporting.
//!
//! The engine never prints. It emits [`ProgressEvent`]s through an injected
//! [`ProgressReporter`]; the CLI decides whether they go to the console, to
//! JSON lines, or nowhere.
//!
//! # Example
//!
//! ```ignore
//! use texpipe::pack::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new().with_verbose(true);
//! reporter.report(ProgressEvent::RunStarted { pipelines: 2 });
//! reporter.report(ProgressEvent::CommandLine {
//!     pipeline: "ui".to_string(),
//!     line: "TexturePacker --sheet /out/a.png ...".to_string(),
//! });
//! ```

use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Diagnostics (command lines, declared paths)
    Debug,
    /// Normal progress
    Info,
    /// Something was skipped or looked wrong
    Warn,
    /// An invocation failed or the tool wrote to stderr
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Whether a declared path is read or written by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    /// Source directory
    Input,
    /// Destination directory
    Output,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRole::Input => write!(f, "input"),
            PathRole::Output => write!(f, "output"),
        }
    }
}

/// Events that can be reported during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Engine run started
    RunStarted {
        /// Number of pipelines to process
        pipelines: usize,
    },
    /// A pipeline passed its checks and was scanned
    PipelineStarted {
        /// Pipeline name
        pipeline: String,
        /// Source directory
        source: PathBuf,
        /// Destination directory
        destination: PathBuf,
        /// Number of qualifying subdirectories
        qualifying: usize,
    },
    /// Fully assembled command line
    CommandLine {
        /// Pipeline name
        pipeline: String,
        /// Executable and arguments joined by spaces
        line: String,
    },
    /// Non-empty standard output of the tool
    ToolOutput {
        /// Pipeline name
        pipeline: String,
        /// Decoded output
        text: String,
    },
    /// Non-empty standard error of the tool
    ToolError {
        /// Pipeline name
        pipeline: String,
        /// Decoded output
        text: String,
    },
    /// A subdirectory was packed
    DirectoryProcessed {
        /// Pipeline name
        pipeline: String,
        /// Source subdirectory
        source: PathBuf,
        /// Sheet file produced
        sheet: PathBuf,
        /// Data file produced
        data: PathBuf,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// A subdirectory could not be packed
    InvocationFailed {
        /// Pipeline name
        pipeline: String,
        /// Source subdirectory
        source: PathBuf,
        /// Failure description
        message: String,
    },
    /// A directory was declared as a run input or output
    PathDeclared {
        /// Input or output
        role: PathRole,
        /// Absolute path
        path: PathBuf,
    },
    /// A warning was generated
    Warning {
        /// Pipeline that generated the warning (if applicable)
        pipeline: Option<String>,
        /// Warning message
        message: String,
    },
    /// Engine run completed
    RunCompleted {
        /// Whether no invocation failed
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of directories packed
        processed: usize,
        /// Number of directories skipped
        skipped: usize,
        /// Number of failed invocations
        failed: usize,
    },
}

impl ProgressEvent {
    /// Severity of this event.
    pub fn level(&self) -> LogLevel {
        match self {
            ProgressEvent::CommandLine { .. } | ProgressEvent::PathDeclared { .. } => LogLevel::Debug,
            ProgressEvent::ToolError { .. } | ProgressEvent::InvocationFailed { .. } => {
                LogLevel::Error
            }
            ProgressEvent::Warning { .. } => LogLevel::Warn,
            ProgressEvent::RunCompleted { success: false, .. } => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// A reporter that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingProgress {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events reported so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events at or above `level`.
    pub fn at_level(&self, level: LogLevel) -> Vec<ProgressEvent> {
        self.events().into_iter().filter(|e| e.level() >= level).collect()
    }
}

impl ProgressReporter for CollectingProgress {
    fn report(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn is_verbose(&self) -> bool {
        true
    }
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show debug-level events
    verbose: bool,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false, // Disable colors for custom output
            verbose: false,
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn dim(&self, text: &str) -> String {
        self.color(text, "\x1b[2m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }

    fn prefix(pipeline: &Option<String>) -> String {
        match pipeline {
            Some(name) => format!("{}: ", name),
            None => String::new(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        if event.level() == LogLevel::Debug && !self.verbose {
            return;
        }

        match event {
            ProgressEvent::RunStarted { pipelines } => {
                self.writeln(&format!(
                    "{} Start processing images ({} pipeline{})",
                    self.cyan("[pack]"),
                    pipelines,
                    if pipelines == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::PipelineStarted { pipeline, source, destination, qualifying } => {
                self.writeln(&format!(
                    "{} {}: {} -> {} ({} director{})",
                    self.cyan("[pack]"),
                    pipeline,
                    source.display(),
                    destination.display(),
                    qualifying,
                    if qualifying == 1 { "y" } else { "ies" }
                ));
            }
            ProgressEvent::CommandLine { pipeline, line } => {
                self.writeln(&format!("{} {}: {}", self.dim("[debug]"), pipeline, line));
            }
            ProgressEvent::ToolOutput { text, .. } => {
                self.writeln(text.trim_end());
            }
            ProgressEvent::ToolError { pipeline, text } => {
                self.writeln(&format!("{} {}: {}", self.red("[error]"), pipeline, text.trim_end()));
            }
            ProgressEvent::DirectoryProcessed { pipeline, source, sheet, data, duration_ms } => {
                self.writeln(&format!(
                    "{} {}: directory {} is processed ({})",
                    self.green("[ok]"),
                    pipeline,
                    source.display(),
                    format_duration(duration_ms)
                ));
                self.writeln(&format!("       file {} is created", sheet.display()));
                self.writeln(&format!("       file {} is created", data.display()));
            }
            ProgressEvent::InvocationFailed { pipeline, source, message } => {
                self.writeln(&format!(
                    "{} {}: {} {}",
                    self.red("[FAILED]"),
                    pipeline,
                    source.display(),
                    message
                ));
            }
            ProgressEvent::PathDeclared { role, path } => {
                self.writeln(&format!(
                    "{} {} \"{}\" is added",
                    self.dim("[debug]"),
                    role,
                    path.display()
                ));
            }
            ProgressEvent::Warning { pipeline, message } => {
                self.writeln(&format!(
                    "{} {}{}",
                    self.yellow("[warn]"),
                    Self::prefix(&pipeline),
                    message
                ));
            }
            ProgressEvent::RunCompleted { success, duration_ms, processed, skipped, failed } => {
                if success {
                    self.writeln(&format!(
                        "{} Finish processing images: {} processed, {} skipped in {}",
                        self.green("[done]"),
                        processed,
                        skipped,
                        format_duration(duration_ms)
                    ));
                } else {
                    self.writeln(&format!(
                        "{} Finish processing images: {} processed, {} skipped, {} {} in {}",
                        self.red("[error]"),
                        processed,
                        skipped,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        format_duration(duration_ms)
                    ));
                }
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// JSON progress reporter for machine-readable output, one object per line.
pub struct JsonProgress {
    /// Output writer
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    fn write_json(&self, value: &serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", value);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let level = event.level().to_string();
        let value = match event {
            ProgressEvent::RunStarted { pipelines } => {
                json!({"event": "run_started", "level": level, "pipelines": pipelines})
            }
            ProgressEvent::PipelineStarted { pipeline, source, destination, qualifying } => json!({
                "event": "pipeline_started",
                "level": level,
                "pipeline": pipeline,
                "source": source.display().to_string(),
                "destination": destination.display().to_string(),
                "qualifying": qualifying,
            }),
            ProgressEvent::CommandLine { pipeline, line } => {
                json!({"event": "command_line", "level": level, "pipeline": pipeline, "line": line})
            }
            ProgressEvent::ToolOutput { pipeline, text } => {
                json!({"event": "tool_output", "level": level, "pipeline": pipeline, "text": text})
            }
            ProgressEvent::ToolError { pipeline, text } => {
                json!({"event": "tool_error", "level": level, "pipeline": pipeline, "text": text})
            }
            ProgressEvent::DirectoryProcessed { pipeline, source, sheet, data, duration_ms } => {
                json!({
                    "event": "directory_processed",
                    "level": level,
                    "pipeline": pipeline,
                    "source": source.display().to_string(),
                    "sheet": sheet.display().to_string(),
                    "data": data.display().to_string(),
                    "duration_ms": duration_ms,
                })
            }
            ProgressEvent::InvocationFailed { pipeline, source, message } => json!({
                "event": "invocation_failed",
                "level": level,
                "pipeline": pipeline,
                "source": source.display().to_string(),
                "error": message,
            }),
            ProgressEvent::PathDeclared { role, path } => json!({
                "event": "path_declared",
                "level": level,
                "role": role.to_string(),
                "path": path.display().to_string(),
            }),
            ProgressEvent::Warning { pipeline, message } => json!({
                "event": "warning",
                "level": level,
                "pipeline": pipeline,
                "message": message,
            }),
            ProgressEvent::RunCompleted { success, duration_ms, processed, skipped, failed } => {
                json!({
                    "event": "run_completed",
                    "level": level,
                    "success": success,
                    "duration_ms": duration_ms,
                    "processed": processed,
                    "skipped": skipped,
                    "failed": failed,
                })
            }
        };
        self.write_json(&value);
    }

    fn is_verbose(&self) -> bool {
        true
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn console(verbose: bool) -> (Arc<Mutex<Vec<u8>>>, ConsoleProgress) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleProgress::with_output(TestWriter(Arc::clone(&output)))
            .with_colors(false)
            .with_verbose(verbose);
        (output, reporter)
    }

    fn text(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.lock().unwrap()).into_owned()
    }

    #[test]
    fn test_event_levels() {
        let line = ProgressEvent::CommandLine { pipeline: "p".to_string(), line: "x".to_string() };
        assert_eq!(line.level(), LogLevel::Debug);

        let stderr = ProgressEvent::ToolError { pipeline: "p".to_string(), text: "x".to_string() };
        assert_eq!(stderr.level(), LogLevel::Error);

        let stdout = ProgressEvent::ToolOutput { pipeline: "p".to_string(), text: "x".to_string() };
        assert_eq!(stdout.level(), LogLevel::Info);

        let warning = ProgressEvent::Warning { pipeline: None, message: "x".to_string() };
        assert_eq!(warning.level(), LogLevel::Warn);
    }

    #[test]
    fn test_null_progress() {
        let reporter = NullProgress::new();
        reporter.report(ProgressEvent::RunStarted { pipelines: 3 });
        assert!(!reporter.is_verbose());
    }

    #[test]
    fn test_collecting_progress_filters_by_level() {
        let reporter = CollectingProgress::new();
        reporter.report(ProgressEvent::RunStarted { pipelines: 1 });
        reporter.report(ProgressEvent::CommandLine { pipeline: "p".to_string(), line: "x".to_string() });
        reporter.report(ProgressEvent::ToolError { pipeline: "p".to_string(), text: "bad".to_string() });

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(reporter.at_level(LogLevel::Info).len(), 2);
        assert_eq!(reporter.at_level(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_console_hides_debug_unless_verbose() {
        let (output, reporter) = console(false);
        reporter.report(ProgressEvent::CommandLine {
            pipeline: "ui".to_string(),
            line: "TexturePacker --sheet a.png".to_string(),
        });
        assert!(text(&output).is_empty());

        let (output, reporter) = console(true);
        reporter.report(ProgressEvent::CommandLine {
            pipeline: "ui".to_string(),
            line: "TexturePacker --sheet a.png".to_string(),
        });
        assert!(text(&output).contains("TexturePacker --sheet a.png"));
    }

    #[test]
    fn test_console_directory_processed() {
        let (output, reporter) = console(false);
        reporter.report(ProgressEvent::DirectoryProcessed {
            pipeline: "ui".to_string(),
            source: PathBuf::from("/src/hero"),
            sheet: PathBuf::from("/out/hero.png"),
            data: PathBuf::from("/out/hero.json"),
            duration_ms: 120,
        });

        let text = text(&output);
        assert!(text.contains("directory /src/hero is processed"));
        assert!(text.contains("file /out/hero.png is created"));
        assert!(text.contains("file /out/hero.json is created"));
        assert!(text.contains("120ms"));
    }

    #[test]
    fn test_console_run_completed_failed() {
        let (output, reporter) = console(false);
        reporter.report(ProgressEvent::RunCompleted {
            success: false,
            duration_ms: 1500,
            processed: 3,
            skipped: 0,
            failed: 2,
        });

        let text = text(&output);
        assert!(text.contains("[error]"));
        assert!(text.contains("2 failures"));
        assert!(text.contains("1.5s"));
    }

    #[test]
    fn test_console_warning_prefix() {
        let (output, reporter) = console(false);
        reporter.report(ProgressEvent::Warning {
            pipeline: Some("ui".to_string()),
            message: "source directory does not exist".to_string(),
        });
        assert!(text(&output).contains("[warn] ui: source directory does not exist"));
    }

    #[test]
    fn test_json_progress_escapes_output() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = JsonProgress::with_output(TestWriter(Arc::clone(&output)));
        reporter.report(ProgressEvent::ToolError {
            pipeline: "ui".to_string(),
            text: "line \"one\"\nline two".to_string(),
        });

        let text = text(&output);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["event"], "tool_error");
        assert_eq!(value["level"], "error");
        assert_eq!(value["text"], "line \"one\"\nline two");
    }

    #[test]
    fn test_json_progress_run_completed() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = JsonProgress::with_output(TestWriter(Arc::clone(&output)));
        reporter.report(ProgressEvent::RunCompleted {
            success: true,
            duration_ms: 10,
            processed: 2,
            skipped: 1,
            failed: 0,
        });

        let value: serde_json::Value = serde_json::from_str(text(&output).trim()).unwrap();
        assert_eq!(value["processed"], 2);
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(999), "999ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(90000), "1m 30s");
    }

    // Helper for testing output
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
