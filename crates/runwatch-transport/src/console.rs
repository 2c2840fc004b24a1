//! Console output sink with severity colours.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use runwatch_core::{LogRecord, LogSink, Severity};

/// Timestamp format of locally generated lines.
pub const NOTICE_TIME_FORMAT: &str = "%m-%d %H:%M:%S";

/// Renders records and notices as `[LABEL] [time]: message` lines.
pub struct ConsoleSink<W> {
    out: W,
    color: bool,
    verbose: bool,
}

impl ConsoleSink<io::Stdout> {
    /// Sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Create a coloured, non-verbose sink.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self {
            out,
            color: true,
            verbose: false,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Also echo every record as raw JSON on the debug channel.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, severity: Severity, label: &str, time: &str, msg: &str) {
        let text = format!("[{label}] [{time}]: {msg}");
        let _ = if self.color {
            writeln!(self.out, "{}", text.as_str().with(color_of(severity)))
        } else {
            writeln!(self.out, "{text}")
        };
        let _ = self.out.flush();
    }
}

const fn color_of(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Blue,
        Severity::Warning => Color::Magenta,
        Severity::Error => Color::Red,
        Severity::Success => Color::Green,
        Severity::Debug => Color::DarkGrey,
    }
}

fn now() -> String {
    chrono::Local::now().format(NOTICE_TIME_FORMAT).to_string()
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn render(&mut self, record: &LogRecord) {
        if let Some(severity) = record.severity() {
            self.line(severity, record.label(), record.timestamp(), record.content());
        }
        if self.verbose {
            if let Ok(raw) = serde_json::to_string(record) {
                self.line(Severity::Debug, Severity::Debug.label(), &now(), &raw);
            }
        }
    }

    fn notice(&mut self, severity: Severity, msg: &str) {
        if severity == Severity::Debug && !self.verbose {
            return;
        }
        self.line(severity, severity.label(), &now(), msg);
    }
}
