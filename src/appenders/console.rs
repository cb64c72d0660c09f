//! Console appender implementation

use crate::core::export::format_text_line;
use crate::core::{Appender, LogEntry, LogLevel, LoggerError, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

type Output = Box<dyn Write + Send + Sync>;

/// Writes entries as text lines to stdout, errors to stderr
///
/// Lines use the same layout as the text export,
/// `[timestamp] [LEVEL][category] message`, followed by the entry's fields.
pub struct ConsoleAppender {
    use_colors: bool,
    show_fields: bool,
    out: Output,
    err: Output,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(cfg!(feature = "console"))
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            show_fields: true,
            out: Box::new(std::io::stdout()),
            err: Box::new(std::io::stderr()),
        }
    }

    /// Redirect the two streams, e.g. into a pipe or an in-memory buffer
    #[must_use]
    pub fn with_writers<O, E>(mut self, out: O, err: E) -> Self
    where
        O: Write + Send + Sync + 'static,
        E: Write + Send + Sync + 'static,
    {
        self.out = Box::new(out);
        self.err = Box::new(err);
        self
    }

    /// Toggle the trailing `key=value` field list
    #[must_use]
    pub fn with_fields(mut self, show_fields: bool) -> Self {
        self.show_fields = show_fields;
        self
    }

    /// Render one entry as it would be printed
    pub fn format(&self, entry: &LogEntry) -> String {
        let mut line = if self.use_colors {
            self.format_colored(entry)
        } else {
            format_text_line(entry)
        };

        if self.show_fields {
            if let Some(ref fields) = entry.fields {
                line.push(' ');
                line.push_str(&fields.format_fields());
            }
        }

        line
    }

    #[cfg(feature = "console")]
    fn format_colored(&self, entry: &LogEntry) -> String {
        let level = entry.level.to_str().color(entry.level.color_code()).to_string();
        match entry.category {
            Some(ref category) => format!(
                "[{}] [{}][{}] {}",
                entry.iso_timestamp(),
                level,
                category,
                entry.message
            ),
            None => format!("[{}] [{}] {}", entry.iso_timestamp(), level, entry.message),
        }
    }

    #[cfg(not(feature = "console"))]
    fn format_colored(&self, entry: &LogEntry) -> String {
        format_text_line(entry)
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.format(entry);

        // Route Error and Fatal levels to stderr, others to stdout
        let target = match entry.level {
            LogLevel::Error | LogLevel::Fatal => &mut self.err,
            _ => &mut self.out,
        };
        writeln!(target, "{}", output).map_err(|e| LoggerError::appender("console", e.to_string()))
    }

    fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .and_then(|()| self.err.flush())
            .map_err(|e| LoggerError::appender("console", e.to_string()))
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogFields;
    use std::sync::{Arc, Mutex};

    /// In-memory stream shared with the test
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reader closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reader closed"))
        }
    }

    fn entry() -> LogEntry {
        let mut entry = LogEntry::new(LogLevel::Warn, "cache miss")
            .with_category("Cache")
            .with_fields(LogFields::new().with_field("key", "user:1"));
        entry.timestamp = 1_700_000_000_123;
        entry
    }

    #[test]
    fn test_plain_format() {
        let appender = ConsoleAppender::with_colors(false);
        let line = appender.format(&entry());
        assert!(line.starts_with("[2023-11-14T22:13:20.123Z] [WARN][Cache] cache miss"));
        assert!(line.contains("key=user:1"));
    }

    #[test]
    fn test_fields_can_be_hidden() {
        let appender = ConsoleAppender::with_colors(false).with_fields(false);
        assert_eq!(
            appender.format(&entry()),
            "[2023-11-14T22:13:20.123Z] [WARN][Cache] cache miss"
        );
    }

    #[test]
    fn test_levels_are_routed_to_streams() {
        let (out, err) = (SharedBuf::default(), SharedBuf::default());
        let mut appender = ConsoleAppender::with_colors(false).with_writers(out.clone(), err.clone());

        appender.append(&entry()).unwrap();
        appender.append(&LogEntry::new(LogLevel::Fatal, "crashed")).unwrap();

        assert!(out.text().contains("cache miss"));
        assert!(!out.text().contains("crashed"));
        assert!(err.text().contains("[FATAL] crashed"));
    }

    #[test]
    fn test_write_failure_is_an_appender_error() {
        let mut appender = ConsoleAppender::with_colors(false).with_writers(BrokenPipe, BrokenPipe);

        let err = appender.append(&entry()).unwrap_err();
        assert!(matches!(err, LoggerError::AppenderError { ref appender, .. } if appender == "console"));
        assert_eq!(err.to_string(), "Appender 'console' failed: reader closed");
        assert!(appender.flush().is_err());
    }

    #[test]
    fn test_append_and_flush() {
        let mut appender = ConsoleAppender::new();
        assert!(appender.append(&entry()).is_ok());
        assert!(appender.flush().is_ok());
        assert_eq!(appender.name(), "console");
    }
}
