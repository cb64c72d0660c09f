//! Output sink trait for entries written to the console side

use super::{error::Result, log_entry::LogEntry};

/// Destination an accepted entry is written to when `outputs.console` is on
///
/// The devtools side is not an appender: it is the capture buffer, drained
/// into the transport by the flush scheduler.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
