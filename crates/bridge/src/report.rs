//! Shutdown report

use std::fmt;
use std::time::Duration;

/// What happened during one stop
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// HTTP requests answered over the service lifetime
    pub requests: u64,
    /// Messages the broker client accepted
    pub published: u64,
    /// Messages the broker client failed to deliver
    pub failed: u64,
    /// Envelopes rejected by the encoder
    pub encode_failures: u64,
    /// Publish loop did not drain within the bound and was aborted
    pub drain_timed_out: bool,
    /// Broker client close did not finish within the bound
    pub close_timed_out: bool,
    /// Error returned by the broker client close, if any
    pub close_error: Option<String>,
    /// Time spent in stop
    pub elapsed: Duration,
    /// Time between start and stop
    pub uptime: Duration,
}

impl ShutdownReport {
    /// Whether every stage finished inside the bound
    pub fn is_clean(&self) -> bool {
        !self.drain_timed_out && !self.close_timed_out && self.close_error.is_none()
    }
}

impl fmt::Display for ShutdownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Uptime: {:.2}s", self.uptime.as_secs_f64())?;
        writeln!(f, "Requests: {}", self.requests)?;
        writeln!(
            f,
            "Published: {} (failed: {}, encode failures: {})",
            self.published, self.failed, self.encode_failures
        )?;
        write!(f, "Shutdown: {}ms", self.elapsed.as_millis())?;
        if self.drain_timed_out {
            write!(f, ", drain timed out")?;
        }
        if self.close_timed_out {
            write!(f, ", close timed out")?;
        }
        if let Some(err) = &self.close_error {
            write!(f, ", close failed: {err}")?;
        }
        Ok(())
    }
}
