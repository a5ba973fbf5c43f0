//! Service state machine

use std::fmt;

/// `Created → Running → Stopping → Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Holds its configuration, nothing bound yet
    Created,
    /// HTTP listener active, publish loop running
    Running,
    /// Queue closed, publish loop draining
    Stopping,
    /// Broker client closed; terminal
    Stopped,
}

impl ServiceState {
    pub fn can_start(self) -> bool {
        self == Self::Created
    }

    pub fn can_stop(self) -> bool {
        self == Self::Running
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
