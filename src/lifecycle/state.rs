//! Observable lifecycle state.

/// Where an [`HttpSource`](crate::lifecycle::HttpSource) is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Never configured.
    Unconfigured,
    /// Configuration validated and handler resolved; no listener.
    Configured,
    /// Listener bound and serving.
    Running,
    /// Listener released after a run. Needs `configure` before `start`.
    Stopped,
}

impl Lifecycle {
    pub fn is_running(self) -> bool {
        self == Lifecycle::Running
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Lifecycle::Unconfigured => "unconfigured",
            Lifecycle::Configured => "configured",
            Lifecycle::Running => "running",
            Lifecycle::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
