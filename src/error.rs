use thiserror::Error;

/// Errors raised while loading or running a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The workload script could not be parsed or violates command ordering.
    #[error("malformed command on line {line}: {reason}")]
    MalformedCommand { line: usize, reason: String },

    /// `pop_earliest` was called on a drained timeline.
    #[error("pop from an empty timeline")]
    EmptyTimeline,

    /// An event-kind name outside the closed set.
    #[error("unknown event kind `{0}`")]
    UnknownEventKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCommand {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
