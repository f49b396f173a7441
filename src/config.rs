use std::fmt;

use clap::ValueEnum;

use crate::{
    core::Ticks,
    error::{Result, SimError},
};

/// Latency of one storage access, in ticks.
pub const DEFAULT_STORAGE_LATENCY: Ticks = 1;
/// Latency of one user interaction, in ticks.
pub const DEFAULT_USER_LATENCY: Ticks = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyKind {
    /// Grant free cores on demand and never take them back.
    #[default]
    Greedy,
    /// Return cores at burst end and hand them to the oldest READY process.
    Fifo,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::Greedy => "greedy",
            PolicyKind::Fifo => "fifo",
        })
    }
}

/// Which clock value the report prints as a process's termination time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TerminationMode {
    /// Final clock of the whole run, shared by every process.
    #[default]
    Global,
    /// Time of the last event delivered to each process.
    PerProcess,
}

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub policy: PolicyKind,
    pub storage_latency: Ticks,
    pub user_latency: Ticks,
    /// Stop once the next pending event lies past this time.
    pub horizon: Option<Ticks>,
    pub termination: TerminationMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            storage_latency: DEFAULT_STORAGE_LATENCY,
            user_latency: DEFAULT_USER_LATENCY,
            horizon: None,
            termination: TerminationMode::default(),
        }
    }
}

impl SimConfig {
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_storage_latency(mut self, latency: Ticks) -> Self {
        self.storage_latency = latency;
        self
    }

    pub fn with_user_latency(mut self, latency: Ticks) -> Self {
        self.user_latency = latency;
        self
    }

    pub fn with_horizon(mut self, horizon: Ticks) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_termination(mut self, termination: TerminationMode) -> Self {
        self.termination = termination;
        self
    }

    pub fn validate(&self) -> Result<()> {
        // Under fifo every storage completion starts another burst
        if self.policy == PolicyKind::Fifo && self.horizon.is_none() {
            return Err(SimError::InvalidConfig(
                "the fifo policy never drains on its own; set a horizon".to_string(),
            ));
        }
        if self.policy == PolicyKind::Fifo && self.storage_latency == 0 {
            return Err(SimError::InvalidConfig(
                "the fifo policy needs a non-zero storage latency".to_string(),
            ));
        }
        Ok(())
    }
}
