use std::{fmt, str::FromStr};

use crate::{
    core::{ProcessId, ProcessState, Ticks},
    error::SimError,
};

/// Insertion-order stamp attached to every scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    CpuBurstDone,
    StorageDone,
    UserDone,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Arrival,
        EventKind::CpuBurstDone,
        EventKind::StorageDone,
        EventKind::UserDone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Arrival => "ARRIVAL",
            EventKind::CpuBurstDone => "CPU_BURST_DONE",
            EventKind::StorageDone => "STORAGE_DONE",
            EventKind::UserDone => "USER_DONE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SimError::UnknownEventKind(s.to_string()))
    }
}

/// A pending state-transition trigger. Immutable once scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: Ticks,
    pub sequence: Sequence,
    pub process: ProcessId,
    pub kind: EventKind,
}

/// What a single drain step did: the consumed event and the state change it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub event: Event,
    pub from: ProcessState,
    pub to: ProcessState,
    pub free_cores: u32,
    // Processes dispatched onto a core during this step, in dispatch order
    pub dispatched: Vec<ProcessId>,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} pid={} {} {} -> {} free={}",
            self.event.time, self.event.process, self.event.kind, self.from, self.to, self.free_cores
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            "CPU_COMPLETE".parse::<EventKind>(),
            Err(SimError::UnknownEventKind("CPU_COMPLETE".to_string()))
        );
    }

    #[test]
    fn step_record_renders_trace_line() {
        let record = StepRecord {
            event: Event {
                time: 5,
                sequence: Sequence(1),
                process: 0,
                kind: EventKind::CpuBurstDone,
            },
            from: ProcessState::Running,
            to: ProcessState::Blocked,
            free_cores: 0,
            dispatched: Vec::new(),
        };
        assert_eq!(
            record.to_string(),
            "t=5 pid=0 CPU_BURST_DONE RUNNING -> BLOCKED free=0"
        );
    }
}
