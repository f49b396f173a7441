use std::fmt;

use super::command::{Command, Located, parse_commands};
use crate::{
    config::SimConfig,
    core::{EventKind, SchedCore, Ticks},
    error::{Result, SimError},
    scheduler::Scheduler,
};

/// Per-process step of a workload, in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadOp {
    New(Ticks),
    Cpu(Ticks),
    Ssd,
    User,
}

/// A validated workload: core count plus the ordered process commands.
///
/// Order matters: `SSD` and `USER` seed events at load time, and their
/// insertion order relative to arrivals decides tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub cores: u32,
    pub ops: Vec<WorkloadOp>,
}

impl Workload {
    pub fn new(cores: u32) -> Self {
        Self {
            cores,
            ops: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Self::from_commands(&parse_commands(input)?)
    }

    pub fn from_commands(commands: &[Located]) -> Result<Self> {
        let mut workload: Option<Workload> = None;
        let mut has_process = false;

        for &Located { line, command } in commands {
            let op = match command {
                Command::Ncores(cores) => {
                    if workload.is_some() {
                        return Err(SimError::malformed(line, "NCORES given more than once"));
                    }
                    workload = Some(Workload::new(cores));
                    continue;
                }
                Command::End => break,
                Command::New(start) => WorkloadOp::New(start),
                Command::Cpu(ms) => WorkloadOp::Cpu(ms),
                Command::Ssd => WorkloadOp::Ssd,
                Command::User => WorkloadOp::User,
            };

            let Some(workload) = workload.as_mut() else {
                return Err(SimError::malformed(line, format!("{command} before NCORES")));
            };
            match op {
                WorkloadOp::New(_) => has_process = true,
                _ if !has_process => {
                    return Err(SimError::malformed(
                        line,
                        format!("{command} before any NEW"),
                    ));
                }
                _ => {}
            }
            workload.ops.push(op);
        }

        workload.ok_or_else(|| SimError::malformed(1, "missing NCORES"))
    }

    pub fn num_processes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, WorkloadOp::New(_)))
            .count()
    }

    /// Seed a fresh engine: processes, CPU requests and load-time events.
    ///
    /// Fails on a process command with no preceding `NEW`; the reported line is
    /// the op's line in the rendered script.
    pub fn build<S: Scheduler>(&self, config: &SimConfig) -> Result<SchedCore<S>> {
        let mut core = SchedCore::<S>::new(self.cores, config.storage_latency);
        let mut current = None;

        for (index, op) in self.ops.iter().enumerate() {
            if let WorkloadOp::New(start) = *op {
                current = Some(core.admit(start));
                continue;
            }
            let Some(pid) = current else {
                // Line 1 is NCORES
                return Err(SimError::malformed(
                    index + 2,
                    format!("{} before any NEW", Command::from(*op)),
                ));
            };
            match *op {
                WorkloadOp::New(_) => {}
                WorkloadOp::Cpu(ms) => core.add_cpu_time(pid, ms),
                // Relative to the load-time clock, not to the process's arrival
                WorkloadOp::Ssd => {
                    core.schedule_in(config.storage_latency, pid, EventKind::StorageDone)
                }
                WorkloadOp::User => core.schedule_in(config.user_latency, pid, EventKind::UserDone),
            }
        }

        Ok(core)
    }
}

impl From<WorkloadOp> for Command {
    fn from(op: WorkloadOp) -> Self {
        match op {
            WorkloadOp::New(start) => Command::New(start),
            WorkloadOp::Cpu(ms) => Command::Cpu(ms),
            WorkloadOp::Ssd => Command::Ssd,
            WorkloadOp::User => Command::User,
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Command::Ncores(self.cores))?;
        for &op in &self.ops {
            writeln!(f, "{}", Command::from(op))?;
        }
        writeln!(f, "{}", Command::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::ProcessState, scheduler::GreedyScheduler};

    #[test]
    fn parses_into_ops() {
        let workload = Workload::parse("NCORES 2\nNEW 0\nCPU 3\nCPU 4\nNEW 7\nUSER\nEND\n").unwrap();
        assert_eq!(workload.cores, 2);
        assert_eq!(
            workload.ops,
            vec![
                WorkloadOp::New(0),
                WorkloadOp::Cpu(3),
                WorkloadOp::Cpu(4),
                WorkloadOp::New(7),
                WorkloadOp::User,
            ]
        );
        assert_eq!(workload.num_processes(), 2);
    }

    #[test]
    fn ncores_must_come_first_and_once() {
        let late = Workload::parse("NEW 0\nNCORES 1\nEND").unwrap_err();
        assert_eq!(late, SimError::malformed(1, "NEW 0 before NCORES"));

        let twice = Workload::parse("NCORES 1\nNCORES 2\nEND").unwrap_err();
        assert_eq!(twice, SimError::malformed(2, "NCORES given more than once"));

        let missing = Workload::parse("END").unwrap_err();
        assert!(matches!(missing, SimError::MalformedCommand { .. }));
    }

    #[test]
    fn process_commands_need_a_process() {
        let err = Workload::parse("NCORES 1\nSSD\nEND").unwrap_err();
        assert_eq!(err, SimError::malformed(2, "SSD before any NEW"));
    }

    #[test]
    fn display_renders_a_reparseable_script() {
        let script = "NCORES 1\nNEW 0\nCPU 5\nSSD\nUSER\nEND\n";
        let workload = Workload::parse(script).unwrap();
        assert_eq!(workload.to_string(), script);
        assert_eq!(Workload::parse(&workload.to_string()).unwrap(), workload);
    }

    #[test]
    fn build_seeds_arrivals_and_load_time_events() {
        let workload = Workload::parse("NCORES 1\nNEW 50\nCPU 2\nCPU 3\nSSD\nUSER\nEND").unwrap();
        let core = workload
            .build::<GreedyScheduler>(&SimConfig::default())
            .unwrap();

        assert_eq!(core.ctx.processes.len(), 1);
        assert_eq!(core.ctx.process(0).cpu_time, 5);
        assert_eq!(core.ctx.process(0).state, ProcessState::New);
        // ARRIVAL at 50, STORAGE_DONE at 0 + 1, USER_DONE at 0 + 900
        assert_eq!(core.ctx.timeline.len(), 3);
        assert_eq!(core.ctx.timeline.peek_time(), Some(1));
    }

    #[test]
    fn build_rejects_process_commands_without_a_process() {
        let workload = Workload {
            cores: 1,
            ops: vec![WorkloadOp::Cpu(5), WorkloadOp::Ssd, WorkloadOp::New(0)],
        };
        let err = workload
            .build::<GreedyScheduler>(&SimConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, SimError::malformed(2, "CPU 5 before any NEW"));
    }
}
