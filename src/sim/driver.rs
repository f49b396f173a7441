use tracing::info;

use super::workload::Workload;
use crate::{
    config::{PolicyKind, SimConfig},
    core::{SchedCore, StepRecord, Ticks},
    error::{Result, SimError},
    report::Report,
    scheduler::{FifoScheduler, GreedyScheduler, Scheduler},
};

/// One isolated simulation run: its own timeline, process table and core pool.
pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    config: SimConfig,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(workload: &Workload, config: SimConfig) -> Result<Self> {
        config.validate()?;
        if config.policy != S::KIND {
            return Err(SimError::InvalidConfig(format!(
                "config selects the {} policy but the run uses {}",
                config.policy,
                S::NAME
            )));
        }

        Ok(Self {
            core: workload.build::<S>(&config)?,
            config,
        })
    }

    fn beyond_horizon(&self) -> bool {
        match (self.config.horizon, self.core.ctx.timeline.peek_time()) {
            (Some(horizon), Some(next)) => next > horizon,
            _ => false,
        }
    }

    /// True once the timeline is empty or the next event lies past the horizon.
    pub fn finished(&self) -> bool {
        self.core.ctx.timeline.is_empty() || self.beyond_horizon()
    }

    pub fn step(&mut self) -> Result<Option<StepRecord>> {
        if self.beyond_horizon() {
            return Ok(None);
        }
        self.core.step()
    }

    /// Drain the run, handing every step to `on_step`. Returns the number of steps.
    pub fn run_with(&mut self, mut on_step: impl FnMut(&StepRecord)) -> Result<u64> {
        info!(
            policy = S::NAME,
            cores = self.core.ctx.cores.total(),
            processes = self.core.ctx.processes.len(),
            pending = self.core.ctx.timeline.len(),
            horizon = ?self.config.horizon,
            "Starting simulation"
        );

        let mut steps = 0;
        while let Some(record) = self.step()? {
            on_step(&record);
            steps += 1;
        }

        info!(
            steps,
            clock = self.core.now(),
            free_cores = self.core.ctx.cores.free(),
            unprocessed = self.core.ctx.timeline.len(),
            "Simulation finished"
        );
        Ok(steps)
    }

    pub fn run(&mut self) -> Result<u64> {
        self.run_with(|_| {})
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn report(&self) -> Report {
        Report::capture(&self.core.ctx, self.core.observer(), self.config.termination)
    }
}

/// Run `workload` to completion under the policy `config` selects.
pub fn simulate(workload: &Workload, config: &SimConfig) -> Result<Report> {
    simulate_with(workload, config, |_| {})
}

pub fn simulate_with(
    workload: &Workload,
    config: &SimConfig,
    on_step: impl FnMut(&StepRecord),
) -> Result<Report> {
    match config.policy {
        PolicyKind::Greedy => run_policy::<GreedyScheduler>(workload, config, on_step),
        PolicyKind::Fifo => run_policy::<FifoScheduler>(workload, config, on_step),
    }
}

fn run_policy<S: Scheduler>(
    workload: &Workload,
    config: &SimConfig,
    on_step: impl FnMut(&StepRecord),
) -> Result<Report> {
    let mut sim = Sim::<S>::new(workload, config.clone())?;
    sim.run_with(on_step)?;
    Ok(sim.report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TerminationMode, sim::WorkloadOp};

    #[test]
    fn policy_mismatch_is_rejected() {
        let workload = Workload::new(1);
        let config = SimConfig::default().with_policy(PolicyKind::Fifo).with_horizon(5);
        assert!(matches!(
            Sim::<GreedyScheduler>::new(&workload, config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn horizon_stops_fifo_run() {
        let workload = Workload::parse("NCORES 1\nNEW 0\nCPU 2\nEND").unwrap();
        let config = SimConfig::default().with_policy(PolicyKind::Fifo).with_horizon(10);
        let mut sim = Sim::<FifoScheduler>::new(&workload, config).unwrap();

        sim.run().unwrap();
        assert!(sim.finished());
        assert!(sim.now() <= 10);
        assert!(!sim.core.ctx.timeline.is_empty());
        // Cycle: burst 2, storage 1 -> bursts end at 2, 5, 8; storage at 3, 6, 9
        assert_eq!(sim.core.ctx.process(0).storage_accesses, 3);
        assert_eq!(sim.now(), 9);
    }

    #[test]
    fn per_process_termination_uses_last_event() {
        let workload = Workload::parse("NCORES 1\nNEW 0\nCPU 5\nNEW 2\nCPU 1\nEND").unwrap();
        let config = SimConfig::default().with_termination(TerminationMode::PerProcess);
        let report = simulate(&workload, &config).unwrap();

        assert_eq!(report.final_clock, 6);
        assert_eq!(report.processes[0].terminated_at, 6);
        // Second process only ever saw its arrival
        assert_eq!(report.processes[1].terminated_at, 2);
    }

    #[test]
    fn per_process_termination_caps_unarrived_processes_at_the_clock() {
        let workload = Workload::parse("NCORES 1\nNEW 0\nCPU 2\nNEW 100\nEND").unwrap();
        let config = SimConfig::default()
            .with_policy(PolicyKind::Fifo)
            .with_horizon(10)
            .with_termination(TerminationMode::PerProcess);
        let report = simulate(&workload, &config).unwrap();

        assert_eq!(report.final_clock, 9);
        assert_eq!(report.processes[0].terminated_at, 9);
        // Arrival at 100 lies past the horizon
        assert_eq!(report.processes[1].terminated_at, report.final_clock);
        assert_eq!(report.processes[1].start_time, 100);
    }

    #[test]
    fn workload_without_a_process_fails_to_build() {
        let workload = Workload {
            cores: 1,
            ops: vec![WorkloadOp::Cpu(5), WorkloadOp::Ssd, WorkloadOp::New(0)],
        };
        assert!(matches!(
            simulate(&workload, &SimConfig::default()),
            Err(SimError::MalformedCommand { line: 2, .. })
        ));
    }
}
