//! Final process table and summary statistics.
//!
//! Rendering is a pure function of the captured [`Report`], so printing the
//! same report twice produces identical output.

use std::fmt;

use average::{Estimate, Mean};

use crate::{
    config::TerminationMode,
    core::{Observer, ProcessId, ProcessState, SimCtx, Ticks},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub id: ProcessId,
    pub state: ProcessState,
    pub start_time: Ticks,
    pub cpu_time: Ticks,
    pub storage_accesses: u32,
    pub user_interactions: u32,
    pub terminated_at: Ticks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub processes: Vec<ProcessReport>,
    pub final_clock: Ticks,
    pub total_cores: u32,
    pub free_cores: u32,
    pub events_processed: u64,
    pub peak_cores_in_use: u32,
}

impl Report {
    pub fn capture(ctx: &SimCtx, observer: &Observer, termination: TerminationMode) -> Self {
        let processes = ctx
            .processes
            .iter()
            .map(|p| ProcessReport {
                id: p.id,
                state: p.state,
                start_time: p.start_time,
                cpu_time: p.cpu_time,
                storage_accesses: p.storage_accesses,
                user_interactions: p.user_interactions,
                terminated_at: match termination {
                    TerminationMode::Global => ctx.now,
                    // Never reached by an event (arrival past the horizon): the run's end
                    TerminationMode::PerProcess => p.last_event_at.unwrap_or(ctx.now),
                },
            })
            .collect();

        Self {
            processes,
            final_clock: ctx.now,
            total_cores: ctx.cores.total(),
            free_cores: ctx.cores.free(),
            events_processed: observer.steps(),
            peak_cores_in_use: observer.peak_cores_in_use(),
        }
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary { report: self }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.processes {
            writeln!(f, "Process {} terminated at time {}", p.id, p.terminated_at)?;
            writeln!(
                f,
                "Start Time: {}, CPU Time Used: {} ms, SSD Accesses: {}, User Interactions: {}",
                p.start_time, p.cpu_time, p.storage_accesses, p.user_interactions
            )?;
        }
        Ok(())
    }
}

/// Aggregate view of a [`Report`].
pub struct Summary<'a> {
    report: &'a Report,
}

impl Summary<'_> {
    fn mean(&self, field: impl Fn(&ProcessReport) -> f64) -> f64 {
        avg(self.report.processes.iter().map(field))
    }

    pub fn mean_cpu_time(&self) -> f64 {
        self.mean(|p| p.cpu_time as f64)
    }

    pub fn mean_storage_accesses(&self) -> f64 {
        self.mean(|p| p.storage_accesses as f64)
    }

    pub fn mean_user_interactions(&self) -> f64 {
        self.mean(|p| p.user_interactions as f64)
    }

    /// Processes that ended the run waiting for a core.
    pub fn stranded(&self) -> usize {
        self.report
            .processes
            .iter()
            .filter(|p| p.state == ProcessState::Ready)
            .count()
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        writeln!(f, "Processes: {}", r.processes.len())?;
        writeln!(f, "Events processed: {}", r.events_processed)?;
        writeln!(f, "Final clock: {}", r.final_clock)?;
        writeln!(
            f,
            "Cores: {} total, {} free at end, peak {} in use",
            r.total_cores, r.free_cores, r.peak_cores_in_use
        )?;
        writeln!(f, "Average CPU time: {:.2} ms", self.mean_cpu_time())?;
        writeln!(f, "Average SSD accesses: {:.2}", self.mean_storage_accesses())?;
        writeln!(f, "Average user interactions: {:.2}", self.mean_user_interactions())?;
        writeln!(f, "Left waiting for a core: {}", self.stranded())
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}
