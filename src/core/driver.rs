use tracing::{debug, trace};

use super::{
    event::{Event, EventKind, StepRecord},
    observer::Observer,
    state::{ProcessId, SimCtx, Ticks},
};
use crate::{
    error::Result,
    scheduler::{Placement, Scheduler},
};

/// The event-driven engine: pops events, moves the clock, applies transitions.
pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    observer: Observer,
    storage_latency: Ticks,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(num_cores: u32, storage_latency: Ticks) -> Self {
        let mut ctx = SimCtx::new(num_cores);
        let scheduler = S::init(&mut ctx);
        Self {
            ctx,
            scheduler,
            observer: Observer::new(),
            storage_latency,
        }
    }

    /// Define a process and schedule its arrival.
    pub fn admit(&mut self, start_time: Ticks) -> ProcessId {
        let id = self.ctx.create_process(start_time);
        self.ctx.schedule(start_time, id, EventKind::Arrival);
        id
    }

    pub fn add_cpu_time(&mut self, process: ProcessId, amount: Ticks) {
        let process = self.ctx.process_mut(process);
        process.cpu_time = process.cpu_time.saturating_add(amount);
    }

    /// Schedule `kind` for `process` at `delay` past the current clock.
    pub fn schedule_in(&mut self, delay: Ticks, process: ProcessId, kind: EventKind) {
        let at = self.ctx.now.saturating_add(delay);
        trace!(at, process, %kind, "scheduled");
        self.ctx.schedule(at, process, kind);
    }

    /// Deliver the earliest pending event. `None` once the timeline is drained.
    pub fn step(&mut self) -> Result<Option<StepRecord>> {
        if self.ctx.timeline.is_empty() {
            return Ok(None);
        }
        let event = self.ctx.timeline.pop_earliest()?;
        Ok(Some(self.apply(event)))
    }

    fn apply(&mut self, event: Event) -> StepRecord {
        let pid = event.process;
        self.ctx.advance_to(event.time);
        let from = self.ctx.process(pid).state;
        let mut dispatched = Vec::new();

        match event.kind {
            EventKind::Arrival => self.wake(pid, &mut dispatched),
            EventKind::CpuBurstDone => self.finish_burst(pid, &mut dispatched),
            EventKind::StorageDone => {
                self.ctx.process_mut(pid).storage_accesses += 1;
                self.wake(pid, &mut dispatched);
            }
            EventKind::UserDone => {
                self.ctx.process_mut(pid).user_interactions += 1;
                self.wake(pid, &mut dispatched);
            }
        }
        self.ctx.process_mut(pid).last_event_at = Some(event.time);

        let to = self.ctx.process(pid).state;
        debug!(
            now = event.time,
            pid,
            kind = %event.kind,
            %from,
            %to,
            free = self.ctx.cores.free(),
            "applied"
        );

        self.observer.observe(&self.ctx, S::RELEASES_CORES);

        StepRecord {
            event,
            from,
            to,
            free_cores: self.ctx.cores.free(),
            dispatched,
        }
    }

    fn wake(&mut self, pid: ProcessId, dispatched: &mut Vec<ProcessId>) {
        match self.scheduler.select_core(&mut self.ctx, pid) {
            Placement::Dispatch => self.dispatch(pid, dispatched),
            Placement::Wait => self.ctx.mark_ready(pid),
            Placement::Stay => {}
        }
    }

    fn finish_burst(&mut self, pid: ProcessId, dispatched: &mut Vec<ProcessId>) {
        self.ctx.mark_blocked(pid);
        self.schedule_in(self.storage_latency, pid, EventKind::StorageDone);

        if let Some(next) = self.scheduler.burst_done(&mut self.ctx, pid) {
            self.dispatch(next, dispatched);
        }
    }

    fn dispatch(&mut self, pid: ProcessId, dispatched: &mut Vec<ProcessId>) {
        if !self.ctx.grant_core(pid) {
            debug_assert!(false, "{} dispatched process {pid} with no free core", S::NAME);
            self.ctx.mark_ready(pid);
            return;
        }
        self.ctx.mark_running(pid);
        let burst = self.ctx.process(pid).cpu_time;
        self.schedule_in(burst, pid, EventKind::CpuBurstDone);
        dispatched.push(pid);
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::ProcessState,
        scheduler::{FifoScheduler, GreedyScheduler},
    };
    use tracing_test::traced_test;

    fn drain<S: Scheduler>(core: &mut SchedCore<S>) -> Vec<StepRecord> {
        std::iter::from_fn(|| core.step().unwrap()).collect()
    }

    #[test]
    fn single_process_runs_then_blocks_then_waits() {
        let mut core = SchedCore::<GreedyScheduler>::new(1, 1);
        let p = core.admit(0);
        core.add_cpu_time(p, 5);

        let steps = drain(&mut core);
        let trail: Vec<(Ticks, EventKind, ProcessState)> = steps
            .iter()
            .map(|s| (s.event.time, s.event.kind, s.to))
            .collect();
        assert_eq!(
            trail,
            vec![
                (0, EventKind::Arrival, ProcessState::Running),
                (5, EventKind::CpuBurstDone, ProcessState::Blocked),
                (6, EventKind::StorageDone, ProcessState::Ready),
            ]
        );
        assert_eq!(core.now(), 6);
        assert_eq!(core.ctx.cores.free(), 0);
        assert_eq!(core.observer().steps(), 3);
        assert_eq!(core.observer().last_time(), Some(6));
    }

    #[test]
    fn step_on_drained_core_is_none() {
        let mut core = SchedCore::<GreedyScheduler>::new(1, 1);
        assert_eq!(core.step(), Ok(None));
    }

    #[test]
    fn greedy_keeps_cores_after_bursts() {
        let mut core = SchedCore::<GreedyScheduler>::new(2, 1);
        let p = core.admit(0);
        core.add_cpu_time(p, 2);

        drain(&mut core);
        // Arrival and the first storage completion each took a core
        assert_eq!(core.ctx.process(p).cores_held, 2);
        assert_eq!(core.ctx.process(p).storage_accesses, 2);
        assert_eq!(core.ctx.cores.free(), 0);
    }

    #[test]
    fn fifo_hands_freed_core_to_oldest_waiter() {
        let mut core = SchedCore::<FifoScheduler>::new(1, 1);
        let a = core.admit(0);
        core.add_cpu_time(a, 4);
        let b = core.admit(1);
        core.add_cpu_time(b, 3);
        let c = core.admit(2);
        core.add_cpu_time(c, 3);

        let mut handoff = None;
        while core.now() < 4 {
            let step = core.step().unwrap().unwrap();
            if step.event.kind == EventKind::CpuBurstDone {
                handoff = Some(step.dispatched.clone());
                break;
            }
        }
        assert_eq!(handoff, Some(vec![b]));
        assert_eq!(core.ctx.process(b).state, ProcessState::Running);
        assert_eq!(core.ctx.process(c).state, ProcessState::Ready);
        assert_eq!(core.scheduler.queued().collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn fifo_running_process_stays_on_storage_completion() {
        let mut core = SchedCore::<FifoScheduler>::new(2, 1);
        let p = core.admit(0);
        core.add_cpu_time(p, 5);
        core.schedule_in(1, p, EventKind::StorageDone);

        core.step().unwrap();
        let storage = core.step().unwrap().unwrap();
        assert_eq!(storage.event.kind, EventKind::StorageDone);
        assert_eq!((storage.from, storage.to), (ProcessState::Running, ProcessState::Running));
        assert!(storage.dispatched.is_empty());
        assert_eq!(core.ctx.cores.free(), 1);
    }

    #[test]
    #[traced_test]
    fn transitions_are_logged() {
        let mut core = SchedCore::<GreedyScheduler>::new(1, 1);
        let p = core.admit(3);
        core.add_cpu_time(p, 1);
        core.step().unwrap();

        assert!(logs_contain("applied"));
        assert!(logs_contain("kind=ARRIVAL"));
    }
}
