use std::fmt;

use super::{
    event::{EventKind, Sequence},
    timeline::Timeline,
};

// Index into the process Vec
pub type ProcessId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    // Defined by the workload, arrival not yet delivered
    New,
    Ready,
    Running,
    Blocked,
    // Reserved: no modeled transition enters it
    Terminated,
    // Reserved: USER_DONE is applied whatever the current state is
    AwaitingUser,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Blocked => "BLOCKED",
            ProcessState::Terminated => "TERMINATED",
            ProcessState::AwaitingUser => "AWAITING_USER",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: ProcessId,
    pub state: ProcessState,
    pub start_time: Ticks,
    // Cumulative CPU-time request; grows only while the workload is loaded
    pub cpu_time: Ticks,
    pub storage_accesses: u32,
    pub user_interactions: u32,
    pub cores_held: u32,
    pub last_event_at: Option<Ticks>,
}

/// Fungible cores: only the free count is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorePool {
    total: u32,
    free: u32,
}

impl CorePool {
    pub fn new(total: u32) -> Self {
        Self { total, free: total }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn free(&self) -> u32 {
        self.free
    }

    pub fn in_use(&self) -> u32 {
        self.total - self.free
    }

    pub fn has_free(&self) -> bool {
        self.free > 0
    }

    pub fn try_acquire(&mut self) -> bool {
        if self.free == 0 {
            return false;
        }
        self.free -= 1;
        true
    }

    pub fn release(&mut self, count: u32) {
        debug_assert!(
            self.free + count <= self.total,
            "Releasing {count} cores would overflow a pool of {}",
            self.total
        );
        self.free = (self.free + count).min(self.total);
    }
}

/// Everything one simulation run mutates: clock, cores, processes, pending events.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub cores: CorePool,
    pub processes: Vec<Process>,
    pub timeline: Timeline,
}

impl SimCtx {
    pub fn new(num_cores: u32) -> Self {
        Self {
            now: 0,
            cores: CorePool::new(num_cores),
            processes: Vec::new(),
            timeline: Timeline::new(),
        }
    }

    pub fn create_process(&mut self, start_time: Ticks) -> ProcessId {
        let id = self.processes.len();
        self.processes.push(Process {
            id,
            state: ProcessState::New,
            start_time,
            cpu_time: 0,
            storage_accesses: 0,
            user_interactions: 0,
            cores_held: 0,
            last_event_at: None,
        });
        id
    }

    pub fn schedule(&mut self, time: Ticks, process: ProcessId, kind: EventKind) -> Sequence {
        debug_assert!(
            process < self.processes.len(),
            "Scheduling {kind} for unknown process {process}"
        );
        self.timeline.schedule(time, process, kind)
    }

    pub fn advance_to(&mut self, time: Ticks) {
        debug_assert!(
            time >= self.now,
            "Clock moved backwards from {} to {time}",
            self.now
        );
        self.now = time;
    }

    pub fn process(&self, id: ProcessId) -> &Process {
        &self.processes[id]
    }

    pub fn process_mut(&mut self, id: ProcessId) -> &mut Process {
        &mut self.processes[id]
    }

    pub fn running_count(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.state == ProcessState::Running)
            .count()
    }

    pub fn cores_held(&self) -> u32 {
        self.processes.iter().map(|p| p.cores_held).sum()
    }

    // Take a free core for `id`; false leaves everything untouched
    pub fn grant_core(&mut self, id: ProcessId) -> bool {
        if !self.cores.try_acquire() {
            return false;
        }
        self.process_mut(id).cores_held += 1;
        true
    }

    // Return every core charged to `id`, yielding how many were freed
    pub fn reclaim_cores(&mut self, id: ProcessId) -> u32 {
        let held = std::mem::take(&mut self.process_mut(id).cores_held);
        self.cores.release(held);
        held
    }

    pub fn mark_ready(&mut self, id: ProcessId) {
        self.process_mut(id).state = ProcessState::Ready;
    }

    pub fn mark_running(&mut self, id: ProcessId) {
        let process = self.process_mut(id);
        debug_assert!(
            process.cores_held > 0,
            "Process {id} running without a core"
        );
        process.state = ProcessState::Running;
    }

    pub fn mark_blocked(&mut self, id: ProcessId) {
        self.process_mut(id).state = ProcessState::Blocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_pool_bounds() {
        let mut pool = CorePool::new(2);
        assert!(pool.try_acquire());
        assert!(pool.try_acquire());
        assert!(!pool.try_acquire());
        assert_eq!((pool.free(), pool.in_use()), (0, 2));

        pool.release(1);
        assert_eq!(pool.free(), 1);
        assert!(pool.has_free());
    }

    #[test]
    fn process_ids_are_dense_and_zero_based() {
        let mut ctx = SimCtx::new(1);
        assert_eq!(ctx.create_process(10), 0);
        assert_eq!(ctx.create_process(0), 1);
        assert_eq!(ctx.process(1).start_time, 0);
        assert_eq!(ctx.process(0).state, ProcessState::New);
    }

    #[test]
    fn grant_and_reclaim_keep_the_ledger() {
        let mut ctx = SimCtx::new(2);
        let p = ctx.create_process(0);
        assert!(ctx.grant_core(p));
        assert!(ctx.grant_core(p));
        assert!(!ctx.grant_core(p));
        assert_eq!(ctx.cores.free() + ctx.cores_held(), 2);

        assert_eq!(ctx.reclaim_cores(p), 2);
        assert_eq!(ctx.cores.free(), 2);
        assert_eq!(ctx.process(p).cores_held, 0);
    }
}
