pub mod fifo;
pub mod greedy;

use crate::{
    config::PolicyKind,
    core::state::{ProcessId, SimCtx},
};
pub use fifo::FifoScheduler;
pub use greedy::GreedyScheduler;

/// Where a process that just became ready should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    // Take a free core now and start a burst
    Dispatch,
    // No core for it; leave it READY
    Wait,
    // Already on a core; nothing changes
    Stay,
}

/// Core-allocation policy plugged into the engine.
pub trait Scheduler {
    const NAME: &'static str;
    const KIND: PolicyKind;

    /// Whether a burst end hands the process's core back to the pool.
    const RELEASES_CORES: bool;

    fn init(ctx: &mut SimCtx) -> Self;

    /// Called on arrival and on storage/user completion.
    fn select_core(&mut self, ctx: &mut SimCtx, process: ProcessId) -> Placement;

    /// Called after `process` has left the CPU. Returns a process to dispatch
    /// onto whatever core the policy freed.
    fn burst_done(&mut self, ctx: &mut SimCtx, process: ProcessId) -> Option<ProcessId>;
}
