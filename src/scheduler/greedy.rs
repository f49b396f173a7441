use super::{Placement, ProcessId, Scheduler, SimCtx};
use crate::config::PolicyKind;

/// Grants a core whenever one is free and never takes it back.
///
/// A burst end leaves the core charged to the process, so a process that finds
/// the pool empty stays READY for the rest of the run.
pub struct GreedyScheduler;

impl Scheduler for GreedyScheduler {
    const NAME: &'static str = "greedy";
    const KIND: PolicyKind = PolicyKind::Greedy;
    const RELEASES_CORES: bool = false;

    fn init(_ctx: &mut SimCtx) -> Self {
        Self
    }

    fn select_core(&mut self, ctx: &mut SimCtx, _process: ProcessId) -> Placement {
        if ctx.cores.has_free() {
            Placement::Dispatch
        } else {
            Placement::Wait
        }
    }

    fn burst_done(&mut self, _ctx: &mut SimCtx, _process: ProcessId) -> Option<ProcessId> {
        None
    }
}
