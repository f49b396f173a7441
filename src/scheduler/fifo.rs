use std::collections::VecDeque;

use super::{Placement, ProcessId, Scheduler, SimCtx};
use crate::{config::PolicyKind, core::ProcessState};

/// Returns a core at every burst end and hands it to the oldest READY process.
pub struct FifoScheduler {
    ready: VecDeque<ProcessId>,
}

impl FifoScheduler {
    pub fn queued(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }
}

impl Scheduler for FifoScheduler {
    const NAME: &'static str = "fifo";
    const KIND: PolicyKind = PolicyKind::Fifo;
    const RELEASES_CORES: bool = true;

    fn init(_ctx: &mut SimCtx) -> Self {
        Self {
            ready: VecDeque::new(),
        }
    }

    fn select_core(&mut self, ctx: &mut SimCtx, process: ProcessId) -> Placement {
        if ctx.process(process).state == ProcessState::Running {
            return Placement::Stay;
        }
        if ctx.cores.has_free() {
            debug_assert!(
                self.ready.is_empty(),
                "Free core left idle while {} processes wait",
                self.ready.len()
            );
            return Placement::Dispatch;
        }
        if !self.ready.contains(&process) {
            self.ready.push_back(process);
        }
        Placement::Wait
    }

    fn burst_done(&mut self, ctx: &mut SimCtx, process: ProcessId) -> Option<ProcessId> {
        ctx.reclaim_cores(process);
        while let Some(next) = self.ready.pop_front() {
            if ctx.process(next).state == ProcessState::Ready {
                return Some(next);
            }
        }
        None
    }
}
