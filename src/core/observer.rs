use super::state::{ProcessState, SimCtx, Ticks};

/// Checks engine invariants after every drain step and keeps step statistics.
#[derive(Debug, Default)]
pub struct Observer {
    steps: u64,
    last_time: Option<Ticks>,
    peak_cores_in_use: u32,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, ctx: &SimCtx, releases_cores: bool) {
        self.steps += 1;

        if let Some(last) = self.last_time {
            debug_assert!(
                ctx.now >= last,
                "Clock went backwards: step {} at {} after {last}",
                self.steps,
                ctx.now
            );
        }
        self.last_time = Some(ctx.now);
        self.peak_cores_in_use = self.peak_cores_in_use.max(ctx.cores.in_use());

        debug_assert_eq!(
            ctx.cores.free() + ctx.cores_held(),
            ctx.cores.total(),
            "Core ledger out of balance at t={}",
            ctx.now
        );

        let running = ctx.running_count() as u32;
        if releases_cores {
            debug_assert_eq!(
                ctx.cores.free() + running,
                ctx.cores.total(),
                "free + running must equal total at t={}",
                ctx.now
            );
        } else {
            debug_assert!(
                running <= ctx.cores.in_use(),
                "{running} running processes but only {} cores in use at t={}",
                ctx.cores.in_use(),
                ctx.now
            );
        }

        for process in &ctx.processes {
            if process.state == ProcessState::Running {
                debug_assert!(
                    process.cores_held > 0,
                    "Running process {} holds no core",
                    process.id
                );
            }
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_time(&self) -> Option<Ticks> {
        self.last_time
    }

    pub fn peak_cores_in_use(&self) -> u32 {
        self.peak_cores_in_use
    }
}
