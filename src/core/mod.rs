pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod timeline;

pub use driver::SchedCore;
pub use event::{Event, EventKind, Sequence, StepRecord};
pub use observer::Observer;
pub use state::{CorePool, Process, ProcessId, ProcessState, SimCtx, Ticks};
pub use timeline::Timeline;
