pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod sim;

pub use config::{PolicyKind, SimConfig, TerminationMode};
pub use error::{Result, SimError};
pub use report::Report;
pub use scheduler::Scheduler;
pub use sim::{Sim, Workload, simulate};
