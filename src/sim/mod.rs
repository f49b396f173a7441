pub mod command;
pub mod driver;
pub mod generator;
pub mod workload;

pub use command::{Command, Located, parse_commands};
pub use driver::{Sim, simulate, simulate_with};
pub use generator::{GeneratorConfig, bernoulli_workload};
pub use workload::{Workload, WorkloadOp};
