use rand::prelude::*;

use super::workload::{Workload, WorkloadOp};
use crate::core::Ticks;

/// Parameters for a seeded random workload.
///
/// Each tick a process arrives with probability `p_arrival`. Its CPU request is
/// `short_cpu` with probability `p_short`, `long_cpu` otherwise, and it gets one
/// `SSD` and one `USER` command with probabilities `p_ssd` and `p_user`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_cpu: Ticks,
    pub long_cpu: Ticks,
    pub p_ssd: f64,
    pub p_user: f64,
    pub cores: u32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ticks: 500,
            p_arrival: 0.3,
            p_short: 0.3,
            short_cpu: 2,
            long_cpu: 6,
            p_ssd: 0.2,
            p_user: 0.05,
            cores: 2,
            seed: 0,
        }
    }
}

pub fn bernoulli_workload(config: &GeneratorConfig) -> Workload {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut workload = Workload::new(config.cores);

    for t in 0..config.ticks {
        if rng.random::<f64>() >= config.p_arrival {
            continue;
        }

        let cpu = if rng.random::<f64>() < config.p_short {
            config.short_cpu
        } else {
            config.long_cpu
        };
        workload.ops.push(WorkloadOp::New(t));
        workload.ops.push(WorkloadOp::Cpu(cpu));

        if rng.random::<f64>() < config.p_ssd {
            workload.ops.push(WorkloadOp::Ssd);
        }
        if rng.random::<f64>() < config.p_user {
            workload.ops.push(WorkloadOp::User);
        }
    }

    workload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_workload() {
        let config = GeneratorConfig {
            seed: 7,
            ..Default::default()
        };
        assert_eq!(bernoulli_workload(&config), bernoulli_workload(&config));
    }

    #[test]
    fn arrivals_are_in_time_order_and_parse_back() {
        let config = GeneratorConfig {
            ticks: 200,
            p_arrival: 0.5,
            seed: 3,
            ..Default::default()
        };
        let workload = bernoulli_workload(&config);

        let starts: Vec<Ticks> = workload
            .ops
            .iter()
            .filter_map(|op| match op {
                WorkloadOp::New(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert!(!starts.is_empty());
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        assert!(starts.iter().all(|&t| t < 200));

        let reparsed = Workload::parse(&workload.to_string()).unwrap();
        assert_eq!(reparsed, workload);
    }

    #[test]
    fn zero_arrival_probability_yields_no_processes() {
        let config = GeneratorConfig {
            p_arrival: 0.0,
            ..Default::default()
        };
        let workload = bernoulli_workload(&config);
        assert_eq!(workload.num_processes(), 0);
        assert_eq!(workload.cores, 2);
    }
}
