use serde::{Deserialize, Serialize};

use super::population::Population;

/// Per-epoch summary; the best member is reported in decoded
/// decision-variable space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub best_x1: f64,
    pub best_x2: f64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub std_dev: f64,
}

impl EpochStats {
    pub fn snapshot(epoch: usize, population: &Population) -> EpochStats {
        let best = population.best_member();
        let (best_x1, best_x2) = best.decoded(population.interval);
        let count = population.members.len() as f64;
        let mean = population.members.iter().map(|m| m.fitness).sum::<f64>() / count;
        let variance = population
            .members
            .iter()
            .map(|m| (m.fitness - mean).powi(2))
            .sum::<f64>()
            / count;
        EpochStats {
            epoch,
            best_x1,
            best_x2,
            best_fitness: best.fitness,
            mean_fitness: mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::Chromosome;
    use crate::ga::config::{Optimization, Representation};
    use crate::ga::member::Member;
    use assert_approx_eq::assert_approx_eq;

    const INTERVAL: (f64, f64) = (-10.0, 10.0);

    fn population_of(values: &[(f64, f64)]) -> Population {
        let members = values
            .iter()
            .map(|&(v1, v2)| {
                Member::from_chromosomes(Chromosome::Real(v1), Chromosome::Real(v2), INTERVAL)
            })
            .collect();
        Population {
            members,
            target_size: values.len(),
            interval: INTERVAL,
            precision: 6,
            representation: Representation::Real,
            optimization: Optimization::Minimize,
        }
    }

    #[test]
    fn snapshot_reports_the_decoded_best() {
        let population = population_of(&[(0.0, 0.0), (1.0, 3.0), (5.0, 5.0)]);
        let stats = EpochStats::snapshot(7, &population);
        assert_eq!(stats.epoch, 7);
        assert_approx_eq!(stats.best_x1, 1.0);
        assert_approx_eq!(stats.best_x2, 3.0);
        assert_approx_eq!(stats.best_fitness, 0.0);
    }

    #[test]
    fn mean_and_std_dev_over_the_pool() {
        // fitnesses 74, 0 -> mean 37, population std dev 37
        let population = population_of(&[(0.0, 0.0), (1.0, 3.0)]);
        let stats = EpochStats::snapshot(0, &population);
        assert_approx_eq!(stats.mean_fitness, 37.0);
        assert_approx_eq!(stats.std_dev, 37.0);
    }

    #[test]
    fn maximizing_snapshot_picks_the_high_end() {
        let mut population = population_of(&[(0.0, 0.0), (1.0, 3.0)]);
        population.optimization = Optimization::Maximize;
        let stats = EpochStats::snapshot(0, &population);
        assert_approx_eq!(stats.best_fitness, 74.0);
    }
}
