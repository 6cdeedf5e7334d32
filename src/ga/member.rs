use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::chromosome::Chromosome;
use super::config::Representation;

/// Booth's function, the fixed two-variable objective. Global minimum 0 at (1, 3).
pub fn booth(x1: f64, x2: f64) -> f64 {
    (x1 + 2.0 * x2 - 7.0).powi(2) + (2.0 * x1 + x2 - 5.0).powi(2)
}

/// One candidate solution; `fitness` caches the objective at the current
/// decoded values and is refreshed by every operator that touches a chromosome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub x1: Chromosome,
    pub x2: Chromosome,
    pub fitness: f64,
}

impl Member {
    pub fn random<R: RngCore>(
        rng: &mut R,
        representation: Representation,
        interval: (f64, f64),
        precision: u32,
    ) -> Member {
        let (x1, x2) = match representation {
            Representation::Binary => (
                Chromosome::random_binary(rng, interval, precision),
                Chromosome::random_binary(rng, interval, precision),
            ),
            Representation::Real => (
                Chromosome::random_real(rng, interval),
                Chromosome::random_real(rng, interval),
            ),
        };
        Member::from_chromosomes(x1, x2, interval)
    }

    pub fn from_chromosomes(x1: Chromosome, x2: Chromosome, interval: (f64, f64)) -> Member {
        let mut member = Member { x1, x2, fitness: 0.0 };
        member.update_fitness(interval);
        member
    }

    pub fn decoded(&self, interval: (f64, f64)) -> (f64, f64) {
        (self.x1.decode(interval), self.x2.decode(interval))
    }

    pub fn update_fitness(&mut self, interval: (f64, f64)) {
        let (v1, v2) = self.decoded(interval);
        self.fitness = booth(v1, v2);
    }
}
