use rand::{Rng, RngCore};
use tracing::debug;

use super::config::{Config, ConfigError, Representation, Selection};
use super::member::Member;
use super::population::Population;
use super::stats::EpochStats;

// breeding gives up after this many draws per missing member and falls back
// to cloning survivors, so improbable crossover gates cannot stall an epoch
const BREED_ATTEMPT_FACTOR: usize = 50;

/// Drives the run: validates the configuration, seeds the population and
/// applies the operator pipeline once per epoch, restoring the configured
/// size at every epoch end.
pub struct Engine {
    config: Config,
    population: Population,
}

impl Engine {
    pub fn new<R: RngCore>(rng: &mut R, config: Config) -> Result<Engine, ConfigError> {
        config.validate()?;
        let population = Population::init(rng, &config);
        Ok(Engine { config, population })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Returns one snapshot per epoch plus a final one for the finished
    /// population, `epochs + 1` entries in total.
    pub fn run<R: RngCore>(&mut self, rng: &mut R) -> Vec<EpochStats> {
        let mut series = Vec::with_capacity(self.config.epochs + 1);
        for epoch in 0..self.config.epochs {
            series.push(EpochStats::snapshot(epoch, &self.population));
            self.epoch(rng);
            debug!(
                epoch,
                best_fitness = self.population.best_member().fitness,
                "epoch finished"
            );
        }
        series.push(EpochStats::snapshot(self.config.epochs, &self.population));
        series
    }

    // elite out, select, breed back to size, mutate, invert, elite back in
    fn epoch<R: RngCore>(&mut self, rng: &mut R) {
        let n = self.population.target_size;
        let elite = self.population.elite_strategy(self.config.elite_percentage);

        match self.config.selection {
            Selection::Best { percentage } => {
                self.population.best_selection(percentage);
            }
            Selection::RouletteWheel { percentage } => {
                self.population.roulette_wheel_selection(rng, percentage);
            }
            Selection::Tournament { size } => {
                self.population.tournament_selection(rng, size);
            }
        }

        let mut children = Vec::new();
        let mut attempts = 0;
        while self.population.members.len() + children.len() + elite.len() < n {
            let missing = n - self.population.members.len() - children.len() - elite.len();
            let pool = &self.population.members;
            if pool.len() < 2 || attempts > BREED_ATTEMPT_FACTOR * n {
                children.push(Self::clone_survivor(rng, pool, &elite, &self.config));
                continue;
            }
            attempts += 1;
            let i = rng.gen_range(0..pool.len());
            let j = loop {
                let j = rng.gen_range(0..pool.len());
                if j != i {
                    break j;
                }
            };
            let mut offspring = self.population.crossover(
                rng,
                self.config.crossover,
                self.config.crossover_probability,
                &pool[i],
                &pool[j],
            );
            offspring.truncate(missing);
            children.extend(offspring);
        }
        self.population.members.extend(children);
        // selection schemes that keep more than the breeding shortfall (e.g.
        // roulette at 100%) can overfill; the elite slots are reserved
        self.population.members.truncate(n - elite.len());

        self.population
            .mutate_all(rng, self.config.mutation, self.config.mutation_probability);
        if self.config.representation == Representation::Binary {
            self.population
                .invert_all(rng, self.config.inversion_probability);
        }

        self.population.members.extend(elite);
    }

    // last-resort filler when breeding cannot make progress
    fn clone_survivor<R: RngCore>(
        rng: &mut R,
        pool: &[Member],
        elite: &[Member],
        config: &Config,
    ) -> Member {
        if !pool.is_empty() {
            pool[rng.gen_range(0..pool.len())].clone()
        } else if !elite.is_empty() {
            elite[rng.gen_range(0..elite.len())].clone()
        } else {
            Member::random(rng, config.representation, config.interval, config.precision)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::config::{Crossover, Mutation, Optimization};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn binary_config() -> Config {
        Config {
            interval: (-10.0, 10.0),
            precision: 6,
            population_size: 20,
            epochs: 10,
            optimization: Optimization::Minimize,
            selection: Selection::Best { percentage: 50.0 },
            crossover: Crossover::SinglePoint,
            crossover_probability: 0.9,
            mutation: Mutation::SinglePoint,
            mutation_probability: 0.1,
            inversion_probability: 0.05,
            elite_percentage: 10.0,
            representation: Representation::Binary,
        }
    }

    #[test]
    fn new_rejects_an_invalid_config() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(40);
        let mut config = binary_config();
        config.population_size = 1;
        assert_eq!(
            Engine::new(&mut rng, config).err(),
            Some(ConfigError::PopulationTooSmall(1))
        );
    }

    #[test]
    fn new_rejects_an_interval_too_narrow_to_encode() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(45);
        let mut config = binary_config();
        config.interval = (0.0, 0.3);
        config.precision = 1;
        assert_eq!(
            Engine::new(&mut rng, config).err(),
            Some(ConfigError::BitLengthOutOfRange(2))
        );
    }

    #[test]
    fn population_size_is_restored_every_epoch() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(41);
        let mut config = binary_config();
        config.epochs = 1;
        let mut engine = Engine::new(&mut rng, config).unwrap();
        for _ in 0..8 {
            engine.epoch(&mut rng);
            assert_eq!(engine.population().members.len(), 20);
        }
    }

    #[test]
    fn smallest_worked_generation() {
        // four members, one elite, best-50% selection leaves a pool of two,
        // certain single-point crossover yields two children; the overshoot
        // past four is truncated before mutation
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut config = binary_config();
        config.population_size = 4;
        config.elite_percentage = 25.0;
        config.crossover_probability = 1.0;
        config.mutation_probability = 0.0;
        config.inversion_probability = 0.0;
        let mut engine = Engine::new(&mut rng, config).unwrap();
        let best_before = engine.population().best_member().clone();
        let before = engine.population().members.clone();

        engine.epoch(&mut rng);
        assert_eq!(engine.population().members.len(), 4);
        // the elite member came back untouched
        assert!(engine.population().members.contains(&best_before));
        // with mutation and inversion off, a member that was not in the
        // starting pool can only be crossover offspring
        assert!(engine
            .population()
            .members
            .iter()
            .any(|member| !before.contains(member)));
    }

    #[test]
    fn run_returns_one_snapshot_per_epoch_plus_the_final_state() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(43);
        let mut engine = Engine::new(&mut rng, binary_config()).unwrap();
        let series = engine.run(&mut rng);
        assert_eq!(series.len(), 11);
        assert_eq!(series[0].epoch, 0);
        assert_eq!(series[10].epoch, 10);
    }

    #[test]
    fn breeding_falls_back_when_the_gate_never_opens() {
        // crossover probability zero produces no offspring, the epoch must
        // still refill the population by cloning survivors
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(44);
        let mut config = binary_config();
        config.crossover_probability = 0.0;
        config.epochs = 2;
        let mut engine = Engine::new(&mut rng, config).unwrap();
        engine.run(&mut rng);
        assert_eq!(engine.population().members.len(), 20);
    }
}
