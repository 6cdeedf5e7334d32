use itertools::Itertools;
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::chromosome::{binary_length, Chromosome};
use super::config::{Config, Crossover, Mutation, Optimization, Representation};
use super::member::Member;

// bound on the blend rejection loop so a hostile expansion range cannot spin forever
const BLEND_RETRY_LIMIT: usize = 100;

const LINEAR_WEIGHTS: [(f64, f64); 3] = [(0.5, 0.5), (1.5, -0.5), (-0.5, 1.5)];

/// The working pool of candidates plus the schema every child it breeds must
/// share. Selection operators mutate the pool in place and return a view of
/// it; any operator handed an out-of-range probability or percentage is a
/// no-op.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    pub members: Vec<Member>,
    pub target_size: usize,
    pub interval: (f64, f64),
    pub precision: u32,
    pub representation: Representation,
    pub optimization: Optimization,
}

impl Population {
    pub fn init<R: RngCore>(rng: &mut R, config: &Config) -> Population {
        let members = (0..config.population_size)
            .map(|_| Member::random(rng, config.representation, config.interval, config.precision))
            .collect();
        Population {
            members,
            target_size: config.population_size,
            interval: config.interval,
            precision: config.precision,
            representation: config.representation,
            optimization: config.optimization,
        }
    }

    pub fn best_member(&self) -> &Member {
        let optimization = self.optimization;
        self.members
            .iter()
            .position_min_by(|a, b| optimization.compare(a.fitness, b.fitness))
            .map(|index| &self.members[index])
            .expect("population is empty")
    }

    fn sort_best_first(&mut self) {
        let optimization = self.optimization;
        self.members
            .sort_by(|a, b| optimization.compare(a.fitness, b.fitness));
    }

    fn selection_count(&self, percentage: f64) -> usize {
        (self.target_size as f64 * percentage / 100.0).ceil() as usize
    }

    // selection -----------------------------------------------------------

    pub fn best_selection(&mut self, percentage: f64) -> &[Member] {
        if !(0.0..=100.0).contains(&percentage) {
            return &self.members;
        }
        self.sort_best_first();
        let keep = self.selection_count(percentage).min(self.members.len());
        self.members.truncate(keep);
        &self.members
    }

    /// Fitness-proportional draw with replacement; weight is raw fitness when
    /// maximizing and its reciprocal when minimizing.
    pub fn roulette_wheel_selection<R: RngCore>(
        &mut self,
        rng: &mut R,
        percentage: f64,
    ) -> &[Member] {
        if !(0.0..=100.0).contains(&percentage) || self.members.is_empty() {
            return &self.members;
        }
        let weights: Vec<f64> = match self.optimization {
            Optimization::Maximize => self.members.iter().map(|m| m.fitness).collect(),
            // a member sitting on the optimum would get an infinite weight
            Optimization::Minimize => self
                .members
                .iter()
                .map(|m| 1.0 / m.fitness.max(f64::EPSILON))
                .collect(),
        };
        let count = self.selection_count(percentage);
        let selected: Vec<Member> = match WeightedIndex::new(&weights) {
            Ok(wheel) => (0..count)
                .map(|_| self.members[wheel.sample(rng)].clone())
                .collect(),
            // every weight zero: the wheel has no arcs, draw uniformly instead
            Err(_) => (0..count)
                .map(|_| self.members[rng.gen_range(0..self.members.len())].clone())
                .collect(),
        };
        self.members = selected;
        &self.members
    }

    /// Disjoint random groups of `size`; each group's best survives.
    pub fn tournament_selection<R: RngCore>(&mut self, rng: &mut R, size: usize) -> &[Member] {
        if size == 0 || self.members.is_empty() {
            return &self.members;
        }
        self.members.shuffle(rng);
        let optimization = self.optimization;
        let winners: Vec<Member> = self
            .members
            .chunks(size)
            .map(|group| {
                group
                    .iter()
                    .min_by(|a, b| optimization.compare(a.fitness, b.fitness))
                    .expect("chunks are never empty")
                    .clone()
            })
            .collect();
        self.members = winners;
        &self.members
    }

    /// Removes the top slice of the pool, to be reinserted untouched once the
    /// epoch's operators have run.
    pub fn elite_strategy(&mut self, percentage: f64) -> Vec<Member> {
        if !(0.0..=100.0).contains(&percentage) {
            return Vec::new();
        }
        self.sort_best_first();
        let count = self.selection_count(percentage).min(self.members.len());
        self.members.drain(..count).collect()
    }

    // crossover -----------------------------------------------------------

    fn gate<R: RngCore>(rng: &mut R, probability: f64) -> bool {
        (0.0..=1.0).contains(&probability) && Uniform::from(0.0..1.0).sample(rng) <= probability
    }

    pub fn crossover<R: RngCore>(
        &self,
        rng: &mut R,
        kind: Crossover,
        probability: f64,
        a: &Member,
        b: &Member,
    ) -> Vec<Member> {
        match kind {
            Crossover::SinglePoint | Crossover::TwoPoint | Crossover::ThreePoint => {
                let points = kind.cut_points().expect("multipoint family");
                self.multipoint_crossover(rng, a, b, points, probability)
            }
            Crossover::Homogeneous => self.homogeneous_crossover(rng, a, b, probability),
            Crossover::Arithmetic => self.arithmetic_crossover(rng, a, b, probability),
            Crossover::BlendAlpha { alpha } => {
                self.blend_crossover(rng, a, b, alpha, alpha, probability)
            }
            Crossover::BlendAlphaBeta { alpha, beta } => {
                self.blend_crossover(rng, a, b, alpha, beta, probability)
            }
            Crossover::Average => self.average_crossover(rng, a, b, probability),
            Crossover::Linear => self.linear_crossover(rng, a, b, probability),
        }
    }

    /// Swaps the children's tails at each of `points` distinct cuts, giving
    /// alternating complementary segments. Cuts exclude the last bit position.
    pub fn multipoint_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        points: usize,
        probability: f64,
    ) -> Vec<Member> {
        if !Self::gate(rng, probability) {
            return Vec::new();
        }
        let length = binary_length(self.interval, self.precision);
        if points == 0 || points > length.saturating_sub(1) {
            return Vec::new();
        }

        let mut first = (a.x1.bits().to_vec(), a.x2.bits().to_vec());
        let mut second = (b.x1.bits().to_vec(), b.x2.bits().to_vec());

        for (child_a, child_b) in [(&mut first.0, &mut second.0), (&mut first.1, &mut second.1)] {
            let mut cuts = rand::seq::index::sample(rng, length - 1, points).into_vec();
            cuts.sort_unstable();
            for cut in cuts {
                for i in cut..length {
                    std::mem::swap(&mut child_a[i], &mut child_b[i]);
                }
            }
        }

        vec![
            Member::from_chromosomes(
                Chromosome::Binary(first.0),
                Chromosome::Binary(first.1),
                self.interval,
            ),
            Member::from_chromosomes(
                Chromosome::Binary(second.0),
                Chromosome::Binary(second.1),
                self.interval,
            ),
        ]
    }

    /// No single gate: every bit position is swapped between the children
    /// independently with the given probability.
    pub fn homogeneous_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        probability: f64,
    ) -> Vec<Member> {
        if !(0.0..=1.0).contains(&probability) {
            return Vec::new();
        }
        let between = Uniform::from(0.0..1.0);
        let mut first = (a.x1.bits().to_vec(), a.x2.bits().to_vec());
        let mut second = (b.x1.bits().to_vec(), b.x2.bits().to_vec());

        for (child_a, child_b) in [(&mut first.0, &mut second.0), (&mut first.1, &mut second.1)] {
            for i in 0..child_a.len() {
                if between.sample(rng) <= probability {
                    std::mem::swap(&mut child_a[i], &mut child_b[i]);
                }
            }
        }

        vec![
            Member::from_chromosomes(
                Chromosome::Binary(first.0),
                Chromosome::Binary(first.1),
                self.interval,
            ),
            Member::from_chromosomes(
                Chromosome::Binary(second.0),
                Chromosome::Binary(second.1),
                self.interval,
            ),
        ]
    }

    /// `child1 = p·a + (1−p)·b`, `child2` with the complementary weights.
    pub fn arithmetic_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        probability: f64,
    ) -> Vec<Member> {
        if !Self::gate(rng, probability) {
            return Vec::new();
        }
        let p = probability;
        let (a1, a2) = (a.x1.value(), a.x2.value());
        let (b1, b2) = (b.x1.value(), b.x2.value());
        vec![
            Member::from_chromosomes(
                Chromosome::Real(p * a1 + (1.0 - p) * b1),
                Chromosome::Real(p * a2 + (1.0 - p) * b2),
                self.interval,
            ),
            Member::from_chromosomes(
                Chromosome::Real((1.0 - p) * a1 + p * b1),
                Chromosome::Real((1.0 - p) * a2 + p * b2),
                self.interval,
            ),
        ]
    }

    /// BLX-α-β: each component is drawn from the parents' range expanded by
    /// α below and β above; a child that never lands inside the interval
    /// within the retry limit is dropped.
    pub fn blend_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        alpha: f64,
        beta: f64,
        probability: f64,
    ) -> Vec<Member> {
        if !Self::gate(rng, probability) {
            return Vec::new();
        }
        let (lo, hi) = self.interval;
        let ranges: Vec<(f64, f64)> = [(a.x1.value(), b.x1.value()), (a.x2.value(), b.x2.value())]
            .iter()
            .map(|&(p, q)| {
                let (min, max) = if p < q { (p, q) } else { (q, p) };
                let delta = max - min;
                (min - alpha * delta, max + beta * delta)
            })
            .collect();

        let mut children = Vec::with_capacity(2);
        for _ in 0..2 {
            for _ in 0..BLEND_RETRY_LIMIT {
                let v1 = rng.gen_range(ranges[0].0..=ranges[0].1);
                let v2 = rng.gen_range(ranges[1].0..=ranges[1].1);
                if (lo..=hi).contains(&v1) && (lo..=hi).contains(&v2) {
                    children.push(Member::from_chromosomes(
                        Chromosome::Real(v1),
                        Chromosome::Real(v2),
                        self.interval,
                    ));
                    break;
                }
            }
        }
        children
    }

    pub fn average_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        probability: f64,
    ) -> Vec<Member> {
        if !Self::gate(rng, probability) {
            return Vec::new();
        }
        vec![Member::from_chromosomes(
            Chromosome::Real((a.x1.value() + b.x1.value()) / 2.0),
            Chromosome::Real((a.x2.value() + b.x2.value()) / 2.0),
            self.interval,
        )]
    }

    /// Three fixed linear combinations, keeping the best two that stay in
    /// the interval. Fewer than two survivors means no offspring at all.
    pub fn linear_crossover<R: RngCore>(
        &self,
        rng: &mut R,
        a: &Member,
        b: &Member,
        probability: f64,
    ) -> Vec<Member> {
        if !Self::gate(rng, probability) {
            return Vec::new();
        }
        let (lo, hi) = self.interval;
        let (a1, a2) = (a.x1.value(), a.x2.value());
        let (b1, b2) = (b.x1.value(), b.x2.value());

        let survivors: Vec<Member> = LINEAR_WEIGHTS
            .iter()
            .filter_map(|&(wa, wb)| {
                let v1 = wa * a1 + wb * b1;
                let v2 = wa * a2 + wb * b2;
                ((lo..=hi).contains(&v1) && (lo..=hi).contains(&v2)).then(|| {
                    Member::from_chromosomes(
                        Chromosome::Real(v1),
                        Chromosome::Real(v2),
                        self.interval,
                    )
                })
            })
            .collect();

        if survivors.len() < 2 {
            return Vec::new();
        }
        let optimization = self.optimization;
        survivors
            .into_iter()
            .sorted_by(|a, b| optimization.compare(a.fitness, b.fitness))
            .take(2)
            .collect()
    }

    // mutation & inversion ------------------------------------------------

    pub fn mutate_all<R: RngCore>(&mut self, rng: &mut R, mutation: Mutation, probability: f64) {
        let mut members = std::mem::take(&mut self.members);
        for member in &mut members {
            if let Some(points) = mutation.flip_points() {
                self.multipoint_mutation(rng, member, points, probability);
            } else {
                match mutation {
                    Mutation::Boundary => self.boundary_mutation(rng, member, probability),
                    Mutation::Uniform => self.uniform_mutation(rng, member, probability),
                    Mutation::Gauss => self.gauss_mutation(rng, member, probability),
                    Mutation::SinglePoint | Mutation::TwoPoint => unreachable!(),
                }
            }
        }
        self.members = members;
    }

    pub fn invert_all<R: RngCore>(&mut self, rng: &mut R, probability: f64) {
        let mut members = std::mem::take(&mut self.members);
        for member in &mut members {
            self.inversion(rng, member, probability);
        }
        self.members = members;
    }

    /// Flips the first or the last bit, chosen at random on every draw.
    pub fn boundary_mutation<R: RngCore>(&self, rng: &mut R, member: &mut Member, probability: f64) {
        if !(0.0..=1.0).contains(&probability) {
            return;
        }
        let between = Uniform::from(0.0..1.0);
        for chromosome in [&mut member.x1, &mut member.x2] {
            if between.sample(rng) <= probability {
                let bits = chromosome.bits_mut();
                let index = if rng.gen_range(0..=1) == 1 { bits.len() - 1 } else { 0 };
                bits[index] ^= 1;
            }
        }
        member.update_fitness(self.interval);
    }

    /// `points` distinct positions are picked up front; a single gate decides
    /// whether the whole set flips.
    pub fn multipoint_mutation<R: RngCore>(
        &self,
        rng: &mut R,
        member: &mut Member,
        points: usize,
        probability: f64,
    ) {
        if !(0.0..=1.0).contains(&probability) {
            return;
        }
        let between = Uniform::from(0.0..1.0);
        for chromosome in [&mut member.x1, &mut member.x2] {
            let bits = chromosome.bits_mut();
            if points == 0 || points > bits.len().saturating_sub(1) {
                continue;
            }
            let positions = rand::seq::index::sample(rng, bits.len() - 1, points);
            if between.sample(rng) <= probability {
                for position in positions {
                    bits[position] ^= 1;
                }
            }
        }
        member.update_fitness(self.interval);
    }

    /// Complements every bit in the half-open range between two random cuts.
    pub fn inversion<R: RngCore>(&self, rng: &mut R, member: &mut Member, probability: f64) {
        if !(0.0..=1.0).contains(&probability) {
            return;
        }
        let between = Uniform::from(0.0..1.0);
        for chromosome in [&mut member.x1, &mut member.x2] {
            if between.sample(rng) <= probability {
                let bits = chromosome.bits_mut();
                if bits.len() < 3 {
                    continue;
                }
                let mut cuts = rand::seq::index::sample(rng, bits.len() - 1, 2).into_vec();
                cuts.sort_unstable();
                for i in cuts[0]..cuts[1] {
                    bits[i] = 1 - bits[i];
                }
            }
        }
        member.update_fitness(self.interval);
    }

    /// Resamples one randomly chosen component uniformly over the interval.
    pub fn uniform_mutation<R: RngCore>(&self, rng: &mut R, member: &mut Member, probability: f64) {
        if !(0.0..=1.0).contains(&probability) {
            return;
        }
        if Uniform::from(0.0..1.0).sample(rng) <= probability {
            let (lo, hi) = self.interval;
            let value = rng.gen_range(lo..=hi);
            if rng.gen_range(0..=1) == 1 {
                member.x2.set_value(value);
            } else {
                member.x1.set_value(value);
            }
        }
        member.update_fitness(self.interval);
    }

    /// Adds one standard-normal draw to both components at once; the shift is
    /// discarded unless both results stay inside the interval.
    pub fn gauss_mutation<R: RngCore>(&self, rng: &mut R, member: &mut Member, probability: f64) {
        if !(0.0..=1.0).contains(&probability) {
            return;
        }
        if Uniform::from(0.0..1.0).sample(rng) <= probability {
            let (lo, hi) = self.interval;
            let shift: f64 = StandardNormal.sample(rng);
            let v1 = member.x1.value() + shift;
            let v2 = member.x2.value() + shift;
            if (lo..=hi).contains(&v1) && (lo..=hi).contains(&v2) {
                member.x1.set_value(v1);
                member.x2.set_value(v2);
            }
        }
        member.update_fitness(self.interval);
    }
}
