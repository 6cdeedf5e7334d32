use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::chromosome::binary_length;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Binary,
    Real,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimization {
    Maximize,
    Minimize,
}

impl Optimization {
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Optimization::Maximize => a > b,
            Optimization::Minimize => a < b,
        }
    }

    /// Puts the better fitness first when sorting.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Optimization::Maximize => b.total_cmp(&a),
            Optimization::Minimize => a.total_cmp(&b),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Best { percentage: f64 },
    RouletteWheel { percentage: f64 },
    Tournament { size: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    SinglePoint,
    TwoPoint,
    ThreePoint,
    Homogeneous,
    Arithmetic,
    BlendAlpha { alpha: f64 },
    BlendAlphaBeta { alpha: f64, beta: f64 },
    Average,
    Linear,
}

impl Crossover {
    pub fn cut_points(self) -> Option<usize> {
        match self {
            Crossover::SinglePoint => Some(1),
            Crossover::TwoPoint => Some(2),
            Crossover::ThreePoint => Some(3),
            _ => None,
        }
    }

    fn required_representation(self) -> Representation {
        match self {
            Crossover::SinglePoint
            | Crossover::TwoPoint
            | Crossover::ThreePoint
            | Crossover::Homogeneous => Representation::Binary,
            Crossover::Arithmetic
            | Crossover::BlendAlpha { .. }
            | Crossover::BlendAlphaBeta { .. }
            | Crossover::Average
            | Crossover::Linear => Representation::Real,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Boundary,
    SinglePoint,
    TwoPoint,
    Uniform,
    Gauss,
}

impl Mutation {
    pub fn flip_points(self) -> Option<usize> {
        match self {
            Mutation::SinglePoint => Some(1),
            Mutation::TwoPoint => Some(2),
            _ => None,
        }
    }

    fn required_representation(self) -> Representation {
        match self {
            Mutation::Boundary | Mutation::SinglePoint | Mutation::TwoPoint => {
                Representation::Binary
            }
            Mutation::Uniform | Mutation::Gauss => Representation::Real,
        }
    }
}

/// One run's hyperparameters. Probabilities and percentages are deliberately
/// not range-checked: an out-of-range value turns the affected operator into
/// a silent no-op instead of failing the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub interval: (f64, f64),
    /// decimal digits of resolution, binary representation only
    pub precision: u32,
    pub population_size: usize,
    pub epochs: usize,
    pub optimization: Optimization,
    pub selection: Selection,
    pub crossover: Crossover,
    pub crossover_probability: f64,
    pub mutation: Mutation,
    pub mutation_probability: f64,
    pub inversion_probability: f64,
    pub elite_percentage: f64,
    pub representation: Representation,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("interval [{lo}, {hi}] is empty")]
    EmptyInterval { lo: f64, hi: f64 },
    #[error("binary precision must be between 1 and 15 decimal digits, got {0}")]
    PrecisionOutOfRange(u32),
    #[error("the interval and precision encode to {0} bits, supported range is 3 to 63")]
    BitLengthOutOfRange(usize),
    #[error("population needs at least two members, got {0}")]
    PopulationTooSmall(usize),
    #[error("at least one epoch is required")]
    NoEpochs,
    #[error("tournament size must be at least 1")]
    ZeroTournamentSize,
    #[error("blend expansion factors must be non-negative")]
    NegativeBlendFactor,
    #[error("{operator} applies only to the {required:?} representation")]
    RepresentationMismatch {
        operator: &'static str,
        required: Representation,
    },
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = self.interval;
        if !(lo < hi) {
            return Err(ConfigError::EmptyInterval { lo, hi });
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.epochs == 0 {
            return Err(ConfigError::NoEpochs);
        }
        if self.representation == Representation::Binary {
            if !(1..=15).contains(&self.precision) {
                return Err(ConfigError::PrecisionOutOfRange(self.precision));
            }
            // the lower bound leaves room for two distinct interior cut
            // points, the upper keeps the decoded integer inside a u64
            let length = binary_length(self.interval, self.precision);
            if !(3..=63).contains(&length) {
                return Err(ConfigError::BitLengthOutOfRange(length));
            }
        }
        if let Selection::Tournament { size } = self.selection {
            if size == 0 {
                return Err(ConfigError::ZeroTournamentSize);
            }
        }
        match self.crossover {
            Crossover::BlendAlpha { alpha } if alpha < 0.0 => {
                return Err(ConfigError::NegativeBlendFactor);
            }
            Crossover::BlendAlphaBeta { alpha, beta } if alpha < 0.0 || beta < 0.0 => {
                return Err(ConfigError::NegativeBlendFactor);
            }
            _ => {}
        }
        if self.crossover.required_representation() != self.representation {
            return Err(ConfigError::RepresentationMismatch {
                operator: "crossover",
                required: self.crossover.required_representation(),
            });
        }
        if self.mutation.required_representation() != self.representation {
            return Err(ConfigError::RepresentationMismatch {
                operator: "mutation",
                required: self.mutation.required_representation(),
            });
        }
        if self.inversion_probability > 0.0 && self.representation != Representation::Binary {
            return Err(ConfigError::RepresentationMismatch {
                operator: "inversion",
                required: Representation::Binary,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_config() -> Config {
        Config {
            interval: (-10.0, 10.0),
            precision: 6,
            population_size: 10,
            epochs: 5,
            optimization: Optimization::Minimize,
            selection: Selection::Best { percentage: 50.0 },
            crossover: Crossover::SinglePoint,
            crossover_probability: 0.9,
            mutation: Mutation::Boundary,
            mutation_probability: 0.1,
            inversion_probability: 0.05,
            elite_percentage: 10.0,
            representation: Representation::Binary,
        }
    }

    #[test]
    fn valid_binary_config_passes() {
        assert_eq!(binary_config().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_interval() {
        let mut config = binary_config();
        config.interval = (10.0, -10.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyInterval { lo: 10.0, hi: -10.0 })
        );
    }

    #[test]
    fn rejects_an_interval_too_narrow_to_encode() {
        // 0.3 * 10^1 distinct states fit in 2 bits, too short to cut twice
        let mut config = binary_config();
        config.interval = (0.0, 0.3);
        config.precision = 1;
        assert_eq!(config.validate(), Err(ConfigError::BitLengthOutOfRange(2)));
    }

    #[test]
    fn rejects_an_encoding_wider_than_a_machine_word() {
        let mut config = binary_config();
        config.interval = (-10_000.0, 10_000.0);
        config.precision = 15;
        assert_eq!(config.validate(), Err(ConfigError::BitLengthOutOfRange(65)));
    }

    #[test]
    fn rejects_real_operator_under_binary_representation() {
        let mut config = binary_config();
        config.crossover = Crossover::Average;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RepresentationMismatch {
                operator: "crossover",
                required: Representation::Real,
            })
        );
    }

    #[test]
    fn rejects_inversion_under_real_representation() {
        let mut config = binary_config();
        config.representation = Representation::Real;
        config.crossover = Crossover::Arithmetic;
        config.mutation = Mutation::Uniform;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RepresentationMismatch {
                operator: "inversion",
                required: Representation::Binary,
            })
        );
        config.inversion_probability = 0.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_binary_mutation_under_real_representation() {
        let mut config = binary_config();
        config.representation = Representation::Real;
        config.crossover = Crossover::Linear;
        config.inversion_probability = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RepresentationMismatch {
                operator: "mutation",
                required: Representation::Binary,
            })
        );
    }

    #[test]
    fn rejects_negative_blend_factor() {
        let mut config = binary_config();
        config.representation = Representation::Real;
        config.crossover = Crossover::BlendAlphaBeta { alpha: 0.3, beta: -0.1 };
        config.mutation = Mutation::Gauss;
        config.inversion_probability = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NegativeBlendFactor));
    }

    #[test]
    fn out_of_range_probabilities_are_not_rejected() {
        // these values degrade to operator no-ops at runtime by design
        let mut config = binary_config();
        config.mutation_probability = 7.0;
        config.elite_percentage = 250.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn direction_aware_ordering() {
        assert!(Optimization::Minimize.is_better(1.0, 2.0));
        assert!(Optimization::Maximize.is_better(2.0, 1.0));
        assert_eq!(
            Optimization::Minimize.compare(1.0, 2.0),
            std::cmp::Ordering::Less
        );
        assert_eq!(
            Optimization::Maximize.compare(1.0, 2.0),
            std::cmp::Ordering::Greater
        );
    }

    #[test]
    fn multipoint_families_expose_their_point_counts() {
        assert_eq!(Crossover::SinglePoint.cut_points(), Some(1));
        assert_eq!(Crossover::ThreePoint.cut_points(), Some(3));
        assert_eq!(Crossover::Homogeneous.cut_points(), None);
        assert_eq!(Mutation::TwoPoint.flip_points(), Some(2));
        assert_eq!(Mutation::Gauss.flip_points(), None);
    }
}
