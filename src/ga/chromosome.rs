use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

pub fn binary_length(interval: (f64, f64), precision: u32) -> usize {
    let (lo, hi) = interval;
    ((hi - lo) * 10f64.powi(precision as i32)).log2().ceil() as usize
}

/// One decision variable. The variants never mix: bit operators on a `Real`
/// (or scalar operators on a `Binary`) panic outright.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Chromosome {
    Binary(Vec<u8>),
    Real(f64),
}

impl Chromosome {
    pub fn random_binary<R: RngCore>(rng: &mut R, interval: (f64, f64), precision: u32) -> Chromosome {
        let bits = (0..binary_length(interval, precision))
            .map(|_| rng.gen_range(0..=1u8))
            .collect();
        Chromosome::Binary(bits)
    }

    pub fn random_real<R: RngCore>(rng: &mut R, interval: (f64, f64)) -> Chromosome {
        Chromosome::Real(rng.gen_range(interval.0..=interval.1))
    }

    /// Nearest bit pattern for `value`, the inverse of `decode`.
    pub fn encode(value: f64, interval: (f64, f64), precision: u32) -> Chromosome {
        let (lo, hi) = interval;
        let length = binary_length(interval, precision);
        let steps = 2f64.powi(length as i32) - 1.0;
        let index = ((value - lo) / (hi - lo) * steps).round() as u64;
        let bits = (0..length).rev().map(|i| ((index >> i) & 1) as u8).collect();
        Chromosome::Binary(bits)
    }

    pub fn decode(&self, interval: (f64, f64)) -> f64 {
        let (lo, hi) = interval;
        match self {
            Chromosome::Binary(bits) => {
                let int_value = bits.iter().fold(0u64, |acc, &bit| (acc << 1) | bit as u64);
                let steps = 2f64.powi(bits.len() as i32) - 1.0;
                lo + int_value as f64 * (hi - lo) / steps
            }
            Chromosome::Real(value) => *value,
        }
    }

    pub fn bits(&self) -> &[u8] {
        match self {
            Chromosome::Binary(bits) => bits,
            Chromosome::Real(_) => panic!("Tried to read bits of a real-valued chromosome"),
        }
    }

    pub fn bits_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Chromosome::Binary(bits) => bits,
            Chromosome::Real(_) => panic!("Tried to mutate bits of a real-valued chromosome"),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Chromosome::Real(value) => *value,
            Chromosome::Binary(_) => panic!("Tried to read the scalar of a bit-encoded chromosome"),
        }
    }

    pub fn set_value(&mut self, new_value: f64) {
        match self {
            Chromosome::Real(value) => *value = new_value,
            Chromosome::Binary(_) => panic!("Tried to assign a scalar to a bit-encoded chromosome"),
        }
    }

    pub fn in_bounds(&self, interval: (f64, f64)) -> bool {
        let (lo, hi) = interval;
        match self {
            // decode can never leave the interval, bits only index into it
            Chromosome::Binary(_) => true,
            Chromosome::Real(value) => (lo..=hi).contains(value),
        }
    }
}
