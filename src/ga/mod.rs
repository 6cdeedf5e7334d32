pub mod chromosome;
pub mod config;
pub mod engine;
pub mod member;
pub mod population;
pub mod stats;
