//! Synthetic dataset generation for stress testing and benchmarks.

pub mod generator;
