//! fit benchmarking suite
//!
//! Benchmarks for the digest engine, the store codec and the snapshot save
//! pass.

pub mod common;

pub use common::*;
