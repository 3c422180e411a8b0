//! Configuration loading and the pre-flight quality gate.

pub mod config;
pub mod gate;
