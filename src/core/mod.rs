// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for the core types of faqqer, located
// in the core subdirectory. It declares submodules and re-exports key types
// for use throughout the project.

pub mod types;
pub mod units;

// Re-export the most commonly used items
pub use types::{Args, HashRateSample, MediaRef, Message, MessageSequence, OutputFormat};
pub use units::{HashRateValueParser, ParsedRate, RateParse, UnitFamily, UnitQuantity};

// Changelog:
// - v1.1.0 (2026-08-20): Added the units module for hash rate token parsing.
