// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for utility functions in faqqer,
// located in the utils subdirectory. It declares submodules for shared utility
// logic used across the project.
//
// Tree Location:
// - src/utils/mod.rs (utils module entry point)
// - Submodules: format, atomic_file

pub mod atomic_file;
pub mod format;

pub use atomic_file::{AtomicFileError, write_atomic};
pub use format::FormatUtils;

// Changelog:
// - v1.1.0 (2026-08-12): Added atomic_file.
// - v1.0.0 (2026-07-01): Initial utils module with the format submodule.
