// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bot/mod.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// Tree Location:
// - src/bot/mod.rs (bot module entry point)
// - Submodules: commands, dispatcher

pub mod commands;
pub mod dispatcher;

pub use commands::{BotCommand, HELP_TEXT};
pub use dispatcher::{CommandHandler, Dispatcher, IncomingCommand, UpdateSource};
