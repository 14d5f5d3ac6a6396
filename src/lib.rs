// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          list / select / env ..
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          manager          |
//!              |  state, selection, flush  |
//!              '--+-----------------+------'
//!                 |                 |
//!                 v                 v
//!              groups        persist worker
//!          model, migrate     (flume queue)
//!                 |                 |
//!                 +--------+--------+
//!                          v
//!                  store (JSON file, memory)
//!
//!   +-----------------------------------------+
//!   |  foundation   config, error, logging    |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod groups;
pub mod logging;
pub mod manager;
pub mod store;

#[cfg(test)]
mod test_utils;
