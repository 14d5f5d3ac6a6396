// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for envgroups using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! envgroups [global options] <command>
//! list
//! current
//! show <id>
//! select <id>
//! env [id]
//! options
//! inis
//! version
//! ```

pub mod global;


use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Environment Group Manager
///
/// Switches between named sets of environment variables stored in a JSON
/// settings document.
#[derive(Debug, Parser)]
#[command(
    name = "envgroups",
    author,
    version,
    about = "Environment Group Manager",
    long_about = "envgroups Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Manages named environment groups stored in a settings document.\n\n\
                  `envgroups list` shows every group, `envgroups select <id>` makes\n\
                  a group active and writes its variables to the document's `env`\n\
                  field. See `envgroups <command> --help` for more information.",
    after_help = "INI FILES:\n\n\
                  By default, envgroups looks for `envgroups.toml` in the current\n\
                  directory. Additional INIs can be specified with --ini, those are\n\
                  loaded after the default one. Use --no-default-inis to disable\n\
                  auto detection and only use --ini. ENVGROUPS_SECTION__KEY\n\
                  environment variables override INI values."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values from the INIs.
    Options,

    /// Lists the INIs used by envgroups.
    Inis,

    /// Lists all environment groups.
    List,

    /// Shows the active environment group.
    Current,

    /// Shows the variables of one group.
    Show {
        /// Group id
        id: String,
    },

    /// Makes a group active and saves the selection.
    Select {
        /// Group id
        id: String,
    },

    /// Prints variables as `KEY=VALUE` lines.
    Env {
        /// Group id, defaults to the active group
        id: Option<String>,
    },
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
