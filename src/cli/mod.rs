//! Command-line interface

pub mod commands;
pub mod config;
pub mod output;
pub mod shell;

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Run a sequence of programs.
///
/// Each program (except the first) receives the standard output of the
/// previous program on its standard input, by default. Steps can also turn
/// that output into extra arguments, or store it in a file.
#[derive(Debug, Parser, Clone)]
#[command(name = "pipeline")]
#[command(author = "Pipeline Contributors")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Keep running the pipeline after a step fails
    #[arg(short, long)]
    pub keep_going: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Don't record runs in the history database
    #[arg(long)]
    pub no_history: bool,

    /// Pipeline file to load at startup and write on `save`
    pub filename: PathBuf,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
