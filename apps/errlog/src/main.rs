//! # stride-errlog
//!
//! Operator CLI over the persisted enrollment error journal: list, inspect, summarize and
//! clear entries, classify raw failure payloads and print the retry schedule.

mod args;
mod commands;

use crate::args::{Cli, Command};
use crate::commands::Context as CommandContext;
use anyhow::{Context, Result};
use clap::Parser;
use stride_kernel::config::load_stride_config;
use stride_logger::Logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_stride_config(cli.global.config.as_deref())
        .context("Critical: Configuration is malformed")?;
    if cli.global.verbose {
        cfg.logging.console = true;
        "debug".clone_into(&mut cfg.logging.level);
    } else {
        cfg.logging.console = false;
    }

    let _log = if cfg.logging.console || cfg.logging.dir.is_some() {
        Some(Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?)
    } else {
        None
    };

    let ctx = CommandContext::open(&cfg, &cli.global)?;

    match cli.command {
        Command::List { limit, category, step } => {
            commands::list(&ctx, limit, category, step.as_deref())?;
        },
        Command::Show { id } => commands::show(&ctx, &id)?,
        Command::Stats {} => commands::stats(&ctx)?,
        Command::Clear {} => commands::clear(&ctx)?,
        Command::Classify { json, record } => commands::classify(&ctx, &json, record.as_deref())?,
        Command::Schedule {} => commands::schedule(&ctx, &cfg)?,
    }

    Ok(())
}
