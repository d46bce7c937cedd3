// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host tool for top-swap boot flash updates against a ROM image.
//!
//! Usage:
//!   bootflash-update plan -m flashmap.bin -c capsule.bin --phase part-a
//!   bootflash-update apply -m flashmap.bin -c capsule.bin -r rom.bin -s state.bin --partition-b
//!   bootflash-update locate -m flashmap.bin -c capsule.bin --component SG1A --backup
//!   bootflash-update status -s state.bin

mod cli;
mod commands;
mod device;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    cli::run(args)
}
