// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use bootflash_common::policy::{
    FW_UPDATE_SM_DONE, FW_UPDATE_SM_INIT, FW_UPDATE_SM_PART_A, FW_UPDATE_SM_PART_AB,
    FW_UPDATE_SM_PART_B,
};
use bootflash_common::{BootPartition, StateMachinePhase, TargetCopy, UpdatePolicy};

use crate::commands;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "bootflash-update")]
#[command(about = "Plan and apply top-swap firmware updates to a flash image")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flash map and capsule inputs.
#[derive(Args)]
pub struct Inputs {
    /// Flash map blob (FLMP)
    #[arg(short = 'm', long, value_name = "FILE")]
    pub flash_map: PathBuf,

    /// Capsule image (header followed by the BIOS region mirror)
    #[arg(short, long, value_name = "FILE")]
    pub capsule: PathBuf,
}

/// Update state machine phase names.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Phase {
    Init,
    PartA,
    PartB,
    PartAb,
    Done,
}

impl Phase {
    fn selector(self) -> u8 {
        match self {
            Phase::Init => FW_UPDATE_SM_INIT,
            Phase::PartA => FW_UPDATE_SM_PART_A,
            Phase::PartB => FW_UPDATE_SM_PART_B,
            Phase::PartAb => FW_UPDATE_SM_PART_AB,
            Phase::Done => FW_UPDATE_SM_DONE,
        }
    }
}

/// Policy selection, either as a raw word or as separate fields.
#[derive(Args)]
pub struct PolicyArgs {
    /// Raw 32-bit policy word (e.g. 0x17F); overrides the options below
    #[arg(long, value_name = "WORD", value_parser = parse_u32)]
    pub policy: Option<u32>,

    /// Write redundant copy B instead of copy A
    #[arg(short = 'b', long)]
    pub partition_b: bool,

    /// Update state machine phase
    #[arg(long, value_enum, default_value = "part-a")]
    pub phase: Phase,
}

impl PolicyArgs {
    pub fn policy(&self) -> UpdatePolicy {
        if let Some(bits) = self.policy {
            return UpdatePolicy::from_bits(bits);
        }
        let target = if self.partition_b {
            TargetCopy::B
        } else {
            TargetCopy::A
        };
        UpdatePolicy::new(target, StateMachinePhase::from_selector(self.phase.selector()))
    }
}

/// Boot partition names.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Partition {
    Primary,
    Backup,
}

impl From<Partition> for BootPartition {
    fn from(p: Partition) -> Self {
        match p {
            Partition::Primary => BootPartition::Primary,
            Partition::Backup => BootPartition::Backup,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the update plan for a policy
    Plan {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Locate a component's image inside the capsule
    Locate {
        #[command(flatten)]
        inputs: Inputs,

        /// Component signature (e.g. SG1A)
        #[arg(long, default_value = "SG1A")]
        component: String,

        /// Look up the backup copy (falls back to primary)
        #[arg(long)]
        backup: bool,

        /// Address the capsule is loaded at
        #[arg(long, value_parser = parse_u64, default_value = "0")]
        capsule_base: u64,
    },

    /// Apply the update to a ROM image, then switch partition and clear the flag
    Apply {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// ROM image standing in for the flash part
        #[arg(short, long, value_name = "FILE")]
        rom: PathBuf,

        /// Simulated register/CMOS state file
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Set the boot partition (top-swap bit)
    Switch {
        /// Simulated register/CMOS state file
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(value_enum)]
        partition: Partition,
    },

    /// Request firmware update mode on next boot
    Request {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Clear the pending-update flag
    Finish {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Show the simulated register and flag state
    Status {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },
}

fn parse_u32(s: &str) -> std::result::Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{} does not fit in 32 bits", s))
}

fn parse_u64(s: &str) -> std::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan { inputs, policy } => commands::plan(&inputs, policy.policy()),
        Commands::Locate {
            inputs,
            component,
            backup,
            capsule_base,
        } => commands::locate(&inputs, &component, backup, capsule_base),
        Commands::Apply {
            inputs,
            policy,
            rom,
            state,
        } => commands::apply(&inputs, policy.policy(), &rom, &state),
        Commands::Switch { state, partition } => commands::switch(&state, partition.into()),
        Commands::Request { state } => commands::request(&state),
        Commands::Finish { state } => commands::finish(&state),
        Commands::Status { state } => commands::status(&state),
    }
}
