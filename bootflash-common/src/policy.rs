// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware update policy word.
//!
//! The update driver hands the planner a 32-bit policy:
//! bits 0..=7 select the update state machine phase and bit 8 selects the
//! redundant copy being written.

use serde::{Deserialize, Serialize};

// --- State machine selector values ---

pub const FW_UPDATE_SM_INIT: u8 = 0xFF;
pub const FW_UPDATE_SM_PART_A: u8 = 0x7F;
pub const FW_UPDATE_SM_PART_B: u8 = 0x7E;
pub const FW_UPDATE_SM_PART_AB: u8 = 0x7D;
pub const FW_UPDATE_SM_DONE: u8 = 0x77;

const STATE_MACHINE_MASK: u32 = 0xFF;
const UPDATE_PARTITION_B: u32 = 1 << 8;

/// Which redundant copy is being written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCopy {
    #[default]
    A,
    B,
}

impl TargetCopy {
    /// The other copy.
    pub fn toggle(self) -> Self {
        match self {
            TargetCopy::A => TargetCopy::B,
            TargetCopy::B => TargetCopy::A,
        }
    }
}

/// Update state machine phase.
///
/// Only `PartA` and `PartB` bring the non-redundant region into scope.
/// Every other selector is carried verbatim in `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateMachinePhase {
    PartA,
    PartB,
    Other(u8),
}

impl StateMachinePhase {
    pub fn from_selector(selector: u8) -> Self {
        match selector {
            FW_UPDATE_SM_PART_A => StateMachinePhase::PartA,
            FW_UPDATE_SM_PART_B => StateMachinePhase::PartB,
            other => StateMachinePhase::Other(other),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            StateMachinePhase::PartA => FW_UPDATE_SM_PART_A,
            StateMachinePhase::PartB => FW_UPDATE_SM_PART_B,
            StateMachinePhase::Other(selector) => selector,
        }
    }

    /// Whether this pass rewrites the shared non-redundant region.
    pub fn includes_non_redundant(self) -> bool {
        matches!(self, StateMachinePhase::PartA | StateMachinePhase::PartB)
    }
}

impl Default for StateMachinePhase {
    fn default() -> Self {
        StateMachinePhase::Other(FW_UPDATE_SM_INIT)
    }
}

/// Immutable policy for one update attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePolicy {
    pub target: TargetCopy,
    pub phase: StateMachinePhase,
}

impl UpdatePolicy {
    pub fn new(target: TargetCopy, phase: StateMachinePhase) -> Self {
        Self { target, phase }
    }

    /// Decode the policy word. Unused bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        let target = if bits & UPDATE_PARTITION_B != 0 {
            TargetCopy::B
        } else {
            TargetCopy::A
        };
        Self {
            target,
            phase: StateMachinePhase::from_selector((bits & STATE_MACHINE_MASK) as u8),
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = self.phase.selector() as u32;
        if self.target == TargetCopy::B {
            bits |= UPDATE_PARTITION_B;
        }
        bits
    }
}
