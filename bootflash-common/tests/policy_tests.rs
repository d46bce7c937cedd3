// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the update policy word.

use bootflash_common::policy::{
    FW_UPDATE_SM_DONE, FW_UPDATE_SM_INIT, FW_UPDATE_SM_PART_A, FW_UPDATE_SM_PART_AB,
    FW_UPDATE_SM_PART_B,
};
use bootflash_common::{StateMachinePhase, TargetCopy, UpdatePolicy};

#[test]
fn test_policy_decodes_partition_b_bit() {
    assert_eq!(UpdatePolicy::from_bits(0x100 | 0x7F).target, TargetCopy::B);
    assert_eq!(UpdatePolicy::from_bits(0x7F).target, TargetCopy::A);
}

#[test]
fn test_policy_decodes_phases() {
    assert_eq!(
        UpdatePolicy::from_bits(FW_UPDATE_SM_PART_A as u32).phase,
        StateMachinePhase::PartA
    );
    assert_eq!(
        UpdatePolicy::from_bits(FW_UPDATE_SM_PART_B as u32).phase,
        StateMachinePhase::PartB
    );
    assert_eq!(
        UpdatePolicy::from_bits(FW_UPDATE_SM_PART_AB as u32).phase,
        StateMachinePhase::Other(FW_UPDATE_SM_PART_AB)
    );
}

#[test]
fn test_policy_ignores_unused_bits() {
    let policy = UpdatePolicy::from_bits(0xFFFF_FE00 | FW_UPDATE_SM_PART_B as u32);
    assert_eq!(policy.target, TargetCopy::A);
    assert_eq!(policy.phase, StateMachinePhase::PartB);
}

#[test]
fn test_policy_bits_reencode() {
    for selector in [
        FW_UPDATE_SM_INIT,
        FW_UPDATE_SM_PART_A,
        FW_UPDATE_SM_PART_B,
        FW_UPDATE_SM_PART_AB,
        FW_UPDATE_SM_DONE,
    ] {
        for b in [0u32, 0x100] {
            let bits = b | selector as u32;
            assert_eq!(UpdatePolicy::from_bits(bits).bits(), bits);
        }
    }
}

#[test]
fn test_only_part_a_and_part_b_include_non_redundant() {
    assert!(StateMachinePhase::PartA.includes_non_redundant());
    assert!(StateMachinePhase::PartB.includes_non_redundant());
    assert!(!StateMachinePhase::Other(FW_UPDATE_SM_PART_AB).includes_non_redundant());
    assert!(!StateMachinePhase::Other(FW_UPDATE_SM_INIT).includes_non_redundant());
    assert!(!StateMachinePhase::default().includes_non_redundant());
}

#[test]
fn test_target_copy_toggle() {
    assert_eq!(TargetCopy::A.toggle(), TargetCopy::B);
    assert_eq!(TargetCopy::B.toggle(), TargetCopy::A);
}
