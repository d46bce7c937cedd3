// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the top-swap partition switch.

mod common;

use bootflash_common::partition::{current_boot_partition, TOP_SWAP_BIT};
use bootflash_common::{set_boot_partition, BootPartition, Error, TargetCopy};

use common::*;

#[test]
fn test_switch_to_backup_sets_bit0() {
    let mut reg = FakeRegister::default();
    set_boot_partition(&mut reg, BootPartition::Backup).unwrap();
    assert_eq!(reg.value, TOP_SWAP_BIT);
    assert_eq!(current_boot_partition(&mut reg), BootPartition::Backup);
}

#[test]
fn test_switch_to_primary_clears_bit0() {
    let mut reg = FakeRegister::with_value(0x1);
    set_boot_partition(&mut reg, BootPartition::Primary).unwrap();
    assert_eq!(reg.value, 0);
    assert_eq!(current_boot_partition(&mut reg), BootPartition::Primary);
}

#[test]
fn test_switch_preserves_other_bits() {
    let mut reg = FakeRegister::with_value(0xA5A5_0000);
    set_boot_partition(&mut reg, BootPartition::Backup).unwrap();
    assert_eq!(reg.value, 0xA5A5_0001);
    set_boot_partition(&mut reg, BootPartition::Primary).unwrap();
    assert_eq!(reg.value, 0xA5A5_0000);
}

#[test]
fn test_switch_is_idempotent() {
    let mut reg = FakeRegister::with_value(0x10);
    set_boot_partition(&mut reg, BootPartition::Backup).unwrap();
    let after_first = reg.value;
    set_boot_partition(&mut reg, BootPartition::Backup).unwrap();
    assert_eq!(reg.value, after_first);
    assert_eq!(reg.value & TOP_SWAP_BIT, TOP_SWAP_BIT);
}

#[test]
fn test_switch_reports_stuck_bit() {
    let mut reg = FakeRegister {
        frozen: TOP_SWAP_BIT,
        ..FakeRegister::default()
    };
    assert_eq!(
        set_boot_partition(&mut reg, BootPartition::Backup),
        Err(Error::VerificationFailed)
    );
    assert_eq!(reg.writes, 1);
    assert_eq!(current_boot_partition(&mut reg), BootPartition::Primary);
}

#[test]
fn test_stuck_bit_already_in_target_state_is_fine() {
    let mut reg = FakeRegister {
        value: TOP_SWAP_BIT,
        frozen: TOP_SWAP_BIT,
        ..FakeRegister::default()
    };
    assert_eq!(set_boot_partition(&mut reg, BootPartition::Backup), Ok(()));
}

#[test]
fn test_partition_for_copy() {
    assert_eq!(BootPartition::for_copy(TargetCopy::A), BootPartition::Primary);
    assert_eq!(BootPartition::for_copy(TargetCopy::B), BootPartition::Backup);
}
