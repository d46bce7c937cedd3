// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Boot partition switch through the top-swap bit.
//!
//! Bit 0 of the top-swap control register selects which redundant copy the
//! boot decode logic treats as authoritative: clear for the primary copy,
//! set for the backup copy. The switch only happens on explicit request.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::TargetCopy;

/// Top-swap enable bit.
pub const TOP_SWAP_BIT: u32 = 1 << 0;

/// Access to the 32-bit register holding the top-swap bit.
pub trait TopSwapRegister {
    fn read(&mut self) -> u32;
    fn write(&mut self, value: u32);
}

impl<T: TopSwapRegister + ?Sized> TopSwapRegister for &mut T {
    fn read(&mut self) -> u32 {
        (**self).read()
    }

    fn write(&mut self, value: u32) {
        (**self).write(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootPartition {
    Primary,
    Backup,
}

impl BootPartition {
    /// Partition that boots the given redundant copy.
    pub fn for_copy(copy: TargetCopy) -> Self {
        match copy {
            TargetCopy::A => BootPartition::Primary,
            TargetCopy::B => BootPartition::Backup,
        }
    }

    fn from_register(value: u32) -> Self {
        if value & TOP_SWAP_BIT != 0 {
            BootPartition::Backup
        } else {
            BootPartition::Primary
        }
    }
}

/// Partition the hardware currently boots from.
pub fn current_boot_partition<R: TopSwapRegister>(reg: &mut R) -> BootPartition {
    BootPartition::from_register(reg.read())
}

/// Make `target` the authoritative copy.
///
/// Read-modify-write of bit 0 followed by a read-back. Other register bits
/// are preserved. A read-back that does not reflect the requested state is
/// reported as `VerificationFailed`.
pub fn set_boot_partition<R: TopSwapRegister>(reg: &mut R, target: BootPartition) -> Result<()> {
    let mut value = reg.read();
    log::debug!("TopSwapReg=0x{:x} before switch to {:?}", value, target);

    match target {
        BootPartition::Backup => value |= TOP_SWAP_BIT,
        BootPartition::Primary => value &= !TOP_SWAP_BIT,
    }

    reg.write(value);
    log::debug!("Wrote TopSwapReg=0x{:x}", value);

    let readback = reg.read();
    log::info!("TopSwapReg read back 0x{:x}", readback);

    if BootPartition::from_register(readback) != target {
        log::error!(
            "Top swap switch to {:?} did not stick (wrote 0x{:x}, read 0x{:x})",
            target,
            value,
            readback
        );
        return Err(Error::VerificationFailed);
    }
    Ok(())
}
