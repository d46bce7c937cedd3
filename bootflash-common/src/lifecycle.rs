// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hooks around an update pass.
//!
//! A battery-backed byte tells the next boot whether a firmware update is
//! pending. It is advisory: failing to clear it must not block a boot.

use crate::error::Result;
use crate::plan::UpdatePlan;

/// Value written to the persistent flag to request update mode.
pub const FWU_BOOT_MODE_VALUE: u8 = 0x5A;

/// One persistent byte (CMOS index 0x40 on real hardware).
pub trait PersistentFlag {
    fn read(&mut self) -> u8;
    fn write(&mut self, value: u8);
}

impl<T: PersistentFlag + ?Sized> PersistentFlag for &mut T {
    fn read(&mut self) -> u8 {
        (**self).read()
    }

    fn write(&mut self, value: u8) {
        (**self).write(value)
    }
}

/// Platform extension points.
pub trait UpdateHooks {
    /// Called before any region is erased, e.g. to notify other firmware
    /// components that the boot media is about to change.
    fn prepare_regions_update(&mut self, _plan: &UpdatePlan) -> Result<()> {
        Ok(())
    }
}

impl<T: UpdateHooks + ?Sized> UpdateHooks for &mut T {
    fn prepare_regions_update(&mut self, plan: &UpdatePlan) -> Result<()> {
        (**self).prepare_regions_update(plan)
    }
}

/// Hooks with no platform behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl UpdateHooks for NoHooks {}

/// Ask the next boot to enter firmware update mode.
pub fn request_firmware_update<F: PersistentFlag>(flag: &mut F) {
    flag.write(FWU_BOOT_MODE_VALUE);
    log::info!("Firmware update requested (flag=0x{:x})", flag.read());
}

pub fn is_update_requested<F: PersistentFlag>(flag: &mut F) -> bool {
    flag.read() == FWU_BOOT_MODE_VALUE
}

/// Clear the pending-update flag after a completed update.
///
/// Never fails; a flag that refuses to clear is only logged.
pub fn end_firmware_update<F: PersistentFlag>(flag: &mut F) {
    log::info!("Firmware update done, clearing update flag for normal boot");

    let status = flag.read();
    if status == 0 {
        return;
    }

    flag.write(0);
    let after = flag.read();
    log::info!("Fw update trigger status 0x{:x} -> 0x{:x}", status, after);
    if after != 0 {
        log::warn!("Update flag still set (0x{:x}) after clear", after);
    }
}
