// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! x86 PCH backends for the top-swap register and the CMOS update flag.
//!
//! The top-swap bit lives in the RTC "backed up control" register, reached
//! through the PCH private configuration register (PCR) MMIO window:
//!   address = PCR base | (port id << 16) | register offset
//!
//! The update flag is CMOS byte 0x40, accessed through the RTC index/data
//! port pair.

use core::arch::asm;

use crate::lifecycle::PersistentFlag;
use crate::partition::TopSwapRegister;

pub const PCH_PCR_BASE_ADDRESS: u32 = 0xFD00_0000;
pub const PID_RTC_HOST: u8 = 0xC3;
pub const R_RTC_PCR_BUC: u16 = 0x3414;

pub const CMOS_ADDREG: u16 = 0x70;
pub const CMOS_DATAREG: u16 = 0x71;
pub const FWU_BOOT_MODE_OFFSET: u8 = 0x40;

/// MMIO address of a PCH private configuration register.
pub const fn pch_pcr_address(pid: u8, offset: u16) -> u32 {
    PCH_PCR_BASE_ADDRESS | ((pid as u32) << 16) | offset as u32
}

/// Top-swap control in the RTC BUC register.
pub struct PchTopSwap {
    addr: *mut u32,
}

impl PchTopSwap {
    /// # Safety
    /// The PCR MMIO window must be mapped at [`PCH_PCR_BASE_ADDRESS`] and no
    /// other code may access the BUC register while this value is alive.
    pub unsafe fn new() -> Self {
        Self {
            addr: pch_pcr_address(PID_RTC_HOST, R_RTC_PCR_BUC) as usize as *mut u32,
        }
    }
}

impl TopSwapRegister for PchTopSwap {
    fn read(&mut self) -> u32 {
        unsafe { self.addr.read_volatile() }
    }

    fn write(&mut self, value: u32) {
        unsafe { self.addr.write_volatile(value) }
    }
}

unsafe fn outb(port: u16, value: u8) {
    asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
}

unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
    value
}

/// Battery-backed CMOS byte used as the pending-update flag.
pub struct CmosFlag {
    index: u8,
}

impl CmosFlag {
    /// # Safety
    /// Caller must have I/O privilege for ports 0x70/0x71 and exclusive use
    /// of the RTC index register.
    pub unsafe fn new() -> Self {
        Self::at(FWU_BOOT_MODE_OFFSET)
    }

    /// # Safety
    /// Same requirements as [`CmosFlag::new`].
    pub unsafe fn at(index: u8) -> Self {
        Self { index }
    }
}

impl PersistentFlag for CmosFlag {
    fn read(&mut self) -> u8 {
        unsafe {
            outb(CMOS_ADDREG, self.index);
            inb(CMOS_DATAREG)
        }
    }

    fn write(&mut self, value: u8) {
        unsafe {
            outb(CMOS_ADDREG, self.index);
            outb(CMOS_DATAREG, value);
        }
    }
}
