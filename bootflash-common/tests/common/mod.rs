// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Fakes and fixtures shared by the integration tests.

#![allow(dead_code)]

use bootflash_common::capsule::{CapsuleImageHeader, CAPSULE_IMAGE_HEADER_SIZE};
use bootflash_common::flash_map::{
    FlashMap, FlashMapEntry, FLAG_BACKUP, FLAG_NON_REDUNDANT_REGION, FLAG_REDUNDANT_REGION,
    FLAG_TOP_SWAP, SIG_STAGE1A, SIG_STAGE1B, SIG_STAGE2,
};
use bootflash_common::{Error, PersistentFlag, Result, SpiFlash, TopSwapRegister};
use zerocopy::IntoBytes;

// Small layout: 64 KiB ROM, 4 KiB top swap, 8 KiB redundant, 16 KiB non-redundant
pub const ROM_SIZE: u32 = 0x1_0000;
pub const TOP_SWAP_SIZE: u32 = 0x1000;
pub const REDUNDANT_SIZE: u32 = 0x2000;
pub const NON_REDUNDANT_SIZE: u32 = 0x4000;

pub const STAGE1A_OFFSET: u32 = 0xF000;
pub const STAGE1A_BACKUP_OFFSET: u32 = 0xE000;
pub const STAGE1B_OFFSET: u32 = 0xC000;
pub const STAGE1B_BACKUP_OFFSET: u32 = 0xA000;
pub const STAGE2_OFFSET: u32 = 0x6000;

/// Flash map matching the small layout, with backup copies for the
/// redundant components and a single-copy Stage 2.
pub fn make_flash_map() -> FlashMap {
    FlashMap::new(ROM_SIZE)
        .and_then(|m| {
            m.with_entry(FlashMapEntry::new(
                SIG_STAGE1A,
                FLAG_TOP_SWAP,
                STAGE1A_OFFSET,
                TOP_SWAP_SIZE,
            ))
        })
        .and_then(|m| {
            m.with_entry(FlashMapEntry::new(
                SIG_STAGE1A,
                FLAG_TOP_SWAP | FLAG_BACKUP,
                STAGE1A_BACKUP_OFFSET,
                TOP_SWAP_SIZE,
            ))
        })
        .and_then(|m| {
            m.with_entry(FlashMapEntry::new(
                SIG_STAGE1B,
                FLAG_REDUNDANT_REGION,
                STAGE1B_OFFSET,
                REDUNDANT_SIZE,
            ))
        })
        .and_then(|m| {
            m.with_entry(FlashMapEntry::new(
                SIG_STAGE1B,
                FLAG_REDUNDANT_REGION | FLAG_BACKUP,
                STAGE1B_BACKUP_OFFSET,
                REDUNDANT_SIZE,
            ))
        })
        .and_then(|m| {
            m.with_entry(FlashMapEntry::new(
                SIG_STAGE2,
                FLAG_NON_REDUNDANT_REGION,
                STAGE2_OFFSET,
                NON_REDUNDANT_SIZE,
            ))
        })
        .unwrap()
}

/// Capsule whose payload byte at ROM offset `o` is `pattern(o)`.
pub fn make_capsule(rom_size: u32) -> Vec<u8> {
    let header = CapsuleImageHeader::new([0x11; 16], 1, rom_size);
    let mut capsule = Vec::with_capacity(CAPSULE_IMAGE_HEADER_SIZE + rom_size as usize);
    capsule.extend_from_slice(header.as_bytes());
    capsule.extend((0..rom_size).map(pattern));
    capsule
}

pub fn pattern(offset: u32) -> u8 {
    (offset >> 4) as u8 ^ (offset as u8).wrapping_mul(7)
}

/// RAM-backed NOR flash: erase sets 0xFF, programming can only clear bits.
pub struct FakeSpi {
    pub data: Vec<u8>,
    pub init_count: u32,
    pub erase_calls: Vec<(u32, u32)>,
    pub write_bytes: u64,
    pub fail_erase: bool,
    pub fail_read: bool,
    /// Bits forced low on every programmed byte (simulates a bad cell).
    pub stuck_low: u8,
}

impl FakeSpi {
    pub fn new(size: u32) -> Self {
        Self {
            data: vec![0xFF; size as usize],
            init_count: 0,
            erase_calls: Vec::new(),
            write_bytes: 0,
            fail_erase: false,
            fail_read: false,
            stuck_low: 0,
        }
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>> {
        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(Error::DeviceError);
        }
        Ok(start..end)
    }
}

impl SpiFlash for FakeSpi {
    fn init(&mut self) -> Result<()> {
        self.init_count += 1;
        Ok(())
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail_read {
            return Err(Error::DeviceError);
        }
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        let range = self.range(offset, data.len())?;
        for (cell, byte) in self.data[range].iter_mut().zip(data) {
            *cell &= *byte & !self.stuck_low;
        }
        self.write_bytes += data.len() as u64;
        Ok(())
    }

    fn erase(&mut self, offset: u32, len: u32) -> Result<()> {
        if self.fail_erase {
            return Err(Error::DeviceError);
        }
        let range = self.range(offset, len as usize)?;
        self.data[range].fill(0xFF);
        self.erase_calls.push((offset, len));
        Ok(())
    }
}

/// Top-swap register with optional bits that ignore writes.
#[derive(Default)]
pub struct FakeRegister {
    pub value: u32,
    pub writes: u32,
    /// Bits that keep their old value regardless of what is written.
    pub frozen: u32,
}

impl FakeRegister {
    pub fn with_value(value: u32) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

impl TopSwapRegister for FakeRegister {
    fn read(&mut self) -> u32 {
        self.value
    }

    fn write(&mut self, value: u32) {
        self.writes += 1;
        self.value = (self.value & self.frozen) | (value & !self.frozen);
    }
}

/// CMOS byte fake.
#[derive(Default)]
pub struct FakeFlag {
    pub value: u8,
    pub writes: u32,
    pub read_only: bool,
}

impl FakeFlag {
    pub fn with_value(value: u8) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

impl PersistentFlag for FakeFlag {
    fn read(&mut self) -> u8 {
        self.value
    }

    fn write(&mut self, value: u8) {
        self.writes += 1;
        if !self.read_only {
            self.value = value;
        }
    }
}
