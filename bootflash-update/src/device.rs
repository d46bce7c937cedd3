// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! File-backed stand-ins for the flash part and the platform registers.
//!
//! The ROM image file plays the SPI flash (BIOS region). The top-swap
//! register and the CMOS update flag live in a small postcard-encoded state
//! file so their values survive between invocations, like the real hardware
//! survives reboots.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use bootflash_common::{Error, PersistentFlag, SpiFlash, TopSwapRegister};

/// ROM image file driven through the `SpiFlash` interface.
pub struct FileFlash {
    file: File,
    size: u32,
}

impl FileFlash {
    /// Open an existing ROM image for read/write.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open ROM image {}", path.display()))?;
        let len = file.metadata()?.len();
        let size = u32::try_from(len)
            .with_context(|| format!("ROM image {} is larger than 4 GiB", path.display()))?;
        Ok(Self { file, size })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn check_range(&self, offset: u32, len: usize) -> bootflash_common::Result<()> {
        let end = offset as u64 + len as u64;
        if end > self.size as u64 {
            log::error!(
                "Access 0x{:x}..0x{:x} beyond ROM image of 0x{:x} bytes",
                offset,
                end,
                self.size
            );
            return Err(Error::DeviceError);
        }
        Ok(())
    }

    fn seek(&mut self, offset: u32) -> bootflash_common::Result<()> {
        self.file
            .seek(SeekFrom::Start(offset as u64))
            .map(|_| ())
            .map_err(device_error)
    }
}

fn device_error(e: std::io::Error) -> Error {
    log::error!("ROM image I/O error: {}", e);
    Error::DeviceError
}

impl SpiFlash for FileFlash {
    fn init(&mut self) -> bootflash_common::Result<()> {
        log::debug!("ROM image: 0x{:x} bytes", self.size);
        Ok(())
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> bootflash_common::Result<()> {
        self.check_range(offset, buf.len())?;
        self.seek(offset)?;
        self.file.read_exact(buf).map_err(device_error)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> bootflash_common::Result<()> {
        self.check_range(offset, data.len())?;
        self.seek(offset)?;
        self.file.write_all(data).map_err(device_error)
    }

    fn erase(&mut self, offset: u32, len: u32) -> bootflash_common::Result<()> {
        self.check_range(offset, len as usize)?;
        self.seek(offset)?;
        let blank = [0xFFu8; 4096];
        let mut remaining = len as usize;
        while remaining > 0 {
            let n = remaining.min(blank.len());
            self.file.write_all(&blank[..n]).map_err(device_error)?;
            remaining -= n;
        }
        Ok(())
    }
}

/// Simulated top-swap control register.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimRegister(pub u32);

impl TopSwapRegister for SimRegister {
    fn read(&mut self) -> u32 {
        self.0
    }

    fn write(&mut self, value: u32) {
        self.0 = value;
    }
}

/// Simulated CMOS update flag byte.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimCmos(pub u8);

impl PersistentFlag for SimCmos {
    fn read(&mut self) -> u8 {
        self.0
    }

    fn write(&mut self, value: u8) {
        self.0 = value;
    }
}

/// Persistent platform state.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub top_swap_register: SimRegister,
    pub cmos_flag: SimCmos,
}

impl DeviceState {
    /// Load the state file; a missing file means power-on defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read state {}", path.display()))
            }
        };
        postcard::from_bytes(&bytes)
            .map_err(|e| anyhow::anyhow!("Failed to decode state {}: {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = postcard::to_allocvec(self)
            .map_err(|e| anyhow::anyhow!("Failed to encode state: {}", e))?;
        fs::write(path, bytes).with_context(|| format!("Failed to write state {}", path.display()))
    }
}

/// Read a whole input file, refusing empty ones.
pub fn read_input(path: &Path, what: &str) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {} {}", what, path.display()))?;
    if bytes.is_empty() {
        bail!("{} {} is empty", what, path.display());
    }
    Ok(bytes)
}
