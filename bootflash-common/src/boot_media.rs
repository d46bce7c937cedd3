// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Boot media service: erase/program/verify of plan regions.
//!
//! `BootMedia` owns the SPI flash driver. Constructing it runs the driver's
//! one-time initialization, so holding a `BootMedia` means the device is
//! ready; there is no global service handle. All offsets are relative to the
//! BIOS region.
//!
//! Each region is applied as:
//!   1. compare flash with the capsule bytes, skip if identical
//!   2. erase the destination range
//!   3. program the new bytes
//!   4. read back and compare CRC-32 with the source

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::capsule::Capsule;
use crate::error::{Error, Result};
use crate::plan::{Region, UpdatePlan};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Bytes moved per read or program call.
pub const TRANSFER_CHUNK_SIZE: usize = 4096;

/// SPI flash driver for the BIOS region.
///
/// Implementations report any bus or controller failure as
/// [`Error::DeviceError`].
pub trait SpiFlash {
    /// One-time controller setup.
    fn init(&mut self) -> Result<()>;
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()>;
    fn erase(&mut self, offset: u32, len: u32) -> Result<()>;
}

/// What happened to a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionOutcome {
    Written,
    Unchanged,
}

/// Summary of an applied plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub written: usize,
    pub unchanged: usize,
    pub bytes_written: u64,
}

/// Initialized SPI flash service.
pub struct BootMedia<S: SpiFlash> {
    spi: S,
}

impl<S: SpiFlash> BootMedia<S> {
    /// Initialize the driver and take ownership of it.
    pub fn new(mut spi: S) -> Result<Self> {
        spi.init()?;
        log::debug!("Boot media initialized");
        Ok(Self { spi })
    }

    pub fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        self.spi.read(offset, buf)
    }

    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.spi.write(offset, data)
    }

    pub fn erase(&mut self, offset: u32, len: u32) -> Result<()> {
        self.spi.erase(offset, len)
    }

    pub fn device(&self) -> &S {
        &self.spi
    }

    pub fn into_inner(self) -> S {
        self.spi
    }

    /// True when flash at `offset` already holds `data`.
    fn matches(&mut self, offset: u32, data: &[u8]) -> Result<bool> {
        let mut chunk = [0u8; TRANSFER_CHUNK_SIZE];
        let mut at = offset;
        for expected in data.chunks(TRANSFER_CHUNK_SIZE) {
            let buf = &mut chunk[..expected.len()];
            self.spi.read(at, buf)?;
            if buf != expected {
                return Ok(false);
            }
            at = next_offset(at, expected.len())?;
        }
        Ok(true)
    }

    /// CRC-32 of `size` flash bytes starting at `offset`.
    pub fn crc32(&mut self, offset: u32, size: u32) -> Result<u32> {
        let mut digest = CRC32.digest();
        let mut chunk = [0u8; TRANSFER_CHUNK_SIZE];
        let mut remaining = size as usize;
        let mut at = offset;

        while remaining > 0 {
            let n = remaining.min(chunk.len());
            self.spi.read(at, &mut chunk[..n])?;
            digest.update(&chunk[..n]);
            at = next_offset(at, n)?;
            remaining -= n;
        }

        Ok(digest.finalize())
    }

    /// Write one region from the capsule, skipping it when already current.
    ///
    /// `progress` receives the number of bytes handled by each step.
    pub fn apply_region(
        &mut self,
        region: &Region,
        capsule: &Capsule<'_>,
        mut progress: impl FnMut(u64),
    ) -> Result<RegionOutcome> {
        let source = capsule.slice(region.source, region.size)?;

        if self.matches(region.destination, source)? {
            log::info!(
                "{:?} region at 0x{:08x} already up to date",
                region.kind,
                region.destination
            );
            progress(region.size as u64);
            return Ok(RegionOutcome::Unchanged);
        }

        log::info!(
            "Updating {:?} region: 0x{:08x}..0x{:08x}",
            region.kind,
            region.destination,
            region.end()
        );

        self.spi.erase(region.destination, region.size)?;

        let mut at = region.destination;
        for chunk in source.chunks(TRANSFER_CHUNK_SIZE) {
            self.spi.write(at, chunk)?;
            at = next_offset(at, chunk.len())?;
            progress(chunk.len() as u64);
        }

        let expected = CRC32.checksum(source);
        let actual = self.crc32(region.destination, region.size)?;
        if actual != expected {
            log::error!(
                "CRC mismatch at 0x{:08x}: expected 0x{:08x}, got 0x{:08x}",
                region.destination,
                expected,
                actual
            );
            return Err(Error::VerificationFailed);
        }

        Ok(RegionOutcome::Written)
    }

    /// Apply every region of `plan` in order, stopping at the first error.
    pub fn apply_plan(
        &mut self,
        plan: &UpdatePlan,
        capsule: &Capsule<'_>,
        mut progress: impl FnMut(u64),
    ) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for region in plan {
            match self.apply_region(region, capsule, &mut progress)? {
                RegionOutcome::Written => {
                    report.written += 1;
                    report.bytes_written += region.size as u64;
                }
                RegionOutcome::Unchanged => report.unchanged += 1,
            }
        }

        log::info!(
            "Plan applied: {} written, {} unchanged",
            report.written,
            report.unchanged
        );
        Ok(report)
    }
}

fn next_offset(offset: u32, len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .ok_or(Error::InvalidArgument)
}
