// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Locate a component's new image inside the capsule.
//!
//! The flash map gives the component's absolute base; converting it to a ROM
//! offset and skipping the capsule header yields where the replacement bytes
//! sit in the capsule buffer.

use crate::capsule::Capsule;
use crate::error::{Error, Result};
use crate::flash_map::{FlashMap, Signature, SIG_STAGE1A};

/// Where a component lives, both in flash and in the capsule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentLocation {
    /// Offset within the BIOS region.
    pub rom_offset: u32,
    /// Offset from the start of the capsule buffer (header included).
    pub capsule_offset: u64,
    pub size: u32,
    /// True when the backup copy was requested but the primary was used.
    pub fell_back: bool,
}

impl ComponentLocation {
    /// Absolute address of the component in a capsule loaded at
    /// `capsule_base`.
    pub fn address(&self, capsule_base: u64) -> Result<u64> {
        capsule_base
            .checked_add(self.capsule_offset)
            .ok_or(Error::InvalidArgument)
    }

    /// The component's bytes inside `capsule`.
    pub fn bytes<'a>(&self, capsule: &Capsule<'a>) -> Result<&'a [u8]> {
        capsule.slice(self.capsule_offset, self.size)
    }
}

/// Find `signature` in the flash map and translate it into capsule terms.
///
/// When the backup copy is requested but the map has none, the primary copy
/// is used instead (single-copy layouts).
pub fn locate_component(
    map: &FlashMap,
    header_size: usize,
    signature: u32,
    backup: bool,
) -> Result<ComponentLocation> {
    let mut fell_back = false;
    let info = match map.component_info(signature, backup) {
        Err(Error::NotFound) if backup => {
            fell_back = true;
            map.component_info(signature, false)
        }
        other => other,
    };

    let info = info.map_err(|e| {
        log::error!(
            "Could not get component {} information from flash map",
            Signature(signature)
        );
        e
    })?;

    let rom_offset = map.rom_offset(info.base)?;
    let capsule_offset = (header_size as u64)
        .checked_add(rom_offset as u64)
        .ok_or(Error::InvalidArgument)?;

    log::debug!(
        "Component {} ({}): base 0x{:x} -> ROM offset 0x{:08x}, capsule offset 0x{:x}, size 0x{:x}",
        Signature(signature),
        if backup { "backup" } else { "primary" },
        info.base,
        rom_offset,
        capsule_offset,
        info.size
    );

    Ok(ComponentLocation {
        rom_offset,
        capsule_offset,
        size: info.size,
        fell_back,
    })
}

/// Stage 1A image location in the capsule.
pub fn locate_stage1a(map: &FlashMap, header_size: usize, backup: bool) -> Result<ComponentLocation> {
    locate_component(map, header_size, SIG_STAGE1A, backup)
}
