// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Region layout of the BIOS area.
//!
//! The physical order, from the top of the ROM down, is fixed:
//!
//! ```text
//!  +-------------------------+  <- rom_size
//!  |        Top Swap         |
//!  +-------------------------+
//!  |     Top Swap Backup     |
//!  +-------------------------+
//!  |    Redundant Region     |
//!  +-------------------------+
//!  | Redundant Region Backup |
//!  +-------------------------+
//!  |  Non Redundant Region   |
//!  +-------------------------+
//! ```
//!
//! Firmware reads the copies back at exactly these offsets after a switch, so
//! the order must not change.

use crate::error::{Error, Result};
use crate::flash_map::RegionSizes;
use crate::policy::TargetCopy;

/// Offsets of the three regions for one target copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionLayout {
    pub target: TargetCopy,
    pub rom_size: u32,
    pub sizes: RegionSizes,
    pub top_swap_offset: u32,
    pub redundant_offset: u32,
    pub non_redundant_offset: u32,
}

/// Compute the region offsets for `target`.
///
/// Fails with `LayoutOverflow` for an empty region or when both redundant
/// pairs plus the non-redundant region exceed the ROM.
pub fn compute_layout(rom_size: u32, sizes: RegionSizes, target: TargetCopy) -> Result<RegionLayout> {
    if sizes.top_swap == 0 || sizes.redundant == 0 || sizes.non_redundant == 0 {
        log::warn!("Empty region in layout: {:?}", sizes);
        return Err(Error::LayoutOverflow);
    }

    let top_swap = sizes.top_swap as u64;
    let redundant = sizes.redundant as u64;
    let non_redundant = sizes.non_redundant as u64;
    let rom = rom_size as u64;

    let required = 2 * (top_swap + redundant) + non_redundant;
    if required > rom {
        log::warn!(
            "Regions need 0x{:x} bytes, ROM has 0x{:x}",
            required,
            rom
        );
        return Err(Error::LayoutOverflow);
    }

    let non_redundant_offset = rom - required;
    let mut top_swap_offset = rom - top_swap;
    let mut redundant_offset = top_swap_offset - top_swap - redundant;

    if target == TargetCopy::B {
        top_swap_offset -= top_swap;
        redundant_offset -= redundant;
    }

    // all offsets are below rom_size, which is a u32
    let layout = RegionLayout {
        target,
        rom_size,
        sizes,
        top_swap_offset: top_swap_offset as u32,
        redundant_offset: redundant_offset as u32,
        non_redundant_offset: non_redundant_offset as u32,
    };

    log::info!(
        "TopSwapRegion      Offset/Size = 0x{:08X}/0x{:X}",
        layout.top_swap_offset,
        sizes.top_swap
    );
    log::info!(
        "RedundantRegion    Offset/Size = 0x{:08X}/0x{:X}",
        layout.redundant_offset,
        sizes.redundant
    );
    log::info!(
        "NonRedundantRegion Offset/Size = 0x{:08X}/0x{:X}",
        layout.non_redundant_offset,
        sizes.non_redundant
    );

    Ok(layout)
}
