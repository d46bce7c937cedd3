// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Update plan: the list of (destination, size, source) writes for one pass.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flash_map::FlashMap;
use crate::layout::{compute_layout, RegionLayout};
use crate::policy::UpdatePolicy;

/// Top-swap, redundant and (phase permitting) non-redundant.
pub const MAX_UPDATE_REGIONS: usize = 3;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    TopSwap,
    Redundant,
    NonRedundant,
}

/// One contiguous write.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    /// ROM-relative offset to write at.
    pub destination: u32,
    pub size: u32,
    /// Offset of the new contents inside the capsule buffer.
    pub source: u64,
}

impl Region {
    /// One past the last destination byte.
    pub fn end(&self) -> u64 {
        self.destination as u64 + self.size as u64
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        (self.destination as u64) < other.end() && (other.destination as u64) < self.end()
    }
}

/// Ordered regions for a single update pass. Built fresh per attempt.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    regions: Vec<Region, MAX_UPDATE_REGIONS>,
}

impl UpdatePlan {
    /// Compute the layout from the flash map and build the plan for `policy`.
    pub fn for_flash_map(map: &FlashMap, header_size: usize, policy: UpdatePolicy) -> Result<Self> {
        let layout = compute_layout(map.rom_size(), map.region_sizes()?, policy.target)?;
        build_plan(header_size, policy, &layout)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn region(&self, kind: RegionKind) -> Option<&Region> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    /// Total bytes the plan writes.
    pub fn total_size(&self) -> u64 {
        self.regions.iter().map(|r| r.size as u64).sum()
    }

    fn push(&mut self, region: Region) -> Result<()> {
        self.regions.push(region).map_err(|_| Error::LayoutOverflow)
    }
}

impl<'a> IntoIterator for &'a UpdatePlan {
    type Item = &'a Region;
    type IntoIter = core::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

fn make_region(kind: RegionKind, destination: u32, size: u32, header_size: usize) -> Result<Region> {
    let source = (header_size as u64)
        .checked_add(destination as u64)
        .ok_or(Error::LayoutOverflow)?;
    Ok(Region {
        kind,
        destination,
        size,
        source,
    })
}

/// Build the plan for one pass from a computed layout.
///
/// Top-swap and redundant regions are always written; the non-redundant
/// region only in the `PartA`/`PartB` phases.
pub fn build_plan(header_size: usize, policy: UpdatePolicy, layout: &RegionLayout) -> Result<UpdatePlan> {
    if layout.target != policy.target {
        log::warn!(
            "Layout computed for copy {:?}, policy targets {:?}",
            layout.target,
            policy.target
        );
        return Err(Error::InvalidArgument);
    }

    let sizes = layout.sizes;
    let mut plan = UpdatePlan::default();

    plan.push(make_region(
        RegionKind::TopSwap,
        layout.top_swap_offset,
        sizes.top_swap,
        header_size,
    )?)?;
    plan.push(make_region(
        RegionKind::Redundant,
        layout.redundant_offset,
        sizes.redundant,
        header_size,
    )?)?;
    if policy.phase.includes_non_redundant() {
        plan.push(make_region(
            RegionKind::NonRedundant,
            layout.non_redundant_offset,
            sizes.non_redundant,
            header_size,
        )?)?;
    }

    // Hand-built layouts get the same guarantees as computed ones
    for (i, region) in plan.iter().enumerate() {
        if region.end() > layout.rom_size as u64 {
            return Err(Error::LayoutOverflow);
        }
        if plan.regions[..i].iter().any(|prev| prev.overlaps(region)) {
            return Err(Error::LayoutOverflow);
        }
    }

    for (idx, region) in plan.iter().enumerate() {
        log::info!(
            "Region {} ({:?}): ToUpdateAddress=0x{:08x} UpdateSize=0x{:08x} SourceOffset=0x{:08x}",
            idx,
            region.kind,
            region.destination,
            region.size,
            region.source
        );
    }

    Ok(plan)
}
