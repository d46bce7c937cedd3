// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and logic for top-swap boot flash updates.
//!
//! This crate supports both `no_std` (firmware) and `std` (host) environments:
//! - Default: `no_std` mode for pre-boot firmware
//! - `std` feature: Enables `std` support for host tools
//! - `hw` feature: Enables x86 PCH register and CMOS backends
//!
//! Everything except [`platform`] is pure logic over the capability traits
//! ([`SpiFlash`], [`TopSwapRegister`], [`PersistentFlag`]), so it can be
//! exercised on the host against fakes.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod boot_media;
pub mod capsule;
pub mod error;
pub mod flash_map;
pub mod layout;
pub mod lifecycle;
pub mod locator;
pub mod partition;
pub mod plan;
pub mod policy;
pub mod update;

// x86 register and CMOS access (requires hw feature)
#[cfg(all(feature = "hw", any(target_arch = "x86", target_arch = "x86_64")))]
pub mod platform;

// Re-export commonly used types
pub use boot_media::{BootMedia, SpiFlash};
pub use capsule::{Capsule, CapsuleImageHeader, CAPSULE_IMAGE_HEADER_SIZE};
pub use error::{Error, Result};
pub use flash_map::{ComponentInfo, FlashMap, RegionSizes, TOP_ADDRESS};
pub use layout::{compute_layout, RegionLayout};
pub use lifecycle::{end_firmware_update, PersistentFlag, UpdateHooks};
pub use locator::{locate_component, ComponentLocation};
pub use partition::{set_boot_partition, BootPartition, TopSwapRegister};
pub use plan::{build_plan, Region, RegionKind, UpdatePlan, MAX_UPDATE_REGIONS};
pub use policy::{StateMachinePhase, TargetCopy, UpdatePolicy};
pub use update::{run_update, UpdateReport, UpdateSession};
