// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for update operations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};

use bootflash_common::flash_map::Signature;
use bootflash_common::lifecycle::{is_update_requested, request_firmware_update, NoHooks};
use bootflash_common::partition::current_boot_partition;
use bootflash_common::{
    end_firmware_update, locate_component, set_boot_partition, BootMedia, BootPartition, Capsule,
    FlashMap, UpdatePlan, UpdatePolicy, UpdateSession,
};

use crate::cli::Inputs;
use crate::device::{read_input, DeviceState, FileFlash};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Parsed flash map plus the raw capsule bytes.
struct Loaded {
    map: FlashMap,
    capsule: Vec<u8>,
}

fn load(inputs: &Inputs) -> Result<Loaded> {
    let blob = read_input(&inputs.flash_map, "flash map")?;
    let map = FlashMap::parse(&blob)
        .with_context(|| format!("Invalid flash map {}", inputs.flash_map.display()))?;
    let capsule = read_input(&inputs.capsule, "capsule")?;
    Ok(Loaded { map, capsule })
}

fn parse_capsule<'a>(bytes: &'a [u8], path: &Path) -> Result<Capsule<'a>> {
    Capsule::parse(bytes).with_context(|| format!("Invalid capsule {}", path.display()))
}

fn print_plan(plan: &UpdatePlan) {
    println!("  {:<14} {:>12} {:>12} {:>12}", "Region", "Flash", "Size", "Capsule");
    for region in plan {
        println!(
            "  {:<14} {:>#12x} {:>#12x} {:>#12x}",
            format!("{:?}", region.kind),
            region.destination,
            region.size,
            region.source
        );
    }
    println!("  Total: {} bytes", plan.total_size());
}

fn partition_name(partition: BootPartition) -> &'static str {
    match partition {
        BootPartition::Primary => "primary",
        BootPartition::Backup => "backup",
    }
}

/// Print the regions an update pass would write.
pub fn plan(inputs: &Inputs, policy: UpdatePolicy) -> Result<()> {
    let loaded = load(inputs)?;
    let capsule = parse_capsule(&loaded.capsule, &inputs.capsule)?;
    let plan = UpdatePlan::for_flash_map(&loaded.map, capsule.header_size(), policy)
        .context("Failed to build update plan")?;

    println!(
        "Policy:   0x{:08x} (copy {:?}, phase {:?})",
        policy.bits(),
        policy.target,
        policy.phase
    );
    println!("ROM size: 0x{:x}", loaded.map.rom_size());
    println!();
    print_plan(&plan);

    Ok(())
}

/// Find a component inside the capsule.
pub fn locate(inputs: &Inputs, component: &str, backup: bool, capsule_base: u64) -> Result<()> {
    let Some(signature) = Signature::parse(component) else {
        bail!("Invalid component signature '{}' (expected 4 ASCII characters)", component);
    };

    let loaded = load(inputs)?;
    let capsule = parse_capsule(&loaded.capsule, &inputs.capsule)?;
    let location = locate_component(&loaded.map, capsule.header_size(), signature.0, backup)
        .with_context(|| format!("Failed to locate {}", signature))?;
    let bytes = location
        .bytes(&capsule)
        .with_context(|| format!("{} lies outside the capsule", signature))?;

    println!("Component: {}{}", signature, if backup { " (backup)" } else { "" });
    if location.fell_back {
        println!("  No backup copy in flash map, using primary");
    }
    println!("  ROM offset:     0x{:08x}", location.rom_offset);
    println!("  Capsule offset: 0x{:x}", location.capsule_offset);
    println!("  Address:        0x{:x}", location.address(capsule_base)?);
    println!("  Size:           0x{:x}", location.size);
    println!("  CRC32:          0x{:08x}", CRC32.checksum(bytes));

    Ok(())
}

/// Write the update into a ROM image, then switch partition and clear the flag.
pub fn apply(inputs: &Inputs, policy: UpdatePolicy, rom: &Path, state_path: &Path) -> Result<()> {
    let loaded = load(inputs)?;
    let capsule = parse_capsule(&loaded.capsule, &inputs.capsule)?;

    let flash = FileFlash::open(rom)?;
    if flash.size() != loaded.map.rom_size() {
        bail!(
            "ROM image is 0x{:x} bytes but the flash map describes 0x{:x}",
            flash.size(),
            loaded.map.rom_size()
        );
    }

    println!(
        "Capsule: {} ({} bytes, CRC32: 0x{:08x})",
        inputs.capsule.display(),
        loaded.capsule.len(),
        CRC32.checksum(&loaded.capsule)
    );
    println!("Target:  {}", rom.display());
    println!(
        "Policy:  0x{:08x} (copy {:?}, phase {:?})",
        policy.bits(),
        policy.target,
        policy.phase
    );
    println!();

    let plan = UpdatePlan::for_flash_map(&loaded.map, capsule.header_size(), policy)
        .context("Failed to build update plan")?;

    let mut state = DeviceState::load(state_path)?;
    let mut media = BootMedia::new(flash).context("Failed to initialize boot media")?;

    let pb = ProgressBar::new(plan.total_size());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let result = {
        let mut session = UpdateSession::new(
            &mut media,
            &mut state.top_swap_register,
            &mut state.cmos_flag,
            NoHooks,
        );
        session.run(&capsule, &loaded.map, policy, |n| pb.inc(n))
    };

    let report = match result {
        Ok(report) => {
            pb.finish_with_message("Update complete");
            report
        }
        Err(e) => {
            pb.abandon();
            // keep whatever register/flag changes happened before the failure
            state.save(state_path)?;
            return Err(e).context("Update failed");
        }
    };
    state.save(state_path)?;

    println!();
    print_plan(&report.plan);
    println!();
    println!(
        "Regions written: {}, unchanged: {} ({} bytes written)",
        report.apply.written, report.apply.unchanged, report.apply.bytes_written
    );
    println!("Boot partition:  {}", partition_name(report.partition));

    Ok(())
}

/// Flip the top-swap bit.
pub fn switch(state_path: &Path, partition: BootPartition) -> Result<()> {
    let mut state = DeviceState::load(state_path)?;
    let before = current_boot_partition(&mut state.top_swap_register);

    set_boot_partition(&mut state.top_swap_register, partition)
        .context("Failed to switch boot partition")?;
    state.save(state_path)?;

    println!(
        "Boot partition: {} -> {} (register 0x{:08x})",
        partition_name(before),
        partition_name(partition),
        state.top_swap_register.0
    );
    Ok(())
}

/// Set the pending-update flag.
pub fn request(state_path: &Path) -> Result<()> {
    let mut state = DeviceState::load(state_path)?;
    request_firmware_update(&mut state.cmos_flag);
    state.save(state_path)?;

    println!("Firmware update requested (flag 0x{:02x})", state.cmos_flag.0);
    Ok(())
}

/// Clear the pending-update flag.
pub fn finish(state_path: &Path) -> Result<()> {
    let mut state = DeviceState::load(state_path)?;
    end_firmware_update(&mut state.cmos_flag);
    state.save(state_path)?;

    println!("Update flag cleared (flag 0x{:02x})", state.cmos_flag.0);
    Ok(())
}

/// Show register and flag state.
pub fn status(state_path: &Path) -> Result<()> {
    let mut state = DeviceState::load(state_path)?;
    let partition = current_boot_partition(&mut state.top_swap_register);

    println!("Platform Status:");
    println!("  Top-swap register: 0x{:08x}", state.top_swap_register.0);
    println!("  Boot partition:    {}", partition_name(partition));
    println!("  Update flag:       0x{:02x}", state.cmos_flag.0);
    println!(
        "  Update pending:    {}",
        if is_update_requested(&mut state.cmos_flag) {
            "yes"
        } else {
            "no"
        }
    );

    Ok(())
}
