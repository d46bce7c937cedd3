// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One complete update pass over the capability traits.
//!
//! Sequence:
//! - build the plan for the policy
//! - platform prepare hook
//! - erase/program/verify every region
//! - switch the top-swap bit to the copy just written
//! - clear the pending-update flag
//!
//! Any failure before the switch leaves the boot partition untouched.

use crate::boot_media::{ApplyReport, BootMedia, SpiFlash};
use crate::capsule::Capsule;
use crate::error::Result;
use crate::flash_map::FlashMap;
use crate::lifecycle::{end_firmware_update, PersistentFlag, UpdateHooks};
use crate::partition::{set_boot_partition, BootPartition, TopSwapRegister};
use crate::plan::UpdatePlan;
use crate::policy::UpdatePolicy;

/// Outcome of a successful pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateReport {
    pub plan: UpdatePlan,
    pub apply: ApplyReport,
    pub partition: BootPartition,
}

/// Platform collaborators for an update pass.
pub struct UpdateSession<'a, S: SpiFlash, R, F, H> {
    pub media: &'a mut BootMedia<S>,
    pub register: R,
    pub flag: F,
    pub hooks: H,
}

impl<'a, S, R, F, H> UpdateSession<'a, S, R, F, H>
where
    S: SpiFlash,
    R: TopSwapRegister,
    F: PersistentFlag,
    H: UpdateHooks,
{
    pub fn new(media: &'a mut BootMedia<S>, register: R, flag: F, hooks: H) -> Self {
        Self {
            media,
            register,
            flag,
            hooks,
        }
    }

    /// Run the pass described by `policy`.
    pub fn run(
        &mut self,
        capsule: &Capsule<'_>,
        map: &FlashMap,
        policy: UpdatePolicy,
        progress: impl FnMut(u64),
    ) -> Result<UpdateReport> {
        log::info!(
            "Starting update: copy {:?}, phase {:?} (policy 0x{:x})",
            policy.target,
            policy.phase,
            policy.bits()
        );

        let plan = UpdatePlan::for_flash_map(map, capsule.header_size(), policy)?;
        self.hooks.prepare_regions_update(&plan)?;

        let apply = self.media.apply_plan(&plan, capsule, progress)?;

        let partition = BootPartition::for_copy(policy.target);
        set_boot_partition(&mut self.register, partition)?;

        end_firmware_update(&mut self.flag);

        Ok(UpdateReport {
            plan,
            apply,
            partition,
        })
    }
}

/// Convenience wrapper around [`UpdateSession::run`].
pub fn run_update<S, R, F, H>(
    session: &mut UpdateSession<'_, S, R, F, H>,
    capsule: &Capsule<'_>,
    map: &FlashMap,
    policy: UpdatePolicy,
) -> Result<UpdateReport>
where
    S: SpiFlash,
    R: TopSwapRegister,
    F: PersistentFlag,
    H: UpdateHooks,
{
    session.run(capsule, map, policy, |_| {})
}
