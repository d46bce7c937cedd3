// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error type shared by every update operation.

use core::fmt;

/// Failure kinds reported by the planner and its collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Flash map lookup missed (after the backup -> primary fallback).
    NotFound,
    /// An argument or address fell outside what the operation accepts.
    InvalidArgument,
    /// The computed region layout would not fit in the ROM.
    LayoutOverflow,
    /// A flash, register or CMOS collaborator failed.
    DeviceError,
    /// Data read back after a write did not match what was written.
    VerificationFailed,
    /// The flash map blob is malformed.
    InvalidFlashMap,
    /// The capsule buffer is too short or carries an unknown header.
    InvalidCapsule,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::NotFound => "component not found in flash map",
            Error::InvalidArgument => "invalid argument",
            Error::LayoutOverflow => "region layout exceeds ROM size",
            Error::DeviceError => "boot media device error",
            Error::VerificationFailed => "read-back verification failed",
            Error::InvalidFlashMap => "malformed flash map",
            Error::InvalidCapsule => "malformed capsule image",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}
