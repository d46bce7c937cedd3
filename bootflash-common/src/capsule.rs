// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware management capsule image.
//!
//! The capsule is a fixed 40-byte image header followed by a byte-for-byte
//! mirror of the BIOS region, so a ROM offset `o` lives at capsule offset
//! `CAPSULE_IMAGE_HEADER_SIZE + o`.

use zerocopy::byteorder::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{Error, Result};

/// Header layout shared with the capsule producer.
#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Clone)]
pub struct CapsuleImageHeader {
    pub version: U32,
    pub update_image_type_id: [u8; 16],
    pub update_image_index: u8,
    pub reserved: [u8; 3],
    pub update_image_size: U32,
    pub update_vendor_code_size: U32,
    pub update_hardware_instance: U64,
}

pub const CAPSULE_IMAGE_HEADER_SIZE: usize = core::mem::size_of::<CapsuleImageHeader>();

const _: () = assert!(CAPSULE_IMAGE_HEADER_SIZE == 40);

const MIN_HEADER_VERSION: u32 = 1;
const MAX_HEADER_VERSION: u32 = 3;

impl CapsuleImageHeader {
    pub fn new(type_id: [u8; 16], index: u8, image_size: u32) -> Self {
        Self {
            version: U32::new(2),
            update_image_type_id: type_id,
            update_image_index: index,
            reserved: [0; 3],
            update_image_size: U32::new(image_size),
            update_vendor_code_size: U32::new(0),
            update_hardware_instance: U64::new(0),
        }
    }
}

/// A parsed capsule borrowing the caller's buffer.
#[derive(Clone, Debug)]
pub struct Capsule<'a> {
    bytes: &'a [u8],
    header: CapsuleImageHeader,
}

impl<'a> Capsule<'a> {
    /// Validate the header and wrap the buffer.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let Ok((header, _)) = CapsuleImageHeader::read_from_prefix(bytes) else {
            log::warn!("Capsule shorter than its header ({} bytes)", bytes.len());
            return Err(Error::InvalidCapsule);
        };

        let version = header.version.get();
        if !(MIN_HEADER_VERSION..=MAX_HEADER_VERSION).contains(&version) {
            log::warn!("Unsupported capsule header version {}", version);
            return Err(Error::InvalidCapsule);
        }

        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &CapsuleImageHeader {
        &self.header
    }

    pub fn header_size(&self) -> usize {
        CAPSULE_IMAGE_HEADER_SIZE
    }

    /// The whole buffer, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The BIOS region mirror that follows the header.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[CAPSULE_IMAGE_HEADER_SIZE..]
    }

    /// Bytes at `offset` (counted from the start of the buffer).
    pub fn slice(&self, offset: u64, size: u32) -> Result<&'a [u8]> {
        let start = usize::try_from(offset).map_err(|_| Error::InvalidArgument)?;
        let end = start
            .checked_add(size as usize)
            .ok_or(Error::InvalidArgument)?;
        self.bytes.get(start..end).ok_or_else(|| {
            log::warn!(
                "Capsule range 0x{:x}..0x{:x} beyond buffer of 0x{:x} bytes",
                start,
                end,
                self.bytes.len()
            );
            Error::InvalidArgument
        })
    }
}
