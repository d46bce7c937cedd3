// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash map parsing and component lookup.
//!
//! The platform flash map (`FLMP`) is a small little-endian table that
//! describes where every boot component lives in the BIOS region:
//!
//! ```text
//! header (16 bytes): signature 'FLMP', version u8, reserved u8, length u16,
//!                    attributes u32, rom_size u32
//! entry  (16 bytes): signature u32, flags u32, offset u32, size u32
//! ```
//!
//! Entry offsets are ROM-relative. Lookups hand out hardware-native absolute
//! addresses (the ROM is decoded right below [`TOP_ADDRESS`]), which
//! [`FlashMap::rom_offset`] converts back.

use core::fmt;

use heapless::Vec;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{Error, Result};

/// The flash part is decoded so that its last byte sits right below 4 GiB.
pub const TOP_ADDRESS: u64 = 0x1_0000_0000;

/// Maximum number of entries a flash map may carry.
pub const MAX_FLASH_MAP_ENTRIES: usize = 32;

/// Build a component signature from its four ASCII characters.
pub const fn signature(tag: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*tag)
}

pub const FLASH_MAP_SIGNATURE: u32 = signature(b"FLMP");

pub const SIG_STAGE1A: u32 = signature(b"SG1A");
pub const SIG_STAGE1B: u32 = signature(b"SG1B");
pub const SIG_STAGE2: u32 = signature(b"SG02");
pub const SIG_CFGDATA: u32 = signature(b"CNFG");
pub const SIG_FWUPDATE: u32 = signature(b"FWUP");
pub const SIG_PAYLOAD: u32 = signature(b"PYLD");
pub const SIG_VARIABLE: u32 = signature(b"VARS");
pub const SIG_MRCDATA: u32 = signature(b"MRCD");
pub const SIG_UCODE: u32 = signature(b"UCOD");
pub const SIG_ACM: u32 = signature(b"ACM0");
pub const SIG_EPAYLOAD: u32 = signature(b"EPLD");
pub const SIG_BLANK: u32 = signature(b"EMTY");

// --- Entry flags ---

pub const FLAG_TOP_SWAP: u32 = 1 << 0;
pub const FLAG_REDUNDANT_REGION: u32 = 1 << 1;
pub const FLAG_NON_REDUNDANT_REGION: u32 = 1 << 2;
pub const FLAG_NON_VOLATILE: u32 = 1 << 3;
pub const FLAG_BACKUP: u32 = 1 << 4;

#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Clone)]
struct RawHeader {
    signature: U32,
    version: u8,
    reserved: u8,
    length: U16,
    attributes: U32,
    rom_size: U32,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug, Clone)]
struct RawEntry {
    signature: U32,
    flags: U32,
    offset: U32,
    size: U32,
}

pub const FLASH_MAP_HEADER_SIZE: usize = core::mem::size_of::<RawHeader>();
pub const FLASH_MAP_ENTRY_SIZE: usize = core::mem::size_of::<RawEntry>();

const _: () = assert!(FLASH_MAP_HEADER_SIZE == 16);
const _: () = assert!(FLASH_MAP_ENTRY_SIZE == 16);

/// Displays a signature as its four characters (`SG1A`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub u32);

impl Signature {
    /// Parse a four character tag such as `"SG1A"`.
    pub fn parse(tag: &str) -> Option<Self> {
        let bytes: [u8; 4] = tag.as_bytes().try_into().ok()?;
        if !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        Some(Self(signature(&bytes)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.to_le_bytes() {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// One component descriptor of the flash map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashMapEntry {
    pub signature: u32,
    pub flags: u32,
    /// ROM-relative offset.
    pub offset: u32,
    pub size: u32,
}

impl FlashMapEntry {
    pub fn new(signature: u32, flags: u32, offset: u32, size: u32) -> Self {
        Self {
            signature,
            flags,
            offset,
            size,
        }
    }

    pub fn is_backup(&self) -> bool {
        self.flags & FLAG_BACKUP != 0
    }
}

/// Location of a component copy in absolute (hardware-native) form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    pub base: u64,
    pub size: u32,
}

/// Aggregate sizes of the three update regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionSizes {
    pub top_swap: u32,
    pub redundant: u32,
    pub non_redundant: u32,
}

/// Immutable flash geometry: ROM size plus the component table.
#[derive(Clone, Debug)]
pub struct FlashMap {
    rom_size: u32,
    entries: Vec<FlashMapEntry, MAX_FLASH_MAP_ENTRIES>,
}

impl FlashMap {
    /// Create an empty map for a ROM of `rom_size` bytes.
    pub fn new(rom_size: u32) -> Result<Self> {
        if rom_size == 0 {
            return Err(Error::InvalidFlashMap);
        }
        Ok(Self {
            rom_size,
            entries: Vec::new(),
        })
    }

    /// Add an entry, rejecting ones that fall outside the ROM.
    pub fn push(&mut self, entry: FlashMapEntry) -> Result<()> {
        let end = entry.offset as u64 + entry.size as u64;
        if end > self.rom_size as u64 {
            log::warn!(
                "Flash map entry {} at 0x{:08x}/0x{:x} exceeds ROM size 0x{:x}",
                Signature(entry.signature),
                entry.offset,
                entry.size,
                self.rom_size
            );
            return Err(Error::InvalidFlashMap);
        }
        self.entries.push(entry).map_err(|_| Error::InvalidFlashMap)
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_entry(mut self, entry: FlashMapEntry) -> Result<Self> {
        self.push(entry)?;
        Ok(self)
    }

    /// Parse a `FLMP` blob.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Ok((header, _)) = RawHeader::read_from_prefix(bytes) else {
            log::warn!("Flash map shorter than its header ({} bytes)", bytes.len());
            return Err(Error::InvalidFlashMap);
        };

        if header.signature.get() != FLASH_MAP_SIGNATURE {
            log::warn!(
                "Bad flash map signature {}",
                Signature(header.signature.get())
            );
            return Err(Error::InvalidFlashMap);
        }

        let length = header.length.get() as usize;
        if length < FLASH_MAP_HEADER_SIZE
            || length > bytes.len()
            || (length - FLASH_MAP_HEADER_SIZE) % FLASH_MAP_ENTRY_SIZE != 0
        {
            log::warn!(
                "Bad flash map length {} (buffer {} bytes)",
                length,
                bytes.len()
            );
            return Err(Error::InvalidFlashMap);
        }

        let mut map = Self::new(header.rom_size.get())?;
        let mut remaining = &bytes[FLASH_MAP_HEADER_SIZE..length];
        while !remaining.is_empty() {
            let Ok((raw, rest)) = RawEntry::read_from_prefix(remaining) else {
                return Err(Error::InvalidFlashMap);
            };
            map.push(FlashMapEntry {
                signature: raw.signature.get(),
                flags: raw.flags.get(),
                offset: raw.offset.get(),
                size: raw.size.get(),
            })?;
            remaining = rest;
        }

        log::debug!(
            "Flash map: ROM size 0x{:x}, {} entries",
            map.rom_size,
            map.entries.len()
        );
        Ok(map)
    }

    /// Size in bytes of the blob [`encode`](Self::encode) produces.
    pub fn encoded_len(&self) -> usize {
        FLASH_MAP_HEADER_SIZE + self.entries.len() * FLASH_MAP_ENTRY_SIZE
    }

    /// Serialize into `buf` as a `FLMP` blob, returning the bytes used.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.encoded_len();
        let length = u16::try_from(len).map_err(|_| Error::InvalidArgument)?;
        if buf.len() < len {
            return Err(Error::InvalidArgument);
        }

        let header = RawHeader {
            signature: U32::new(FLASH_MAP_SIGNATURE),
            version: 1,
            reserved: 0,
            length: U16::new(length),
            attributes: U32::new(0),
            rom_size: U32::new(self.rom_size),
        };
        buf[..FLASH_MAP_HEADER_SIZE].copy_from_slice(header.as_bytes());

        for (i, entry) in self.entries.iter().enumerate() {
            let raw = RawEntry {
                signature: U32::new(entry.signature),
                flags: U32::new(entry.flags),
                offset: U32::new(entry.offset),
                size: U32::new(entry.size),
            };
            let at = FLASH_MAP_HEADER_SIZE + i * FLASH_MAP_ENTRY_SIZE;
            buf[at..at + FLASH_MAP_ENTRY_SIZE].copy_from_slice(raw.as_bytes());
        }
        Ok(len)
    }

    pub fn rom_size(&self) -> u32 {
        self.rom_size
    }

    pub fn entries(&self) -> &[FlashMapEntry] {
        &self.entries
    }

    /// Absolute address of a ROM-relative offset.
    pub fn absolute_base(&self, offset: u32) -> u64 {
        TOP_ADDRESS - self.rom_size as u64 + offset as u64
    }

    /// Convert an absolute address back to a ROM-relative offset.
    ///
    /// `RomSize - (TOP_ADDRESS - base)`; addresses outside the decoded ROM
    /// window are rejected.
    pub fn rom_offset(&self, base: u64) -> Result<u32> {
        let below_top = TOP_ADDRESS
            .checked_sub(base)
            .filter(|d| *d > 0)
            .ok_or(Error::InvalidArgument)?;
        let offset = (self.rom_size as u64)
            .checked_sub(below_top)
            .ok_or(Error::InvalidArgument)?;
        // offset < rom_size here, so it fits
        Ok(offset as u32)
    }

    /// Look up one copy of a component.
    ///
    /// Only entries whose backup flag matches `backup` are considered; there
    /// is no fallback at this level.
    pub fn component_info(&self, signature: u32, backup: bool) -> Result<ComponentInfo> {
        self.entries
            .iter()
            .find(|e| e.signature == signature && e.is_backup() == backup)
            .map(|e| ComponentInfo {
                base: self.absolute_base(e.offset),
                size: e.size,
            })
            .ok_or(Error::NotFound)
    }

    /// Sum the primary-copy sizes of the top-swap, redundant and
    /// non-redundant regions.
    ///
    /// A sum that does not fit in 32 bits is `LayoutOverflow`.
    pub fn region_sizes(&self) -> Result<RegionSizes> {
        let mut sizes = RegionSizes::default();
        for entry in self.entries.iter().filter(|e| !e.is_backup()) {
            if entry.flags & FLAG_TOP_SWAP != 0 {
                sizes.top_swap = add_region_size(sizes.top_swap, entry)?;
            }
            if entry.flags & FLAG_REDUNDANT_REGION != 0 {
                sizes.redundant = add_region_size(sizes.redundant, entry)?;
            }
            if entry.flags & FLAG_NON_REDUNDANT_REGION != 0 {
                sizes.non_redundant = add_region_size(sizes.non_redundant, entry)?;
            }
        }
        Ok(sizes)
    }
}

fn add_region_size(total: u32, entry: &FlashMapEntry) -> Result<u32> {
    total.checked_add(entry.size).ok_or_else(|| {
        log::warn!(
            "Region size overflow adding {} (0x{:x}) to 0x{:x}",
            Signature(entry.signature),
            entry.size,
            total
        );
        Error::LayoutOverflow
    })
}
