// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for capsule header parsing.

mod common;

use bootflash_common::capsule::{Capsule, CapsuleImageHeader, CAPSULE_IMAGE_HEADER_SIZE};
use bootflash_common::Error;
use zerocopy::IntoBytes;

use common::*;

#[test]
fn test_capsule_header_size() {
    assert_eq!(CAPSULE_IMAGE_HEADER_SIZE, 40);
}

#[test]
fn test_capsule_parse() {
    let buf = make_capsule(0x100);
    let capsule = Capsule::parse(&buf).unwrap();
    assert_eq!(capsule.header().version.get(), 2);
    assert_eq!(capsule.header().update_image_size.get(), 0x100);
    assert_eq!(capsule.payload().len(), 0x100);
    assert_eq!(capsule.payload()[0x20], pattern(0x20));
}

#[test]
fn test_capsule_header_only() {
    let header = CapsuleImageHeader::new([0; 16], 0, 0);
    let capsule = Capsule::parse(header.as_bytes()).unwrap();
    assert!(capsule.payload().is_empty());
}

#[test]
fn test_capsule_too_short() {
    let buf = make_capsule(0);
    assert_eq!(
        Capsule::parse(&buf[..CAPSULE_IMAGE_HEADER_SIZE - 1]).unwrap_err(),
        Error::InvalidCapsule
    );
}

#[test]
fn test_capsule_bad_version() {
    let mut buf = make_capsule(0x10);
    buf[..4].copy_from_slice(&7u32.to_le_bytes());
    assert_eq!(Capsule::parse(&buf).unwrap_err(), Error::InvalidCapsule);
    buf[..4].copy_from_slice(&0u32.to_le_bytes());
    assert_eq!(Capsule::parse(&buf).unwrap_err(), Error::InvalidCapsule);
}

#[test]
fn test_capsule_slice_bounds() {
    let buf = make_capsule(0x100);
    let capsule = Capsule::parse(&buf).unwrap();
    let end = (CAPSULE_IMAGE_HEADER_SIZE + 0x100) as u64;
    assert_eq!(capsule.slice(end - 0x10, 0x10).unwrap().len(), 0x10);
    assert_eq!(capsule.slice(end - 0x10, 0x11), Err(Error::InvalidArgument));
    assert_eq!(capsule.slice(u64::MAX, 1), Err(Error::InvalidArgument));
}
