//! Way Header and Tag Codec Tests.
//!
//! Verifies the status flags, the policy metadata bits and the bit-exact tag packing.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use waycache_core::core::header;

// ══════════════════════════════════════════════════════════
// 1. Status byte
// ══════════════════════════════════════════════════════════

/// Valid, dirty and metadata occupy disjoint bits of byte 0.
#[test]
fn flags_and_meta_are_independent() {
    let mut hdr = [0u8; 3];
    header::set_meta(&mut hdr, 0b10_1101);
    header::set_valid(&mut hdr);
    header::set_dirty(&mut hdr);
    assert!(header::is_valid(&hdr));
    assert!(header::is_dirty(&hdr));
    assert_eq!(header::meta(&hdr), 0b10_1101);

    header::clear_dirty(&mut hdr);
    assert!(header::is_valid(&hdr));
    assert!(!header::is_dirty(&hdr));
    assert_eq!(header::meta(&hdr), 0b10_1101);

    header::clear_valid(&mut hdr);
    assert_eq!(hdr[0], 0b10_1101 << 2);
}

/// Metadata wider than six bits is cut to six.
#[test]
fn meta_is_masked_to_six_bits() {
    let mut hdr = [0u8; 2];
    header::set_valid(&mut hdr);
    header::set_meta(&mut hdr, 0xFF);
    assert_eq!(header::meta(&hdr), 0x3F);
    assert!(header::is_valid(&hdr));
    assert!(!header::is_dirty(&hdr));
}

// ══════════════════════════════════════════════════════════
// 2. Tag codec
// ══════════════════════════════════════════════════════════

/// Tags are stored least-significant byte first after the status byte.
#[test]
fn packs_little_endian_after_status_byte() {
    let mut hdr = [0xFFu8; 4];
    header::pack_tag(&mut hdr, 20, 0xA_BCDE);
    assert_eq!(hdr, [0xFF, 0xDE, 0xBC, 0x0A]);
}

/// Input bits above the tag width are discarded.
#[test]
fn discards_bits_above_tag_width() {
    let mut hdr = [0u8; 2];
    header::pack_tag(&mut hdr, 3, 0xFF);
    assert_eq!(hdr[1], 0b111);
    assert_eq!(header::unpack_tag(&hdr, 3), 0b111);
}

/// A 64-bit tag uses eight whole bytes.
#[test]
fn full_width_tag_round_trips() {
    let mut hdr = [0u8; 9];
    header::pack_tag(&mut hdr, 64, u64::MAX - 1);
    assert_eq!(header::unpack_tag(&hdr, 64), u64::MAX - 1);
}

/// Packing leaves the status byte alone.
#[test]
fn packing_preserves_status_byte() {
    let mut hdr = [0u8; 7];
    header::set_valid(&mut hdr);
    header::set_meta(&mut hdr, 1);
    header::pack_tag(&mut hdr, 45, (1 << 45) - 1);
    assert!(header::is_valid(&hdr));
    assert_eq!(header::meta(&hdr), 1);
}

proptest! {
    /// Every tag below `2^tag_bits` survives pack then unpack, and the unused high
    /// bits of the last byte are zero.
    #[test]
    fn tag_round_trip(tag_bits in 1u32..64, raw in any::<u64>()) {
        let tag = raw & ((1u64 << tag_bits) - 1);
        let len = 1 + tag_bits.div_ceil(8) as usize;
        let mut hdr = vec![0xFFu8; len];

        header::pack_tag(&mut hdr, tag_bits, tag);
        prop_assert_eq!(header::unpack_tag(&hdr, tag_bits), tag);

        let rem = tag_bits % 8;
        if rem != 0 {
            prop_assert_eq!(hdr[len - 1] >> rem, 0);
        }
    }

    /// Garbage above the tag width in the last byte is ignored by unpacking.
    #[test]
    fn unpack_ignores_stray_bits(tag_bits in 1u32..64, raw in any::<u64>()) {
        let tag = raw & ((1u64 << tag_bits) - 1);
        let len = 1 + tag_bits.div_ceil(8) as usize;
        let mut hdr = vec![0u8; len];
        header::pack_tag(&mut hdr, tag_bits, tag);

        let rem = tag_bits % 8;
        if rem != 0 {
            hdr[len - 1] |= !((1u8 << rem) - 1);
        }
        prop_assert_eq!(header::unpack_tag(&hdr, tag_bits), tag);
    }
}
