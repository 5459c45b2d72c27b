//! Compact ("nBits") encoding of 256-bit targets.
//!
//! `bits = (size << 24) | sign | mantissa` where `size` is the byte length of
//! the value, bit 23 is a sign flag and the low 23 bits hold the three most
//! significant bytes. The decoded value is `mantissa * 256^(size - 3)`.
//!
//! Decoding never fails: malformed encodings are reported through the
//! `negative` and `overflow` flags of [`DecodedTarget`], and callers decide
//! what to reject.

use crate::U256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Result of expanding a compact value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedTarget {
    pub target: U256,
    /// Sign bit set on a non-zero mantissa.
    pub negative: bool,
    /// The value does not fit in 256 bits.
    pub overflow: bool,
}

impl DecodedTarget {
    /// Returns the target only when it is positive and in range.
    pub fn valid_target(&self) -> Option<U256> {
        if self.negative || self.overflow || self.target.is_zero() {
            None
        } else {
            Some(self.target)
        }
    }
}

/// Expands `bits` into a 256-bit target.
pub fn target_from_compact(bits: u32) -> DecodedTarget {
    let size = (bits >> 24) as usize;
    let mut word = bits & MANTISSA_MASK;

    let target = if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        let shift = 8 * (size - 3);
        if shift >= 256 {
            U256::zero()
        } else {
            U256::from(word) << shift
        }
    };

    let negative = word != 0 && (bits & SIGN_BIT) != 0;
    let overflow = word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedTarget { target, negative, overflow }
}

/// Encodes a non-negative target into its canonical compact form.
///
/// Only the three most significant bytes survive; the rest is truncated.
pub fn compact_from_target(target: &U256) -> u32 {
    compact_from_target_signed(target, false)
}

/// Encodes a target, setting the sign flag when `negative` and the mantissa is non-zero.
pub fn compact_from_target_signed(target: &U256, negative: bool) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*target >> (8 * (size - 3))).low_u64() as u32
    };

    // A set sign bit would read back as negative; move it into the next byte.
    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    debug_assert_eq!(compact & !MANTISSA_MASK, 0);
    debug_assert!(size < 256);

    compact |= (size as u32) << 24;
    if negative && compact & MANTISSA_MASK != 0 {
        compact |= SIGN_BIT;
    }
    compact
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bits: u32) -> (U256, bool, bool) {
        let d = target_from_compact(bits);
        (d.target, d.negative, d.overflow)
    }

    #[test]
    fn zero_mantissas_decode_to_zero_without_flags() {
        for bits in [
            0x0000_0000u32,
            0x0012_3456,
            0x0100_3456,
            0x0200_0056,
            0x0300_0000,
            0x0400_0000,
            0x0092_3456,
            0x0180_3456,
            0x0280_0056,
            0x0380_0000,
            0x0480_0000,
        ] {
            let (target, negative, overflow) = decode(bits);
            assert!(target.is_zero(), "bits {bits:#010x}");
            assert!(!negative, "bits {bits:#010x}");
            assert!(!overflow, "bits {bits:#010x}");
            assert_eq!(compact_from_target(&target), 0);
        }
    }

    #[test]
    fn small_sizes_shift_mantissa_right() {
        let (t, neg, _) = decode(0x0112_3456);
        assert_eq!(t, U256::from(0x12u64));
        assert!(!neg);
        assert_eq!(compact_from_target(&t), 0x0112_0000);

        let (t, _, _) = decode(0x0212_3456);
        assert_eq!(t, U256::from(0x1234u64));
        assert_eq!(compact_from_target(&t), 0x0212_3400);

        let (t, _, _) = decode(0x0312_3456);
        assert_eq!(t, U256::from(0x12_3456u64));
        assert_eq!(compact_from_target(&t), 0x0312_3456);
    }

    #[test]
    fn negative_flag_is_reported_and_reencoded() {
        let (t, neg, overflow) = decode(0x01fe_dcba);
        assert_eq!(t, U256::from(0x7eu64));
        assert!(neg);
        assert!(!overflow);
        assert_eq!(compact_from_target_signed(&t, true), 0x01fe_0000);

        let (t, neg, _) = decode(0x0492_3456);
        assert_eq!(t, U256::from(0x1234_5600u64));
        assert!(neg);
        assert_eq!(compact_from_target_signed(&t, true), 0x0492_3456);
    }

    #[test]
    fn large_sizes_shift_mantissa_left() {
        let (t, _, _) = decode(0x0412_3456);
        assert_eq!(t, U256::from(0x1234_5600u64));
        assert_eq!(compact_from_target(&t), 0x0412_3456);

        // Leading zero byte in the mantissa is kept so the sign bit stays clear.
        let (t, _, _) = decode(0x0500_9234);
        assert_eq!(t, U256::from(0x9234_0000u64));
        assert_eq!(compact_from_target(&t), 0x0500_9234);

        let (t, _, overflow) = decode(0x2012_3456);
        assert_eq!(t, U256::from(0x12_3456u64) << (8 * 29));
        assert!(!overflow);
        assert_eq!(compact_from_target(&t), 0x2012_3456);
    }

    #[test]
    fn oversized_exponents_overflow() {
        let (_, _, overflow) = decode(0xff12_3456);
        assert!(overflow);
        // 0xff mantissa fits with size 34, 0x100 does not.
        assert!(!decode(0x2200_00ff).2);
        assert!(decode(0x2200_0100).2);
        assert!(decode(0x2301_0000).2);
        assert_eq!(target_from_compact(0xff12_3456).valid_target(), None);
    }

    #[test]
    fn bitcoin_limit_roundtrips() {
        let limit = (U256::one() << 224) - 1;
        let bits = compact_from_target(&limit);
        assert_eq!(bits, 0x1d00_ffff);
        let back = target_from_compact(bits).valid_target().unwrap();
        assert_eq!(back, U256::from(0xffffu64) << 208);
        assert_eq!(compact_from_target(&back), bits);
    }

    #[test]
    fn max_value_encodes_with_size_33() {
        let bits = compact_from_target(&U256::MAX);
        assert_eq!(bits, 0x2100_ffff);
        let d = target_from_compact(bits);
        assert!(!d.overflow);
        assert_eq!(d.target, U256::from(0xffffu64) << 240);
    }
}
