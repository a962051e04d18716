//! Reversible mapping between a bounded real interval `[a, b]`, integers in
//! `[0, 2^l - 1]` and their zero-padded bit strings of width `l`.
//!
//! Conventions shared by every function here:
//! - `l` must lie in `1..=MAX_BITS`; `2^l - 1` is then exact in an `f64`.
//! - [`int_to_bin`] never truncates: a value that does not fit in `l` bits is
//!   a [`SweepError::Domain`].
//! - [`real_to_int`] clamps `x` into `[a, b]` before quantizing, so every real
//!   maps onto a valid genotype.

use crate::error::{Result, SweepError};

/// Largest supported bit-string length.
pub const MAX_BITS: u32 = 53;

/// Largest integer representable with `l` bits.
pub fn max_int(l: u32) -> u64 {
    if l >= 64 {
        u64::MAX
    } else {
        (1u64 << l) - 1
    }
}

pub fn check_bits(l: u32) -> Result<()> {
    if l == 0 || l > MAX_BITS {
        return Err(SweepError::Domain(format!(
            "bit length must be between 1 and {}, got {}",
            MAX_BITS, l
        )));
    }
    Ok(())
}

/// Zero-padded binary representation of `x` with width `l`.
pub fn int_to_bin(x: u64, l: u32) -> Result<String> {
    check_bits(l)?;
    if x > max_int(l) {
        return Err(SweepError::Domain(format!(
            "{} does not fit in {} bits",
            x, l
        )));
    }
    Ok(format!("{:0width$b}", x, width = l as usize))
}

/// Parses a bit string back into its integer value.
pub fn bin_to_int(bits: &str) -> Result<u64> {
    if bits.is_empty() {
        return Err(SweepError::Format("empty bit string".to_string()));
    }
    if bits.len() > MAX_BITS as usize {
        return Err(SweepError::Format(format!(
            "bit string of length {} exceeds {} bits",
            bits.len(),
            MAX_BITS
        )));
    }

    bits.bytes().enumerate().try_fold(0u64, |acc, (pos, byte)| match byte {
        b'0' => Ok(acc << 1),
        b'1' => Ok((acc << 1) | 1),
        other => Err(SweepError::Format(format!(
            "invalid character {:?} at position {}",
            other as char, pos
        ))),
    })
}

/// `floor((x - a) / (b - a) * (2^l - 1))`, with `x` clamped into `[a, b]`.
///
/// NaN is treated as `a`; callers that must reject it should check first.
pub fn real_to_int(x: f64, a: f64, b: f64, l: u32) -> u64 {
    let max = max_int(l);
    let clamped = if x.is_nan() { a } else { x.clamp(a, b) };
    let scaled = ((clamped - a) / (b - a) * max as f64).floor();

    if scaled <= 0.0 {
        0
    } else {
        (scaled as u64).min(max)
    }
}

/// `x * (b - a) / (2^l - 1) + a`.
pub fn int_to_real(x: u64, a: f64, b: f64, l: u32) -> f64 {
    x as f64 * (b - a) / max_int(l) as f64 + a
}

pub fn real_to_bin(x: f64, a: f64, b: f64, l: u32) -> Result<String> {
    if x.is_nan() {
        return Err(SweepError::Domain("cannot encode NaN".to_string()));
    }
    int_to_bin(real_to_int(x, a, b, l), l)
}

pub fn bin_to_real(bits: &str, a: f64, b: f64, l: u32) -> Result<f64> {
    Ok(int_to_real(bin_to_int(bits)?, a, b, l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_to_bin_pads_to_width() {
        assert_eq!(int_to_bin(5, 6).unwrap(), "000101");
        assert_eq!(int_to_bin(0, 3).unwrap(), "000");
        assert_eq!(int_to_bin(7, 3).unwrap(), "111");
    }

    #[test]
    fn test_int_to_bin_rejects_overflow() {
        assert!(matches!(int_to_bin(8, 3), Err(SweepError::Domain(_))));
        assert!(matches!(int_to_bin(0, 0), Err(SweepError::Domain(_))));
    }

    #[test]
    fn test_bin_to_int_rejects_non_binary() {
        assert!(matches!(bin_to_int("10a1"), Err(SweepError::Format(_))));
        assert!(matches!(bin_to_int(""), Err(SweepError::Format(_))));
        assert_eq!(bin_to_int("0110").unwrap(), 6);
    }

    #[test]
    fn test_real_to_int_clamps() {
        assert_eq!(real_to_int(-100.0, -4.0, 12.0, 10), 0);
        assert_eq!(real_to_int(100.0, -4.0, 12.0, 10), 1023);
        assert_eq!(real_to_int(12.0, -4.0, 12.0, 10), 1023);
    }

    #[test]
    fn test_interval_endpoints() {
        assert_eq!(int_to_real(0, -4.0, 12.0, 8), -4.0);
        assert_eq!(int_to_real(255, -4.0, 12.0, 8), 12.0);
    }
}
