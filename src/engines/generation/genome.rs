use crate::error::{Result, SweepError};
use crate::functions::encoding;
use std::fmt;
use std::str::FromStr;

/// Fixed-length bit string genotype
///
/// A genome stores one bit per position, most significant bit first, so its
/// textual form is exactly the zero-padded output of `int_to_bin`. Crossover
/// and mutation work on the bit vector directly; decoding goes through the
/// integer value and the owning `GenotypeSpace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    bits: Vec<bool>,
}

impl Genome {
    pub fn from_int(value: u64, len: u32) -> Result<Self> {
        encoding::int_to_bin(value, len)?.parse()
    }

    pub fn to_int(&self) -> u64 {
        self.bits
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }
}

impl FromStr for Genome {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        // Validates characters and length.
        encoding::bin_to_int(s)?;
        Ok(Self {
            bits: s.bytes().map(|b| b == b'1').collect(),
        })
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
