use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{Result, SweepError};
use crate::functions::encoding::MAX_BITS;
use crate::types::{GenotypeSpace, MAX_DECIMAL_PLACES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotypeConfig {
    pub a: f64,
    pub b: f64,
    pub decimal_places: u32,
    /// Explicit bit length; derived from `decimal_places` when absent
    pub bits: Option<u32>,
}

impl Default for GenotypeConfig {
    fn default() -> Self {
        Self {
            a: -4.0,
            b: 12.0,
            decimal_places: 3,
            bits: None,
        }
    }
}

impl GenotypeConfig {
    pub fn space(&self) -> Result<GenotypeSpace> {
        match self.bits {
            Some(bits) => GenotypeSpace::with_bits(self.a, self.b, bits, self.decimal_places),
            None => GenotypeSpace::from_decimal_places(self.decimal_places, self.a, self.b),
        }
    }
}

impl ConfigSection for GenotypeConfig {
    fn section_name() -> &'static str {
        "genotype"
    }

    fn validate(&self) -> Result<()> {
        if !self.a.is_finite() || !self.b.is_finite() || self.a >= self.b {
            return Err(SweepError::Configuration(format!(
                "Lower bound a ({}) must be below upper bound b ({})",
                self.a, self.b
            )));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(SweepError::Configuration(format!(
                "Decimal places must be at most {}",
                MAX_DECIMAL_PLACES
            )));
        }
        if let Some(bits) = self.bits {
            if bits == 0 || bits > MAX_BITS {
                return Err(SweepError::Configuration(format!(
                    "Bit length must be between 1 and {}",
                    MAX_BITS
                )));
            }
        }
        self.space()
            .map(|_| ())
            .map_err(|e| SweepError::Configuration(e.to_string()))
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Genotype".to_string(),
            fields: vec![
                FieldManifest::new("a", "float", serde_json::json!(-4.0), "Lower bound of the search interval"),
                FieldManifest::new("b", "float", serde_json::json!(12.0), "Upper bound of the search interval"),
                FieldManifest::new(
                    "decimal_places",
                    "integer",
                    serde_json::json!(3),
                    "Decimal precision of the encoding and of reported averages",
                )
                .with_range(Some(0.0), Some(MAX_DECIMAL_PLACES as f64)),
                FieldManifest::new("bits", "integer", serde_json::Value::Null, "Explicit bit-string length")
                    .with_range(Some(1.0), Some(MAX_BITS as f64)),
            ],
        }
    }
}
