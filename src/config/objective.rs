use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::evaluation;
use crate::error::{Result, SweepError};
use crate::types::OptimizationGoal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPRESSION: &str = "mod(x,1) * (cos(20*pi*x) - sin(x))";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    pub expression: String,
    pub goal: OptimizationGoal,
    pub elitism: bool,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            expression: DEFAULT_EXPRESSION.to_string(),
            goal: OptimizationGoal::Max,
            elitism: true,
        }
    }
}

impl ConfigSection for ObjectiveConfig {
    fn section_name() -> &'static str {
        "objective"
    }

    fn validate(&self) -> Result<()> {
        if self.expression.trim().is_empty() {
            return Err(SweepError::Configuration(
                "Objective expression must not be empty".to_string(),
            ));
        }
        // Parse errors keep their own variant so callers can point at the position.
        evaluation::parse(&self.expression).map(|_| ())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Objective".to_string(),
            fields: vec![
                FieldManifest::new(
                    "expression",
                    "string",
                    serde_json::json!(DEFAULT_EXPRESSION),
                    "Objective function of x",
                ),
                FieldManifest::new("goal", "enum", serde_json::json!("Max"), "Max or Min"),
                FieldManifest::new("elitism", "bool", serde_json::json!(true), "Keep the best individual between generations"),
            ],
        }
    }
}
