pub mod traits;
pub mod genotype;
pub mod objective;
pub mod sweep;
pub mod manager;
pub mod bridge;

pub use manager::{ConfigManager, AppConfig};
pub use bridge::ConfigBridge;
pub use genotype::GenotypeConfig;
pub use objective::ObjectiveConfig;
pub use sweep::SweepConfig;
pub use traits::{ConfigSection, ConfigManifest, FieldManifest};
