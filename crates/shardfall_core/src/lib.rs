pub mod config;
pub mod events;

pub use config::{AudioConfig, EffectsConfig, NoiseParams, SimConfig, TerrainParams, WorldConfig};
pub use events::EventQueue;
