use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_CHUNK_SIZE: i32 = 4;
pub const MAX_CHUNK_SIZE: i32 = 64;
pub const MIN_RENDER_DISTANCE: i32 = 0;
pub const MAX_RENDER_DISTANCE: i32 = 16;
pub const MAX_POOL_CAPACITY: usize = 1 << 16;
pub const MAX_LEGACY_CAPACITY: usize = 256;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_render_distance")]
    pub render_distance: i32,
    /// Chunks generated per tick at most; the rest wait for later ticks.
    #[serde(default = "default_generation_budget")]
    pub generation_budget: usize,
    #[serde(default)]
    pub noise: NoiseParams,
    #[serde(default)]
    pub terrain: TerrainParams,
}

/// Coefficients of the lattice hash `frac(sin(x * k1 + z * k2) * k3)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default = "default_k2")]
    pub k2: f64,
    #[serde(default = "default_k3")]
    pub k3: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    #[serde(default = "default_base_height")]
    pub base_height: i32,
    #[serde(default = "default_height_amplitude")]
    pub height_amplitude: i32,
    #[serde(default = "default_height_scale")]
    pub height_scale: f64,
    #[serde(default = "default_dirt_depth")]
    pub dirt_depth: i32,
    #[serde(default = "default_pocket_scale")]
    pub pocket_scale: f64,
    #[serde(default = "default_crystal_threshold")]
    pub crystal_threshold: f64,
    #[serde(default = "default_magma_threshold")]
    pub magma_threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "default_particle_capacity")]
    pub particle_capacity: usize,
    #[serde(default = "default_drop_capacity")]
    pub drop_capacity: usize,
    #[serde(default = "default_shockwave_capacity")]
    pub shockwave_capacity: usize,
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,
    #[serde(default = "default_text_capacity")]
    pub text_capacity: usize,
    #[serde(default = "default_ambient_motes")]
    pub ambient_motes: usize,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_drop_lifetime")]
    pub drop_lifetime: f32,
    #[serde(default = "default_collect_radius")]
    pub collect_radius: f32,
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_enabled")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            render_distance: default_render_distance(),
            generation_budget: default_generation_budget(),
            noise: NoiseParams::default(),
            terrain: TerrainParams::default(),
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            k2: default_k2(),
            k3: default_k3(),
        }
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height: default_base_height(),
            height_amplitude: default_height_amplitude(),
            height_scale: default_height_scale(),
            dirt_depth: default_dirt_depth(),
            pocket_scale: default_pocket_scale(),
            crystal_threshold: default_crystal_threshold(),
            magma_threshold: default_magma_threshold(),
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            particle_capacity: default_particle_capacity(),
            drop_capacity: default_drop_capacity(),
            shockwave_capacity: default_shockwave_capacity(),
            trail_capacity: default_trail_capacity(),
            text_capacity: default_text_capacity(),
            ambient_motes: default_ambient_motes(),
            gravity: default_gravity(),
            drop_lifetime: default_drop_lifetime(),
            collect_radius: default_collect_radius(),
            rng_seed: default_rng_seed(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_audio_enabled(),
            volume: default_volume(),
        }
    }
}

impl SimConfig {
    pub fn sanitize(mut self) -> Self {
        let world = &mut self.world;
        world.chunk_size = world.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        world.render_distance = world
            .render_distance
            .clamp(MIN_RENDER_DISTANCE, MAX_RENDER_DISTANCE);
        world.generation_budget = world.generation_budget.max(1);

        let terrain = &mut world.terrain;
        terrain.base_height = terrain.base_height.clamp(1, world.chunk_size - 1);
        terrain.height_amplitude = terrain.height_amplitude.clamp(0, world.chunk_size - 1);
        terrain.dirt_depth = terrain.dirt_depth.max(1);
        terrain.crystal_threshold = terrain.crystal_threshold.clamp(0.0, 1.0);
        terrain.magma_threshold = terrain.magma_threshold.clamp(0.0, 1.0);

        let effects = &mut self.effects;
        effects.particle_capacity = effects.particle_capacity.clamp(1, MAX_POOL_CAPACITY);
        effects.drop_capacity = effects.drop_capacity.clamp(1, MAX_LEGACY_CAPACITY);
        effects.shockwave_capacity = effects.shockwave_capacity.clamp(1, MAX_LEGACY_CAPACITY);
        effects.trail_capacity = effects.trail_capacity.clamp(1, MAX_LEGACY_CAPACITY);
        effects.text_capacity = effects.text_capacity.clamp(1, MAX_LEGACY_CAPACITY);
        effects.ambient_motes = effects.ambient_motes.clamp(1, MAX_LEGACY_CAPACITY);
        effects.gravity = effects.gravity.max(0.0);
        effects.drop_lifetime = effects.drop_lifetime.max(0.1);
        effects.collect_radius = effects.collect_radius.max(0.0);

        self.audio.volume = self.audio.volume.clamp(0.0, 1.0);
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize config: {e}"),
            )
        })?;
        debug!("Loaded simulation config from {}", path.display());
        Ok(parsed.sanitize())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let config = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&config).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize config: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

fn default_chunk_size() -> i32 {
    16
}

fn default_render_distance() -> i32 {
    2
}

fn default_generation_budget() -> usize {
    64
}

fn default_k1() -> f64 {
    12.9898
}

fn default_k2() -> f64 {
    78.233
}

fn default_k3() -> f64 {
    43758.5453
}

fn default_base_height() -> i32 {
    4
}

fn default_height_amplitude() -> i32 {
    6
}

fn default_height_scale() -> f64 {
    0.1
}

fn default_dirt_depth() -> i32 {
    2
}

fn default_pocket_scale() -> f64 {
    0.37
}

fn default_crystal_threshold() -> f64 {
    0.9
}

fn default_magma_threshold() -> f64 {
    0.95
}

fn default_particle_capacity() -> usize {
    1000
}

fn default_drop_capacity() -> usize {
    40
}

fn default_shockwave_capacity() -> usize {
    5
}

fn default_trail_capacity() -> usize {
    15
}

fn default_text_capacity() -> usize {
    10
}

fn default_ambient_motes() -> usize {
    30
}

fn default_gravity() -> f32 {
    18.0
}

fn default_drop_lifetime() -> f32 {
    30.0
}

fn default_collect_radius() -> f32 {
    1.5
}

fn default_rng_seed() -> u64 {
    0xC0FF_EE00_5EED
}

fn default_audio_enabled() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}
