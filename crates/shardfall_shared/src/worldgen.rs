use std::fmt;

use shardfall_core::config::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use shardfall_core::{TerrainParams, WorldConfig};
use tracing::trace;

use crate::block::{BlockError, BlockKindId, BlockRegistry};
use crate::chunk::{BlockInstance, Chunk};
use crate::coords::{chunk_to_world, ChunkPos, LocalPos};
use crate::noise::NoiseField;

// Offsets keep the pocket field decorrelated from the height field.
const POCKET_OFFSET_X: f64 = 1031.0;
const POCKET_OFFSET_Z: f64 = -517.0;
const POCKET_LAYER_SHEAR: f64 = 3.7;
const MAGMA_MIN_DEPTH: i32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldGenError {
    ChunkSizeOutOfRange(i32),
    MissingTerrainKind(BlockError),
}

impl fmt::Display for WorldGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkSizeOutOfRange(size) => write!(
                f,
                "chunk size {size} outside {MIN_CHUNK_SIZE}..={MAX_CHUNK_SIZE}"
            ),
            Self::MissingTerrainKind(err) => write!(f, "missing terrain kind: {err}"),
        }
    }
}

impl std::error::Error for WorldGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ChunkSizeOutOfRange(_) => None,
            Self::MissingTerrainKind(err) => Some(err),
        }
    }
}

impl From<BlockError> for WorldGenError {
    fn from(err: BlockError) -> Self {
        Self::MissingTerrainKind(err)
    }
}

#[derive(Copy, Clone, Debug)]
struct TerrainKind {
    id: BlockKindId,
    max_hp: u32,
}

impl TerrainKind {
    fn resolve(registry: &BlockRegistry, id: BlockKindId) -> Result<Self, BlockError> {
        let kind = registry.lookup(id)?;
        Ok(Self {
            id,
            max_hp: kind.max_hp,
        })
    }

    fn instance(self) -> BlockInstance {
        BlockInstance::new(self.id, self.max_hp)
    }
}

/// Deterministic terrain: the same chunk position always yields the same
/// block grid.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    noise: NoiseField,
    terrain: TerrainParams,
    size: i32,
    // Same as `size`, for building local positions.
    span: u8,
    dirt: TerrainKind,
    stone: TerrainKind,
    crystal: TerrainKind,
    magma: TerrainKind,
}

impl WorldGenerator {
    /// Fails when `chunk_size` is outside `MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE`
    /// or the registry lacks one of the terrain kinds.
    pub fn new(config: &WorldConfig, registry: &BlockRegistry) -> Result<Self, WorldGenError> {
        let size = config.chunk_size;
        let span = u8::try_from(size)
            .ok()
            .filter(|_| (MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size))
            .ok_or(WorldGenError::ChunkSizeOutOfRange(size))?;

        Ok(Self {
            noise: NoiseField::new(config.noise),
            terrain: config.terrain,
            size,
            span,
            dirt: TerrainKind::resolve(registry, BlockKindId::DIRT)?,
            stone: TerrainKind::resolve(registry, BlockKindId::STONE)?,
            crystal: TerrainKind::resolve(registry, BlockKindId::CRYSTAL)?,
            magma: TerrainKind::resolve(registry, BlockKindId::MAGMA)?,
        })
    }

    pub fn chunk_size(&self) -> i32 {
        self.size
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Number of filled cells in the column at world `(x, z)`, in `1..=size`.
    pub fn column_height(&self, world_x: i32, world_z: i32) -> i32 {
        let scale = self.terrain.height_scale;
        let value = self
            .noise
            .sample(f64::from(world_x) * scale, f64::from(world_z) * scale);
        let relief = (value * f64::from(self.terrain.height_amplitude + 1)).floor() as i32;
        (self.terrain.base_height + relief).clamp(1, self.size)
    }

    fn pocket_value(&self, world_x: i32, world_y: i32, world_z: i32) -> f64 {
        let scale = self.terrain.pocket_scale;
        let layer = f64::from(world_y) * POCKET_LAYER_SHEAR;
        self.noise.sample(
            f64::from(world_x) * scale + POCKET_OFFSET_X + layer,
            f64::from(world_z) * scale + POCKET_OFFSET_Z - layer,
        )
    }

    fn kind_at(&self, world_x: i32, world_y: i32, world_z: i32, height: i32) -> TerrainKind {
        let depth = height - 1 - world_y;
        if depth < self.terrain.dirt_depth {
            return self.dirt;
        }

        let pocket = self.pocket_value(world_x, world_y, world_z);
        if pocket >= self.terrain.magma_threshold
            && depth >= self.terrain.dirt_depth + MAGMA_MIN_DEPTH
        {
            self.magma
        } else if pocket >= self.terrain.crystal_threshold {
            self.crystal
        } else {
            self.stone
        }
    }

    pub fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos, self.size);

        for z in 0..self.span {
            for x in 0..self.span {
                let anchor = chunk_to_world(pos, LocalPos { x, y: 0, z }, self.size);
                let height = self.column_height(anchor.x, anchor.z);

                for y in (0..self.span).take_while(|&y| i32::from(y) < height) {
                    let kind = self.kind_at(anchor.x, i32::from(y), anchor.z, height);
                    chunk.set(LocalPos { x, y, z }, kind.instance());
                }
            }
        }

        chunk.mark_active();
        trace!("Generated chunk {:?} with {} blocks", pos, chunk.len());
        chunk
    }
}

#[cfg(test)]
mod tests {
    use shardfall_core::WorldConfig;

    use super::{WorldGenError, WorldGenerator};
    use crate::block::{register_default_blocks, BlockError, BlockKindId, BlockRegistry};
    use crate::coords::{ChunkPos, LocalPos};

    fn generator() -> WorldGenerator {
        WorldGenerator::new(&WorldConfig::default(), &register_default_blocks())
            .expect("default registry has terrain kinds")
    }

    #[test]
    fn generation_is_deterministic_per_chunk() {
        let generator = generator();
        for pos in [ChunkPos::new(0, 0), ChunkPos::new(-3, 7), ChunkPos::new(12, -40)] {
            let first = generator.generate_chunk(pos);
            let second = generator.generate_chunk(pos);
            assert!(first.is_generated());
            assert_eq!(first.kind_grid(), second.kind_grid());
        }
    }

    #[test]
    fn columns_are_solid_up_to_their_height_with_dirt_on_top() {
        let generator = generator();
        let chunk = generator.generate_chunk(ChunkPos::new(2, 1));
        let size = generator.chunk_size();

        for z in 0..size as u8 {
            for x in 0..size as u8 {
                let world_x = 2 * size + i32::from(x);
                let world_z = size + i32::from(z);
                let height = generator.column_height(world_x, world_z);
                assert!((1..=size).contains(&height));

                for y in 0..size as u8 {
                    let block = chunk.get(LocalPos::new(x, y, z));
                    assert_eq!(block.is_some(), i32::from(y) < height, "column ({x},{z}) y={y}");
                }

                let top = chunk
                    .get(LocalPos::new(x, (height - 1) as u8, z))
                    .expect("top block present");
                assert_eq!(top.kind, BlockKindId::DIRT);
                assert_eq!(top.hp, 30);
            }
        }
    }

    #[test]
    fn deep_layers_hold_stone_and_rare_pockets() {
        let generator = generator();
        let mut stone = 0usize;
        let mut pockets = 0usize;
        for cx in -4..4 {
            for cz in -4..4 {
                let chunk = generator.generate_chunk(ChunkPos::new(cx, cz));
                for (_, block) in chunk.iter() {
                    match block.kind {
                        BlockKindId::STONE => stone += 1,
                        BlockKindId::CRYSTAL | BlockKindId::MAGMA => pockets += 1,
                        _ => {}
                    }
                }
            }
        }
        assert!(stone > 0);
        assert!(pockets < stone, "pockets ({pockets}) should be rarer than stone ({stone})");
    }

    #[test]
    fn generator_requires_terrain_kinds() {
        let empty = BlockRegistry::new();
        let err = WorldGenerator::new(&WorldConfig::default(), &empty).unwrap_err();
        assert_eq!(
            err,
            WorldGenError::MissingTerrainKind(BlockError::UnknownBlockKind(BlockKindId::DIRT))
        );
    }

    #[test]
    fn chunk_sizes_outside_the_supported_range_are_rejected() {
        let registry = register_default_blocks();
        for chunk_size in [0, -16, 3, 65, 256, 300] {
            let config = WorldConfig {
                chunk_size,
                ..WorldConfig::default()
            };
            let err = WorldGenerator::new(&config, &registry).unwrap_err();
            assert_eq!(err, WorldGenError::ChunkSizeOutOfRange(chunk_size));
        }
    }

    #[test]
    fn largest_chunk_size_fills_every_column() {
        let config = WorldConfig {
            chunk_size: 64,
            ..WorldConfig::default()
        };
        let generator = WorldGenerator::new(&config, &register_default_blocks())
            .expect("64 is a supported chunk size");
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        for (x, z) in [(0u8, 0u8), (63, 0), (0, 63), (63, 63)] {
            assert!(chunk.get(LocalPos::new(x, 0, z)).is_some(), "column ({x},{z})");
        }
    }
}
