use std::fmt;

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use shardfall_core::{EventQueue, WorldConfig};
use shardfall_shared::block::{BlockKindId, BlockRegistry};
use shardfall_shared::chunk::{BlockInstance, Chunk};
use shardfall_shared::coords::{chunk_of, chunk_to_world, world_to_chunk, ChunkPos, LocalPos};
use shardfall_shared::worldgen::{WorldGenError, WorldGenerator};
use tracing::debug;

use crate::streaming::{in_window, stream_window, StreamReport};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    BlockHit {
        kind: BlockKindId,
        world_pos: IVec3,
        remaining_hp: u32,
    },
    BlockDestroyed {
        kind: BlockKindId,
        world_pos: IVec3,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Hit { remaining_hp: u32 },
    Destroyed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The cell is empty or its chunk is not loaded.
    NoBlockAtPosition { world_pos: IVec3 },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBlockAtPosition { world_pos } => {
                write!(f, "no block at {}, {}, {}", world_pos.x, world_pos.y, world_pos.z)
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// Owns every loaded chunk. Streams chunks around a focus and applies damage;
/// reactions are only ever reported through the event queue.
pub struct ChunkManager {
    chunks: FxHashMap<ChunkPos, Chunk>,
    generator: WorldGenerator,
    registry: BlockRegistry,
    render_distance: i32,
    generation_budget: usize,
    events: EventQueue<WorldEvent>,
}

impl ChunkManager {
    pub fn new(config: &WorldConfig, registry: BlockRegistry) -> Result<Self, WorldGenError> {
        let generator = WorldGenerator::new(config, &registry)?;
        Ok(Self {
            chunks: FxHashMap::default(),
            generator,
            registry,
            render_distance: config.render_distance.max(0),
            generation_budget: config.generation_budget.max(1),
            events: EventQueue::new(),
        })
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn chunk_size(&self) -> i32 {
        self.generator.chunk_size()
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn loaded_positions(&self) -> Vec<ChunkPos> {
        let mut positions: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Evicts chunks outside the render window around `focus`, then generates
    /// missing window chunks nearest first, up to the generation budget.
    pub fn update_focus(&mut self, focus: Vec3) -> StreamReport {
        let center = chunk_of(focus, self.chunk_size());
        let radius = self.render_distance;
        let mut report = StreamReport {
            center,
            ..StreamReport::default()
        };

        self.chunks.retain(|&pos, _| {
            let keep = in_window(center, radius, pos);
            if !keep {
                report.evicted.push(pos);
            }
            keep
        });
        report.evicted.sort_unstable();

        let missing: Vec<ChunkPos> = stream_window(center, radius)
            .into_iter()
            .filter(|pos| !self.chunks.contains_key(pos))
            .collect();
        for &pos in missing.iter().take(self.generation_budget) {
            let chunk = self.generator.generate_chunk(pos);
            self.chunks.insert(pos, chunk);
            report.generated.push(pos);
        }
        report.pending = missing.len() - report.generated.len();

        if !report.is_idle() {
            debug!(
                "Streamed around chunk ({}, {}): {} generated, {} evicted, {} pending",
                center.x,
                center.z,
                report.generated.len(),
                report.evicted.len(),
                report.pending
            );
        }
        report
    }

    pub fn apply_damage(
        &mut self,
        chunk_pos: ChunkPos,
        local: LocalPos,
        amount: u32,
    ) -> Result<DamageOutcome, WorldError> {
        let world_pos = chunk_to_world(chunk_pos, local, self.chunk_size());
        let missing = WorldError::NoBlockAtPosition { world_pos };

        let chunk = self.chunks.get_mut(&chunk_pos).ok_or(missing.clone())?;
        let block = chunk.get_mut(local).ok_or(missing)?;
        block.hp = block.hp.saturating_sub(amount);
        let kind = block.kind;

        if block.hp == 0 {
            chunk.remove(local);
            self.events
                .push(WorldEvent::BlockDestroyed { kind, world_pos });
            debug!("Block {} destroyed at {:?}", kind, world_pos);
            Ok(DamageOutcome::Destroyed)
        } else {
            let remaining_hp = block.hp;
            self.events.push(WorldEvent::BlockHit {
                kind,
                world_pos,
                remaining_hp,
            });
            Ok(DamageOutcome::Hit { remaining_hp })
        }
    }

    pub fn apply_damage_at(
        &mut self,
        world_pos: IVec3,
        amount: u32,
    ) -> Result<DamageOutcome, WorldError> {
        let (chunk_pos, local) = world_to_chunk(world_pos, self.chunk_size())
            .ok_or(WorldError::NoBlockAtPosition { world_pos })?;
        self.apply_damage(chunk_pos, local, amount)
    }

    pub fn block_at(&self, world_pos: IVec3) -> Option<BlockInstance> {
        let (chunk_pos, local) = world_to_chunk(world_pos, self.chunk_size())?;
        self.chunks.get(&chunk_pos)?.get(local).copied()
    }

    /// World `y` of the topmost block in a loaded column.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> Option<i32> {
        let size = self.chunk_size();
        let (chunk_pos, local) = world_to_chunk(IVec3::new(world_x, 0, world_z), size)?;
        let top = self.chunks.get(&chunk_pos)?.column_top(local.x, local.z)?;
        Some(i32::from(top))
    }

    pub fn pop_event(&mut self) -> Option<WorldEvent> {
        self.events.try_pop()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};
    use proptest::prelude::*;
    use shardfall_core::WorldConfig;
    use shardfall_shared::block::{register_default_blocks, BlockKindId};
    use shardfall_shared::chunk::BlockInstance;
    use shardfall_shared::coords::{ChunkPos, LocalPos};
    use shardfall_shared::worldgen::WorldGenError;

    use super::{ChunkManager, DamageOutcome, WorldError, WorldEvent};
    use crate::streaming::stream_window;

    fn manager(render_distance: i32) -> ChunkManager {
        let config = WorldConfig {
            render_distance,
            ..WorldConfig::default()
        };
        ChunkManager::new(&config, register_default_blocks()).expect("default terrain kinds")
    }

    #[test]
    fn oversized_chunks_are_refused_before_generation() {
        let config = WorldConfig {
            chunk_size: 300,
            ..WorldConfig::default()
        };
        let result = ChunkManager::new(&config, register_default_blocks());
        assert!(matches!(result, Err(WorldGenError::ChunkSizeOutOfRange(300))));

        let empty = WorldConfig {
            chunk_size: 0,
            ..WorldConfig::default()
        };
        assert!(ChunkManager::new(&empty, register_default_blocks()).is_err());
    }

    fn settle(world: &mut ChunkManager, focus: Vec3) {
        for _ in 0..64 {
            if world.update_focus(focus).is_idle() {
                return;
            }
        }
        panic!("streaming did not settle");
    }

    fn place(world: &mut ChunkManager, chunk: ChunkPos, local: LocalPos, kind: BlockKindId, hp: u32) {
        world
            .chunks
            .get_mut(&chunk)
            .expect("chunk loaded")
            .set(local, BlockInstance::new(kind, hp));
    }

    #[test]
    fn active_set_matches_the_window_around_the_focus() {
        let mut world = manager(2);
        settle(&mut world, Vec3::new(8.0, 10.0, 8.0));
        let mut expected = stream_window(ChunkPos::new(0, 0), 2);
        expected.sort_unstable();
        assert_eq!(world.loaded_positions(), expected);

        // Two chunks east: the western columns go, the eastern ones arrive.
        let report = world.update_focus(Vec3::new(40.0, 10.0, 8.0));
        assert_eq!(report.center, ChunkPos::new(2, 0));
        assert_eq!(report.evicted.len(), 10);
        assert_eq!(report.generated.len(), 10);
        assert!(report.evicted.iter().all(|pos| pos.x < 0));
        let mut expected = stream_window(ChunkPos::new(2, 0), 2);
        expected.sort_unstable();
        assert_eq!(world.loaded_positions(), expected);
    }

    #[test]
    fn generation_budget_spreads_work_over_ticks() {
        let config = WorldConfig {
            render_distance: 3,
            generation_budget: 10,
            ..WorldConfig::default()
        };
        let mut world = ChunkManager::new(&config, register_default_blocks()).expect("terrain");

        let first = world.update_focus(Vec3::ZERO);
        assert_eq!(first.generated.len(), 10);
        assert_eq!(first.pending, 39);
        assert_eq!(first.generated[0], ChunkPos::new(0, 0));

        settle(&mut world, Vec3::ZERO);
        assert_eq!(world.loaded_count(), 49);
    }

    #[test]
    fn regenerated_chunks_match_their_first_generation() {
        let mut world = manager(1);
        settle(&mut world, Vec3::ZERO);
        let before = world
            .chunk(ChunkPos::new(1, 1))
            .expect("corner chunk loaded")
            .kind_grid();

        settle(&mut world, Vec3::new(200.0, 0.0, 200.0));
        assert!(!world.is_loaded(ChunkPos::new(1, 1)));

        settle(&mut world, Vec3::ZERO);
        let after = world
            .chunk(ChunkPos::new(1, 1))
            .expect("corner chunk reloaded")
            .kind_grid();
        assert_eq!(before, after);
    }

    #[test]
    fn thirty_hp_block_takes_three_hits_of_ten() {
        let mut world = manager(0);
        settle(&mut world, Vec3::ZERO);
        let chunk = ChunkPos::new(0, 0);
        let local = LocalPos::new(2, 15, 3);
        place(&mut world, chunk, local, BlockKindId::DIRT, 30);

        let outcomes: Vec<_> = (0..3)
            .map(|_| world.apply_damage(chunk, local, 10).expect("block present"))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                DamageOutcome::Hit { remaining_hp: 20 },
                DamageOutcome::Hit { remaining_hp: 10 },
                DamageOutcome::Destroyed,
            ]
        );

        let world_pos = IVec3::new(2, 15, 3);
        assert_eq!(
            world.pop_event(),
            Some(WorldEvent::BlockHit {
                kind: BlockKindId::DIRT,
                world_pos,
                remaining_hp: 20
            })
        );
        assert!(matches!(world.pop_event(), Some(WorldEvent::BlockHit { .. })));
        assert_eq!(
            world.pop_event(),
            Some(WorldEvent::BlockDestroyed {
                kind: BlockKindId::DIRT,
                world_pos
            })
        );
        assert_eq!(world.pop_event(), None);

        assert_eq!(
            world.apply_damage(chunk, local, 10),
            Err(WorldError::NoBlockAtPosition { world_pos })
        );
        assert_eq!(world.pending_events(), 0);
    }

    #[test]
    fn damage_outside_loaded_chunks_fails() {
        let mut world = manager(0);
        settle(&mut world, Vec3::ZERO);
        let far = IVec3::new(500, 2, 500);
        assert_eq!(
            world.apply_damage_at(far, 5),
            Err(WorldError::NoBlockAtPosition { world_pos: far })
        );
        assert!(world.apply_damage_at(IVec3::new(0, -1, 0), 5).is_err());
        assert!(world.apply_damage_at(IVec3::new(0, 99, 0), 5).is_err());
    }

    #[test]
    fn surface_height_tracks_the_column_top() {
        let mut world = manager(0);
        settle(&mut world, Vec3::ZERO);
        let top = world.surface_height(5, 5).expect("column is loaded");
        let surface = IVec3::new(5, top, 5);
        assert_eq!(world.block_at(surface).map(|b| b.kind), Some(BlockKindId::DIRT));
        assert!(world.block_at(surface + IVec3::Y).is_none());

        world.apply_damage_at(surface, u32::MAX).expect("surface block");
        assert_eq!(world.surface_height(5, 5), Some(top - 1).filter(|&y| y >= 0));
        assert_eq!(world.surface_height(900, 900), None);
    }

    proptest! {
        #[test]
        fn hp_never_increases_and_destruction_happens_once(
            hits in proptest::collection::vec(0u32..40, 1..30)
        ) {
            let mut world = manager(0);
            settle(&mut world, Vec3::ZERO);
            let chunk = ChunkPos::new(0, 0);
            let local = LocalPos::new(7, 15, 7);
            place(&mut world, chunk, local, BlockKindId::STONE, 80);

            let mut last_hp = 80;
            let mut destroyed = 0;
            for amount in hits {
                match world.apply_damage(chunk, local, amount) {
                    Ok(DamageOutcome::Hit { remaining_hp }) => {
                        prop_assert!(remaining_hp <= last_hp);
                        last_hp = remaining_hp;
                    }
                    Ok(DamageOutcome::Destroyed) => destroyed += 1,
                    Err(WorldError::NoBlockAtPosition { .. }) => prop_assert_eq!(destroyed, 1),
                }
            }

            let mut destroyed_events = 0;
            while let Some(event) = world.pop_event() {
                if matches!(event, WorldEvent::BlockDestroyed { .. }) {
                    destroyed_events += 1;
                }
            }
            prop_assert!(destroyed <= 1);
            prop_assert_eq!(destroyed_events, destroyed);
        }
    }
}
