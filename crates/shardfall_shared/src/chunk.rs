use rustc_hash::FxHashMap;

use crate::block::BlockKindId;
use crate::coords::{ChunkPos, LocalPos};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockInstance {
    pub kind: BlockKindId,
    pub hp: u32,
}

impl BlockInstance {
    pub fn new(kind: BlockKindId, hp: u32) -> Self {
        Self { kind, hp }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Generating,
    Active,
}

/// Sparse block storage for one chunk; empty cells are simply absent.
#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    size: i32,
    state: ChunkState,
    blocks: FxHashMap<LocalPos, BlockInstance>,
}

impl Chunk {
    pub fn new(pos: ChunkPos, size: i32) -> Self {
        Self {
            pos,
            size,
            state: ChunkState::Generating,
            blocks: FxHashMap::default(),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_generated(&self) -> bool {
        self.state == ChunkState::Active
    }

    pub fn mark_active(&mut self) {
        self.state = ChunkState::Active;
    }

    pub fn get(&self, local: LocalPos) -> Option<&BlockInstance> {
        self.blocks.get(&local)
    }

    pub fn get_mut(&mut self, local: LocalPos) -> Option<&mut BlockInstance> {
        self.blocks.get_mut(&local)
    }

    pub fn set(&mut self, local: LocalPos, block: BlockInstance) {
        assert!(
            local.in_bounds(self.size),
            "local position {local:?} outside chunk of size {}",
            self.size
        );
        self.blocks.insert(local, block);
    }

    pub fn remove(&mut self, local: LocalPos) -> Option<BlockInstance> {
        self.blocks.remove(&local)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocalPos, &BlockInstance)> {
        self.blocks.iter()
    }

    /// Highest occupied `y` in the column, if any.
    pub fn column_top(&self, x: u8, z: u8) -> Option<u8> {
        let height = u8::try_from(self.size).unwrap_or(u8::MAX);
        (0..height)
            .rev()
            .find(|&y| self.blocks.contains_key(&LocalPos { x, y, z }))
    }

    /// Kind per occupied cell in a stable order, for comparing generations.
    pub fn kind_grid(&self) -> Vec<(LocalPos, BlockKindId)> {
        let mut grid: Vec<(LocalPos, BlockKindId)> = self
            .blocks
            .iter()
            .map(|(&local, block)| (local, block.kind))
            .collect();
        grid.sort_unstable_by_key(|(local, _)| *local);
        grid
    }
}
