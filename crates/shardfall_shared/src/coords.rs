use std::ops::{Add, Sub};

use glam::{IVec3, Vec3};

pub const DEFAULT_CHUNK_SIZE: i32 = 16;

/// Chunk coordinate on the horizontal grid. Chunks are one chunk tall, so
/// there is no vertical component.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn chebyshev_distance(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl LocalPos {
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    pub fn in_bounds(self, size: i32) -> bool {
        i32::from(self.x) < size && i32::from(self.y) < size && i32::from(self.z) < size
    }
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for ChunkPos {
    type Output = ChunkPos;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

fn div_rem_floor(value: i32, divisor: i32) -> (i32, i32) {
    (value.div_euclid(divisor), value.rem_euclid(divisor))
}

/// Chunk containing a continuous world position (floor division per axis).
pub fn chunk_of(position: Vec3, size: i32) -> ChunkPos {
    let block = position.floor().as_ivec3();
    ChunkPos {
        x: block.x.div_euclid(size),
        z: block.z.div_euclid(size),
    }
}

/// Splits a world block coordinate into chunk and local parts. Returns `None`
/// when `y` lies outside the single vertical chunk layer.
pub fn world_to_chunk(world_pos: IVec3, size: i32) -> Option<(ChunkPos, LocalPos)> {
    if world_pos.y < 0 || world_pos.y >= size {
        return None;
    }

    let (chunk_x, local_x) = div_rem_floor(world_pos.x, size);
    let (chunk_z, local_z) = div_rem_floor(world_pos.z, size);

    let local = LocalPos {
        x: u8::try_from(local_x).ok()?,
        y: u8::try_from(world_pos.y).ok()?,
        z: u8::try_from(local_z).ok()?,
    };
    Some((
        ChunkPos {
            x: chunk_x,
            z: chunk_z,
        },
        local,
    ))
}

pub fn chunk_to_world(chunk_pos: ChunkPos, local: LocalPos, size: i32) -> IVec3 {
    IVec3::new(
        chunk_pos.x * size + i32::from(local.x),
        i32::from(local.y),
        chunk_pos.z * size + i32::from(local.z),
    )
}

/// Center of the block cell at `world_pos`.
pub fn block_center(world_pos: IVec3) -> Vec3 {
    world_pos.as_vec3() + Vec3::splat(0.5)
}
