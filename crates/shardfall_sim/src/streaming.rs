use shardfall_shared::coords::ChunkPos;

/// What one streaming pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub center: ChunkPos,
    pub generated: Vec<ChunkPos>,
    pub evicted: Vec<ChunkPos>,
    /// Window chunks still waiting because the generation budget ran out.
    pub pending: usize,
}

impl StreamReport {
    pub fn is_idle(&self) -> bool {
        self.generated.is_empty() && self.evicted.is_empty()
    }
}

/// Every chunk in the square window of `radius` around `center`, nearest
/// first. Ties keep row-major order so the sequence is stable.
pub fn stream_window(center: ChunkPos, radius: i32) -> Vec<ChunkPos> {
    let side = (2 * radius + 1).max(0) as usize;
    let mut window = Vec::with_capacity(side * side);
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            window.push(ChunkPos::new(center.x + dx, center.z + dz));
        }
    }
    window.sort_by_key(|pos| pos.chebyshev_distance(center));
    window
}

pub fn in_window(center: ChunkPos, radius: i32, pos: ChunkPos) -> bool {
    pos.chebyshev_distance(center) <= radius
}
