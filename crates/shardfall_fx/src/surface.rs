use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Height inactive instances are parked at, well below any terrain.
pub const OFFSCREEN_Y: f32 = -100.0;
/// Anything below this height counts as parked.
pub const OFFSCREEN_THRESHOLD: f32 = -50.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    pub fn offscreen() -> Self {
        Self::new(
            Mat4::from_translation(Vec3::new(0.0, OFFSCREEN_Y, 0.0)),
            [0.0; 4],
        )
    }

    pub fn translation(&self) -> Vec3 {
        let [x, y, z, _] = self.model[3];
        Vec3::new(x, y, z)
    }

    pub fn is_offscreen(&self) -> bool {
        self.translation().y < OFFSCREEN_THRESHOLD
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PoolId {
    Fragments,
    Dust,
    Drops,
    Shockwaves,
    Trails,
    Ambient,
}

impl PoolId {
    pub const COUNT: usize = 6;
    pub const ALL: [PoolId; Self::COUNT] = [
        PoolId::Fragments,
        PoolId::Dust,
        PoolId::Drops,
        PoolId::Shockwaves,
        PoolId::Trails,
        PoolId::Ambient,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PoolId::Fragments => "frags",
            PoolId::Dust => "dust",
            PoolId::Drops => "drops",
            PoolId::Shockwaves => "shockwaves",
            PoolId::Trails => "trails",
            PoolId::Ambient => "ambient",
        }
    }
}

/// Receives every slot of a pool once per frame, inactive slots included.
pub trait RenderSurface {
    fn submit(&mut self, pool: PoolId, instances: &[InstanceRaw]);
}

/// Keeps the last submitted instance buffer of every pool.
#[derive(Clone, Debug, Default)]
pub struct InstanceSnapshot {
    pools: [Vec<InstanceRaw>; PoolId::COUNT],
    frames: u64,
}

impl InstanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self, pool: PoolId) -> &[InstanceRaw] {
        &self.pools[pool.index()]
    }

    /// Raw bytes ready for a GPU instance buffer upload.
    pub fn as_bytes(&self, pool: PoolId) -> &[u8] {
        bytemuck::cast_slice(self.instances(pool))
    }

    pub fn visible_count(&self, pool: PoolId) -> usize {
        self.instances(pool)
            .iter()
            .filter(|instance| !instance.is_offscreen())
            .count()
    }

    /// Number of `submit` calls received so far.
    pub fn submissions(&self) -> u64 {
        self.frames
    }
}

impl RenderSurface for InstanceSnapshot {
    fn submit(&mut self, pool: PoolId, instances: &[InstanceRaw]) {
        let buffer = &mut self.pools[pool.index()];
        buffer.clear();
        buffer.extend_from_slice(instances);
        self.frames += 1;
    }
}

/// Camera data needed to place floating text on screen.
#[derive(Copy, Clone, Debug)]
pub struct FrameView {
    pub view_proj: Mat4,
    pub viewport: Vec2,
}

impl FrameView {
    /// Screen position in pixels (origin top-left), or `None` behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }

        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextLabel<'a> {
    pub screen: Vec2,
    pub text: &'a str,
    pub anchor: Vec3,
    pub opacity: f32,
}

/// Host-side text elements, one per text pool slot.
pub trait TextSink {
    fn show(&mut self, slot: usize, label: &TextLabel<'_>);
    fn hide(&mut self, slot: usize);
}
