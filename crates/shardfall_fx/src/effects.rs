use std::fmt;

use glam::{IVec3, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use shardfall_core::EffectsConfig;
use shardfall_shared::block::{rgb_from_hex, BlockFlags, BlockKind};
use shardfall_shared::coords::block_center;
use tracing::debug;

use crate::ambient::Mote;
use crate::decals::{Decal, DecalKind};
use crate::drops::{CollectedDrop, DropStyle, ItemDrop};
use crate::particles::{Particle, ParticlePool, ParticleVariant};
use crate::pool::{RingPool, Slot};
use crate::surface::{FrameView, InstanceRaw, PoolId, RenderSurface, TextSink};
use crate::text::FloatingText;

const BURST_FRAGMENTS: usize = 12;
const BURST_DUST: usize = 8;
const BURST_SPARKS: usize = 10;
const CHIP_DUST: usize = 3;
const SPARK_COLOR: u32 = 0xFFFFAA;
const DROP_REST_OFFSET: f32 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    UnknownPoolName(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPoolName(name) => write!(f, "unknown effect pool '{name}'"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Owns every effect slot. Capacities are fixed at construction and nothing
/// allocates per spawn.
pub struct EffectPools {
    fragments: RingPool<Particle>,
    dust: RingPool<Particle>,
    drops: RingPool<ItemDrop>,
    shockwaves: RingPool<Decal>,
    trails: RingPool<Decal>,
    texts: RingPool<FloatingText>,
    motes: RingPool<Mote>,
    ambient_visible: bool,
    focus: Vec3,
    gravity: f32,
    drop_lifetime: f32,
    rng: Pcg32,
    staging: Vec<InstanceRaw>,
}

impl EffectPools {
    pub fn new(config: &EffectsConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.rng_seed);
        let mut motes = RingPool::<Mote>::new(config.ambient_motes.max(1));
        for mote in motes.slots_mut() {
            mote.scatter(&mut rng);
        }

        let largest = [
            config.particle_capacity,
            config.drop_capacity,
            config.shockwave_capacity,
            config.trail_capacity,
            config.ambient_motes,
        ]
        .into_iter()
        .max()
        .unwrap_or(1);

        Self {
            fragments: RingPool::new(config.particle_capacity.max(1)),
            dust: RingPool::new(config.particle_capacity.max(1)),
            drops: RingPool::new(config.drop_capacity.max(1)),
            shockwaves: RingPool::new(config.shockwave_capacity.max(1)),
            trails: RingPool::new(config.trail_capacity.max(1)),
            texts: RingPool::new(config.text_capacity.max(1)),
            motes,
            ambient_visible: false,
            focus: Vec3::ZERO,
            gravity: config.gravity,
            drop_lifetime: config.drop_lifetime,
            rng,
            staging: Vec::with_capacity(largest),
        }
    }

    /// Writes `count` particles into consecutive ring slots, overwriting
    /// whatever lived there.
    pub fn spawn(
        &mut self,
        pool: ParticlePool,
        position: Vec3,
        color: [f32; 3],
        count: usize,
        variant: ParticleVariant,
    ) {
        let slots = match pool {
            ParticlePool::Fragments => &mut self.fragments,
            ParticlePool::Dust => &mut self.dust,
        };
        for _ in 0..count {
            let (_, particle) = slots.claim();
            match pool {
                ParticlePool::Fragments => particle.spawn_fragment(&mut self.rng, position, color),
                ParticlePool::Dust => {
                    particle.spawn_dust(&mut self.rng, position, color, variant)
                }
            }
        }
    }

    /// [`EffectPools::spawn`] addressed by pool name. Unknown names spawn
    /// nothing.
    pub fn spawn_named(
        &mut self,
        name: &str,
        position: Vec3,
        color: [f32; 3],
        count: usize,
        variant: ParticleVariant,
    ) -> Result<(), PoolError> {
        match name.parse::<ParticlePool>() {
            Ok(pool) => {
                self.spawn(pool, position, color, count, variant);
                Ok(())
            }
            Err(err) => {
                debug!("Ignoring spawn of {} particles: {}", count, err);
                Err(err)
            }
        }
    }

    pub fn spawn_drop(&mut self, kind: &BlockKind, style: DropStyle, position: Vec3, rest_y: f32) {
        let (_, item) = self.drops.claim();
        item.spawn(
            &mut self.rng,
            kind.id,
            style,
            position,
            rest_y,
            self.drop_lifetime,
        );
    }

    pub fn spawn_shockwave(&mut self, position: Vec3) {
        let (_, ring) = self.shockwaves.claim();
        ring.spawn(DecalKind::Shockwave, position);
    }

    pub fn spawn_trail(&mut self, position: Vec3) {
        let (_, trail) = self.trails.claim();
        trail.spawn(DecalKind::Trail, position);
    }

    pub fn spawn_text(&mut self, anchor: Vec3, text: &str) {
        let (_, label) = self.texts.claim();
        label.spawn(anchor, text);
    }

    /// Destruction reaction for a block of `kind` that stood at `world_pos`.
    pub fn burst(&mut self, kind: &BlockKind, world_pos: IVec3) {
        let center = block_center(world_pos);
        let floor = world_pos.y as f32;

        self.spawn(
            ParticlePool::Fragments,
            center,
            kind.color,
            BURST_FRAGMENTS,
            ParticleVariant::Debris,
        );
        self.spawn(
            ParticlePool::Dust,
            center,
            kind.color,
            BURST_DUST,
            ParticleVariant::Debris,
        );

        if kind.flags.contains(BlockFlags::SPARKS) {
            self.spawn(
                ParticlePool::Dust,
                center,
                rgb_from_hex(SPARK_COLOR),
                BURST_SPARKS,
                ParticleVariant::Spark,
            );
        }
        if kind.flags.contains(BlockFlags::SHOCKWAVE) {
            self.spawn_shockwave(Vec3::new(center.x, floor, center.z));
        }
        if kind.flags.contains(BlockFlags::TRAIL) {
            self.spawn_trail(Vec3::new(center.x, floor, center.z));
        }
        if kind.flags.contains(BlockFlags::DROPS_ITEM) {
            let style = if kind.flags.contains(BlockFlags::RESONANT) {
                DropStyle::Crystal
            } else {
                DropStyle::Material
            };
            self.spawn_drop(kind, style, center, floor + DROP_REST_OFFSET);
        }
    }

    /// Hit reaction: a puff of dust in the block's color.
    pub fn chip(&mut self, kind: &BlockKind, world_pos: IVec3) {
        self.spawn(
            ParticlePool::Dust,
            block_center(world_pos),
            kind.color,
            CHIP_DUST,
            ParticleVariant::Debris,
        );
    }

    /// Deactivates every live drop within `radius` of `point`.
    pub fn collect_drops(&mut self, point: Vec3, radius: f32) -> Vec<CollectedDrop> {
        let radius_sq = radius * radius;
        self.drops
            .slots_mut()
            .iter_mut()
            .filter(|drop| drop.active && drop.position.distance_squared(point) <= radius_sq)
            .map(ItemDrop::collect)
            .collect()
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus = focus;
    }

    pub fn set_ambient(&mut self, visible: bool) {
        self.ambient_visible = visible;
    }

    pub fn ambient_enabled(&self) -> bool {
        self.ambient_visible
    }

    /// One pass over every slot of every pool. Each instance pool is
    /// submitted exactly once, with one entry per slot.
    pub fn update<S, T>(&mut self, dt: f32, surface: &mut S, view: &FrameView, text_sink: &mut T)
    where
        S: RenderSurface + ?Sized,
        T: TextSink + ?Sized,
    {
        let gravity = self.gravity;
        let staging = &mut self.staging;

        advance_pool(&mut self.fragments, staging, PoolId::Fragments, surface, |p| {
            p.step(dt, gravity, ParticlePool::Fragments)
        });
        advance_pool(&mut self.dust, staging, PoolId::Dust, surface, |p| {
            p.step(dt, gravity, ParticlePool::Dust)
        });
        advance_pool(&mut self.drops, staging, PoolId::Drops, surface, |drop| {
            drop.step(dt, gravity)
        });
        advance_pool(&mut self.shockwaves, staging, PoolId::Shockwaves, surface, |ring| {
            ring.step(dt)
        });
        advance_pool(&mut self.trails, staging, PoolId::Trails, surface, |trail| {
            trail.step(dt)
        });

        let focus = self.focus;
        let visible = self.ambient_visible;
        advance_pool(&mut self.motes, staging, PoolId::Ambient, surface, |mote| {
            mote.step(dt, focus, visible)
        });

        for (slot, label) in self.texts.slots_mut().iter_mut().enumerate() {
            label.step(dt, slot, view, text_sink);
        }
    }

    pub fn active_count(&self, pool: PoolId) -> usize {
        match pool {
            PoolId::Fragments => self.fragments.active_count(),
            PoolId::Dust => self.dust.active_count(),
            PoolId::Drops => self.drops.active_count(),
            PoolId::Shockwaves => self.shockwaves.active_count(),
            PoolId::Trails => self.trails.active_count(),
            PoolId::Ambient if self.ambient_visible => self.motes.active_count(),
            PoolId::Ambient => 0,
        }
    }

    pub fn text_count(&self) -> usize {
        self.texts.active_count()
    }

    pub fn capacity(&self, pool: PoolId) -> usize {
        match pool {
            PoolId::Fragments => self.fragments.capacity(),
            PoolId::Dust => self.dust.capacity(),
            PoolId::Drops => self.drops.capacity(),
            PoolId::Shockwaves => self.shockwaves.capacity(),
            PoolId::Trails => self.trails.capacity(),
            PoolId::Ambient => self.motes.capacity(),
        }
    }

    /// Deactivates every transient effect. Ambient motes keep their layout.
    pub fn clear(&mut self) {
        self.fragments.clear();
        self.dust.clear();
        self.drops.clear();
        self.shockwaves.clear();
        self.trails.clear();
        self.texts.clear();
    }

    pub fn particles(&self, pool: ParticlePool) -> &RingPool<Particle> {
        match pool {
            ParticlePool::Fragments => &self.fragments,
            ParticlePool::Dust => &self.dust,
        }
    }

    pub fn drops(&self) -> &RingPool<ItemDrop> {
        &self.drops
    }

    pub fn texts(&self) -> &RingPool<FloatingText> {
        &self.texts
    }
}

fn advance_pool<T, S, F>(
    pool: &mut RingPool<T>,
    staging: &mut Vec<InstanceRaw>,
    id: PoolId,
    surface: &mut S,
    step: F,
) where
    T: Slot,
    S: RenderSurface + ?Sized,
    F: FnMut(&mut T) -> InstanceRaw,
{
    staging.clear();
    staging.extend(pool.slots_mut().iter_mut().map(step));
    surface.submit(id, staging);
}
