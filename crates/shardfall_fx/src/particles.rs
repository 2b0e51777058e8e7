use std::f32::consts::PI;
use std::str::FromStr;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::effects::PoolError;
use crate::pool::{remaining_life, Slot};
use crate::surface::{InstanceRaw, OFFSCREEN_Y};

const FRAGMENT_SIZE: f32 = 0.12;
const DUST_SIZE: f32 = 0.1;
const SPAWN_JITTER: f32 = 0.5;
const SPARK_SPEEDUP: f32 = 3.0;
const DUST_GRAVITY_SCALE: f32 = 0.35;
const MIN_MAX_LIFE: f32 = 0.5;
const MAX_MAX_LIFE: f32 = 1.0;

/// The high-churn instanced pools.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParticlePool {
    Fragments,
    Dust,
}

impl ParticlePool {
    pub fn name(self) -> &'static str {
        match self {
            ParticlePool::Fragments => "frags",
            ParticlePool::Dust => "dust",
        }
    }
}

impl FromStr for ParticlePool {
    type Err = PoolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "frags" | "fragments" => Ok(ParticlePool::Fragments),
            "dust" => Ok(ParticlePool::Dust),
            other => Err(PoolError::UnknownPoolName(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParticleVariant {
    #[default]
    Debris,
    /// Dust thrown three times as fast.
    Spark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    /// Remaining life, 1 at spawn down to 0.
    pub life: f32,
    /// Seconds since spawn.
    pub age: f32,
    /// Seconds the particle lives for.
    pub max_life: f32,
    pub color: [f32; 3],
    pub active: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, OFFSCREEN_Y, 0.0),
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            life: 0.0,
            age: 0.0,
            max_life: 1.0,
            color: [1.0; 3],
            active: false,
        }
    }
}

impl Slot for Particle {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.life = 0.0;
    }
}

fn centered<R: Rng>(rng: &mut R, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}

impl Particle {
    fn reset<R: Rng>(&mut self, rng: &mut R, origin: Vec3, color: [f32; 3]) {
        self.active = true;
        self.life = 1.0;
        self.age = 0.0;
        self.max_life = rng.random_range(MIN_MAX_LIFE..MAX_MAX_LIFE);
        // One offset shared by all three axes.
        self.position = origin + Vec3::splat(centered(rng, SPAWN_JITTER));
        self.color = color;
    }

    pub fn spawn_fragment<R: Rng>(&mut self, rng: &mut R, origin: Vec3, color: [f32; 3]) {
        self.reset(rng, origin, color);
        self.velocity = Vec3::new(
            centered(rng, 5.0),
            rng.random::<f32>() * 4.0 + 2.0,
            centered(rng, 5.0),
        );
        self.rotation = Vec3::new(
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
        );
        self.angular_velocity = Vec3::new(
            centered(rng, 10.0),
            centered(rng, 10.0),
            centered(rng, 10.0),
        );
    }

    pub fn spawn_dust<R: Rng>(
        &mut self,
        rng: &mut R,
        origin: Vec3,
        color: [f32; 3],
        variant: ParticleVariant,
    ) {
        self.reset(rng, origin, color);
        self.velocity = Vec3::new(
            centered(rng, 2.0),
            rng.random::<f32>() * 1.5,
            centered(rng, 2.0),
        );
        if variant == ParticleVariant::Spark {
            self.velocity *= SPARK_SPEEDUP;
        }
        self.rotation = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Integrates one frame and returns the instance to draw for this slot.
    pub fn step(&mut self, dt: f32, gravity: f32, pool: ParticlePool) -> InstanceRaw {
        if !self.active {
            return InstanceRaw::offscreen();
        }

        let gravity_scale = match pool {
            ParticlePool::Fragments => 1.0,
            ParticlePool::Dust => DUST_GRAVITY_SCALE,
        };
        self.velocity.y -= gravity * gravity_scale * dt;
        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;
        self.age += dt;

        let Some(life) = remaining_life(self.age, self.max_life) else {
            self.deactivate();
            self.position.y = OFFSCREEN_Y;
            return InstanceRaw::offscreen();
        };
        self.life = life;

        let (size, rotation) = match pool {
            ParticlePool::Fragments => (
                FRAGMENT_SIZE,
                Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            ),
            ParticlePool::Dust => (DUST_SIZE, Quat::IDENTITY),
        };
        let model =
            Mat4::from_scale_rotation_translation(Vec3::splat(size), rotation, self.position);

        let glow = 0.35 + 0.65 * self.life;
        let [r, g, b] = self.color;
        InstanceRaw::new(model, [r * glow, g * glow, b * glow, self.life])
    }
}
