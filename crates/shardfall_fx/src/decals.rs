use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};
use shardfall_shared::block::rgb_from_hex;

use crate::pool::{remaining_life, Slot};
use crate::surface::InstanceRaw;

const SHOCKWAVE_DURATION: f32 = 0.5;
const SHOCKWAVE_OPACITY: f32 = 0.6;
const SHOCKWAVE_MAX_SCALE: f32 = 4.0;
const TRAIL_DURATION: f32 = 0.6;
const TRAIL_OPACITY: f32 = 0.3;
const TRAIL_COLOR: u32 = 0xFFAA00;
const TRAIL_SIZE: f32 = 0.6;
// Lifts ground decals off the block face they sit on.
const DECAL_LIFT: f32 = 0.02;

/// Which flat, ground-aligned effect a [`Decal`] slot draws.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DecalKind {
    #[default]
    Shockwave,
    Trail,
}

impl DecalKind {
    fn duration(self) -> f32 {
        match self {
            DecalKind::Shockwave => SHOCKWAVE_DURATION,
            DecalKind::Trail => TRAIL_DURATION,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decal {
    pub kind: DecalKind,
    pub position: Vec3,
    pub life: f32,
    pub age: f32,
    pub active: bool,
}

impl Slot for Decal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.life = 0.0;
    }
}

impl Decal {
    pub fn spawn(&mut self, kind: DecalKind, position: Vec3) {
        *self = Self {
            kind,
            position: position + Vec3::Y * DECAL_LIFT,
            life: 1.0,
            age: 0.0,
            active: true,
        };
    }

    pub fn step(&mut self, dt: f32) -> InstanceRaw {
        if !self.active {
            return InstanceRaw::offscreen();
        }

        self.age += dt;
        let Some(life) = remaining_life(self.age, self.kind.duration()) else {
            self.deactivate();
            return InstanceRaw::offscreen();
        };
        self.life = life;

        let flat = Quat::from_rotation_x(-FRAC_PI_2);
        match self.kind {
            DecalKind::Shockwave => {
                let scale = 1.0 + (1.0 - self.life) * (SHOCKWAVE_MAX_SCALE - 1.0);
                let model = Mat4::from_scale_rotation_translation(
                    Vec3::new(scale, scale, 1.0),
                    flat,
                    self.position,
                );
                InstanceRaw::new(model, [1.0, 1.0, 1.0, SHOCKWAVE_OPACITY * self.life])
            }
            DecalKind::Trail => {
                let model = Mat4::from_scale_rotation_translation(
                    Vec3::new(TRAIL_SIZE, TRAIL_SIZE, 1.0),
                    flat,
                    self.position,
                );
                let [r, g, b] = rgb_from_hex(TRAIL_COLOR);
                InstanceRaw::new(model, [r, g, b, TRAIL_OPACITY * self.life])
            }
        }
    }
}
