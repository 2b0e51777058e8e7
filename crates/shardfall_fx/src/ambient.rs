use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use shardfall_shared::block::rgb_from_hex;

use crate::pool::Slot;
use crate::surface::InstanceRaw;

const MOTE_COLOR: u32 = 0xFFFFAA;
const MOTE_OPACITY: f32 = 0.6;
const MOTE_SIZE: f32 = 0.15;
const MOTE_SPREAD: f32 = 20.0;
const MOTE_HEIGHT: f32 = 5.0;
const DRIFT_AMPLITUDE: f32 = 0.4;
const DRIFT_SPEED: f32 = 0.5;

/// One slow mote hovering around the focus. Motes never expire; the whole
/// field is shown or hidden at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mote {
    pub offset: Vec3,
    pub phase: f32,
    pub active: bool,
}

impl Slot for Mote {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Mote {
    pub fn scatter<R: Rng>(&mut self, rng: &mut R) {
        self.offset = Vec3::new(
            (rng.random::<f32>() - 0.5) * MOTE_SPREAD,
            rng.random::<f32>() * MOTE_HEIGHT,
            (rng.random::<f32>() - 0.5) * MOTE_SPREAD,
        );
        self.phase = rng.random::<f32>() * std::f32::consts::TAU;
        self.active = true;
    }

    pub fn step(&mut self, dt: f32, focus: Vec3, visible: bool) -> InstanceRaw {
        if !self.active || !visible {
            return InstanceRaw::offscreen();
        }

        self.phase += dt * DRIFT_SPEED;
        let drift = Vec3::new(
            self.phase.sin(),
            (self.phase * 0.7).cos() * 0.5,
            (self.phase * 1.3).cos(),
        ) * DRIFT_AMPLITUDE;
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(MOTE_SIZE),
            Quat::IDENTITY,
            focus + self.offset + drift,
        );
        let [r, g, b] = rgb_from_hex(MOTE_COLOR);
        InstanceRaw::new(model, [r, g, b, MOTE_OPACITY])
    }
}
