use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use shardfall_shared::block::{rgb_from_hex, BlockKindId};

use crate::pool::Slot;
use crate::surface::{InstanceRaw, OFFSCREEN_Y};

const ITEM_SCALE: f32 = 0.25;
const ITEM_BOB_AMPLITUDE: f32 = 0.08;
const ITEM_BOB_SPEED: f32 = 2.8;
const ITEM_ROTATION_SPEED: f32 = 1.7;
const POP_SPEED: f32 = 3.0;
const POP_SPREAD: f32 = 1.5;

const CRYSTAL_DROP_COLOR: u32 = 0x00FFFF;
const MATERIAL_DROP_COLOR: u32 = 0x55AA55;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropStyle {
    Crystal,
    #[default]
    Material,
}

impl DropStyle {
    pub fn color(self) -> [f32; 3] {
        match self {
            DropStyle::Crystal => rgb_from_hex(CRYSTAL_DROP_COLOR),
            DropStyle::Material => rgb_from_hex(MATERIAL_DROP_COLOR),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollectedDrop {
    pub kind: BlockKindId,
    pub style: DropStyle,
    pub position: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemDrop {
    pub kind: BlockKindId,
    pub style: DropStyle,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Height the drop settles at once it stops falling.
    pub rest_y: f32,
    pub age: f32,
    /// Seconds left before the drop despawns.
    pub remaining: f32,
    pub landed: bool,
    pub active: bool,
}

impl Default for ItemDrop {
    fn default() -> Self {
        Self {
            kind: BlockKindId::default(),
            style: DropStyle::default(),
            position: Vec3::new(0.0, OFFSCREEN_Y, 0.0),
            velocity: Vec3::ZERO,
            rest_y: 0.0,
            age: 0.0,
            remaining: 0.0,
            landed: false,
            active: false,
        }
    }
}

impl Slot for ItemDrop {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.remaining = 0.0;
    }
}

impl ItemDrop {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        kind: BlockKindId,
        style: DropStyle,
        position: Vec3,
        rest_y: f32,
        lifetime: f32,
    ) {
        *self = Self {
            kind,
            style,
            position,
            velocity: Vec3::new(
                (rng.random::<f32>() - 0.5) * POP_SPREAD,
                POP_SPEED,
                (rng.random::<f32>() - 0.5) * POP_SPREAD,
            ),
            rest_y,
            age: 0.0,
            remaining: lifetime,
            landed: false,
            active: true,
        };
    }

    pub fn step(&mut self, dt: f32, gravity: f32) -> InstanceRaw {
        if !self.active {
            return InstanceRaw::offscreen();
        }

        self.age += dt;
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.deactivate();
            self.position.y = OFFSCREEN_Y;
            return InstanceRaw::offscreen();
        }

        if !self.landed {
            self.velocity.y -= gravity * dt;
            self.position += self.velocity * dt;
            if self.position.y <= self.rest_y && self.velocity.y <= 0.0 {
                self.position.y = self.rest_y;
                self.velocity = Vec3::ZERO;
                self.landed = true;
            }
        }

        let bob = if self.landed {
            (self.age * ITEM_BOB_SPEED).sin() * ITEM_BOB_AMPLITUDE
        } else {
            0.0
        };
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(ITEM_SCALE),
            Quat::from_rotation_y(self.age * ITEM_ROTATION_SPEED),
            self.position + Vec3::Y * bob,
        );
        let [r, g, b] = self.style.color();
        InstanceRaw::new(model, [r, g, b, 1.0])
    }

    pub fn collect(&mut self) -> CollectedDrop {
        self.deactivate();
        CollectedDrop {
            kind: self.kind,
            style: self.style,
            position: self.position,
        }
    }
}
