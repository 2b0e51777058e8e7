use glam::{IVec3, Vec3};
use shardfall_core::{EventQueue, SimConfig};
use shardfall_fx::{
    AudioStimulusMapper, EffectPools, FrameView, RenderSurface, TextSink, ToneGenerator,
};
use shardfall_shared::block::register_default_blocks;
use shardfall_shared::worldgen::WorldGenError;
use tracing::{debug, warn};

use crate::streaming::StreamReport;
use crate::world::{ChunkManager, WorldEvent};

const COLLECT_LABEL: &str = "+1";
const LABEL_LIFT: f32 = 0.5;
// Keeps audio pitch jitter independent of the effect jitter stream.
const AUDIO_SEED_SALT: u64 = 0xA0D1_0000;

/// Damage requested against a world block, applied on the next tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Strike {
    pub world_pos: IVec3,
    pub damage: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub stream: StreamReport,
    pub hits: usize,
    pub destroyed: usize,
    pub collected: usize,
    pub missed: usize,
}

/// Drives the world and the effects layer one tick at a time.
pub struct Simulation<G> {
    world: ChunkManager,
    effects: EffectPools,
    audio: AudioStimulusMapper<G>,
    strikes: EventQueue<Strike>,
    focus: Vec3,
    view: FrameView,
    collect_radius: f32,
    tick: u64,
}

impl<G: ToneGenerator> Simulation<G> {
    pub fn new(config: &SimConfig, tones: G) -> Result<Self, WorldGenError> {
        let world = ChunkManager::new(&config.world, register_default_blocks())?;
        Ok(Self {
            world,
            effects: EffectPools::new(&config.effects),
            audio: AudioStimulusMapper::new(
                tones,
                &config.audio,
                config.effects.rng_seed ^ AUDIO_SEED_SALT,
            ),
            strikes: EventQueue::new(),
            focus: Vec3::ZERO,
            view: FrameView::default(),
            collect_radius: config.effects.collect_radius,
            tick: 0,
        })
    }

    pub fn world(&self) -> &ChunkManager {
        &self.world
    }

    pub fn effects(&self) -> &EffectPools {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectPools {
        &mut self.effects
    }

    pub fn audio(&self) -> &AudioStimulusMapper<G> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioStimulusMapper<G> {
        &mut self.audio
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus = focus;
    }

    pub fn set_view(&mut self, view: FrameView) {
        self.view = view;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn queue_strike(&mut self, world_pos: IVec3, damage: u32) {
        self.strikes.push(Strike { world_pos, damage });
    }

    /// Streaming, queued damage, then the resulting events, then effect
    /// integration. Everything a strike causes shows up in the same tick.
    pub fn tick<S, T>(&mut self, dt: f32, surface: &mut S, text_sink: &mut T) -> FrameReport
    where
        S: RenderSurface + ?Sized,
        T: TextSink + ?Sized,
    {
        self.tick += 1;
        let mut report = FrameReport {
            tick: self.tick,
            stream: self.world.update_focus(self.focus),
            ..FrameReport::default()
        };
        self.effects.set_focus(self.focus);

        for strike in self.strikes.drain() {
            if let Err(err) = self.world.apply_damage_at(strike.world_pos, strike.damage) {
                debug!("Strike ignored: {}", err);
                report.missed += 1;
            }
        }

        while let Some(event) = self.world.pop_event() {
            match event {
                WorldEvent::BlockHit {
                    kind, world_pos, ..
                } => match self.world.registry().lookup(kind) {
                    Ok(block) => {
                        self.effects.chip(block, world_pos);
                        self.audio.on_hit();
                        report.hits += 1;
                    }
                    Err(err) => warn!("Dropping hit event: {}", err),
                },
                WorldEvent::BlockDestroyed { kind, world_pos } => {
                    match self.world.registry().lookup(kind) {
                        Ok(block) => {
                            self.effects.burst(block, world_pos);
                            self.audio.on_break(kind);
                            report.destroyed += 1;
                        }
                        Err(err) => warn!("Dropping destruction event: {}", err),
                    }
                }
            }
        }

        for drop in self.effects.collect_drops(self.focus, self.collect_radius) {
            self.audio.on_collect();
            self.effects
                .spawn_text(drop.position + Vec3::Y * LABEL_LIFT, COLLECT_LABEL);
            report.collected += 1;
        }

        self.effects.update(dt, surface, &self.view, text_sink);
        report
    }
}
