use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use shardfall_fx::{RenderSurface, TextSink, ToneGenerator};
use tracing::info;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::frame::{FrameReport, Simulation};

/// Accumulates wall-clock time into whole simulation steps.
#[derive(Clone, Debug, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `SIM_DT` steps owed for a frame of `frame_dt` seconds.
    /// Whole steps beyond `MAX_SUBSTEPS` are dropped; a sub-step remainder
    /// carries over.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if self.accumulator >= SIM_DT {
            self.accumulator = 0.0;
        }
        substeps
    }

    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub generated: usize,
    pub evicted: usize,
    pub hits: usize,
    pub destroyed: usize,
    pub collected: usize,
}

impl RunSummary {
    fn record(&mut self, report: &FrameReport) {
        self.ticks += 1;
        self.generated += report.stream.generated.len();
        self.evicted += report.stream.evicted.len();
        self.hits += report.hits;
        self.destroyed += report.destroyed;
        self.collected += report.collected;
    }
}

/// Paces the simulation at `SIM_DT` until `running` clears or `max_ticks`
/// ticks have run. `drive` is called before every tick to move the focus and
/// queue strikes.
pub fn run<G, S, T, F>(
    sim: &mut Simulation<G>,
    surface: &mut S,
    text_sink: &mut T,
    running: &AtomicBool,
    max_ticks: Option<u64>,
    mut drive: F,
) -> RunSummary
where
    G: ToneGenerator,
    S: RenderSurface + ?Sized,
    T: TextSink + ?Sized,
    F: FnMut(&mut Simulation<G>),
{
    let frame_budget = Duration::from_secs_f32(SIM_DT);
    let mut stepper = FixedStep::new();
    let mut summary = RunSummary::default();
    let mut last_frame = Instant::now();
    // First frame runs a tick right away.
    let mut owed = 1;

    info!(
        "Simulation running at {:.0} Hz{}",
        1.0 / SIM_DT,
        max_ticks.map_or(String::new(), |n| format!(" for {n} ticks"))
    );

    'frames: while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();
        owed += stepper.advance(frame_start.duration_since(last_frame).as_secs_f32());
        last_frame = frame_start;

        for _ in 0..owed {
            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                break 'frames;
            }
            drive(sim);
            let report = sim.tick(SIM_DT, surface, text_sink);
            summary.record(&report);
        }
        owed = 0;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    info!(
        "Simulation stopped after {} ticks: {} chunks generated, {} evicted, {} hits, {} blocks destroyed, {} drops collected",
        summary.ticks,
        summary.generated,
        summary.evicted,
        summary.hits,
        summary.destroyed,
        summary.collected
    );
    summary
}
