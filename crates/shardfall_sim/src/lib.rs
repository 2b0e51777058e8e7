pub mod frame;
pub mod runner;
pub mod streaming;
pub mod world;

pub use frame::{FrameReport, Simulation, Strike};
pub use runner::{run, FixedStep, RunSummary};
pub use streaming::StreamReport;
pub use world::{ChunkManager, DamageOutcome, WorldError, WorldEvent};

pub mod consts {
    /// Fixed simulation timestep.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock frame fed into the accumulator, in seconds.
    pub const MAX_FRAME_DT: f32 = 0.25;
}
