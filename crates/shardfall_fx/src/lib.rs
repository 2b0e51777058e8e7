//! Fixed-capacity effect pools and the audio stimulus mapper.
//!
//! Everything here reacts to world events; nothing reaches back into the
//! world. Rendering and audio output are traits implemented by the host.

pub mod ambient;
pub mod audio;
pub mod decals;
pub mod drops;
pub mod effects;
pub mod particles;
pub mod pool;
pub mod surface;
pub mod text;

pub use audio::{AudioStimulusMapper, LoggingToneGenerator, ToneGenerator, ToneRequest, Waveform};
pub use drops::{CollectedDrop, DropStyle};
pub use effects::{EffectPools, PoolError};
pub use particles::{ParticlePool, ParticleVariant};
pub use surface::{FrameView, InstanceRaw, InstanceSnapshot, PoolId, RenderSurface, TextLabel, TextSink};
