use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use shardfall_core::AudioConfig;
use shardfall_shared::block::BlockKindId;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToneRequest {
    pub frequency: f32,
    pub waveform: Waveform,
    /// Seconds.
    pub duration: f32,
    pub volume: f32,
}

/// Host side of the audio path: something that can synthesize a single tone.
pub trait ToneGenerator {
    fn play(&mut self, tone: ToneRequest);
}

/// Tone sink for headless runs; every request becomes a debug log line.
#[derive(Debug, Default)]
pub struct LoggingToneGenerator {
    played: u64,
}

impl LoggingToneGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> u64 {
        self.played
    }
}

impl ToneGenerator for LoggingToneGenerator {
    fn play(&mut self, tone: ToneRequest) {
        self.played += 1;
        debug!(
            "Tone {:?} {:.0} Hz for {:.2}s at volume {:.2}",
            tone.waveform, tone.frequency, tone.duration, tone.volume
        );
    }
}

/// Maps gameplay stimuli to tone requests.
pub struct AudioStimulusMapper<G> {
    generator: G,
    enabled: bool,
    volume: f32,
    rng: Pcg32,
}

impl<G: ToneGenerator> AudioStimulusMapper<G> {
    pub fn new(generator: G, config: &AudioConfig, seed: u64) -> Self {
        Self {
            generator,
            enabled: config.enabled,
            volume: config.volume.clamp(0.0, 1.0),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    fn emit(&mut self, frequency: f32, waveform: Waveform, duration: f32, volume: f32) {
        if !self.enabled {
            return;
        }
        self.generator.play(ToneRequest {
            frequency,
            waveform,
            duration,
            volume: volume * self.volume,
        });
    }

    pub fn on_hit(&mut self) {
        let frequency = self.rng.random_range(100.0..150.0);
        self.emit(frequency, Waveform::Square, 0.05, 0.05);
    }

    pub fn on_break(&mut self, kind: BlockKindId) {
        if kind == BlockKindId::CRYSTAL {
            self.emit(600.0, Waveform::Sine, 0.4, 0.2);
        } else {
            self.emit(80.0, Waveform::Sawtooth, 0.15, 0.2);
        }
    }

    pub fn on_collect(&mut self) {
        let frequency = self.rng.random_range(1200.0..1400.0);
        self.emit(frequency, Waveform::Sine, 0.1, 0.1);
    }
}

#[cfg(test)]
mod tests {
    use shardfall_core::AudioConfig;
    use shardfall_shared::block::BlockKindId;

    use super::{AudioStimulusMapper, ToneGenerator, ToneRequest, Waveform};

    #[derive(Default)]
    struct RecordingGenerator {
        tones: Vec<ToneRequest>,
    }

    impl ToneGenerator for RecordingGenerator {
        fn play(&mut self, tone: ToneRequest) {
            self.tones.push(tone);
        }
    }

    fn mapper() -> AudioStimulusMapper<RecordingGenerator> {
        AudioStimulusMapper::new(RecordingGenerator::default(), &AudioConfig::default(), 42)
    }

    #[test]
    fn hits_are_short_square_clicks() {
        let mut audio = mapper();
        for _ in 0..20 {
            audio.on_hit();
        }
        for tone in &audio.generator().tones {
            assert_eq!(tone.waveform, Waveform::Square);
            assert!((100.0..150.0).contains(&tone.frequency));
            assert_eq!(tone.duration, 0.05);
            assert_eq!(tone.volume, 0.05);
        }
        assert_eq!(audio.generator().tones.len(), 20);
    }

    #[test]
    fn crystal_breaks_ring_and_others_rumble() {
        let mut audio = mapper();
        audio.on_break(BlockKindId::CRYSTAL);
        audio.on_break(BlockKindId::STONE);

        let tones = &audio.generator().tones;
        assert_eq!(
            tones[0],
            ToneRequest {
                frequency: 600.0,
                waveform: Waveform::Sine,
                duration: 0.4,
                volume: 0.2
            }
        );
        assert_eq!(tones[1].waveform, Waveform::Sawtooth);
        assert_eq!(tones[1].frequency, 80.0);
        assert_eq!(tones[1].duration, 0.15);
    }

    #[test]
    fn collect_chimes_high() {
        let mut audio = mapper();
        audio.on_collect();
        let tone = audio.generator().tones[0];
        assert_eq!(tone.waveform, Waveform::Sine);
        assert!((1200.0..1400.0).contains(&tone.frequency));
        assert_eq!(tone.duration, 0.1);
    }

    #[test]
    fn disabled_mapper_forwards_nothing() {
        let mut audio = mapper();
        audio.set_enabled(false);
        audio.on_hit();
        audio.on_break(BlockKindId::DIRT);
        audio.on_collect();
        assert!(audio.generator().tones.is_empty());
    }

    #[test]
    fn master_volume_scales_requests() {
        let config = AudioConfig {
            enabled: true,
            volume: 0.5,
        };
        let mut audio = AudioStimulusMapper::new(RecordingGenerator::default(), &config, 1);
        audio.on_break(BlockKindId::MAGMA);
        assert!((audio.generator().tones[0].volume - 0.1).abs() < 1e-6);

        audio.set_volume(3.0);
        assert_eq!(audio.volume(), 1.0);
    }
}
