/// Sound effects, synthesised once at start-up and played through rodio.
///
/// Every effect is a short mono buffer of f32 samples. Playing one hands a
/// copy to rodio's mixer thread and returns immediately. Built without the
/// "sound" feature, `SoundEngine` is a stub with the same methods.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod engine {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle};

    use super::synth::{self, SAMPLE_RATE};

    pub struct SoundEngine {
        // Dropping the stream silences everything, so it lives as long as we do.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Vec<f32>,
        point: Vec<f32>,
        crash: Vec<f32>,
        select: Vec<f32>,
    }

    impl SoundEngine {
        /// None when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| log::warn!("No audio output, sound disabled: {e}"))
                .ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: synth::jump(),
                point: synth::point(),
                crash: synth::crash(),
                select: synth::select(),
            })
        }

        fn play(&self, samples: &[f32]) {
            let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec());
            if let Err(e) = self.handle.play_raw(source) {
                log::debug!("sfx dropped: {e}");
            }
        }

        pub fn play_jump(&self) { self.play(&self.jump); }
        pub fn play_point(&self) { self.play(&self.point); }
        pub fn play_crash(&self) { self.play(&self.crash); }
        pub fn play_select(&self) { self.play(&self.select); }
    }
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    pub const SAMPLE_RATE: u32 = 22050;

    /// One segment of an effect: a pitch glide under a decaying envelope,
    /// optionally mixed with an overtone and white noise.
    #[derive(Clone, Copy)]
    pub struct Voice {
        pub from_hz: f32,
        pub to_hz: f32,
        pub secs: f32,
        pub gain: f32,
        /// Envelope exponent: `(1 - t)^decay`.
        pub decay: f32,
        /// Share of the third harmonic, 0..1.
        pub overtone: f32,
        /// Share of noise, 0..1.
        pub noise: f32,
    }

    impl Voice {
        const fn tone(from_hz: f32, to_hz: f32, secs: f32, gain: f32) -> Self {
            Voice { from_hz, to_hz, secs, gain, decay: 1.0, overtone: 0.0, noise: 0.0 }
        }
    }

    /// Render voices back to back.
    pub fn render(voices: &[Voice]) -> Vec<f32> {
        let mut out = Vec::new();
        let mut seed: u32 = 0x9E37_79B9;
        for v in voices {
            let n = (SAMPLE_RATE as f32 * v.secs) as usize;
            let mut phase = 0.0_f32;
            for i in 0..n {
                let t = i as f32 / n as f32;
                let hz = v.from_hz + (v.to_hz - v.from_hz) * t;
                phase = (phase + hz / SAMPLE_RATE as f32).fract();

                let tone = (phase * TAU).sin() * (1.0 - v.overtone)
                    + (phase * 3.0 * TAU).sin() * v.overtone;
                let hiss = next_noise(&mut seed);
                let env = (1.0 - t).powf(v.decay);

                let s = (tone * (1.0 - v.noise) + hiss * v.noise) * env * v.gain;
                out.push(s.clamp(-1.0, 1.0));
            }
        }
        out
    }

    /// xorshift32 mapped to -1..1
    fn next_noise(state: &mut u32) -> f32 {
        let mut x = *state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *state = x;
        x as f32 / u32::MAX as f32 * 2.0 - 1.0
    }

    pub fn jump() -> Vec<f32> {
        render(&[Voice { decay: 0.7, ..Voice::tone(300.0, 700.0, 0.09, 0.25) }])
    }

    /// Two rising blips.
    pub fn point() -> Vec<f32> {
        let blip = |hz| Voice { decay: 0.5, overtone: 0.3, ..Voice::tone(hz, hz, 0.04, 0.2) };
        render(&[blip(1319.0), blip(1760.0)])
    }

    pub fn crash() -> Vec<f32> {
        render(&[Voice { decay: 1.2, noise: 0.5, ..Voice::tone(220.0, 80.0, 0.35, 0.35) }])
    }

    pub fn select() -> Vec<f32> {
        render(&[Voice::tone(880.0, 880.0, 0.06, 0.25)])
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn lengths_follow_voice_durations() {
            assert_eq!(select().len(), (SAMPLE_RATE as f32 * 0.06) as usize);
            assert_eq!(point().len(), 2 * (SAMPLE_RATE as f32 * 0.04) as usize);
        }

        #[test]
        fn effects_stay_in_range_and_fade_out() {
            for s in [jump(), point(), crash(), select()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
                let tail = s[s.len() - 8..].iter().map(|v| v.abs()).fold(0.0, f32::max);
                assert!(tail < 0.05);
            }
        }

        #[test]
        fn noise_is_bounded() {
            let mut seed = 1;
            for _ in 0..1000 {
                let n = next_noise(&mut seed);
                assert!((-1.0..=1.0).contains(&n));
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use engine::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_point(&self) {}
    pub fn play_crash(&self) {}
    pub fn play_select(&self) {}
}

/// Route simulation events to sound effects.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::ObstaclePassed { .. } => sfx.play_point(),
            GameEvent::Collision { .. } => sfx.play_crash(),
            GameEvent::ObstacleSpawned { .. } => {}
        }
    }
}
