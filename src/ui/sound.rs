/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// One sound effect slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Jump,
    Score,
    Smash,
    Pickup,
    Shot,
    Banana,
    BossHit,
    Die,
    Clear,
    Win,
}

impl Sfx {
    pub const ALL: [Sfx; 10] = [
        Sfx::Jump, Sfx::Score, Sfx::Smash, Sfx::Pickup, Sfx::Shot,
        Sfx::Banana, Sfx::BossHit, Sfx::Die, Sfx::Clear, Sfx::Win,
    ];

    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    fn slot(self) -> usize {
        self as usize
    }

    /// Which effect (if any) accompanies a step event.
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::BarrelJumped { .. } => Some(Sfx::Score),
            GameEvent::BarrelSmashed { .. } | GameEvent::MonkeyDestroyed => Some(Sfx::Smash),
            GameEvent::HammerCollected | GameEvent::BlasterCollected => Some(Sfx::Pickup),
            GameEvent::BulletFired => Some(Sfx::Shot),
            GameEvent::BananaThrown => Some(Sfx::Banana),
            GameEvent::BossHit { .. } => Some(Sfx::BossHit),
            GameEvent::PlayerKilled | GameEvent::TimeUp => Some(Sfx::Die),
            GameEvent::LevelCleared => Some(Sfx::Clear),
            GameEvent::GameWon => Some(Sfx::Win),
            GameEvent::BossDefeated => None,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers, indexed by `Sfx`.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            let buffers = Sfx::ALL.iter().map(|&s| Arc::new(make_wav(&generate(s)))).collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx.slot()) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    /// How a note is shaped: overtone mix and amplitude envelope.
    #[derive(Clone, Copy)]
    struct Voice {
        /// (multiple of the fundamental, weight)
        partials: &'static [(f32, f32)],
        /// Exponent of the fade; 1.0 is linear, lower holds longer.
        fade: f32,
        /// Fraction of the amplitude lost by the end of the note.
        depth: f32,
        volume: f32,
    }

    const PURE: Voice = Voice { partials: &[(1.0, 1.0)], fade: 1.0, depth: 1.0, volume: 0.3 };
    const RETRO: Voice = Voice { partials: &[(1.0, 0.7), (3.0, 0.3)], fade: 0.5, depth: 1.0, volume: 0.25 };
    const BRASS: Voice = Voice { partials: &[(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)], fade: 1.0, depth: 0.3, volume: 0.3 };
    const MOURN: Voice = Voice { partials: &[(1.0, 1.0)], fade: 1.0, depth: 0.3, volume: 0.3 };

    fn samples_for(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Append one note to `out`.
    fn note(out: &mut Vec<f32>, freq: f32, secs: f32, v: Voice) {
        let n = samples_for(secs).max(1);
        out.extend((0..n).map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(v.fade) * v.depth;
            let wave: f32 = v.partials.iter().map(|&(k, w)| (t * freq * k * TAU).sin() * w).sum();
            wave * env * v.volume
        }));
    }

    fn melody(notes: &[(f32, f32)], v: Voice) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, secs) in notes {
            note(&mut out, freq, secs, v);
        }
        out
    }

    /// Pitch glide from `from` to `to`, optionally mixed with noise.
    fn glide(from: f32, to: f32, secs: f32, noise: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(secs).max(1);
        let mut phase = 0.0_f32;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345); // LCG
                let hiss = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let tone = (phase * TAU).sin();
                (tone * (1.0 - noise) + hiss * noise) * (1.0 - t).powf(0.7) * volume
            })
            .collect()
    }

    /// Fade the tail quarter to silence.
    fn tail_fade(mut s: Vec<f32>) -> Vec<f32> {
        let len = s.len();
        let fade = (len / 4).max(1);
        for (i, x) in s.iter_mut().enumerate().skip(len.saturating_sub(fade)) {
            *x *= (len - i) as f32 / fade as f32;
        }
        s
    }

    fn generate(sfx: Sfx) -> Vec<f32> {
        // C5 E5 G5 C6
        const FANFARE: [(f32, f32); 4] = [(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.1)];
        match sfx {
            Sfx::Jump => glide(300.0, 700.0, 0.08, 0.0, 0.2),
            Sfx::Score => melody(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.045)], RETRO),
            Sfx::Smash => glide(500.0, 200.0, 0.12, 0.6, 0.3),
            Sfx::Pickup => melody(&[(784.0, 0.07), (1047.0, 0.12)], RETRO),
            Sfx::Shot => glide(1400.0, 500.0, 0.05, 0.1, 0.18),
            Sfx::Banana => glide(500.0, 350.0, 0.1, 0.0, 0.15),
            Sfx::BossHit => melody(&[(160.0, 0.12)], PURE),
            Sfx::Die => tail_fade(melody(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.12)], MOURN)),
            Sfx::Clear => {
                let mut s = melody(&FANFARE, BRASS);
                note(&mut s, 1047.0, 0.25, PURE);
                s
            }
            Sfx::Win => {
                let mut s = melody(&FANFARE, BRASS);
                s.extend(melody(&FANFARE, BRASS));
                note(&mut s, 1047.0, 0.5, PURE);
                s
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

impl SoundEngine {
    /// Play whatever the frame's events call for.
    pub fn play_events(&self, events: &[GameEvent]) {
        for sfx in events.iter().filter_map(Sfx::for_event) {
            self.play(sfx);
        }
    }
}
