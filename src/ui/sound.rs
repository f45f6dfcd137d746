/// Sound engine: procedural chiptune effects via rodio.
///
/// Fixed effects are generated as in-memory WAV buffers at init time. The
/// merge chime is pitched by tile value, so it is built per call (it is a few
/// kilobytes). Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without the "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::domain::tile::Value;

/// Merge chime frequency: one semitone up per doubling, 4 → A4.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn merge_freq(value: Value) -> f32 {
    let steps = value.max(4).trailing_zeros().saturating_sub(2);
    440.0 * 2f32.powf(steps as f32 / 12.0)
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::domain::tile::Value;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_slide: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_slide: Arc::new(make_wav(&gen_slide())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_lose: Arc::new(make_wav(&gen_lose())),
            })
        }

        fn play_bytes(&self, buf: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        pub fn play_slide(&self) { self.play(&self.sfx_slide); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }

        /// Chime for a merge; bigger tiles ring higher.
        pub fn play_merge(&self, value: Value) {
            let freq = super::merge_freq(value);
            self.play_bytes(make_wav(&gen_chime(freq)));
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    /// Slide: soft low whoosh, falling pitch over filtered noise
    fn gen_slide() -> Vec<f32> {
        let duration = 0.06;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 2048;
        let mut smooth = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 220.0 - t * 80.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                smooth += (noise - smooth) * 0.15; // one-pole low-pass
                let env = (1.0 - t).powf(1.5);
                (tone * 0.5 + smooth * 0.5) * env * 0.15
            })
            .collect()
    }

    /// Merge: two-partial bell at `freq`
    fn gen_chime(freq: f32) -> Vec<f32> {
        let duration = 0.09;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * 0.22
            })
            .collect()
    }

    /// Play `(frequency, seconds)` notes back to back. Each note decays to
    /// `1 - sustain` of its start level; `partials` weights the harmonics.
    fn gen_notes(notes: &[(f32, f32)], partials: &[f32], sustain: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            samples.extend((0..n).map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * sustain;
                let wave: f32 = partials
                    .iter()
                    .enumerate()
                    .map(|(h, w)| (t * freq * (h + 1) as f32 * std::f32::consts::TAU).sin() * w)
                    .sum();
                wave * env * 0.3
            }));
        }
        samples
    }

    /// Win: G4 B4 D5 then a ringing G5
    fn gen_win() -> Vec<f32> {
        gen_notes(
            &[(392.0, 0.09), (494.0, 0.09), (587.0, 0.09), (784.0, 0.35)],
            &[0.6, 0.3, 0.1],
            0.4,
        )
    }

    /// Lose: slow fall E4 C4 A3, last note dying out
    fn gen_lose() -> Vec<f32> {
        let mut samples = gen_notes(&[(330.0, 0.14), (262.0, 0.14)], &[0.8, 0.2], 0.3);
        samples.extend(gen_notes(&[(220.0, 0.3)], &[0.8, 0.2], 1.0));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_describes_the_samples() {
            let wav = make_wav(&[0.0, 1.0, -1.0]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        }

        #[test]
        fn effects_are_non_empty_and_bounded() {
            for samples in [gen_slide(), gen_chime(880.0), gen_win(), gen_lose()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_slide(&self) {}
    pub fn play_merge(&self, _value: Value) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
}
