//! Audio using the Web Audio API
//!
//! Cues are synthesized on the fly; music is a looping media element.

use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::ports::{AudioPort, SoundCue};

const MUSIC_PATH: &str = "audio/music.mp3";

/// Browser audio
pub struct WebAudio {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    volume: f32,
}

impl WebAudio {
    pub fn new(music_enabled: bool) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - sound effects disabled");
        }

        let music = if music_enabled {
            let el = HtmlAudioElement::new_with_src(MUSIC_PATH).ok();
            if let Some(el) = &el {
                el.set_loop(true);
                el.set_volume(0.5);
            }
            el
        } else {
            None
        };

        Self {
            ctx,
            music,
            volume: 0.8,
        }
    }

    /// Resume the context and start music (call from a user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
        if let Some(music) = &self.music {
            if music.play().is_err() {
                log::warn!("Music did not start");
            }
        }
    }

    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Found him - quick rising arpeggio
    fn play_caught(ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.0, 659.0, 784.0].iter().enumerate() {
            let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Triangle) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.07;
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.3).ok();
        }
    }

    /// Wrong character - falling buzz
    fn play_penalty(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.35).ok();
    }
}

impl AudioPort for WebAudio {
    fn play(&mut self, cue: SoundCue) {
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Caught => Self::play_caught(ctx, self.volume),
            SoundCue::Penalty => Self::play_penalty(ctx, self.volume),
        }
    }
}
