//! Short oscillator blips for hover and click feedback.
//!
//! The audio context is created on the first cue, since browsers refuse to
//! start audio before a user gesture. When Web Audio is missing every later
//! cue is a silent no-op.

use std::cell::{Cell, RefCell};

use web_sys::AudioContext;

use crate::error::{FxError, FxResult};
use crate::mascot::MASCOT_ID;
use crate::stage::Stage;

/// Classes whose elements blip on hover and click. The mascot has its own
/// click wiring and is skipped even when it carries one of these.
pub const SOUND_TRIGGER_CLASSES: [&str; 3] = ["btn", "link", "card"];

/// Gain every envelope decays to; exponential ramps cannot reach zero.
pub const FLOOR_GAIN: f32 = 0.01;

/// Frequency sweep and gain envelope of one blip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    pub peak_gain: f32,
    pub duration_s: f64,
}

impl Tone {
    pub fn frequency_at(&self, t: f64) -> f32 {
        exp_ramp(self.start_hz, self.end_hz, t / self.duration_s)
    }

    pub fn gain_at(&self, t: f64) -> f32 {
        exp_ramp(self.peak_gain, FLOOR_GAIN, t / self.duration_s)
    }

    fn sweeps(&self) -> bool {
        self.start_hz != self.end_hz
    }
}

// Same curve as `AudioParam.exponentialRampToValueAtTime`.
fn exp_ramp(from: f32, to: f32, progress: f64) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    let (from, to) = (f64::from(from), f64::from(to));
    (from * (to / from).powf(p)) as f32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Hover,
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            Cue::Click => {
                Tone { start_hz: 800.0, end_hz: 400.0, peak_gain: 0.1, duration_s: 0.1 }
            }
            Cue::Hover => {
                Tone { start_hz: 600.0, end_hz: 600.0, peak_gain: 0.05, duration_s: 0.05 }
            }
        }
    }
}

/// Elements that get hover/click blips, in document order, without
/// duplicates and without the mascot.
pub fn sound_triggers<S: Stage>(stage: &S) -> Vec<S::Node> {
    let mut found: Vec<S::Node> = Vec::new();
    for class in SOUND_TRIGGER_CLASSES {
        for node in stage.by_class(class) {
            let is_mascot = stage.attr(&node, "id").as_deref() == Some(MASCOT_ID);
            if !is_mascot && !found.contains(&node) {
                found.push(node);
            }
        }
    }
    found
}

/// Lazily created Web Audio output shared by every trigger.
pub struct AudioBoard {
    enabled: bool,
    context: RefCell<Option<AudioContext>>,
    unavailable: Cell<bool>,
}

impl AudioBoard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, context: RefCell::new(None), unavailable: Cell::new(false) }
    }

    pub fn play(&self, cue: Cue) {
        if !self.enabled || self.unavailable.get() {
            return;
        }
        if let Err(err) = self.try_play(cue.tone()) {
            log::warn!("{cue:?} sound skipped: {err}");
        }
    }

    fn context(&self) -> FxResult<AudioContext> {
        if let Some(ctx) = self.context.borrow().as_ref() {
            return Ok(ctx.clone());
        }
        match AudioContext::new() {
            Ok(ctx) => {
                *self.context.borrow_mut() = Some(ctx.clone());
                Ok(ctx)
            }
            Err(err) => {
                self.unavailable.set(true);
                Err(FxError::Audio(format!("{err:?}")))
            }
        }
    }

    fn try_play(&self, tone: Tone) -> FxResult<()> {
        let ctx = self.context()?;
        let oscillator = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        let now = ctx.current_time();
        let end = now + tone.duration_s;
        let frequency = oscillator.frequency();
        frequency.set_value_at_time(tone.start_hz, now)?;
        if tone.sweeps() {
            frequency.exponential_ramp_to_value_at_time(tone.end_hz, end)?;
        }
        let level = gain.gain();
        level.set_value_at_time(tone.peak_gain, now)?;
        level.exponential_ramp_to_value_at_time(FLOOR_GAIN, end)?;

        oscillator.start_with_when(now)?;
        oscillator.stop_with_when(end)?;
        Ok(())
    }
}
