//! Audio-timed theme transitions and narrative captions
//!
//! Events are sorted by timestamp when a level starts and fire at most once
//! per level session. Colour events arm a transition that interpolates the
//! background and wave accent; caption events push short-lived text.

use serde::{Deserialize, Serialize};

use super::color::Color;
use crate::consts::FRAME_UNITS_PER_SECOND;

/// Caption that appears when playback reaches `time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTextEvent {
    pub time: f64,
    pub text: String,
    #[serde(skip)]
    pub triggered: bool,
}

/// Theme change that starts when playback reaches `time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedColorEvent {
    pub time: f64,
    pub background: Color,
    pub wave: Color,
    /// Transition length in seconds
    pub duration: f64,
    #[serde(skip)]
    pub triggered: bool,
}

/// Colours the renderer (and spectrum tint) read every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeCells {
    pub background: Color,
    pub wave: Color,
}

impl Default for ThemeCells {
    fn default() -> Self {
        Self {
            background: Color::hex(0x0b, 0x3d, 0x91),
            wave: Color::rgba(64, 200, 255, 0.35),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveColorTransition {
    pub from: ThemeCells,
    pub to: ThemeCells,
    /// 0.0 - 1.0, 1.0 means idle
    pub progress: f32,
    /// Seconds
    pub duration: f64,
}

impl ActiveColorTransition {
    fn idle(cells: ThemeCells) -> Self {
        Self {
            from: cells,
            to: cells,
            progress: 1.0,
            duration: 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.progress >= 1.0
    }

    /// Colours at the current progress
    pub fn current(&self) -> ThemeCells {
        ThemeCells {
            background: Color::lerp(self.from.background, self.to.background, self.progress),
            wave: Color::lerp(self.from.wave, self.to.wave, self.progress),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCaption {
    pub text: String,
    /// Frame units left
    pub remaining: f32,
    /// Trigger order, newest wins when captions overlap
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct TransitionEngine {
    color_events: Vec<TimedColorEvent>,
    text_events: Vec<TimedTextEvent>,
    next_color: usize,
    next_text: usize,
    transition: ActiveColorTransition,
    captions: Vec<ActiveCaption>,
    caption_lifetime: f32,
    caption_seq: u64,
}

impl TransitionEngine {
    pub fn new(caption_lifetime: f32) -> Self {
        Self {
            color_events: Vec::new(),
            text_events: Vec::new(),
            next_color: 0,
            next_text: 0,
            transition: ActiveColorTransition::idle(ThemeCells::default()),
            captions: Vec::new(),
            caption_lifetime,
            caption_seq: 0,
        }
    }

    /// Load a level's events, re-arming all of them.
    ///
    /// Colour events at timestamp 0 describe the level's opening theme: they
    /// are applied straight to `cells` and marked fired.
    pub fn reset(
        &mut self,
        colors: &[TimedColorEvent],
        texts: &[TimedTextEvent],
        cells: &mut ThemeCells,
    ) {
        self.color_events = colors.to_vec();
        self.text_events = texts.to_vec();
        self.color_events.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.text_events.sort_by(|a, b| a.time.total_cmp(&b.time));
        for event in &mut self.color_events {
            event.triggered = false;
        }
        for event in &mut self.text_events {
            event.triggered = false;
        }
        self.captions.clear();
        self.caption_seq = 0;
        self.next_color = 0;
        self.next_text = 0;

        while let Some(event) = self.color_events.get_mut(self.next_color) {
            if event.time > 0.0 {
                break;
            }
            event.triggered = true;
            cells.background = event.background;
            cells.wave = event.wave;
            self.next_color += 1;
        }
        self.transition = ActiveColorTransition::idle(*cells);
    }

    /// Fire due events and advance the running transition and captions
    pub fn update(&mut self, audio_time: f64, frame_factor: f32, cells: &mut ThemeCells) {
        while let Some(event) = self.color_events.get_mut(self.next_color) {
            if event.time > audio_time {
                break;
            }
            event.triggered = true;
            self.next_color += 1;
            log::debug!("Theme transition armed at {:.2}s", event.time);
            self.transition = ActiveColorTransition {
                from: *cells,
                to: ThemeCells {
                    background: event.background,
                    wave: event.wave,
                },
                progress: 0.0,
                duration: event.duration,
            };
        }

        if !self.transition.is_idle() {
            let frames = self.transition.duration as f32 * FRAME_UNITS_PER_SECOND;
            self.transition.progress = if frames > 0.0 {
                (self.transition.progress + frame_factor / frames).min(1.0)
            } else {
                1.0
            };
            *cells = self.transition.current();
        }

        while let Some(event) = self.text_events.get_mut(self.next_text) {
            if event.time > audio_time {
                break;
            }
            event.triggered = true;
            self.next_text += 1;
            self.caption_seq += 1;
            log::info!("Caption: {}", event.text);
            self.captions.push(ActiveCaption {
                text: event.text.clone(),
                remaining: self.caption_lifetime,
                seq: self.caption_seq,
            });
        }

        for caption in &mut self.captions {
            caption.remaining -= frame_factor;
        }
        self.captions.retain(|c| c.remaining > 0.0);
    }

    /// Most recently triggered caption still alive
    pub fn current_caption(&self) -> Option<&ActiveCaption> {
        self.captions.iter().max_by_key(|c| c.seq)
    }

    pub fn active_captions(&self) -> &[ActiveCaption] {
        &self.captions
    }

    pub fn transition(&self) -> &ActiveColorTransition {
        &self.transition
    }

    pub fn color_events(&self) -> &[TimedColorEvent] {
        &self.color_events
    }

    pub fn text_events(&self) -> &[TimedTextEvent] {
        &self.text_events
    }
}

/// Largest font size (px) at which `text` fits in `max_width`, shrinking
/// from `start_px` one pixel at a time down to `min_px`
pub fn fit_font_size(
    text: &str,
    max_width: f32,
    start_px: f32,
    min_px: f32,
    measure: impl Fn(&str, f32) -> f32,
) -> f32 {
    let mut size = start_px;
    while size > min_px && measure(text, size) > max_width {
        size -= 1.0;
    }
    size.max(min_px)
}
