//! Mutable playback state owned by one [`crate::ScriptEngine`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use rin_script::Presentation;

/// One layer of the background stack.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backdrop {
    #[default]
    None,
    Image {
        src: String,
        mode: String,
    },
    Video {
        src: String,
    },
}

impl Backdrop {
    /// The visual an entry carries, if any. Background wins over video.
    pub fn from_presentation(p: &Presentation, default_mode: &str) -> Option<Backdrop> {
        if let Some(src) = &p.background {
            let mode = p
                .background_mode
                .clone()
                .unwrap_or_else(|| default_mode.to_string());
            Some(Backdrop::Image { src: src.clone(), mode })
        } else if let Some(src) = &p.video {
            Some(Backdrop::Video { src: src.clone() })
        } else {
            None
        }
    }

    pub fn src(&self) -> Option<&str> {
        match self {
            Backdrop::None => None,
            Backdrop::Image { src, .. } | Backdrop::Video { src } => Some(src),
        }
    }

    pub fn mode(&self) -> Option<&str> {
        match self {
            Backdrop::Image { mode, .. } => Some(mode),
            _ => None,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Backdrop::Video { .. })
    }
}

/// Last BGM descriptor; persists across entries until overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgmState {
    pub src: String,
    pub volume: Option<f32>,
    pub pan: Option<f32>,
    pub delay: Option<f32>,
    pub looping: Option<bool>,
    pub fade: Option<f32>,
}

impl BgmState {
    pub fn from_presentation(p: &Presentation) -> Option<BgmState> {
        p.bgm.as_ref().map(|src| BgmState {
            src: src.clone(),
            volume: p.bgm_volume,
            pan: p.bgm_pan,
            delay: p.bgm_delay,
            looping: p.bgm_loop,
            fade: p.bgm_fade,
        })
    }
}

/// One line of the dialogue history. `speaker` is `None` for narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub speaker: Option<String>,
    pub text: String,
}

/// Everything the engine derives while walking a script, minus the
/// script itself. This is the persisted part of a save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Never empty; the top is the active backdrop.
    pub background_stack: Vec<Backdrop>,
    pub bgm: Option<BgmState>,
    pub last_speaker: Option<String>,
    pub is_in_ending_phase: bool,
    /// Set by auto-dialogue choices, consumed by the next request.
    pub pending_jump: Option<String>,
    /// Set by look-ahead chaining, consumed by the next payload.
    pub skip_next_transition_in: bool,
    /// Set after a label emitted a transition directive; the next
    /// request resumes pumping without a cursor increment.
    pub awaiting_transition: bool,
    /// Flat variable store written by choice options. Nothing in the
    /// engine evaluates these yet.
    pub variables: FxHashMap<String, serde_json::Value>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            background_stack: vec![Backdrop::None],
            bgm: None,
            last_speaker: None,
            is_in_ending_phase: false,
            pending_jump: None,
            skip_next_transition_in: false,
            awaiting_transition: false,
            variables: FxHashMap::default(),
        }
    }
}

impl EngineState {
    pub fn top(&self) -> &Backdrop {
        self.background_stack.last().expect("background stack is never empty")
    }

    /// Phase semantics: the whole stack collapses to a single layer.
    pub fn reset_stack(&mut self, top: Backdrop) {
        self.background_stack.clear();
        self.background_stack.push(top);
    }

    /// Label semantics: the new layer goes on top of the old one.
    pub fn push_merged(&mut self, layer: Backdrop) {
        self.background_stack.push(layer);
    }

    /// Dialogue / persisting-scene semantics: the top layer is replaced
    /// in place.
    pub fn set_top(&mut self, layer: Backdrop) {
        if let Some(top) = self.background_stack.last_mut() {
            *top = layer;
        } else {
            self.background_stack.push(layer);
        }
    }
}
