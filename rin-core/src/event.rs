//! Events crossing the engine boundary.
//!
//! The engine pushes [`OutputEvent`]s onto its queue; the driver drains
//! them, hands each to the renderer and feeds any resulting
//! [`InputEvent`] back in. All calls into the engine are serialized by
//! the driver, the engine keeps no locks.

use serde::{Deserialize, Serialize};

use rin_script::{AutoDialogue, ChoiceOption};

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// An enriched terminal entry for the rendering layer.
    Display(DisplayPayload),
    /// A scene-change animation for the presentation layer, which is
    /// expected to answer with `RequestNext` once it finishes.
    ExecuteTransition {
        effect: String,
        payload: TransitionPayload,
    },
    EndOfChapter {
        has_next_chapter: bool,
    },
    PreviewFinished(PreviewFinished),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The rendering layer is ready for the first payload.
    Ready,
    /// The user asked for the next line, or a transition completed.
    RequestNext,
    /// The user picked a choice option.
    ChoiceMade(ChoiceOption),
    Replay,
    SaveRequest { slot: u32 },
    LoadRequest { slot: u32 },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Dialogue,
    Choice,
    Scene,
}

/// A terminal entry, shallow-copied and enriched with the engine's
/// running state (BGM, background stack top, speaker carry-forward).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayload {
    pub kind: PayloadKind,
    pub text: Option<String>,
    pub options: Vec<ChoiceOption>,
    pub auto_dialogue: Option<AutoDialogue>,
    pub speaker: Option<String>,
    pub background: Option<String>,
    pub background_mode: Option<String>,
    pub video: Option<String>,
    pub bgm: Option<String>,
    pub bgm_volume: Option<f32>,
    pub bgm_pan: Option<f32>,
    pub bgm_delay: Option<f32>,
    pub bgm_loop: Option<bool>,
    pub bgm_fade: Option<f32>,
    pub transition: Option<String>,
    pub transition_out: Option<String>,
    pub persist_background: Option<bool>,
    /// This entry's "in" animation is the tail of the previous entry's
    /// "out" animation; the presentation layer skips its own lead-in.
    pub is_chained_transition: bool,
    /// Set on the first half of a chained transition: the "in" effect of
    /// the upcoming scene, for pre-staging.
    pub next_transition: Option<String>,
    pub is_preview: bool,
    pub is_label_preview: bool,
}

/// Visual state accompanying a transition directive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    pub bgm: Option<String>,
    pub background: Option<String>,
    pub video: Option<String>,
    pub background_mode: Option<String>,
}

/// End-of-preview signal, see [`crate::engine::preview`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFinished {
    pub label_name: String,
    /// `None` when the preview simply ran off the end of its entries.
    pub finished_by: Option<FinishedBy>,
    pub jump_target: Option<String>,
    pub phase_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishedBy {
    /// A jump that exits the label (phase jump or exit command).
    #[serde(rename = "jump")]
    Jump,
    /// A jump whose target does not exist inside the preview script.
    #[serde(rename = "jump-external")]
    JumpExternal,
    #[serde(rename = "phase")]
    Phase,
}
