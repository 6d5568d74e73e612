//! Script entry schema.
//!
//! Every entry kind shares the optional presentation fields in
//! [`Presentation`]; the engine fills the gaps from its running state
//! (background stack, last BGM, last speaker) when it builds a display
//! payload.

use serde::{Deserialize, Serialize};

/// Presentation-affecting fields every entry may carry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presentation {
    pub background: Option<String>,
    /// Fit mode for `background`, defaults to `"cover"` when the image is
    /// committed to the background stack.
    pub background_mode: Option<String>,
    /// Mutually exclusive with `background` as the active visual.
    pub video: Option<String>,
    pub bgm: Option<String>,
    pub bgm_volume: Option<f32>,
    pub bgm_pan: Option<f32>,
    pub bgm_delay: Option<f32>,
    pub bgm_loop: Option<bool>,
    pub bgm_fade: Option<f32>,
    pub speaker: Option<String>,
    pub transition: Option<String>,
    pub transition_out: Option<String>,
}

impl Presentation {
    pub fn has_visual(&self) -> bool {
        self.background.is_some() || self.video.is_some()
    }
}

/// One element of a chapter script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptEntry {
    /// A named checkpoint, usable as a jump target. Dotted names
    /// (`"Parent.Sub"`) denote a sub-label nested under `"Parent"`.
    Label {
        name: String,
        #[serde(flatten)]
        presentation: Presentation,
    },
    /// A named top-level section boundary.
    Phase {
        name: String,
        #[serde(default, rename = "isEnding")]
        is_ending: bool,
        #[serde(flatten)]
        presentation: Presentation,
    },
    /// One line of narration or speech.
    Dialogue {
        #[serde(default)]
        text: Option<String>,
        #[serde(flatten)]
        presentation: Presentation,
    },
    /// Presents branching options to the player.
    Choice {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        options: Vec<ChoiceOption>,
        #[serde(default, rename = "autoDialogue")]
        auto_dialogue: Option<AutoDialogue>,
        #[serde(flatten)]
        presentation: Presentation,
    },
    /// A background/video change. With `persistBackground: false` it is a
    /// transient overlay, not a new default.
    Scene {
        #[serde(default, rename = "persistBackground")]
        persist_background: Option<bool>,
        #[serde(flatten)]
        presentation: Presentation,
    },
    /// Unconditional control transfer, see [`crate::JumpTarget`].
    Jump { target: String },
}

impl ScriptEntry {
    pub fn presentation(&self) -> Option<&Presentation> {
        match self {
            ScriptEntry::Label { presentation, .. }
            | ScriptEntry::Phase { presentation, .. }
            | ScriptEntry::Dialogue { presentation, .. }
            | ScriptEntry::Choice { presentation, .. }
            | ScriptEntry::Scene { presentation, .. } => Some(presentation),
            ScriptEntry::Jump { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ScriptEntry::Label { .. } => "label",
            ScriptEntry::Phase { .. } => "phase",
            ScriptEntry::Dialogue { .. } => "dialogue",
            ScriptEntry::Choice { .. } => "choice",
            ScriptEntry::Scene { .. } => "scene",
            ScriptEntry::Jump { .. } => "jump",
        }
    }

    pub fn label_name(&self) -> Option<&str> {
        match self {
            ScriptEntry::Label { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn phase_name(&self) -> Option<&str> {
        match self {
            ScriptEntry::Phase { name, .. } => Some(name),
            _ => None,
        }
    }

    /// A label whose name carries no dot, i.e. a parent block anchor.
    pub fn is_top_level_label(&self) -> bool {
        matches!(self, ScriptEntry::Label { name, .. } if !name.contains('.'))
    }

    /// A label nested under a parent via dotted naming.
    pub fn is_sub_label(&self) -> bool {
        matches!(self, ScriptEntry::Label { name, .. } if name.contains('.'))
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, ScriptEntry::Jump { .. })
    }

    pub fn is_phase(&self) -> bool {
        matches!(self, ScriptEntry::Phase { .. })
    }
}

/// One selectable option of a `choice` entry, also the shape the player
/// layer sends back when the user picks one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceOption {
    pub text: Option<String>,
    pub jump: Option<String>,
    pub set_variable: Option<SetVariable>,
}

/// Variable assignment attached to a choice option. The value is stored
/// verbatim in the engine's variable map; nothing evaluates it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    pub name: String,
    pub value: serde_json::Value,
}

/// The `autoDialogue` flag of a choice entry: `true` enables narration of
/// the chosen option text, `"character"` additionally attributes it to
/// the last speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoDialogue {
    Enabled(bool),
    Mode(String),
}

impl AutoDialogue {
    pub fn is_active(&self) -> bool {
        match self {
            AutoDialogue::Enabled(on) => *on,
            AutoDialogue::Mode(mode) => !mode.is_empty(),
        }
    }

    pub fn is_character(&self) -> bool {
        matches!(self, AutoDialogue::Mode(mode) if mode == "character")
    }
}

/// Parent part of a dotted label name, `None` for top-level labels.
pub fn parent_name(label: &str) -> Option<&str> {
    label.split_once('.').map(|(parent, _)| parent)
}
