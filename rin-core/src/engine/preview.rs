//! Authoring-time preview of a single label.
//!
//! The preview runs a second, fully independent [`ScriptEngine`] over a
//! synthetic script of one label header plus its entries. The normal
//! playthrough is parked untouched while the preview lives (push/pop,
//! depth one, see [`crate::renderer::driver::EngineHandle`]).
//!
//! Preview differs from normal play only at the points where control
//! would leave the synthetic script: jumps that exit the label and phase
//! entries finish the preview instead of resolving.

use rin_script::target::{JumpCommand, JumpTarget};
use rin_script::{Presentation, ScriptEntry};

use crate::event::FinishedBy;

use super::{Mode, ScriptEngine};

/// Everything the authoring tool supplies to preview one label.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub label_name: String,
    /// Ambience of the label header (background, bgm, transition).
    pub context: Presentation,
    pub entries: Vec<ScriptEntry>,
}

impl PreviewRequest {
    /// The synthetic script: the label header followed by its entries.
    fn into_script(self) -> (String, Vec<ScriptEntry>) {
        let mut script = Vec::with_capacity(self.entries.len() + 1);
        script.push(ScriptEntry::Label {
            name: self.label_name.clone(),
            presentation: self.context,
        });
        script.extend(self.entries);
        (self.label_name, script)
    }
}

impl ScriptEngine {
    /// Builds the preview interpreter. It shares the walking algorithm
    /// with normal play but owns its own state and history.
    pub fn label_preview(request: PreviewRequest) -> ScriptEngine {
        log::info!("Starting label preview for '{}'", request.label_name);
        let (label_name, script) = request.into_script();
        let mut engine = ScriptEngine::new(script, "", "", None);
        engine.mode = Mode::LabelPreview;
        engine.preview_label = label_name;
        engine
    }

    /// Preview handling of a `jump` entry. Returns `true` when the
    /// preview finished and pumping must stop.
    pub(super) fn preview_jump_entry(&mut self, raw: &str) -> bool {
        match JumpTarget::parse(raw) {
            // Targets that leave the label end the preview.
            JumpTarget::Phase(_)
            | JumpTarget::Command(JumpCommand::FinishParent)
            | JumpTarget::Command(JumpCommand::SkipAllLabels) => {
                self.finish_preview(Some(FinishedBy::Jump), Some(raw.to_string()), None);
                true
            }
            JumpTarget::Label(name) => {
                if let Some(&idx) = self.labels.get(&name) {
                    log::debug!("Preview jump to in-script label '{}'", name);
                    self.cursor = idx;
                    false
                } else {
                    self.finish_preview(
                        Some(FinishedBy::JumpExternal),
                        Some(raw.to_string()),
                        None,
                    );
                    true
                }
            }
            _ => {
                self.finish_preview(Some(FinishedBy::JumpExternal), Some(raw.to_string()), None);
                true
            }
        }
    }

    /// Preview handling of choice and pending jumps: a plain label
    /// lookup inside the synthetic script, falling through on a miss
    /// rather than finishing the preview.
    pub(super) fn preview_label_jump(&mut self, target: &str) {
        if let Some(&idx) = self.labels.get(target) {
            self.cursor = idx;
        } else {
            log::debug!("Preview jump target '{}' not in preview script, advancing", target);
            self.cursor += 1;
        }
    }
}
