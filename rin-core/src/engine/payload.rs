//! Display-payload assembly for terminal entries.
//!
//! A payload starts as a shallow copy of the entry; the gaps are filled
//! from engine state (BGM, background stack top, speaker carry-forward)
//! and the entry's own visuals are committed back into the state when
//! they persist.

use rin_script::{AutoDialogue, ScriptEntry};

use crate::event::{DisplayPayload, OutputEvent, PayloadKind};

use super::state::{Backdrop, BgmState, DialogueRecord};
use super::{Mode, ScriptEngine};

impl ScriptEngine {
    /// Handles a dialogue/choice/scene entry at the cursor: builds and
    /// emits its payload, records history, and updates derived state.
    /// The cursor stays put; the next external trigger moves it.
    pub(super) fn process_terminal(&mut self, entry: &ScriptEntry) {
        let Some(mut payload) = base_payload(entry) else {
            return;
        };

        if self.state.skip_next_transition_in {
            payload.is_chained_transition = true;
            self.state.skip_next_transition_in = false;
        }

        if payload.bgm.is_none() {
            if let Some(bgm) = &self.state.bgm {
                fill_bgm(&mut payload, bgm);
            }
        }

        match self.state.top() {
            Backdrop::Image { src, mode } if payload.background.is_none() => {
                payload.background = Some(src.clone());
                payload.background_mode = Some(mode.clone());
            }
            Backdrop::Video { src } if payload.video.is_none() => {
                payload.video = Some(src.clone());
            }
            _ => {}
        }

        let explicit_speaker = entry.presentation().and_then(|p| p.speaker.clone());
        if let Some(speaker) = explicit_speaker {
            self.state.last_speaker = Some(speaker);
        } else {
            payload.speaker = self.state.last_speaker.clone();
        }

        let should_persist = match entry {
            ScriptEntry::Dialogue { .. } => true,
            ScriptEntry::Scene { persist_background, .. } => *persist_background != Some(false),
            _ => false,
        };
        if should_persist {
            if let Some(p) = entry.presentation() {
                let default_mode = crate::config::playback().default_background_mode;
                if let Some(backdrop) = Backdrop::from_presentation(p, &default_mode) {
                    self.state.set_top(backdrop);
                }
            }
        }

        // Look-ahead: a transient scene with an exit animation chains
        // into the next scene's entry animation instead of playing both
        // in isolation.
        if let ScriptEntry::Scene { persist_background, presentation } = entry {
            if presentation.transition_out.is_some() && *persist_background == Some(false) {
                if let Some(ScriptEntry::Scene { presentation: next, .. }) =
                    self.script.get(self.cursor + 1)
                {
                    if let Some(next_transition) = next.transition.as_ref().filter(|t| t.as_str() != "cut")
                    {
                        log::debug!(
                            "Look-ahead: '{}' chains into '{}'",
                            presentation.transition_out.as_deref().unwrap_or_default(),
                            next_transition
                        );
                        self.state.skip_next_transition_in = true;
                        payload.next_transition = Some(next_transition.clone());
                    }
                }
            }
        }

        if self.mode == Mode::LabelPreview {
            payload.is_preview = true;
            payload.is_label_preview = true;
        }

        log::trace!("Display payload for index {}: {:?}", self.cursor, payload);

        let record_text = matches!(entry, ScriptEntry::Dialogue { .. } | ScriptEntry::Choice { .. })
            .then(|| payload.text.clone())
            .flatten();
        let record_speaker = payload.speaker.clone();

        self.emit(OutputEvent::Display(payload));

        if let Some(text) = record_text {
            self.history.push(DialogueRecord { speaker: record_speaker, text });
        }
    }

    /// Synthesizes the narration payload for an auto-dialogue choice:
    /// the chosen option's text over the choice entry's ambience.
    pub(super) fn auto_dialogue_payload(&self, text: &str, auto: &AutoDialogue) -> DisplayPayload {
        let mut payload = empty_payload(PayloadKind::Dialogue);
        payload.text = Some(text.to_string());
        payload.bgm = self.state.bgm.as_ref().map(|b| b.src.clone());
        payload.bgm_volume = self.state.bgm.as_ref().and_then(|b| b.volume);
        payload.background = self.state.top().src().map(String::from);
        payload.background_mode = self.state.top().mode().map(String::from);
        if auto.is_character() && self.state.last_speaker.is_some() {
            payload.speaker = self.state.last_speaker.clone();
        }
        if self.mode == Mode::LabelPreview {
            payload.is_preview = true;
            payload.is_label_preview = true;
        }
        payload
    }
}

fn fill_bgm(payload: &mut DisplayPayload, bgm: &BgmState) {
    payload.bgm = Some(bgm.src.clone());
    if payload.bgm_volume.is_none() {
        payload.bgm_volume = bgm.volume;
    }
    if payload.bgm_pan.is_none() {
        payload.bgm_pan = bgm.pan;
    }
    if payload.bgm_delay.is_none() {
        payload.bgm_delay = bgm.delay;
    }
    if payload.bgm_loop.is_none() {
        payload.bgm_loop = bgm.looping;
    }
    if payload.bgm_fade.is_none() {
        payload.bgm_fade = bgm.fade;
    }
}

/// Shallow copy of a terminal entry; `None` for non-terminal kinds.
fn base_payload(entry: &ScriptEntry) -> Option<DisplayPayload> {
    let (kind, text, options, auto_dialogue) = match entry {
        ScriptEntry::Dialogue { text, .. } => (PayloadKind::Dialogue, text.clone(), Vec::new(), None),
        ScriptEntry::Choice { text, options, auto_dialogue, .. } => (
            PayloadKind::Choice,
            text.clone(),
            options.clone(),
            auto_dialogue.clone(),
        ),
        ScriptEntry::Scene { .. } => (PayloadKind::Scene, None, Vec::new(), None),
        _ => return None,
    };
    let p = entry.presentation().cloned().unwrap_or_default();
    let persist_background = match entry {
        ScriptEntry::Scene { persist_background, .. } => *persist_background,
        _ => None,
    };

    let mut payload = empty_payload(kind);
    payload.text = text;
    payload.options = options;
    payload.auto_dialogue = auto_dialogue;
    payload.speaker = p.speaker;
    payload.background = p.background;
    payload.background_mode = p.background_mode;
    payload.video = p.video;
    payload.bgm = p.bgm;
    payload.bgm_volume = p.bgm_volume;
    payload.bgm_pan = p.bgm_pan;
    payload.bgm_delay = p.bgm_delay;
    payload.bgm_loop = p.bgm_loop;
    payload.bgm_fade = p.bgm_fade;
    payload.transition = p.transition;
    payload.transition_out = p.transition_out;
    payload.persist_background = persist_background;
    Some(payload)
}

fn empty_payload(kind: PayloadKind) -> DisplayPayload {
    DisplayPayload {
        kind,
        text: None,
        options: Vec::new(),
        auto_dialogue: None,
        speaker: None,
        background: None,
        background_mode: None,
        video: None,
        bgm: None,
        bgm_volume: None,
        bgm_pan: None,
        bgm_delay: None,
        bgm_loop: None,
        bgm_fade: None,
        transition: None,
        transition_out: None,
        persist_background: None,
        is_chained_transition: false,
        next_transition: None,
        is_preview: false,
        is_label_preview: false,
    }
}
