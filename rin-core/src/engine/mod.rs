//! The script execution engine.
//!
//! A [`ScriptEngine`] owns one flat script, a cursor into it and the
//! derived presentation state. Label, phase and jump entries are
//! consumed synchronously inside [`ScriptEngine::pump`]; dialogue,
//! choice and scene entries are terminal, each producing one display
//! payload and waiting for the next external trigger.

mod jump;
mod payload;
pub mod preview;
pub mod state;

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use rin_script::{ChoiceOption, ScriptEntry};

use crate::event::{FinishedBy, InputEvent, OutputEvent, PreviewFinished, TransitionPayload};
use crate::storager::types::PlaySnapshot;
use state::{Backdrop, BgmState, DialogueRecord, EngineState};

/// Chapter-listing collaborator, queried only at end-of-chapter.
pub trait ChapterList {
    fn next_chapter(&self, story: &str, chapter: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Authoring-time preview of a single label, see [`preview`].
    LabelPreview,
}

#[derive(Clone)]
pub struct ScriptEngine {
    script: Vec<ScriptEntry>,
    cursor: usize,
    state: EngineState,
    history: Vec<DialogueRecord>,
    /// First occurrence of each label / phase name.
    labels: FxHashMap<String, usize>,
    phases: FxHashMap<String, usize>,
    mode: Mode,
    story_title: String,
    chapter: String,
    preview_label: String,
    chapters: Option<Arc<dyn ChapterList>>,
    events: VecDeque<OutputEvent>,
}

impl ScriptEngine {
    pub fn new(
        script: Vec<ScriptEntry>,
        story_title: impl Into<String>,
        chapter: impl Into<String>,
        chapters: Option<Arc<dyn ChapterList>>,
    ) -> Self {
        let (labels, phases) = index_names(&script);
        ScriptEngine {
            script,
            cursor: 0,
            state: EngineState::default(),
            history: Vec::new(),
            labels,
            phases,
            mode: Mode::Normal,
            story_title: story_title.into(),
            chapter: chapter.into(),
            preview_label: String::new(),
            chapters,
            events: VecDeque::new(),
        }
    }

    /// Replaces the script wholesale and resets to the start of it.
    pub fn load_script(&mut self, script: Vec<ScriptEntry>) {
        let (labels, phases) = index_names(&script);
        self.script = script;
        self.labels = labels;
        self.phases = phases;
        self.reset();
    }

    pub fn feed(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Ready => self.ready(),
            InputEvent::RequestNext => self.request_next(),
            InputEvent::ChoiceMade(option) => self.choice_made(option),
            InputEvent::Replay => self.replay(),
            // Save/load/exit need collaborators the engine must not
            // depend on; the driver intercepts them.
            _ => {}
        }
    }

    /// Resets and produces the first payload. Also the replay trigger.
    pub fn start(&mut self) {
        self.reset();
        self.pump();
    }

    pub fn replay(&mut self) {
        log::info!("Replay requested, resetting playback state");
        self.start();
    }

    /// The renderer is ready: produce the next payload without touching
    /// state, so a restored save resumes where it stood.
    pub fn ready(&mut self) {
        self.pump();
    }

    /// External "next line" trigger.
    pub fn request_next(&mut self) {
        if self.state.awaiting_transition {
            // The label was already stepped over when its directive was
            // emitted; a second increment would skip an entry.
            self.state.awaiting_transition = false;
            self.pump();
            return;
        }
        if let Some(target) = self.state.pending_jump.take() {
            match self.mode {
                Mode::Normal => self.cursor = self.resolve_jump(&target),
                Mode::LabelPreview => self.preview_label_jump(&target),
            }
        } else {
            self.cursor += 1;
        }
        self.pump();
    }

    /// Resolves a choice the user made against the choice entry at the
    /// cursor.
    pub fn choice_made(&mut self, option: ChoiceOption) {
        let Some(entry) = self.script.get(self.cursor).cloned() else {
            log::error!("Choice resolved with no entry at index {}", self.cursor);
            self.cursor += 1;
            self.pump();
            return;
        };

        if let Some(set) = &option.set_variable {
            log::debug!("Choice set variable '{}' = {}", set.name, set.value);
            self.state.variables.insert(set.name.clone(), set.value.clone());
        }

        let auto = match &entry {
            ScriptEntry::Choice { auto_dialogue, .. } => auto_dialogue.clone(),
            _ => None,
        };

        if let (Some(auto), Some(text)) = (auto.filter(|a| a.is_active()), option.text.clone()) {
            // Narrate the chosen option before following its jump; the
            // jump itself is parked until the next request.
            let auto_payload = self.auto_dialogue_payload(&text, &auto);
            if auto_payload.speaker.is_some() {
                self.history.push(DialogueRecord {
                    speaker: auto_payload.speaker.clone(),
                    text,
                });
            }
            self.state.pending_jump = option.jump.clone();
            self.emit(OutputEvent::Display(auto_payload));
            return;
        }

        match self.mode {
            Mode::Normal => {
                if let Some(jump) = &option.jump {
                    if jump.starts_with("##") {
                        self.cursor = self.resolve_jump(jump);
                    } else if let Some(&idx) = self.labels.get(jump) {
                        self.cursor = idx;
                    } else if let Some(&idx) = self.phases.get(jump) {
                        self.cursor = idx;
                    } else {
                        log::error!("Choice jump target '{}' is neither label nor phase", jump);
                        self.cursor += 1;
                    }
                } else {
                    self.cursor += 1;
                }
            }
            Mode::LabelPreview => {
                if let Some(jump) = &option.jump {
                    self.preview_label_jump(jump);
                } else {
                    self.cursor += 1;
                }
            }
        }
        self.pump();
    }

    /// Runs the cursor forward until a terminal entry produced a payload
    /// or the script ended. Label/phase/jump entries are never shown.
    fn pump(&mut self) {
        loop {
            if self.mode == Mode::Normal && self.state.is_in_ending_phase {
                let ended = match self.script.get(self.cursor) {
                    None => true,
                    Some(entry) => entry.is_phase(),
                };
                if ended {
                    log::info!("Reached the end of an ending phase, chapter complete");
                    self.emit(OutputEvent::EndOfChapter { has_next_chapter: false });
                    return;
                }
            }

            if self.cursor >= self.script.len() {
                match self.mode {
                    Mode::Normal => {
                        let has_next = self.lookup_next_chapter().is_some();
                        log::info!(
                            "Reached end of script at index {}, has_next_chapter: {}",
                            self.cursor,
                            has_next
                        );
                        self.emit(OutputEvent::EndOfChapter { has_next_chapter: has_next });
                    }
                    Mode::LabelPreview => self.finish_preview(None, None, None),
                }
                return;
            }

            let entry = self.script[self.cursor].clone();
            log::trace!("pump: index {} {}", self.cursor, entry.kind_name());

            match &entry {
                ScriptEntry::Phase { name, is_ending, presentation } => {
                    if self.mode == Mode::LabelPreview {
                        self.finish_preview(Some(FinishedBy::Phase), None, Some(name.clone()));
                        return;
                    }
                    if *is_ending {
                        log::info!("Entering ending phase '{}'", name);
                    }
                    self.state.is_in_ending_phase = *is_ending;
                    let default_mode = crate::config::playback().default_background_mode;
                    if let Some(backdrop) = Backdrop::from_presentation(presentation, &default_mode) {
                        self.state.reset_stack(backdrop);
                    }
                    if let Some(bgm) = BgmState::from_presentation(presentation) {
                        self.state.bgm = Some(bgm);
                    }
                    self.cursor += 1;
                }
                ScriptEntry::Label { name, presentation } => {
                    let playback = crate::config::playback();
                    if let Some(backdrop) =
                        Backdrop::from_presentation(presentation, &playback.default_background_mode)
                    {
                        self.state.push_merged(backdrop);
                    }
                    if let Some(bgm) = BgmState::from_presentation(presentation) {
                        self.state.bgm = Some(bgm);
                    }
                    if presentation.has_visual() {
                        let effect = presentation
                            .transition
                            .clone()
                            .unwrap_or(playback.default_transition);
                        let top = self.state.top();
                        let directive = TransitionPayload {
                            bgm: self.state.bgm.as_ref().map(|b| b.src.clone()),
                            background: top.src().map(String::from),
                            video: top.is_video().then(|| top.src().unwrap_or_default().to_string()),
                            background_mode: top.mode().map(String::from),
                        };
                        log::debug!("Label '{}' carries a visual, emitting '{}' transition", name, effect);
                        // Step over the label now; the presentation layer
                        // resumes us with a plain RequestNext.
                        self.cursor += 1;
                        self.state.awaiting_transition = true;
                        self.emit(OutputEvent::ExecuteTransition { effect, payload: directive });
                        return;
                    }
                    self.cursor += 1;
                }
                ScriptEntry::Jump { target } => match self.mode {
                    Mode::Normal => self.cursor = self.resolve_jump(target),
                    Mode::LabelPreview => {
                        if self.preview_jump_entry(target) {
                            return;
                        }
                    }
                },
                _ => {
                    // dialogue / choice / scene
                    self.process_terminal(&entry);
                    return;
                }
            }
        }
    }

    fn resolve_jump(&self, target: &str) -> usize {
        jump::resolve(&self.script, &self.labels, &self.phases, self.cursor, target)
    }

    fn lookup_next_chapter(&self) -> Option<String> {
        if self.story_title.is_empty() || self.chapter.is_empty() {
            return None;
        }
        let chapters = self.chapters.as_ref()?;
        chapters.next_chapter(&self.story_title, &self.chapter)
    }

    fn finish_preview(
        &mut self,
        finished_by: Option<FinishedBy>,
        jump_target: Option<String>,
        phase_name: Option<String>,
    ) {
        log::info!("Label preview '{}' finished", self.preview_label);
        self.emit(OutputEvent::PreviewFinished(PreviewFinished {
            label_name: self.preview_label.clone(),
            finished_by,
            jump_target,
            phase_name,
        }));
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.state = EngineState::default();
        self.history.clear();
    }

    fn emit(&mut self, ev: OutputEvent) {
        self.events.push_back(ev);
    }

    pub fn drain_events(&mut self) -> Vec<OutputEvent> {
        self.events.drain(..).collect()
    }

    pub fn history(&self) -> &[DialogueRecord] {
        &self.history
    }

    /// Drops the newest history record. Used after a slot restore, where
    /// re-displaying the current line appends it again.
    pub(crate) fn pop_history(&mut self) {
        self.history.pop();
    }

    pub fn variables(&self) -> &FxHashMap<String, serde_json::Value> {
        &self.state.variables
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn story_title(&self) -> &str {
        &self.story_title
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn snapshot(&self) -> PlaySnapshot {
        PlaySnapshot {
            index: self.cursor,
            state: self.state.clone(),
            history: self.history.clone(),
        }
    }

    /// Restores a snapshot verbatim; the caller must have loaded the
    /// matching chapter script first.
    pub fn restore(&mut self, snap: PlaySnapshot) {
        self.cursor = snap.index;
        self.state = snap.state;
        self.history = snap.history;
    }
}

fn index_names(
    script: &[ScriptEntry],
) -> (FxHashMap<String, usize>, FxHashMap<String, usize>) {
    let mut labels = FxHashMap::default();
    let mut phases = FxHashMap::default();
    for (i, entry) in script.iter().enumerate() {
        match entry {
            ScriptEntry::Label { name, .. } => {
                labels.entry(name.clone()).or_insert(i);
            }
            ScriptEntry::Phase { name, .. } => {
                phases.entry(name.clone()).or_insert(i);
            }
            _ => {}
        }
    }
    (labels, phases)
}
