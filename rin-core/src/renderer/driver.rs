//! Serializes all input into the engine and routes the requests that
//! need collaborators the engine itself must not depend on: save/load
//! slots and the label-preview push/pop.

use std::sync::Arc;

use crate::engine::preview::PreviewRequest;
use crate::engine::{ChapterList, ScriptEngine};
use crate::event::{InputEvent, OutputEvent};
use crate::manager::StoryManager;
use crate::renderer::Renderer;
use crate::storager;

pub struct EngineHandle {
    engine: ScriptEngine,
    /// Normal-play engine parked while a label preview runs.
    parked: Option<ScriptEngine>,
    manager: Arc<StoryManager>,
}

impl EngineHandle {
    pub fn new(manager: Arc<StoryManager>, story: &str, chapter: &str) -> anyhow::Result<Self> {
        let script = manager.load_chapter(story, chapter)?;
        let chapters: Arc<dyn ChapterList> = manager.clone();
        let engine = ScriptEngine::new(script, story, chapter, Some(chapters));
        Ok(Self { engine, parked: None, manager })
    }

    pub fn engine(&mut self) -> &mut ScriptEngine {
        &mut self.engine
    }

    pub fn drain_events(&mut self) -> Vec<OutputEvent> {
        self.engine.drain_events()
    }

    pub fn feed(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::SaveRequest { slot } => {
                log::info!("Save requested, slot {}", slot);
                storager::save_slot(slot, &self.engine)
                    .unwrap_or_else(|e| log::error!("Save failed: {e:#}"));
            }
            InputEvent::LoadRequest { slot } => {
                log::info!("Load requested, slot {}", slot);
                self.load(slot);
            }
            other => self.engine.feed(other),
        }
    }

    fn load(&mut self, slot: u32) {
        let save = match storager::load_slot(self.engine.story_title(), slot) {
            Ok(save) => save,
            Err(e) => {
                log::error!("Load failed: {e:#}");
                return;
            }
        };
        match self.manager.load_chapter(&save.story_title, &save.chapter) {
            Ok(script) => {
                let chapters: Arc<dyn ChapterList> = self.manager.clone();
                let mut engine = ScriptEngine::new(
                    script,
                    save.story_title.clone(),
                    save.chapter.clone(),
                    Some(chapters),
                );
                engine.restore(save.snapshot);
                // Re-displaying the current line appends it to history
                // again; drop the saved copy first.
                engine.pop_history();
                self.engine = engine;
                self.engine.ready();
            }
            Err(e) => log::error!("Load failed to reload chapter script: {e:#}"),
        }
    }

    /// Parks the live playthrough and swaps in a preview interpreter.
    /// Depth one: a second preview request while one is active is
    /// rejected.
    pub fn enter_label_preview(&mut self, request: PreviewRequest) {
        if self.parked.is_some() {
            log::warn!("Label preview already active, ignoring request");
            return;
        }
        let preview = ScriptEngine::label_preview(request);
        self.parked = Some(std::mem::replace(&mut self.engine, preview));
        self.engine.ready();
    }

    /// Restores the parked playthrough verbatim.
    pub fn close_preview(&mut self) {
        match self.parked.take() {
            Some(normal) => self.engine = normal,
            None => log::warn!("No label preview active"),
        }
    }

    pub fn in_preview(&self) -> bool {
        self.parked.is_some()
    }
}

pub struct Driver<R: Renderer> {
    handle: EngineHandle,
    renderer: R,
}

impl<R: Renderer> Driver<R> {
    pub fn new(handle: EngineHandle, renderer: R) -> Self {
        Self { handle, renderer }
    }

    /// Runs the chapter to its end-of-chapter signal (or an explicit
    /// exit). All engine calls happen on this thread, in order.
    pub fn run(&mut self) {
        self.handle.feed(InputEvent::Ready);
        'chapter: loop {
            let events = self.handle.drain_events();
            if events.is_empty() {
                break;
            }
            for ev in events {
                if let OutputEvent::EndOfChapter { .. } = ev {
                    self.renderer.render(&ev);
                    break 'chapter;
                }
                let mut response = self.renderer.render(&ev);
                while let Some(input) = response.take() {
                    match input {
                        InputEvent::Exit => break 'chapter,
                        InputEvent::SaveRequest { slot } => {
                            self.handle.feed(InputEvent::SaveRequest { slot });
                            // back to the same prompt after saving
                            response = self.renderer.render(&ev);
                        }
                        InputEvent::LoadRequest { slot } => {
                            self.handle.feed(InputEvent::LoadRequest { slot });
                            // the restored engine re-pumped; drop the
                            // stale remainder of this batch
                            continue 'chapter;
                        }
                        other => self.handle.feed(other),
                    }
                }
            }
        }
    }
}
