mod config_gen;
mod setup;

use std::env;
use std::sync::Arc;

use rin_core::config::SystemConfig;
use rin_core::renderer::driver::{Driver, EngineHandle};
use rin_core::{StoryManager, TerminalRenderer};

fn main() {
    setup::init();
    log::info!(">>> Rin Player Started <<<");

    let sys_cfg: SystemConfig = rin_core::config::system();

    let manager = match StoryManager::scan(&sys_cfg.library_path) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            log::error!("Failed to scan story library: {e:#}");
            return;
        }
    };

    let args: Vec<String> = env::args().collect();
    let (story, chapter) = match (args.get(1), args.get(2)) {
        (Some(story), Some(chapter)) => (story.clone(), chapter.clone()),
        (Some(story), None) => {
            // no chapter given: start at the first one
            let Some(first) = manager.chapters(story).and_then(|c| c.first()).cloned() else {
                log::error!("Story '{}' has no chapters", story);
                return;
            };
            (story.clone(), first)
        }
        _ => {
            println!("Usage: rin-player <story> [chapter]");
            println!("Stories found: {:?}", manager.stories());
            return;
        }
    };

    log::info!("Playing '{}' / '{}'", story, chapter);

    let handle = match EngineHandle::new(manager.clone(), &story, &chapter) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to load chapter: {e:#}");
            return;
        }
    };

    let mut driver = Driver::new(handle, TerminalRenderer);
    driver.run();
}
