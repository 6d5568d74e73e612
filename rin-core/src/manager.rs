//! Story library manager: scans the visual-novel directory, orders
//! chapters and loads chapter scripts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use log::info;
use regex::Regex;
use walkdir::WalkDir;

use rin_script::ScriptEntry;

use crate::engine::ChapterList;

const SIDE_STORIES_DIR: &str = "sidestories";

pub struct StoryManager {
    root: PathBuf,
    script_file: String,
    /// Story title → main chapters, in reading order.
    stories: HashMap<String, Vec<String>>,
    side_stories: HashMap<String, Vec<String>>,
}

impl StoryManager {
    /// Scans `root` for `<story>/<chapter>/<script file>` layouts. A
    /// chapter directory named `sidestories` is a container for side
    /// chapters one level deeper and never part of the main order.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let script_file = crate::config::playback().script_file;
        info!("Scanning story library at: {:?}", root);

        let mut stories: HashMap<String, Vec<String>> = HashMap::new();
        let mut side_stories: HashMap<String, Vec<String>> = HashMap::new();

        for entry in WalkDir::new(&root)
            .min_depth(3)
            .max_depth(3)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.file_name().is_none_or(|n| n != script_file.as_str()) {
                continue;
            }
            let Some(chapter_dir) = path.parent() else { continue };
            let Some(story_dir) = chapter_dir.parent() else { continue };
            let chapter = chapter_dir.file_name().unwrap_or_default().to_string_lossy().to_string();
            let story = story_dir.file_name().unwrap_or_default().to_string_lossy().to_string();
            if chapter.eq_ignore_ascii_case(SIDE_STORIES_DIR) {
                // the container itself, not a chapter
                continue;
            }
            stories.entry(story).or_default().push(chapter);
        }

        for entry in WalkDir::new(&root)
            .min_depth(4)
            .max_depth(4)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.file_name().is_none_or(|n| n != script_file.as_str()) {
                continue;
            }
            let Some(chapter_dir) = path.parent() else { continue };
            let Some(container) = chapter_dir.parent() else { continue };
            if !container
                .file_name()
                .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(SIDE_STORIES_DIR))
            {
                continue;
            }
            let Some(story_dir) = container.parent() else { continue };
            let chapter = chapter_dir.file_name().unwrap_or_default().to_string_lossy().to_string();
            let story = story_dir.file_name().unwrap_or_default().to_string_lossy().to_string();
            side_stories.entry(story).or_default().push(chapter);
        }

        for chapters in stories.values_mut() {
            chapters.sort_by_key(|name| chapter_sort_key(name));
        }
        for chapters in side_stories.values_mut() {
            chapters.sort();
        }

        info!(
            "Library loaded. Stories: {}, chapters: {}",
            stories.len(),
            stories.values().map(Vec::len).sum::<usize>()
        );
        Ok(Self { root, script_file, stories, side_stories })
    }

    pub fn stories(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.stories.keys().map(String::as_str).collect();
        titles.sort();
        titles
    }

    pub fn chapters(&self, story: &str) -> Option<&[String]> {
        self.stories.get(story).map(Vec::as_slice)
    }

    pub fn side_stories(&self, story: &str) -> Option<&[String]> {
        self.side_stories.get(story).map(Vec::as_slice)
    }

    pub fn load_chapter(&self, story: &str, chapter: &str) -> Result<Vec<ScriptEntry>> {
        let path = self.root.join(story).join(chapter).join(&self.script_file);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script: {:?}", path))?;
        let entries = rin_script::parse_script(&content)
            .with_context(|| format!("Malformed script: {:?}", path))?;
        info!("Loaded '{}' / '{}': {} entries", story, chapter, entries.len());
        Ok(entries)
    }
}

impl ChapterList for StoryManager {
    fn next_chapter(&self, story: &str, current: &str) -> Option<String> {
        let chapters = self.stories.get(story)?;
        let idx = chapters.iter().position(|c| c == current)?;
        chapters.get(idx + 1).cloned()
    }
}

/// Reading order of main chapters: a prologue first, then by the first
/// number embedded in the name, unnumbered chapters last.
fn chapter_sort_key(name: &str) -> u64 {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));

    if name.to_lowercase().contains("prolog") {
        return 0;
    }
    number
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::chapter_sort_key;

    #[test]
    fn test_chapter_order() {
        let mut chapters = vec![
            "Chapter 10".to_string(),
            "Prolog".to_string(),
            "Chapter 2".to_string(),
            "Epilogue".to_string(),
            "Chapter 1".to_string(),
        ];
        chapters.sort_by_key(|n| chapter_sort_key(n));
        assert_eq!(chapters, vec!["Prolog", "Chapter 1", "Chapter 2", "Chapter 10", "Epilogue"]);
    }

    #[test]
    fn test_prologue_spelling() {
        assert_eq!(chapter_sort_key("Prologue"), 0);
        assert_eq!(chapter_sort_key("prolog 99"), 0);
    }
}
