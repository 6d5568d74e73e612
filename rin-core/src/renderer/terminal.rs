//! Plain-stdio debug renderer.
//!
//! Doubles as the presentation layer: a transition directive is printed
//! and acknowledged immediately with `RequestNext`, the way the real
//! presentation layer calls back once its animation completes.

use std::io::{stdin, stdout, Write};

use crate::event::{DisplayPayload, InputEvent, OutputEvent, PayloadKind};
use crate::renderer::Renderer;

pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent> {
        match out {
            OutputEvent::Display(payload) => match payload.kind {
                PayloadKind::Dialogue => {
                    self.print_ambience(payload);
                    match &payload.speaker {
                        Some(speaker) => println!("{}: {}", speaker, payload.text.as_deref().unwrap_or("")),
                        None => println!("{}", payload.text.as_deref().unwrap_or("")),
                    }
                    self.wait_continue()
                }
                PayloadKind::Choice => {
                    self.print_ambience(payload);
                    if let Some(t) = &payload.text {
                        println!("--- {} ---", t);
                    }
                    for (i, option) in payload.options.iter().enumerate() {
                        println!("  [{}] {}", i + 1, option.text.as_deref().unwrap_or("..."));
                    }
                    self.wait_choice(payload)
                }
                PayloadKind::Scene => {
                    self.print_ambience(payload);
                    self.wait_continue()
                }
            },
            OutputEvent::ExecuteTransition { effect, payload } => {
                println!(
                    "[Transition] {} -> {}",
                    effect,
                    payload.background.as_deref().or(payload.video.as_deref()).unwrap_or("(none)")
                );
                Some(InputEvent::RequestNext)
            }
            OutputEvent::EndOfChapter { has_next_chapter } => {
                println!("=== End of chapter (next available: {}) ===", has_next_chapter);
                None
            }
            OutputEvent::PreviewFinished(finished) => {
                println!("=== Preview of '{}' finished ===", finished.label_name);
                None
            }
        }
    }
}

impl TerminalRenderer {
    fn print_ambience(&self, payload: &DisplayPayload) {
        if let Some(bg) = &payload.background {
            println!("[BG] {}{}", bg, if payload.is_chained_transition { " (chained)" } else { "" });
        } else if let Some(video) = &payload.video {
            println!("[Video] {}", video);
        }
        if let Some(bgm) = &payload.bgm {
            println!("[BGM] {}", bgm);
        }
    }

    fn wait_continue(&mut self) -> Option<InputEvent> {
        loop {
            print!("> ");
            stdout().flush().ok()?;
            let mut buf = String::new();
            stdin().read_line(&mut buf).ok()?;
            let trimmed = buf.trim_end();
            if trimmed.is_empty() {
                return Some(InputEvent::RequestNext);
            }
            if trimmed.eq_ignore_ascii_case("exit") {
                return Some(InputEvent::Exit);
            }
            if trimmed.eq_ignore_ascii_case("replay") {
                return Some(InputEvent::Replay);
            }
            if let Some(rest) = trimmed.strip_prefix(":save") {
                if let Ok(slot) = rest.trim().parse::<u32>() {
                    return Some(InputEvent::SaveRequest { slot });
                }
            }
            if let Some(rest) = trimmed.strip_prefix(":load") {
                if let Ok(slot) = rest.trim().parse::<u32>() {
                    return Some(InputEvent::LoadRequest { slot });
                }
            }
            println!("invalid");
        }
    }

    fn wait_choice(&mut self, payload: &DisplayPayload) -> Option<InputEvent> {
        loop {
            print!("Select> ");
            stdout().flush().ok()?;
            let mut buf = String::new();
            stdin().read_line(&mut buf).ok()?;
            if let Ok(n) = buf.trim().parse::<usize>() {
                if n >= 1 && n <= payload.options.len() {
                    return Some(InputEvent::ChoiceMade(payload.options[n - 1].clone()));
                }
            }
            println!("invalid");
        }
    }
}
