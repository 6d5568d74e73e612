//! Block-navigation commands: sub-label exits, parent flow, finish and
//! skip-all resolution over implicit label blocks.

use rin_core::{OutputEvent, ScriptEngine};
use rin_script::{parse_script, ScriptEntry};

fn engine(json: &str) -> ScriptEngine {
    rin_shared::config::init_empty();
    let script: Vec<ScriptEntry> =
        parse_script(json).unwrap_or_else(|e| panic!("Bad test script: {e}"));
    ScriptEngine::new(script, "", "", None)
}

fn next_text(engine: &mut ScriptEngine) -> Option<String> {
    engine
        .drain_events()
        .into_iter()
        .find_map(|ev| match ev {
            OutputEvent::Display(p) => Some(p.text.unwrap_or_default()),
            _ => None,
        })
}

fn first_options(engine: &mut ScriptEngine) -> Vec<rin_script::ChoiceOption> {
    engine
        .drain_events()
        .into_iter()
        .find_map(|ev| match ev {
            OutputEvent::Display(p) => Some(p.options),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn test_continue_parent_from_choice() {
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "dialogue", "text": "intro"},
            {"type": "label", "name": "Main.Sub"},
            {"type": "choice", "options": [{"text": "stay", "jump": "##CONTINUE_PARENT##"}]},
            {"type": "jump", "target": "##EXIT_SUB_LABEL##"},
            {"type": "dialogue", "text": "parent continues"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "done"}
        ]"###,
    );

    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("intro"));

    engine.request_next();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    assert_eq!(next_text(&mut engine).as_deref(), Some("parent continues"));
}

#[test]
fn test_exit_sub_label_jump_entry() {
    // As a jump entry the command scans past the NEXT boundary; the
    // boundary jump itself is stepped over.
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "label", "name": "Main.Sub"},
            {"type": "dialogue", "text": "sub line"},
            {"type": "jump", "target": "##EXIT_SUB_LABEL##"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "dialogue", "text": "between"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "next phase"}
        ]"###,
    );

    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("sub line"));

    // boundary found at the fase jump, landing right after it
    engine.request_next();
    assert_eq!(next_text(&mut engine).as_deref(), Some("between"));
}

#[test]
fn test_continue_parent_flow_skips_sibling_sub_labels() {
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "dialogue", "text": "intro"},
            {"type": "label", "name": "Main.A"},
            {"type": "choice", "options": [{"text": "on", "jump": "##CONTINUE_PARENT_FLOW##"}]},
            {"type": "jump", "target": "##EXIT_SUB_LABEL##"},
            {"type": "label", "name": "Main.B"},
            {"type": "dialogue", "text": "b line"},
            {"type": "jump", "target": "##EXIT_SUB_LABEL##"},
            {"type": "dialogue", "text": "parent resumes"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "phase", "name": "Next"}
        ]"###,
    );

    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("intro"));

    engine.request_next();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    assert_eq!(next_text(&mut engine).as_deref(), Some("parent resumes"));
}

#[test]
fn test_continue_parent_flow_without_content_lands_on_boundary() {
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "label", "name": "Main.A"},
            {"type": "choice", "options": [{"text": "on", "jump": "##CONTINUE_PARENT_FLOW##"}]},
            {"type": "jump", "target": "##EXIT_SUB_LABEL##"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "next phase"}
        ]"###,
    );

    engine.start();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    // parent block ends at the phase; pumping from there crosses it
    assert_eq!(next_text(&mut engine).as_deref(), Some("next phase"));
}

#[test]
fn test_finish_parent_reexecutes_exit_jump() {
    // Scenario D: the exit jump of the parent block is re-executed, so
    // control lands in the phase it names.
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "dialogue", "text": "a"},
            {"type": "jump", "target": "##FINISH_PARENT##"},
            {"type": "dialogue", "text": "b"},
            {"type": "jump", "target": "fase:NextPhase"},
            {"type": "phase", "name": "NextPhase"},
            {"type": "dialogue", "text": "after"}
        ]"###,
    );

    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("a"));

    engine.request_next();
    assert_eq!(next_text(&mut engine).as_deref(), Some("after"));
}

#[test]
fn test_finish_parent_without_exit_jump_lands_past_block() {
    let mut engine = engine(
        r###"[
            {"type": "label", "name": "Main"},
            {"type": "dialogue", "text": "a"},
            {"type": "jump", "target": "##FINISH_PARENT##"},
            {"type": "dialogue", "text": "still inside"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "outside"}
        ]"###,
    );

    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("a"));

    engine.request_next();
    assert_eq!(next_text(&mut engine).as_deref(), Some("outside"));
}

#[test]
fn test_finish_parent_outside_any_label_falls_through() {
    // No enclosing parent: the boundary is the cursor itself, which the
    // resolver returns unchanged; the terminal entry there is shown.
    let mut engine = engine(
        r###"[
            {"type": "dialogue", "text": "a"},
            {"type": "choice", "options": [{"text": "x", "jump": "##FINISH_PARENT##"}]},
            {"type": "dialogue", "text": "b"}
        ]"###,
    );
    engine.start();
    assert_eq!(next_text(&mut engine).as_deref(), Some("a"));
    engine.request_next();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    // boundary == choice index: the choice is re-presented
    let options = first_options(&mut engine);
    assert_eq!(options.len(), 1);
}

#[test]
fn test_skip_all_labels_to_outro() {
    let mut engine = engine(
        r###"[
            {"type": "phase", "name": "Start"},
            {"type": "choice", "options": [{"text": "skip", "jump": "##SKIP_ALL_LABEL##"}]},
            {"type": "label", "name": "A"},
            {"type": "dialogue", "text": "a"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "label", "name": "B"},
            {"type": "dialogue", "text": "b"},
            {"type": "jump", "target": "##FINISH_PARENT##"},
            {"type": "dialogue", "text": "outro"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "next phase"}
        ]"###,
    );

    engine.start();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    assert_eq!(next_text(&mut engine).as_deref(), Some("outro"));
}

#[test]
fn test_skip_all_labels_without_labels() {
    let mut engine = engine(
        r###"[
            {"type": "phase", "name": "Start"},
            {"type": "choice", "options": [{"text": "skip", "jump": "##SKIP_ALL_LABEL##"}]},
            {"type": "jump", "target": "fase:Nowhere"},
            {"type": "dialogue", "text": "content"},
            {"type": "phase", "name": "Next"}
        ]"###,
    );

    engine.start();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    assert_eq!(next_text(&mut engine).as_deref(), Some("content"));
}

#[test]
fn test_skip_all_labels_without_content_lands_on_phase() {
    let mut engine = engine(
        r###"[
            {"type": "phase", "name": "Start"},
            {"type": "choice", "options": [{"text": "skip", "jump": "##SKIP_ALL_LABEL##"}]},
            {"type": "label", "name": "A"},
            {"type": "dialogue", "text": "a"},
            {"type": "jump", "target": "fase:Next"},
            {"type": "phase", "name": "Next"},
            {"type": "dialogue", "text": "next phase"}
        ]"###,
    );

    engine.start();
    let options = first_options(&mut engine);
    engine.choice_made(options[0].clone());
    assert_eq!(next_text(&mut engine).as_deref(), Some("next phase"));
}
