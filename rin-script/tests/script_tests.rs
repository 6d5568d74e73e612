use rin_script::{parse_script, AutoDialogue, JumpCommand, JumpTarget, ScriptEntry};

#[test]
fn test_parse_mixed_entries() {
    let input = r#"[
        {"type": "phase", "name": "Awal", "background": "town.png", "bgm": "theme.mp3"},
        {"type": "label", "name": "Main", "background": "room.png", "transition": "fade"},
        {"type": "dialogue", "text": "Hello", "speaker": "Rin"},
        {"type": "scene", "background": "flash.png", "persistBackground": false, "transitionOut": "fadeout"},
        {"type": "jump", "target": "fase:Akhir"}
    ]"#;

    let script = parse_script(input).unwrap_or_else(|e| {
        panic!("Parse failed: {e}");
    });
    assert_eq!(script.len(), 5);

    match &script[0] {
        ScriptEntry::Phase { name, is_ending, presentation } => {
            assert_eq!(name, "Awal");
            assert!(!is_ending);
            assert_eq!(presentation.background.as_deref(), Some("town.png"));
            assert_eq!(presentation.bgm.as_deref(), Some("theme.mp3"));
        }
        other => panic!("Expected phase, got {other:?}"),
    }

    assert!(script[1].is_top_level_label());
    assert_eq!(script[1].label_name(), Some("Main"));

    match &script[3] {
        ScriptEntry::Scene { persist_background, presentation } => {
            assert_eq!(*persist_background, Some(false));
            assert_eq!(presentation.transition_out.as_deref(), Some("fadeout"));
        }
        other => panic!("Expected scene, got {other:?}"),
    }
}

#[test]
fn test_choice_with_auto_dialogue_flag() {
    let input = r#"[
        {"type": "choice", "autoDialogue": true, "options": [
            {"text": "Go left", "jump": "Left"},
            {"text": "Go right", "jump": "Right", "setVariable": {"name": "route", "value": "right"}}
        ]}
    ]"#;

    let script = parse_script(input).unwrap();
    let ScriptEntry::Choice { options, auto_dialogue, .. } = &script[0] else {
        panic!("Expected choice");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(options[1].set_variable.as_ref().unwrap().name, "route");
    assert!(auto_dialogue.as_ref().unwrap().is_active());
    assert!(!auto_dialogue.as_ref().unwrap().is_character());
}

#[test]
fn test_choice_with_character_auto_dialogue() {
    let input = r#"[{"type": "choice", "autoDialogue": "character", "options": []}]"#;
    let script = parse_script(input).unwrap();
    let ScriptEntry::Choice { auto_dialogue, .. } = &script[0] else {
        panic!("Expected choice");
    };
    let auto = auto_dialogue.as_ref().unwrap();
    assert!(auto.is_active());
    assert!(auto.is_character());
    assert_eq!(*auto, AutoDialogue::Mode("character".into()));
}

#[test]
fn test_missing_optionals_tolerated() {
    let input = r#"[{"type": "dialogue"}]"#;
    let script = parse_script(input).unwrap();
    let ScriptEntry::Dialogue { text, presentation } = &script[0] else {
        panic!("Expected dialogue");
    };
    assert!(text.is_none());
    assert!(presentation.speaker.is_none());
    assert!(!presentation.has_visual());
}

#[test]
fn test_sub_label_detection() {
    let input = r#"[
        {"type": "label", "name": "Pasar"},
        {"type": "label", "name": "Pasar.Beli"}
    ]"#;
    let script = parse_script(input).unwrap();
    assert!(script[0].is_top_level_label());
    assert!(script[1].is_sub_label());
    assert_eq!(rin_script::entry::parent_name("Pasar.Beli"), Some("Pasar"));
    assert_eq!(rin_script::entry::parent_name("Pasar"), None);
}

#[test]
fn test_jump_target_grammar() {
    assert_eq!(
        JumpTarget::parse("fase:Ending"),
        JumpTarget::Phase("Ending".into())
    );
    assert_eq!(JumpTarget::parse("Main"), JumpTarget::Label("Main".into()));
    assert_eq!(
        JumpTarget::parse("##CONTINUE_PARENT##"),
        JumpTarget::Command(JumpCommand::ContinueParent)
    );
    assert_eq!(
        JumpTarget::parse("##EXIT_SUB_LABEL##"),
        JumpTarget::Command(JumpCommand::ContinueParent)
    );
    assert_eq!(
        JumpTarget::parse("##CONTINUE_PARENT_FLOW##"),
        JumpTarget::Command(JumpCommand::ContinueParentFlow)
    );
    assert_eq!(
        JumpTarget::parse("##FINISH_PARENT##"),
        JumpTarget::Command(JumpCommand::FinishParent)
    );
    assert_eq!(
        JumpTarget::parse("##EXIT_LABEL##"),
        JumpTarget::Command(JumpCommand::FinishParent)
    );
    assert_eq!(
        JumpTarget::parse("##SKIP_ALL_LABEL##"),
        JumpTarget::Command(JumpCommand::SkipAllLabels)
    );
    assert_eq!(
        JumpTarget::parse("##NOT_A_COMMAND##"),
        JumpTarget::Unknown("##NOT_A_COMMAND##".into())
    );
}
