//! Jump-target resolution.
//!
//! Labels, sub-labels and phases form implicit blocks in the flat entry
//! list; the reserved `##` commands navigate out of them by scanning
//! relative to the cursor. Name lookups use the first-occurrence indexes
//! built at load time. Every failure degrades to "advance by one" so a
//! malformed script can never stall playback.

use rustc_hash::FxHashMap;

use rin_script::entry::parent_name;
use rin_script::target::{is_exit_target, JumpCommand, JumpTarget};
use rin_script::ScriptEntry;

/// Resolves `raw` against the script and returns the new cursor.
pub(crate) fn resolve(
    script: &[ScriptEntry],
    labels: &FxHashMap<String, usize>,
    phases: &FxHashMap<String, usize>,
    cursor: usize,
    raw: &str,
) -> usize {
    log::debug!("Resolving jump target '{}'", raw);

    let new_index = match JumpTarget::parse(raw) {
        JumpTarget::Phase(name) => phases.get(&name).copied(),
        JumpTarget::Label(name) => labels.get(&name).copied(),
        JumpTarget::Command(cmd) => Some(match cmd {
            JumpCommand::ContinueParent => continue_parent(script, cursor),
            JumpCommand::ContinueParentFlow => continue_parent_flow(script, cursor),
            JumpCommand::FinishParent => finish_parent(script, cursor),
            JumpCommand::SkipAllLabels => skip_all_labels(script, cursor),
        }),
        JumpTarget::Unknown(_) => None,
    };

    match new_index {
        Some(idx) => idx,
        None => {
            log::warn!("Jump target '{}' not found, falling through to the next entry", raw);
            cursor + 1
        }
    }
}

/// End boundary of the sub-label block containing `start`: the next
/// `jump` entry or top-level label, whichever comes first.
fn end_of_sub_label_block(script: &[ScriptEntry], start: usize) -> usize {
    for i in (start + 1)..script.len() {
        if script[i].is_jump() || script[i].is_top_level_label() {
            return i;
        }
    }
    script.len()
}

/// End boundary of the enclosing parent-label block. Dialogue, choices,
/// scenes and jumps count as content; a phase or a label that is not a
/// sub-label of the parent ends the block. Without an enclosing parent
/// the boundary is `start` itself.
fn end_of_parent_block(script: &[ScriptEntry], start: usize) -> usize {
    if script.is_empty() {
        return start;
    }
    let mut parent = None;
    for i in (0..=start.min(script.len().saturating_sub(1))).rev() {
        if script[i].is_top_level_label() {
            parent = script[i].label_name();
            break;
        }
    }
    let Some(parent) = parent else {
        return start;
    };
    let prefix = format!("{}.", parent);

    for i in (start + 1)..script.len() {
        let ends_block = match &script[i] {
            ScriptEntry::Dialogue { .. }
            | ScriptEntry::Choice { .. }
            | ScriptEntry::Scene { .. }
            | ScriptEntry::Jump { .. } => false,
            ScriptEntry::Label { name, .. } => !name.starts_with(&prefix),
            ScriptEntry::Phase { .. } => true,
        };
        if ends_block {
            return i;
        }
    }
    script.len()
}

/// `##CONTINUE_PARENT##`: continue right after the sub-label boundary,
/// stepping over the boundary jump itself.
fn continue_parent(script: &[ScriptEntry], cursor: usize) -> usize {
    let end = end_of_sub_label_block(script, cursor);
    if script.get(end).is_some_and(ScriptEntry::is_jump) {
        end + 1
    } else {
        end
    }
}

/// `##CONTINUE_PARENT_FLOW##`: first content entry of the enclosing
/// parent after the current sub-label block, skipping any further
/// sub-label blocks on the way.
fn continue_parent_flow(script: &[ScriptEntry], cursor: usize) -> usize {
    let end_sub = end_of_sub_label_block(script, cursor);
    let search_start = if script.get(end_sub).is_some_and(ScriptEntry::is_jump) {
        end_sub + 1
    } else {
        end_sub
    };
    let parent_end = end_of_parent_block(script, cursor);

    let mut i = search_start;
    while i < parent_end {
        let entry = &script[i];
        if entry.is_sub_label() {
            let end = end_of_sub_label_block(script, i);
            i = if script.get(end).is_some_and(ScriptEntry::is_jump) {
                end + 1
            } else {
                end
            };
            continue;
        }
        if !matches!(entry, ScriptEntry::Label { .. }) && !entry.is_jump() {
            return i;
        }
        i += 1;
    }
    parent_end
}

/// `##FINISH_PARENT##`: re-execute the parent block's exit jump (the
/// nearest prior phase-or-command jump before the boundary, without
/// crossing another label); with no exit jump, land on the boundary.
fn finish_parent(script: &[ScriptEntry], cursor: usize) -> usize {
    let end_of_block = end_of_parent_block(script, cursor);

    let mut i = end_of_block;
    while i > cursor + 1 {
        i -= 1;
        match &script[i] {
            ScriptEntry::Label { .. } => break,
            ScriptEntry::Jump { target } if is_exit_target(target) => {
                log::debug!("Finish-parent found exit jump at index {}", i);
                return i;
            }
            _ => {}
        }
    }
    end_of_block
}

/// `##SKIP_ALL_LABEL##`: within the current phase, locate the last
/// top-level label, scan past its content (sub-labels included, up to
/// its first exit jump) and land on the first content entry outside any
/// label structure, or on the phase boundary.
fn skip_all_labels(script: &[ScriptEntry], cursor: usize) -> usize {
    let search_limit = ((cursor + 1)..script.len())
        .find(|&i| script[i].is_phase())
        .unwrap_or(script.len());

    let parent_labels: Vec<usize> = ((cursor + 1)..search_limit)
        .filter(|&i| script[i].is_top_level_label())
        .collect();
    log::debug!("Skip-all: {} parent labels left in this phase", parent_labels.len());

    if parent_labels.is_empty() {
        for i in (cursor + 1)..search_limit {
            if !script[i].is_jump() && !matches!(script[i], ScriptEntry::Label { .. }) {
                return i;
            }
        }
        return search_limit;
    }

    let last_label = *parent_labels.last().expect("non-empty");
    let last_label_name = script[last_label].label_name().unwrap_or_default();

    // Content after the label's first exit jump already lies outside it.
    let mut exit_jump = None;
    for i in (last_label + 1)..search_limit {
        let entry = &script[i];
        if entry.is_top_level_label() {
            break;
        }
        if let ScriptEntry::Label { name, .. } = entry {
            if parent_name(name) == Some(last_label_name) {
                continue;
            }
        }
        if let ScriptEntry::Jump { target } = entry {
            if is_exit_target(target) {
                log::debug!("Skip-all: exit jump of the last label at index {}", i);
                exit_jump = Some(i);
                break;
            }
        }
    }

    let search_start = exit_jump.map(|j| j + 1).unwrap_or(last_label + 1);

    let mut i = search_start;
    while i < search_limit {
        let entry = &script[i];
        if entry.is_top_level_label() {
            // Skip the whole block, tracking its last exit jump.
            let mut label_end = i + 1;
            for j in (i + 1)..search_limit {
                if script[j].is_top_level_label() || script[j].is_phase() {
                    label_end = j;
                    break;
                }
                if let ScriptEntry::Jump { target } = &script[j] {
                    if is_exit_target(target) {
                        label_end = j + 1;
                    }
                }
            }
            i = label_end;
            continue;
        }
        if entry.is_jump() || matches!(entry, ScriptEntry::Label { .. }) {
            i += 1;
            continue;
        }
        log::debug!("Skip-all: content entry outside labels at index {}", i);
        return i;
    }
    search_limit
}
