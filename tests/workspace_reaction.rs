//! Integration tests for the reaction loop: reachability, autofix, termination.

#[allow(dead_code)]
mod helpers;

use shellblocks::autofix::NoticeLevel;
use shellblocks::config::EngineConfig;
use shellblocks::error::Phase;
use shellblocks::graph::{BlockKind, fields, slots};

#[test]
fn duplicate_option_is_unplugged() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    helpers::add_option(&mut ws, ls, "ls", "-l");
    helpers::add_option(&mut ws, ls, "ls", "-a");
    let dup = helpers::add_option(&mut ws, ls, "ls", "-l");

    assert_eq!(helpers::option_flags(&ws, ls), vec!["-l", "-a"]);
    let block = ws.block(dup).expect("Unplugged block stays in the workspace");
    assert!(!block.enabled);
    assert_eq!(ws.graph().parent(dup), None);

    let notices = ws.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warn);
    assert_eq!(notices[0].message, "Option \"-l\" removed as a duplicate.");
    assert_eq!(notices[0].block_id, Some(dup));
    assert!(ws.drain_notices().is_empty());
}

#[test]
fn exclusive_options_keep_the_first() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    helpers::add_option(&mut ws, ls, "ls", "-t");
    let size = helpers::add_option(&mut ws, ls, "ls", "-S");

    assert_eq!(helpers::option_flags(&ws, ls), vec!["-t"]);
    assert!(!ws.block(size).unwrap().enabled);
    let notices = ws.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].message,
        "Conflict: option \"-S\" cannot be used with \"-t\"."
    );
}

#[test]
fn changing_a_flag_into_a_conflict_is_repaired() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    helpers::add_option(&mut ws, ls, "ls", "-t");
    let long = helpers::add_option(&mut ws, ls, "ls", "-l");
    assert!(ws.drain_notices().is_empty());

    ws.set_field(long, fields::FLAG, "-S").unwrap();
    assert_eq!(helpers::option_flags(&ws, ls), vec!["-t"]);
    assert_eq!(ws.drain_notices().len(), 1);
}

#[test]
fn operand_overflow_is_trimmed_when_command_attaches() {
    let mut ws = helpers::workspace();
    let ls = helpers::loose_command(&mut ws, "ls");
    let operands: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|v| helpers::add_operand(&mut ws, ls, "ls", "path", v))
        .collect();

    // Orphans are never repaired.
    assert_eq!(ws.graph().slot_chain(ls, slots::OPERANDS), operands);
    assert!(ws.drain_notices().is_empty());

    let root = ws.root();
    ws.attach(root, slots::STACK, ls).unwrap();

    assert_eq!(ws.graph().slot_chain(ls, slots::OPERANDS), operands[..2].to_vec());
    assert!(!ws.block(operands[2]).unwrap().enabled);
    let notices = ws.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Limit of 2 exceeded for \"Path\".");
    assert_eq!(notices[0].block_id, Some(operands[2]));
}

#[test]
fn reaction_settles_after_several_fixes() {
    let mut ws = helpers::workspace();
    let ls = helpers::loose_command(&mut ws, "ls");
    for _ in 0..4 {
        helpers::add_option(&mut ws, ls, "ls", "-l");
    }
    helpers::add_option(&mut ws, ls, "ls", "-t");
    helpers::add_option(&mut ws, ls, "ls", "-S");

    let root = ws.root();
    ws.attach(root, slots::STACK, ls).unwrap();

    assert_eq!(helpers::option_flags(&ws, ls), vec!["-l", "-t"]);
    assert_eq!(ws.drain_notices().len(), 4);
}

#[test]
fn reaction_is_idempotent() {
    let mut ws = helpers::workspace();
    let grep = helpers::script_command(&mut ws, "grep");
    let ls = helpers::script_command(&mut ws, "ls");
    helpers::add_operand(&mut ws, ls, "ls", "path", "*.rs");
    helpers::add_option(&mut ws, grep, "grep", "-i");
    ws.drain_notices();

    let before = ws.all_violations();
    assert!(!before.is_empty());
    ws.react().unwrap();
    ws.react().unwrap();
    assert_eq!(ws.all_violations(), before);
    assert!(ws.drain_notices().is_empty());
}

#[test]
fn reaction_bound_is_enforced() {
    let config = EngineConfig {
        max_reaction_cycles: Some(0),
        ..EngineConfig::default()
    };
    let mut ws = helpers::workspace_with(config);
    let ls = helpers::script_command(&mut ws, "ls");
    let first = helpers::add_option(&mut ws, ls, "ls", "-l");
    let dup = ws.create_block(BlockKind::option("ls")).unwrap();

    let err = ws.insert_after(first, dup).unwrap_err();
    assert_eq!(err.code, "R001");
    assert_eq!(err.phase, Phase::Reaction);

    // The aborted pass still leaves derived state consistent.
    let block = ws.block(dup).unwrap();
    assert_eq!(block.enabled, ws.graph().root_of(dup) == ws.root());
    assert!(!block.enabled);
    assert!(ws.violations(dup).is_empty());
    assert_eq!(helpers::option_flags(&ws, ls), vec!["-l"]);
}

#[test]
fn enabled_follows_the_script_root() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    let pipe = ws.create_block(BlockKind::operator("pipe")).unwrap();
    let ls = helpers::loose_command(&mut ws, "ls");
    let grep = helpers::loose_command(&mut ws, "grep");
    let opt = helpers::add_option(&mut ws, grep, "grep", "-e");
    ws.attach(pipe, "LEFT", ls).unwrap();
    ws.attach(pipe, "RIGHT", grep).unwrap();

    ws.attach(root, slots::STACK, pipe).unwrap();
    for id in [pipe, ls, grep, opt] {
        assert!(ws.block(id).unwrap().enabled, "block {} should be enabled", id);
    }

    ws.detach(pipe, false).unwrap();
    for id in ws.graph().ids() {
        let block = ws.block(id).unwrap();
        assert_eq!(block.enabled, ws.graph().root_of(id) == root, "block {}", id);
        if !block.enabled {
            assert!(ws.violations(id).is_empty(), "orphan {} keeps violations", id);
        }
    }
}

#[test]
fn healing_detach_closes_the_script_stack() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    let ls = helpers::script_command(&mut ws, "ls");
    let cp = helpers::script_command(&mut ws, "cp");
    let head = helpers::script_command(&mut ws, "head");

    ws.detach(cp, true).unwrap();
    assert_eq!(ws.graph().slot_chain(root, slots::STACK), vec![ls, head]);
    assert!(!ws.block(cp).unwrap().enabled);
    assert!(ws.block(head).unwrap().enabled);
}

#[test]
fn script_root_is_locked() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    assert_eq!(ws.remove(root).unwrap_err().code, "G003");
    assert_eq!(ws.detach(root, true).unwrap_err().code, "G003");
    assert!(ws.graph().contains(root));
}

#[test]
fn incompatible_connection_is_rejected() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    let cp_opt = ws.create_block(BlockKind::option("cp")).unwrap();

    let err = ws.attach(ls, slots::OPTIONS, cp_opt).unwrap_err();
    assert_eq!(err.code, "G004");
    assert_eq!(err.phase, Phase::Graph);
    assert!(ws.graph().slot_chain(ls, slots::OPTIONS).is_empty());
}

#[test]
fn remove_drops_the_subtree() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    let opt = helpers::add_option(&mut ws, ls, "ls", "-l");
    let path = helpers::add_operand(&mut ws, ls, "ls", "path", "*");
    assert!(!ws.violations(path).is_empty());

    let removed = ws.remove(ls).unwrap();
    assert_eq!(removed.len(), 3);
    for id in [ls, opt, path] {
        assert!(ws.block(id).is_none());
        assert!(ws.semantics().get(id).is_none());
        assert!(ws.violations(id).is_empty());
    }
    assert_eq!(ws.graph().len(), 1);
}
