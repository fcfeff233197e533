//! Integration tests for the constraint rules, exercised through the workspace.

#[allow(dead_code)]
mod helpers;

use helpers::violation_ids;
use shellblocks::graph::{BlockKind, fields, slots};
use shellblocks::validate::command::SYNTAX_FALLBACK_MESSAGE;
use shellblocks::validate::operator::STACKED_SLOT_MESSAGE;

#[test]
fn empty_grep_reports_every_minimum() {
    let mut ws = helpers::workspace();
    let grep = helpers::script_command(&mut ws, "grep");

    let violations = ws.violations(grep);
    assert_eq!(
        violation_ids(violations),
        vec![
            "CARDINALITY_MIN_OPTIONS",
            "CARDINALITY_MIN_OPERANDS",
            "CARDINALITY_MISSING_OPERAND_file",
        ]
    );
    assert_eq!(violations[0].message, "Missing required options (1).");
    assert_eq!(violations[1].message, "Missing required operands (1 at least).");
    assert_eq!(violations[2].message, "Missing operand: File (needs 1).");
    assert!(ws.is_blocked());
}

#[test]
fn satisfied_command_has_no_violations() {
    let mut ws = helpers::workspace();
    let grep = helpers::script_command(&mut ws, "grep");
    helpers::add_option(&mut ws, grep, "grep", "-i");
    helpers::add_operand(&mut ws, grep, "grep", "file", "log.txt");

    assert!(ws.violations(grep).is_empty());
    assert!(!ws.is_blocked());
}

#[test]
fn cp_with_sources_then_destination_is_valid() {
    let mut ws = helpers::workspace();
    let cp = helpers::script_command(&mut ws, "cp");
    helpers::add_operand(&mut ws, cp, "cp", "source", "a.txt");
    helpers::add_operand(&mut ws, cp, "cp", "source", "b.txt");
    helpers::add_operand(&mut ws, cp, "cp", "dest", "out/");

    assert!(ws.violations(cp).is_empty(), "{:?}", ws.violations(cp));
}

#[test]
fn cp_destination_first_uses_the_rule_message() {
    let mut ws = helpers::workspace();
    let cp = helpers::script_command(&mut ws, "cp");
    helpers::add_operand(&mut ws, cp, "cp", "dest", "out/");
    helpers::add_operand(&mut ws, cp, "cp", "source", "a.txt");

    let violations = ws.violations(cp);
    assert_eq!(violation_ids(violations), vec!["SYNTAX_ERROR"]);
    assert_eq!(
        violations[0].message,
        "The destination must come after every source."
    );
}

#[test]
fn unmatched_sequence_uses_the_generic_message() {
    let mut ws = helpers::workspace();
    let cp = helpers::script_command(&mut ws, "cp");
    helpers::add_operand(&mut ws, cp, "cp", "source", "a.txt");

    let violations = ws.violations(cp);
    assert_eq!(
        violation_ids(violations),
        vec![
            "CARDINALITY_MIN_OPERANDS",
            "CARDINALITY_MISSING_OPERAND_dest",
            "SYNTAX_ERROR",
        ]
    );
    assert_eq!(violations[2].message, SYNTAX_FALLBACK_MESSAGE);
}

#[test]
fn piped_command_skips_operand_checks() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    let pipe = ws.create_block(BlockKind::operator("pipe")).unwrap();
    ws.attach(root, slots::STACK, pipe).unwrap();
    let operator = ws.semantics().get(pipe).and_then(|d| d.operator()).unwrap();
    assert!(operator.supplies_implicit_data("RIGHT"));
    assert!(!operator.supplies_implicit_data("LEFT"));

    let ls = helpers::loose_command(&mut ws, "ls");
    let grep = helpers::loose_command(&mut ws, "grep");
    helpers::add_option(&mut ws, grep, "grep", "-e");
    ws.attach(pipe, "LEFT", ls).unwrap();
    ws.attach(pipe, "RIGHT", grep).unwrap();

    assert!(ws.violations(grep).is_empty(), "{:?}", ws.violations(grep));
    assert!(ws.violations(pipe).is_empty());

    // The left side gets no implicit data.
    ws.detach(ls, true).unwrap();
    ws.detach(grep, true).unwrap();
    ws.attach(pipe, "LEFT", grep).unwrap();
    assert!(
        violation_ids(ws.violations(grep)).contains(&"CARDINALITY_MIN_OPERANDS".to_string())
    );
}

#[test]
fn operator_slots_need_exactly_one_block() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    let pipe = ws.create_block(BlockKind::operator("pipe")).unwrap();
    ws.attach(root, slots::STACK, pipe).unwrap();
    let ls = helpers::loose_command(&mut ws, "ls");
    ws.attach(pipe, "LEFT", ls).unwrap();

    let violations = ws.violations(pipe);
    assert_eq!(violation_ids(violations), vec!["OPERATOR_EMPTY_SLOT_RIGHT"]);
    assert_eq!(violations[0].message, "The \"RIGHT\" slot is required.");

    let second = helpers::loose_command(&mut ws, "ls");
    ws.insert_after(ls, second).unwrap();
    let head = helpers::loose_command(&mut ws, "head");
    ws.attach(pipe, "RIGHT", head).unwrap();

    let violations = ws.violations(pipe);
    assert_eq!(violation_ids(violations), vec!["OPERATOR_STACKED_SLOT_LEFT"]);
    assert_eq!(violations[0].message, STACKED_SLOT_MESSAGE);
}

#[test]
fn control_reports_missing_obligatory_slot() {
    let mut ws = helpers::workspace();
    let root = ws.root();
    let branch = ws.create_block(BlockKind::control("if")).unwrap();
    ws.attach(root, slots::STACK, branch).unwrap();
    let ls = helpers::loose_command(&mut ws, "ls");
    ws.attach(branch, "CONDITION", ls).unwrap();

    let violations = ws.violations(branch);
    assert_eq!(violation_ids(violations), vec!["CONTROL_MISSING_SLOT_THEN"]);
    assert_eq!(violations[0].message, "The \"Then\" slot is required.");

    let head = helpers::loose_command(&mut ws, "head");
    ws.attach(branch, "THEN", head).unwrap();
    assert!(ws.violations(branch).is_empty());
}

#[test]
fn operand_value_regex() {
    let mut ws = helpers::workspace();
    let ls = helpers::script_command(&mut ws, "ls");
    let path = helpers::add_operand(&mut ws, ls, "ls", "path", "*.txt");

    let violations = ws.violations(path);
    assert_eq!(violation_ids(violations), vec!["OPERAND_REGEX_0"]);
    assert_eq!(violations[0].message, "Wildcards are not allowed here.");

    ws.set_field(path, fields::VALUE, "/tmp").unwrap();
    assert!(ws.violations(path).is_empty());
}

#[test]
fn option_argument_regex_applies_to_the_selected_flag() {
    let mut ws = helpers::workspace();
    let grep = helpers::script_command(&mut ws, "grep");
    let opt = helpers::add_option(&mut ws, grep, "grep", "-e");
    assert_eq!(ws.block(opt).unwrap().field(fields::OPTION_ARG_VALUE), Some("error"));
    assert!(ws.violations(opt).is_empty());

    ws.set_field(opt, fields::OPTION_ARG_VALUE, "   ").unwrap();
    let violations = ws.violations(opt);
    assert_eq!(violation_ids(violations), vec!["OPTION_ARG_REGEX_0"]);
    assert_eq!(violations[0].message, "The pattern cannot be blank.");

    ws.set_field(opt, fields::FLAG, "-i").unwrap();
    assert!(ws.violations(opt).is_empty());
}

#[test]
fn orphans_carry_no_violations() {
    let mut ws = helpers::workspace();
    let grep = helpers::loose_command(&mut ws, "grep");
    assert!(ws.violations(grep).is_empty());
    assert!(!ws.is_blocked());

    let root = ws.root();
    ws.attach(root, slots::STACK, grep).unwrap();
    assert_eq!(ws.violations(grep).len(), 3);

    ws.detach(grep, true).unwrap();
    assert!(ws.violations(grep).is_empty());
}
