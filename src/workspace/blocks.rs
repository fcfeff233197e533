//! Block construction: the slots, default fields and semantic data a new block
//! of a given kind starts with.

use std::collections::BTreeMap;

use crate::catalog::{CommandDef, ControlDef, Definition, OperandDef, OperatorDef};
use crate::graph::semantic::{
    ControlSemantic, ControlSlotSemantic, OperatorSemantic, OperatorSlotSemantic,
    SemanticDefinition, keys,
};
use crate::graph::{Binding, NodeType, SemanticData, SlotSpec, StatementTag, fields, slots};

/// Everything needed to insert a block into the graph.
pub struct BlockTemplate {
    pub slots: Vec<SlotSpec>,
    pub fields: BTreeMap<String, String>,
    pub semantic: SemanticData,
}

pub fn template_for(def: Definition<'_>) -> BlockTemplate {
    match def {
        Definition::Script => script_template(),
        Definition::Command(command) => command_template(command),
        Definition::Option(command) => option_template(command),
        Definition::Operand { command, operand } => operand_template(command, operand),
        Definition::Control(control) => control_template(control),
        Definition::Operator(operator) => operator_template(operator),
    }
}

fn script_template() -> BlockTemplate {
    BlockTemplate {
        slots: vec![SlotSpec {
            name: slots::STACK.into(),
            accepts: StatementTag::Command,
        }],
        fields: BTreeMap::new(),
        semantic: script_semantic(),
    }
}

/// Semantic data of the Script root.
pub fn script_semantic() -> SemanticData {
    SemanticData {
        node_type: NodeType::Script,
        name: "script".into(),
        bindings: vec![Binding::input(keys::COMMANDS, slots::STACK)],
        definition: None,
    }
}

fn command_template(command: &CommandDef) -> BlockTemplate {
    BlockTemplate {
        slots: vec![
            SlotSpec {
                name: slots::OPTIONS.into(),
                accepts: StatementTag::Option(command.id().to_string()),
            },
            SlotSpec {
                name: slots::OPERANDS.into(),
                accepts: StatementTag::Operand(command.id().to_string()),
            },
        ],
        fields: BTreeMap::new(),
        semantic: SemanticData {
            node_type: NodeType::Command,
            name: command.shell_command.clone(),
            bindings: vec![
                Binding::input(keys::OPTIONS, slots::OPTIONS),
                Binding::input(keys::OPERANDS, slots::OPERANDS),
            ],
            definition: None,
        },
    }
}

fn option_template(command: &CommandDef) -> BlockTemplate {
    let mut fields = BTreeMap::new();
    let mut bindings = vec![Binding::field(keys::FLAG, fields::FLAG)];

    if let Some(first) = command.options.first() {
        fields.insert(fields::FLAG.to_string(), first.flag.clone());
    }
    if command.has_option_arguments() {
        let default = command
            .options
            .first()
            .and_then(|o| o.argument.as_ref())
            .and_then(|a| a.default_value.clone())
            .unwrap_or_default();
        fields.insert(fields::OPTION_ARG_VALUE.to_string(), default);
        bindings.push(Binding::field(keys::ARGUMENT, fields::OPTION_ARG_VALUE));
    }

    BlockTemplate {
        slots: vec![],
        fields,
        semantic: SemanticData {
            node_type: NodeType::Option,
            name: command.shell_command.clone(),
            bindings,
            definition: None,
        },
    }
}

fn operand_template(_command: &CommandDef, operand: &OperandDef) -> BlockTemplate {
    let mut fields = BTreeMap::new();
    fields.insert(fields::VALUE.to_string(), operand.default_value.clone());

    BlockTemplate {
        slots: vec![],
        fields,
        semantic: SemanticData {
            node_type: NodeType::Operand,
            name: operand.id.clone(),
            bindings: vec![Binding::field(keys::VALUE, fields::VALUE)],
            definition: None,
        },
    }
}

/// Parameter key for a control/operator slot.
pub fn slot_key(slot_name: &str) -> String {
    slot_name.to_ascii_lowercase()
}

fn control_template(control: &ControlDef) -> BlockTemplate {
    let name = if control.shell_command.is_empty() {
        control.id.clone()
    } else {
        control.shell_command.clone()
    };

    BlockTemplate {
        slots: control
            .slots
            .iter()
            .map(|s| SlotSpec {
                name: s.name.clone(),
                accepts: StatementTag::from_check(&s.check),
            })
            .collect(),
        fields: BTreeMap::new(),
        semantic: SemanticData {
            node_type: NodeType::Control,
            name,
            bindings: control
                .slots
                .iter()
                .map(|s| Binding::input(&slot_key(&s.name), &s.name))
                .collect(),
            definition: Some(SemanticDefinition::Control(ControlSemantic {
                syntax_end: control.syntax_end.clone(),
                slots: control
                    .slots
                    .iter()
                    .map(|s| ControlSlotSemantic {
                        name: s.name.clone(),
                        syntax_prefix: s.syntax_prefix.clone(),
                        obligatory: s.obligatory,
                        break_line_before: s.break_line_before,
                    })
                    .collect(),
            })),
        },
    }
}

fn operator_template(operator: &OperatorDef) -> BlockTemplate {
    BlockTemplate {
        slots: operator
            .slots
            .iter()
            .map(|s| SlotSpec {
                name: s.name.clone(),
                accepts: StatementTag::from_check(&s.check),
            })
            .collect(),
        fields: BTreeMap::new(),
        semantic: SemanticData {
            node_type: NodeType::Operator,
            name: operator.id.clone(),
            bindings: operator
                .slots
                .iter()
                .map(|s| Binding::input(&slot_key(&s.name), &s.name))
                .collect(),
            definition: Some(SemanticDefinition::Operator(OperatorSemantic {
                slots: operator
                    .slots
                    .iter()
                    .map(|s| OperatorSlotSemantic {
                        name: s.name.clone(),
                        symbol: s.symbol.clone(),
                        symbol_placement: s.symbol_placement,
                    })
                    .collect(),
                slots_with_implicit_data: operator.slots_with_implicit_data.clone(),
            })),
        },
    }
}
