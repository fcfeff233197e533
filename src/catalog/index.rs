//! Compiled, read-only view over `CliDefinitions`.
//!
//! Lookup maps and regexes are built once at load. A catalog regex that does
//! not compile is a catalog bug and rejects the whole catalog.

use std::collections::HashMap;

use regex::Regex;

use super::types::*;
use crate::error::EngineError;
use crate::graph::BlockKind;

/// Categories shown when the backend could not supply a catalog.
pub const OFFLINE_CATEGORY: &str = "Offline";

#[derive(Debug, Clone)]
pub struct CompiledSyntaxRule {
    pub regex: Regex,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompiledValidation {
    pub regex: Regex,
    pub error_message: String,
}

/// The definition a block kind resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Script,
    Command(&'a CommandDef),
    Option(&'a CommandDef),
    Operand {
        command: &'a CommandDef,
        operand: &'a OperandDef,
    },
    Control(&'a ControlDef),
    Operator(&'a OperatorDef),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: CliDefinitions,
    commands: HashMap<String, usize>,
    controls: HashMap<String, usize>,
    operators: HashMap<String, usize>,
    syntax_rules: HashMap<String, Vec<CompiledSyntaxRule>>,
    operand_validations: HashMap<(String, String), Vec<CompiledValidation>>,
    argument_validations: HashMap<(String, String), Vec<CompiledValidation>>,
}

impl Catalog {
    /// Normalize and compile a parsed catalog. Returns every integrity error found.
    pub fn build(mut definitions: CliDefinitions) -> Result<Self, Vec<EngineError>> {
        let mut errors = Vec::new();

        for command in &mut definitions.commands {
            if command.id.as_deref().is_none_or(str::is_empty) {
                command.id = Some(command.shell_command.clone());
            }
        }

        let commands = index_ids(
            definitions.commands.iter().map(|c| c.id()),
            "command",
            &mut errors,
        );
        let controls = index_ids(
            definitions.controls.iter().map(|c| c.id.as_str()),
            "control",
            &mut errors,
        );
        let operators = index_ids(
            definitions.operators.iter().map(|o| o.id.as_str()),
            "operator",
            &mut errors,
        );

        let mut syntax_rules = HashMap::new();
        let mut operand_validations = HashMap::new();
        let mut argument_validations = HashMap::new();

        for command in &definitions.commands {
            let mut rules = Vec::new();
            for rule in &command.operand_syntax_rules {
                // Rules describe the whole sequence, so anchor both ends.
                match Regex::new(&format!("^(?:{})$", rule.regex_pattern)) {
                    Ok(regex) => rules.push(CompiledSyntaxRule {
                        regex,
                        error_message: rule.error_message.clone(),
                    }),
                    Err(e) => errors.push(EngineError::catalog(
                        "C002",
                        format!(
                            "Invalid syntax rule '{}' on command '{}': {}",
                            rule.regex_pattern,
                            command.id(),
                            e
                        ),
                    )),
                }
            }
            syntax_rules.insert(command.id().to_string(), rules);

            for operand in &command.operands {
                let compiled = compile_validations(
                    &operand.validations,
                    &format!("operand '{}' of command '{}'", operand.id, command.id()),
                    &mut errors,
                );
                operand_validations.insert(
                    (command.id().to_string(), operand.id.clone()),
                    compiled,
                );
            }

            for option in &command.options {
                let Some(argument) = &option.argument else {
                    continue;
                };
                let compiled = compile_validations(
                    &argument.validations,
                    &format!("option '{}' of command '{}'", option.flag, command.id()),
                    &mut errors,
                );
                argument_validations.insert(
                    (command.id().to_string(), option.flag.clone()),
                    compiled,
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        tracing::info!(
            commands = definitions.commands.len(),
            controls = definitions.controls.len(),
            operators = definitions.operators.len(),
            "catalog loaded"
        );

        Ok(Catalog {
            definitions,
            commands,
            controls,
            operators,
            syntax_rules,
            operand_validations,
            argument_validations,
        })
    }

    /// The degraded catalog used when no definitions are available.
    pub fn offline() -> Self {
        let definitions = CliDefinitions {
            commands: vec![],
            operators: vec![],
            controls: vec![],
            categories: vec![CategoryDef {
                name: OFFLINE_CATEGORY.into(),
                commands: vec![],
            }],
        };
        Catalog {
            definitions,
            commands: HashMap::new(),
            controls: HashMap::new(),
            operators: HashMap::new(),
            syntax_rules: HashMap::new(),
            operand_validations: HashMap::new(),
            argument_validations: HashMap::new(),
        }
    }

    pub fn definitions(&self) -> &CliDefinitions {
        &self.definitions
    }

    /// True when the catalog carries no commands (offline/degraded mode).
    pub fn is_offline(&self) -> bool {
        self.definitions.commands.is_empty()
    }

    pub fn command(&self, id: &str) -> Option<&CommandDef> {
        self.commands.get(id).map(|&i| &self.definitions.commands[i])
    }

    pub fn control(&self, id: &str) -> Option<&ControlDef> {
        self.controls.get(id).map(|&i| &self.definitions.controls[i])
    }

    pub fn operator(&self, id: &str) -> Option<&OperatorDef> {
        self.operators.get(id).map(|&i| &self.definitions.operators[i])
    }

    pub fn syntax_rules(&self, command_id: &str) -> &[CompiledSyntaxRule] {
        self.syntax_rules
            .get(command_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn operand_validations(&self, command_id: &str, operand_id: &str) -> &[CompiledValidation] {
        self.operand_validations
            .get(&(command_id.to_string(), operand_id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn argument_validations(&self, command_id: &str, flag: &str) -> &[CompiledValidation] {
        self.argument_validations
            .get(&(command_id.to_string(), flag.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve a block kind to its definition, if the catalog knows it.
    pub fn definition(&self, kind: &BlockKind) -> Option<Definition<'_>> {
        match kind {
            BlockKind::Script => Some(Definition::Script),
            BlockKind::Command { command } => self.command(command).map(Definition::Command),
            BlockKind::Option { command } => self.command(command).map(Definition::Option),
            BlockKind::Operand { command, operand } => {
                let command = self.command(command)?;
                let operand = command.operand(operand)?;
                Some(Definition::Operand { command, operand })
            }
            BlockKind::Control { control } => self.control(control).map(Definition::Control),
            BlockKind::Operator { operator } => self.operator(operator).map(Definition::Operator),
        }
    }
}

fn index_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    what: &str,
    errors: &mut Vec<EngineError>,
) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, id) in ids.enumerate() {
        if map.insert(id.to_string(), i).is_some() {
            errors.push(EngineError::catalog(
                "C004",
                format!("Duplicate {} id '{}'", what, id),
            ));
        }
    }
    map
}

fn compile_validations(
    validations: &[ValueValidation],
    owner: &str,
    errors: &mut Vec<EngineError>,
) -> Vec<CompiledValidation> {
    let mut compiled = Vec::new();
    for validation in validations {
        match Regex::new(&validation.regex) {
            Ok(regex) => compiled.push(CompiledValidation {
                regex,
                error_message: validation.error_message.clone(),
            }),
            Err(e) => errors.push(EngineError::catalog(
                "C003",
                format!(
                    "Invalid validation regex '{}' on {}: {}",
                    validation.regex, owner, e
                ),
            )),
        }
    }
    compiled
}
