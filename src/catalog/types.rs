//! Rust types mirroring the command-definition catalog JSON.
//!
//! These types are the serde target for the catalog document served to the
//! editor. Everything except the identifying fields is defaulted so partially
//! authored catalogs still load.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// TOP-LEVEL CATALOG
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliDefinitions {
    #[serde(default)]
    pub commands: Vec<CommandDef>,
    #[serde(default)]
    pub operators: Vec<OperatorDef>,
    #[serde(default)]
    pub controls: Vec<ControlDef>,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDef {
    /// Optional in the raw document; normalized to `shell_command` on load.
    #[serde(default)]
    pub id: Option<String>,
    pub shell_command: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub option_color: String,
    #[serde(default)]
    pub options: Vec<OptionDef>,
    #[serde(default)]
    pub options_min: Option<u32>,
    #[serde(default)]
    pub exclusive_options: Vec<Vec<String>>,
    #[serde(default)]
    pub operands: Vec<OperandDef>,
    #[serde(default)]
    pub operands_min: Option<u32>,
    #[serde(default)]
    pub operand_syntax_rules: Vec<SyntaxRule>,
    #[serde(default, alias = "operandIdsSequenceSeparator")]
    pub operand_ids_sequence_delimiter: Option<String>,
}

impl CommandDef {
    /// The normalized id. Falls back to the shell command when the catalog
    /// omits one.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.shell_command)
    }

    pub fn option(&self, flag: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.flag == flag)
    }

    pub fn operand(&self, id: &str) -> Option<&OperandDef> {
        self.operands.iter().find(|o| o.id == id)
    }

    /// Whether any of the command's options takes an argument value.
    pub fn has_option_arguments(&self) -> bool {
        self.options.iter().any(|o| o.argument.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDef {
    pub flag: String,
    #[serde(default)]
    pub long_flag: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub argument: Option<ArgumentDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDef {
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub validations: Vec<ValueValidation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperandDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub validations: Vec<ValueValidation>,
}

impl OperandDef {
    /// Label used in user-facing messages.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { &self.id } else { &self.label }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    #[default]
    String,
    File,
    Folder,
    Number,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueValidation {
    pub regex: String,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxRule {
    #[serde(alias = "pattern")]
    pub regex_pattern: String,
    #[serde(default, alias = "message")]
    pub error_message: Option<String>,
}

// =============================================================================
// CARDINALITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: MaxCardinality,
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality {
            min: 0,
            max: MaxCardinality::Unlimited,
        }
    }
}

/// Upper bound of a cardinality rule: a count or `"unlimited"`.
///
/// The catalog writes limited bounds either as numbers or numeric strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaxCardinality {
    Limited(u32),
    #[default]
    Unlimited,
}

impl MaxCardinality {
    pub fn limit(&self) -> Option<u32> {
        match self {
            MaxCardinality::Limited(n) => Some(*n),
            MaxCardinality::Unlimited => None,
        }
    }
}

impl Serialize for MaxCardinality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxCardinality::Limited(n) => serializer.serialize_u32(*n),
            MaxCardinality::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxCardinality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(MaxCardinality::Limited(n)),
            Raw::Text(s) if s.eq_ignore_ascii_case("unlimited") => Ok(MaxCardinality::Unlimited),
            Raw::Text(s) => s.trim().parse::<u32>().map(MaxCardinality::Limited).map_err(|_| {
                serde::de::Error::custom(format!(
                    "cardinality max must be a number or \"unlimited\", got '{}'",
                    s
                ))
            }),
        }
    }
}

// =============================================================================
// CONTROLS & OPERATORS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDef {
    pub id: String,
    #[serde(default)]
    pub shell_command: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub syntax_end: Option<String>,
    #[serde(default)]
    pub slots: Vec<SlotDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub slots: Vec<SlotDef>,
    #[serde(default)]
    pub slots_with_implicit_data: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDef {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_slot_check")]
    pub check: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub symbol_placement: Option<SymbolPlacement>,
    #[serde(default)]
    pub syntax_prefix: Option<String>,
    #[serde(default)]
    pub obligatory: bool,
    #[serde(default)]
    pub break_line_before: bool,
}

impl SlotDef {
    /// Label used in user-facing messages, with any trailing colon dropped.
    pub fn display_label(&self) -> String {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
            .replace(':', "")
            .trim()
            .to_string()
    }
}

fn default_slot_check() -> String {
    "command".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolPlacement {
    Before,
    After,
}
