use crate::hints::{Alphabet, TargetSource, DEFAULT_ALPHABET};
use crate::navigator::VerticalPolicy;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub hints: HintsConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default = "default_jumps")]
    pub jump: Vec<JumpConfig>,
    #[serde(default = "default_wraps")]
    pub wrap: Vec<WrapConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hints: HintsConfig::default(),
            navigation: NavigationConfig::default(),
            editing: EditingConfig::default(),
            jump: default_jumps(),
            wrap: default_wraps(),
        }
    }
}

impl Config {
    pub fn jump_for(&self, key: char) -> Option<&JumpConfig> {
        self.jump.iter().find(|jump| single_char(&jump.key) == Some(key))
    }

    pub fn wrap_for(&self, key: char) -> Option<&WrapConfig> {
        self.wrap.iter().find(|wrap| single_char(&wrap.key) == Some(key))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if let Err(error) = Alphabet::new(&self.hints.alphabet) {
            issues.push(ValidationIssue::InvalidAlphabet {
                message: error.to_string(),
            });
        }

        if self.editing.indent.contains(|c: char| !c.is_whitespace()) {
            issues.push(ValidationIssue::InvalidField {
                section: "editing",
                key: None,
                message: "indent must be whitespace".to_string(),
            });
        }

        check_keys("jump", self.jump.iter().map(|j| j.key.as_str()), &mut issues);
        check_keys("wrap", self.wrap.iter().map(|w| w.key.as_str()), &mut issues);

        for jump in &self.jump {
            let count = jump.source_count();
            if count != 1 {
                issues.push(ValidationIssue::TargetSources {
                    key: jump.key.clone(),
                    count,
                });
            }
            if matches!(&jump.kinds, Some(kinds) if kinds.is_empty()) {
                issues.push(ValidationIssue::InvalidField {
                    section: "jump",
                    key: Some(jump.key.clone()),
                    message: "kinds must not be empty".to_string(),
                });
            }
            for (field, value) in [("query", &jump.query), ("pattern", &jump.pattern)] {
                if matches!(value, Some(text) if text.trim().is_empty()) {
                    issues.push(ValidationIssue::InvalidField {
                        section: "jump",
                        key: Some(jump.key.clone()),
                        message: format!("{field} must not be empty"),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_keys<'a>(
    section: &'static str,
    keys: impl Iterator<Item = &'a str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen = HashSet::new();
    for key in keys {
        if key.is_empty() {
            issues.push(ValidationIssue::EmptyKey { section });
        } else if single_char(key).is_none() {
            issues.push(ValidationIssue::MultiCharKey {
                section,
                key: key.to_string(),
            });
        } else if !seen.insert(key) {
            issues.push(ValidationIssue::DuplicateKey {
                section,
                key: key.to_string(),
            });
        }
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HintsConfig {
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
        }
    }
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NavigationConfig {
    #[serde(default)]
    pub vertical: VerticalPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditingConfig {
    /// One level of indentation, used when a wrap puts code on its own lines
    #[serde(default = "default_indent")]
    pub indent: String,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

fn default_indent() -> String {
    "  ".to_string()
}

/// A jump kind: the key typed after `g`, `l` or `r`, and where its targets
/// come from. Exactly one of `kinds`, `query` or `pattern` is set.
#[derive(Debug, Deserialize, Clone)]
pub struct JumpConfig {
    pub key: String,
    #[serde(default)]
    pub kinds: Option<Vec<String>>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl JumpConfig {
    fn kinds(key: &str, kinds: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            kinds: Some(kinds.iter().map(|k| k.to_string()).collect()),
            query: None,
            pattern: None,
        }
    }

    fn source_count(&self) -> usize {
        [
            self.kinds.is_some(),
            self.query.is_some(),
            self.pattern.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn source(&self) -> Option<TargetSource> {
        match (&self.kinds, &self.query, &self.pattern) {
            (Some(kinds), None, None) => Some(TargetSource::Kinds(kinds.clone())),
            (None, Some(query), None) => Some(TargetSource::Query(query.clone())),
            (None, None, Some(pattern)) => Some(TargetSource::Pattern(pattern.clone())),
            _ => None,
        }
    }
}

fn default_jumps() -> Vec<JumpConfig> {
    vec![
        JumpConfig::kinds(
            "?",
            &[
                "if_statement",
                "ternary_expression",
                "switch_statement",
                "if_expression",
                "match_expression",
                "conditional_expression",
            ],
        ),
        JumpConfig::kinds(
            ";",
            &[
                "expression_statement",
                "lexical_declaration",
                "variable_declaration",
                "return_statement",
                "if_statement",
                "for_statement",
                "for_in_statement",
                "while_statement",
                "do_statement",
                "switch_statement",
                "try_statement",
                "throw_statement",
                "break_statement",
                "continue_statement",
                "function_declaration",
                "class_declaration",
                "let_declaration",
            ],
        ),
        JumpConfig::kinds(
            "f",
            &[
                "function_declaration",
                "function_expression",
                "arrow_function",
                "method_definition",
                "function_item",
                "function_definition",
            ],
        ),
    ]
}

/// Text put around a node (`w`) or inserted on its own (`a`/`A`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WrapConfig {
    pub key: String,
    pub before: String,
    #[serde(default)]
    pub after: Option<String>,
    /// When false, wrapped code always goes on its own indented lines.
    #[serde(default = "default_single_line")]
    pub single_line: bool,
}

fn default_single_line() -> bool {
    true
}

impl WrapConfig {
    fn inline(key: &str, before: &str, after: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            before: before.to_string(),
            after: after.map(str::to_string),
            single_line: true,
        }
    }

    fn block(key: &str, before: &str, after: &str) -> Self {
        Self {
            single_line: false,
            ..Self::inline(key, before, Some(after))
        }
    }
}

fn default_wraps() -> Vec<WrapConfig> {
    vec![
        WrapConfig::inline("(", "(", Some(")")),
        WrapConfig::inline("[", "[", Some("]")),
        WrapConfig::inline("{", "{", Some("}")),
        WrapConfig::inline("'", "'", Some("'")),
        WrapConfig::inline("\"", "\"", Some("\"")),
        WrapConfig::inline("`", "`", Some("`")),
        WrapConfig::block("d", "if (condition) {", "}"),
        WrapConfig::inline("?", "condition ? ", Some(" : alternative")),
        WrapConfig::block("f", "function name() {", "}"),
        WrapConfig::inline("F", "() => ", None),
        WrapConfig::inline("a", "const name = ", None),
        WrapConfig::inline("A", "let name = ", None),
        WrapConfig::inline("c", "name(", Some(")")),
        WrapConfig::inline("C", "console.log(", Some(")")),
        WrapConfig::block("t", "<tag>", "</tag>"),
        WrapConfig::inline("r", "return ", None),
        WrapConfig::block("l", "for (let i = 0; i < max; i++) {", "}"),
        WrapConfig::block("L", "while (condition) {", "}"),
    ]
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidAlphabet {
        message: String,
    },
    EmptyKey {
        section: &'static str,
    },
    MultiCharKey {
        section: &'static str,
        key: String,
    },
    DuplicateKey {
        section: &'static str,
        key: String,
    },
    TargetSources {
        key: String,
        count: usize,
    },
    InvalidField {
        section: &'static str,
        key: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidAlphabet { message } => {
                write!(f, "invalid hints.alphabet: {message}")
            }
            ValidationIssue::EmptyKey { section } => write!(f, "{section} entry has an empty key"),
            ValidationIssue::MultiCharKey { section, key } => {
                write!(f, "{section} key '{key}' must be a single character")
            }
            ValidationIssue::DuplicateKey { section, key } => {
                write!(f, "{section} key '{key}' is defined more than once")
            }
            ValidationIssue::TargetSources { key, count } => write!(
                f,
                "jump '{key}' must set exactly one of kinds, query or pattern (found {count})"
            ),
            ValidationIssue::InvalidField {
                section,
                key,
                message,
            } => match key {
                Some(key) => write!(f, "{section} '{key}' has invalid configuration: {message}"),
                None => write!(f, "invalid {section} configuration: {message}"),
            },
        }
    }
}
