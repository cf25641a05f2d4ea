//! Values exchanged between Terraform and the provider
//!
//! Configuration and state are both trees of [`Dynamic`] nodes. Objects and
//! maps share the `Map` variant; blocks are lists of objects.

use crate::error::{Result, TfplugError};
use std::collections::HashMap;

/// One node of a configuration or state tree
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    /// Terraform numbers are carried as f64
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
}

impl Dynamic {
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Dynamic>> {
        match self {
            Dynamic::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
        }
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Number(value as f64)
    }
}

/// Tag maps: every value becomes a string node
impl From<HashMap<String, String>> for Dynamic {
    fn from(value: HashMap<String, String>) -> Self {
        Dynamic::Map(
            value
                .into_iter()
                .map(|(k, v)| (k, Dynamic::String(v)))
                .collect(),
        )
    }
}

/// One flattened entity as it appears in data source state: attribute name to value.
/// Optional attributes that were absent upstream have no key at all.
pub type Record = HashMap<String, Dynamic>;

/// Root of a configuration or state tree
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self::new(Dynamic::Null)
    }

    /// Build an object value from attribute name/value pairs
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Dynamic)>,
        K: Into<String>,
    {
        Self::new(Dynamic::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Raw lookup; `None` when the path does not resolve
    pub fn get(&self, path: &AttributePath) -> Option<&Dynamic> {
        self.resolve(path).ok()
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.resolve(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        match self.resolve(path)? {
            Dynamic::List(items) => Ok(items.clone()),
            other => Err(mismatch("list", other)),
        }
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    /// Write `value` at `path`, creating intermediate objects as needed.
    /// A null root becomes an empty object first.
    pub fn set_value(&mut self, path: &AttributePath, value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = value;
            return Ok(());
        };

        if self.value.is_null() {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut node = &mut self.value;
        for step in parents {
            node = child_mut(node, step)?;
        }

        match (node, last) {
            (Dynamic::Map(entries), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(entries), AttributePathStep::ElementKeyString(name)) => {
                entries.insert(name.clone(), value);
                Ok(())
            }
            (Dynamic::List(items), AttributePathStep::ElementKeyInt(idx)) => {
                let slot = usize::try_from(*idx)
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or_else(|| TfplugError::InvalidPath(format!("index {} out of bounds", idx)))?;
                *slot = value;
                Ok(())
            }
            (node, step) => Err(TfplugError::InvalidPath(format!(
                "cannot apply {:?} to {}",
                step,
                node.type_name()
            ))),
        }
    }

    fn resolve(&self, path: &AttributePath) -> Result<&Dynamic> {
        path.steps.iter().try_fold(&self.value, |node, step| match (node, step) {
            (Dynamic::Map(entries), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(entries), AttributePathStep::ElementKeyString(name)) => entries
                .get(name)
                .ok_or_else(|| TfplugError::AttributeNotFound(name.clone())),
            (Dynamic::List(items), AttributePathStep::ElementKeyInt(idx)) => usize::try_from(*idx)
                .ok()
                .and_then(|i| items.get(i))
                .ok_or_else(|| TfplugError::InvalidPath(format!("index {} out of bounds", idx))),
            (node, step) => Err(TfplugError::InvalidPath(format!(
                "cannot apply {:?} to {}",
                step,
                node.type_name()
            ))),
        })
    }
}

/// Descend one step for writing; missing object members are created empty
fn child_mut<'a>(node: &'a mut Dynamic, step: &AttributePathStep) -> Result<&'a mut Dynamic> {
    match (node, step) {
        (Dynamic::Map(entries), AttributePathStep::AttributeName(name))
        | (Dynamic::Map(entries), AttributePathStep::ElementKeyString(name)) => Ok(entries
            .entry(name.clone())
            .or_insert_with(|| Dynamic::Map(HashMap::new()))),
        (Dynamic::List(items), AttributePathStep::ElementKeyInt(idx)) => usize::try_from(*idx)
            .ok()
            .and_then(move |i| items.get_mut(i))
            .ok_or_else(|| TfplugError::InvalidPath(format!("index {} out of bounds", idx))),
        (node, step) => Err(TfplugError::InvalidPath(format!(
            "cannot apply {:?} to {}",
            step,
            node.type_name()
        ))),
    }
}

fn mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// Location of a value inside a configuration or state tree
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    /// Map element
    ElementKeyString(String),
    /// List element
    ElementKeyInt(i64),
}

/// Warning or error reported back to Terraform
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary, detail)
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary, detail)
    }

    fn with_severity(
        severity: DiagnosticSeverity,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// True when any diagnostic in the slice is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Data source configuration as written by the user
pub type Config = DynamicValue;

/// Data source state as returned to Terraform
pub type State = DynamicValue;
