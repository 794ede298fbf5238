//! Vendor listener, field-injection and form constructs shared by several
//! element kinds.

/// How a vendor task, listener or service call is implemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Implementation {
    Class(String),
    Expression(String),
    DelegateExpression(String),
    /// `implementation="##WebService"` with the referenced operation.
    WebService { operation_ref: Option<String> },
    /// A bare `implementation` attribute value.
    Other(String),
}

/// A value injected into a delegate: either a literal or an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldExtension {
    pub name: String,
    pub string_value: Option<String>,
    pub expression: Option<String>,
}

impl FieldExtension {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            string_value: Some(value.into()),
            expression: None,
        }
    }

    pub fn expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            string_value: None,
            expression: Some(expression.into()),
        }
    }
}

/// An execution or task listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listener {
    pub event: Option<String>,
    pub implementation: Option<Implementation>,
    pub field_extensions: Vec<FieldExtension>,
}

impl Listener {
    pub fn new(event: impl Into<String>, implementation: Implementation) -> Self {
        Self {
            event: Some(event.into()),
            implementation: Some(implementation),
            field_extensions: Vec::new(),
        }
    }
}

/// A process-level engine event listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListener {
    pub events: Option<String>,
    pub implementation: Option<Implementation>,
    pub entity_type: Option<String>,
}

/// One selectable value of an enum-typed form property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValue {
    pub id: String,
    pub name: Option<String>,
}

/// A form field declared on a user task or start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormProperty {
    pub id: String,
    pub name: Option<String>,
    pub property_type: Option<String>,
    pub expression: Option<String>,
    pub variable: Option<String>,
    pub default_expression: Option<String>,
    pub date_pattern: Option<String>,
    pub readable: bool,
    pub writeable: bool,
    pub required: bool,
    pub form_values: Vec<FormValue>,
}

impl FormProperty {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            property_type: None,
            expression: None,
            variable: None,
            default_expression: None,
            date_pattern: None,
            readable: true,
            writeable: true,
            required: false,
            form_values: Vec::new(),
        }
    }
}

impl Default for FormProperty {
    fn default() -> Self {
        Self::new("")
    }
}

/// A variable mapping into or out of a called process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoParameter {
    pub source: Option<String>,
    pub source_expression: Option<String>,
    pub target: Option<String>,
}
