//! Data objects, data store references, item definitions and IO
//! specifications.
//!
//! A [`ValuedDataObject`] holds one literal whose native type is chosen by the
//! suffix of its item definition's structure reference:
//!
//! ```text
//! itemSubjectRef="xsd:int"   ->  DataObjectKind::Integer  ->  DataValue::Integer(42)
//! ```

use chrono::NaiveDateTime;
use thiserror::Error;

use super::element::BaseElement;

/// The one textual pattern date values are read and written with.
pub const DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";

/// Structure reference given to data objects that declare none.
pub const DEFAULT_STRUCTURE_REF: &str = "xsd:string";

/// A type declaration referenced by data objects, messages and data stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDefinition {
    pub id: Option<String>,
    pub structure_ref: Option<String>,
    pub item_kind: Option<String>,
}

impl ItemDefinition {
    pub fn with_structure_ref(structure_ref: impl Into<String>) -> Self {
        Self {
            structure_ref: Some(structure_ref.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataObjectKind {
    String,
    Boolean,
    Integer,
    Long,
    Double,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read {literal:?} as a {kind} data object value")]
pub struct CoercionError {
    pub kind: &'static str,
    pub literal: String,
}

impl DataObjectKind {
    /// Selects a kind from the type suffix of a structure reference
    /// (`string`, `int`, `long`, `double`, `boolean`, `datetime`).
    pub fn from_type_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "string" => Some(Self::String),
            "int" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            "boolean" => Some(Self::Boolean),
            "datetime" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn type_suffix(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "datetime",
        }
    }

    /// Converts a literal into this kind's native representation.
    pub fn coerce(&self, literal: &str) -> Result<DataValue, CoercionError> {
        let fail = || CoercionError {
            kind: self.type_suffix(),
            literal: literal.to_string(),
        };
        let value = match self {
            Self::String => DataValue::String(literal.to_string()),
            Self::Boolean => DataValue::Boolean(literal.trim().eq_ignore_ascii_case("true")),
            Self::Integer => DataValue::Integer(literal.trim().parse().map_err(|_| fail())?),
            Self::Long => DataValue::Long(literal.trim().parse().map_err(|_| fail())?),
            Self::Double => DataValue::Double(literal.trim().parse().map_err(|_| fail())?),
            Self::Date => DataValue::Date(
                NaiveDateTime::parse_from_str(literal.trim(), DATE_PATTERN).map_err(|_| fail())?,
            ),
        };
        Ok(value)
    }
}

/// A native data object value.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Date(NaiveDateTime),
}

impl DataValue {
    /// The literal written back into the document.
    pub fn to_literal(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Boolean(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Long(value) => value.to_string(),
            Self::Double(value) => format!("{value:?}"),
            Self::Date(value) => value.format(DATE_PATTERN).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuedDataObject {
    pub base: BaseElement,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub kind: DataObjectKind,
    pub item_subject_ref: ItemDefinition,
    pub value: Option<DataValue>,
}

impl ValuedDataObject {
    pub fn new(id: impl Into<String>, kind: DataObjectKind) -> Self {
        Self {
            base: BaseElement::new(id),
            name: None,
            documentation: None,
            kind,
            item_subject_ref: ItemDefinition::with_structure_ref(format!("xsd:{}", kind.type_suffix())),
            value: None,
        }
    }

    pub fn with_value(mut self, value: DataValue) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStoreReference {
    pub base: BaseElement,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub data_store_ref: Option<String>,
    pub item_subject_ref: Option<String>,
    pub data_state: Option<String>,
}

/// One declared input or output of an IO specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSpec {
    pub id: String,
    pub name: Option<String>,
    pub item_subject_ref: Option<String>,
    pub is_collection: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoSpecification {
    pub data_inputs: Vec<DataSpec>,
    pub data_outputs: Vec<DataSpec>,
    pub data_input_refs: Vec<String>,
    pub data_output_refs: Vec<String>,
}
