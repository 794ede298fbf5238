//! Root-level declarations referenced by id from processes.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signal {
    pub id: String,
    pub name: Option<String>,
    pub scope: Option<String>,
}

/// A performer resource that assignments can name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub name: Option<String>,
    pub item_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BpmnError {
    pub id: String,
    pub name: Option<String>,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Import {
    pub import_type: Option<String>,
    pub location: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataStore {
    pub id: String,
    pub name: Option<String>,
    pub item_subject_ref: Option<String>,
    pub data_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    pub id: String,
    pub name: Option<String>,
    pub implementation_ref: Option<String>,
    pub in_message_ref: Option<String>,
    pub out_message_ref: Option<String>,
    pub error_message_refs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    pub id: String,
    pub name: Option<String>,
    pub implementation_ref: Option<String>,
    pub operations: Vec<Operation>,
}
