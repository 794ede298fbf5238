//! Processes, lanes and the collaboration constructs around them.

use super::container::FlowElementsContainer;
use super::data::IoSpecification;
use super::element::BaseElement;
use super::listener::{EventListener, Listener};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lane {
    pub id: String,
    pub name: Option<String>,
    /// Ids from the lane's `flowNodeRef` children.
    pub flow_references: Vec<String>,
}

/// A participant of the collaboration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    pub base: BaseElement,
    pub name: Option<String>,
    pub process_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFlow {
    pub base: BaseElement,
    pub name: Option<String>,
    pub source_ref: Option<String>,
    pub target_ref: Option<String>,
    pub message_ref: Option<String>,
}

/// A top-level scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub base: BaseElement,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub executable: bool,
    pub candidate_starter_users: Vec<String>,
    pub candidate_starter_groups: Vec<String>,
    pub execution_listeners: Vec<Listener>,
    pub event_listeners: Vec<EventListener>,
    pub lanes: Vec<Lane>,
    pub io_specification: Option<IoSpecification>,
    pub container: FlowElementsContainer,
}

impl Process {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            base: BaseElement::new(id),
            name: None,
            documentation: None,
            executable: true,
            candidate_starter_users: Vec::new(),
            candidate_starter_groups: Vec::new(),
            execution_listeners: Vec::new(),
            event_listeners: Vec::new(),
            lanes: Vec::new(),
            io_specification: None,
            container: FlowElementsContainer::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }
}

impl Default for Process {
    fn default() -> Self {
        Self::new("")
    }
}
