//! Sequence flows and gateways.

use super::element::{BaseElement, FlowNode};
use super::listener::Listener;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceFlow {
    pub base: BaseElement,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub execution_listeners: Vec<Listener>,
    pub source_ref: String,
    pub target_ref: String,
    pub condition_expression: Option<String>,
    pub skip_expression: Option<String>,
    /// Source node id once the linker resolved `source_ref` in this scope.
    pub resolved_source: Option<String>,
    /// Target node id once the linker resolved `target_ref` in this scope.
    pub resolved_target: Option<String>,
}

impl SequenceFlow {
    pub fn new(id: impl Into<String>, source_ref: impl Into<String>, target_ref: impl Into<String>) -> Self {
        Self {
            base: BaseElement::new(id),
            source_ref: source_ref.into(),
            target_ref: target_ref.into(),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition_expression = Some(condition.into());
        self
    }

    pub fn is_linked(&self) -> bool {
        self.resolved_source.is_some() && self.resolved_target.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GatewayKind {
    #[default]
    Exclusive,
    Inclusive,
    Parallel,
    EventBased,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gateway {
    pub node: FlowNode,
    pub kind: GatewayKind,
    /// Id of the default sequence flow; written only while it still names one.
    pub default_flow: Option<String>,
}

impl Gateway {
    pub fn new(id: impl Into<String>, kind: GatewayKind) -> Self {
        Self {
            node: FlowNode::new(id),
            kind,
            default_flow: None,
        }
    }
}
