//! Events and their definitions.

use super::activity::VendorFormExtras;
use super::element::{BaseElement, FlowNode};
use super::listener::FormProperty;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerEventDefinition {
    pub time_date: Option<String>,
    pub time_duration: Option<String>,
    pub time_cycle: Option<String>,
    /// Only meaningful together with `time_cycle`.
    pub end_date: Option<String>,
    pub calendar_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalEventDefinition {
    pub signal_ref: Option<String>,
    pub asynchronous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEventDefinition {
    pub message_ref: Option<String>,
    pub message_expression: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEventDefinition {
    /// Value of `errorRef`.
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminateEventDefinition {
    pub terminate_all: bool,
    pub terminate_multi_instance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensateEventDefinition {
    pub activity_ref: Option<String>,
    pub wait_for_completion: bool,
}

impl Default for CompensateEventDefinition {
    fn default() -> Self {
        Self {
            activity_ref: None,
            wait_for_completion: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDefinitionKind {
    Timer(TimerEventDefinition),
    Signal(SignalEventDefinition),
    Message(MessageEventDefinition),
    Error(ErrorEventDefinition),
    Terminate(TerminateEventDefinition),
    Cancel,
    Compensate(CompensateEventDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    pub base: BaseElement,
    pub kind: EventDefinitionKind,
}

impl EventDefinition {
    pub fn new(kind: EventDefinitionKind) -> Self {
        Self {
            base: BaseElement::default(),
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, EventDefinitionKind::Error(_))
    }
}

impl From<EventDefinitionKind> for EventDefinition {
    fn from(kind: EventDefinitionKind) -> Self {
        Self::new(kind)
    }
}

/// End, intermediate throw and intermediate catch events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub node: FlowNode,
    pub event_definitions: Vec<EventDefinition>,
}

impl Event {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            node: FlowNode::new(id),
            event_definitions: Vec::new(),
        }
    }

    pub fn with_definition(mut self, kind: EventDefinitionKind) -> Self {
        self.event_definitions.push(EventDefinition::new(kind));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartEvent {
    pub event: Event,
    pub initiator: Option<String>,
    pub form_key: Option<String>,
    pub form_properties: Vec<FormProperty>,
    pub interrupting: bool,
    pub vendor: Option<VendorFormExtras>,
}

impl StartEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            event: Event::new(id),
            initiator: None,
            form_key: None,
            form_properties: Vec::new(),
            interrupting: true,
            vendor: None,
        }
    }
}

impl Default for StartEvent {
    fn default() -> Self {
        Self::new("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryEvent {
    pub event: Event,
    /// Id of the activity as parsed.
    pub attached_to_ref_id: Option<String>,
    /// Id of the activity once the linker found it in the same scope.
    pub attached_to_ref: Option<String>,
    pub cancel_activity: bool,
}

impl BoundaryEvent {
    pub fn new(id: impl Into<String>, attached_to: impl Into<String>) -> Self {
        Self {
            event: Event::new(id),
            attached_to_ref_id: Some(attached_to.into()),
            attached_to_ref: None,
            cancel_activity: true,
        }
    }

    /// Exactly one error definition: an error boundary event never cancels.
    pub fn has_single_error_definition(&self) -> bool {
        matches!(self.event.event_definitions.as_slice(), [definition] if definition.is_error())
    }

    pub fn is_cancel_activity(&self) -> bool {
        self.cancel_activity && !self.has_single_error_definition()
    }
}

impl Default for BoundaryEvent {
    fn default() -> Self {
        Self {
            event: Event::default(),
            attached_to_ref_id: None,
            attached_to_ref: None,
            cancel_activity: true,
        }
    }
}
