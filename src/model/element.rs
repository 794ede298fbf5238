//! Element identity, the flow-node core, and the closed element sum types.
//!
//! ```text
//! FlowElement
//! ├── SequenceFlow
//! ├── DataObject / DataStoreReference
//! ├── events      StartEvent, EndEvent, BoundaryEvent, ThrowEvent, IntermediateCatchEvent
//! ├── activities  Task, UserTask, ServiceTask, ScriptTask, ..., CallActivity, SubProcess
//! └── Gateway
//! Artifact
//! ├── TextAnnotation
//! └── Association
//! ```

use crate::base::Position;

use super::activity::{
    Activity, BusinessRuleTask, CallActivity, ScriptTask, ServiceTask, SubProcess, SubProcessKind,
    UserTask,
};
use super::data::{DataObjectKind, DataStoreReference, ValuedDataObject};
use super::event::{BoundaryEvent, Event, StartEvent};
use super::extension::ExtensionCarrier;
use super::flow::{Gateway, GatewayKind, SequenceFlow};
use super::listener::Listener;

// ============================================================================
// BASE
// ============================================================================

/// Identity, source position and extension content shared by every element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseElement {
    /// Empty until assigned.
    pub id: String,
    pub position: Option<Position>,
    pub extensions: ExtensionCarrier,
}

impl BaseElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Fields common to every node that sequence flows can connect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowNode {
    pub base: BaseElement,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub execution_listeners: Vec<Listener>,
    pub asynchronous: bool,
    pub not_exclusive: bool,
    /// Sequence flow ids, populated only by the linker.
    pub incoming: Vec<String>,
    /// Sequence flow ids, populated only by the linker.
    pub outgoing: Vec<String>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            base: BaseElement::new(id),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// ELEMENT KINDS
// ============================================================================

/// The concrete kind of an element, used as the write-side registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    SequenceFlow,

    // Data
    StringDataObject,
    BooleanDataObject,
    IntegerDataObject,
    LongDataObject,
    DoubleDataObject,
    DateDataObject,
    DataStoreReference,

    // Events
    StartEvent,
    VendorStartEvent,
    EndEvent,
    BoundaryEvent,
    ThrowEvent,
    IntermediateCatchEvent,

    // Activities
    Task,
    UserTask,
    VendorUserTask,
    ServiceTask,
    ScriptTask,
    BusinessRuleTask,
    ManualTask,
    ReceiveTask,
    SendTask,
    CallActivity,
    SubProcess,
    Transaction,
    AdhocSubProcess,
    EventSubProcess,

    // Gateways
    ExclusiveGateway,
    InclusiveGateway,
    ParallelGateway,
    EventGateway,

    // Artifacts
    TextAnnotation,
    Association,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SequenceFlow => "SequenceFlow",
            Self::StringDataObject => "StringDataObject",
            Self::BooleanDataObject => "BooleanDataObject",
            Self::IntegerDataObject => "IntegerDataObject",
            Self::LongDataObject => "LongDataObject",
            Self::DoubleDataObject => "DoubleDataObject",
            Self::DateDataObject => "DateDataObject",
            Self::DataStoreReference => "DataStoreReference",
            Self::StartEvent => "StartEvent",
            Self::VendorStartEvent => "VendorStartEvent",
            Self::EndEvent => "EndEvent",
            Self::BoundaryEvent => "BoundaryEvent",
            Self::ThrowEvent => "ThrowEvent",
            Self::IntermediateCatchEvent => "IntermediateCatchEvent",
            Self::Task => "Task",
            Self::UserTask => "UserTask",
            Self::VendorUserTask => "VendorUserTask",
            Self::ServiceTask => "ServiceTask",
            Self::ScriptTask => "ScriptTask",
            Self::BusinessRuleTask => "BusinessRuleTask",
            Self::ManualTask => "ManualTask",
            Self::ReceiveTask => "ReceiveTask",
            Self::SendTask => "SendTask",
            Self::CallActivity => "CallActivity",
            Self::SubProcess => "SubProcess",
            Self::Transaction => "Transaction",
            Self::AdhocSubProcess => "AdhocSubProcess",
            Self::EventSubProcess => "EventSubProcess",
            Self::ExclusiveGateway => "ExclusiveGateway",
            Self::InclusiveGateway => "InclusiveGateway",
            Self::ParallelGateway => "ParallelGateway",
            Self::EventGateway => "EventGateway",
            Self::TextAnnotation => "TextAnnotation",
            Self::Association => "Association",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FLOW ELEMENTS
// ============================================================================

/// Anything a process or sub-process scope holds in its id map.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowElement {
    SequenceFlow(SequenceFlow),
    DataObject(ValuedDataObject),
    DataStoreReference(DataStoreReference),
    StartEvent(StartEvent),
    EndEvent(Event),
    BoundaryEvent(BoundaryEvent),
    ThrowEvent(Event),
    IntermediateCatchEvent(Event),
    Task(Activity),
    UserTask(UserTask),
    ServiceTask(ServiceTask),
    ScriptTask(ScriptTask),
    BusinessRuleTask(BusinessRuleTask),
    ManualTask(Activity),
    ReceiveTask(Activity),
    /// Shares its shape with the service task.
    SendTask(ServiceTask),
    CallActivity(CallActivity),
    SubProcess(SubProcess),
    Gateway(Gateway),
}

impl FlowElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::SequenceFlow(_) => ElementKind::SequenceFlow,
            Self::DataObject(data) => match data.kind {
                DataObjectKind::String => ElementKind::StringDataObject,
                DataObjectKind::Boolean => ElementKind::BooleanDataObject,
                DataObjectKind::Integer => ElementKind::IntegerDataObject,
                DataObjectKind::Long => ElementKind::LongDataObject,
                DataObjectKind::Double => ElementKind::DoubleDataObject,
                DataObjectKind::Date => ElementKind::DateDataObject,
            },
            Self::DataStoreReference(_) => ElementKind::DataStoreReference,
            Self::StartEvent(start) if start.vendor.is_some() => ElementKind::VendorStartEvent,
            Self::StartEvent(_) => ElementKind::StartEvent,
            Self::EndEvent(_) => ElementKind::EndEvent,
            Self::BoundaryEvent(_) => ElementKind::BoundaryEvent,
            Self::ThrowEvent(_) => ElementKind::ThrowEvent,
            Self::IntermediateCatchEvent(_) => ElementKind::IntermediateCatchEvent,
            Self::Task(_) => ElementKind::Task,
            Self::UserTask(task) if task.vendor.is_some() => ElementKind::VendorUserTask,
            Self::UserTask(_) => ElementKind::UserTask,
            Self::ServiceTask(_) => ElementKind::ServiceTask,
            Self::ScriptTask(_) => ElementKind::ScriptTask,
            Self::BusinessRuleTask(_) => ElementKind::BusinessRuleTask,
            Self::ManualTask(_) => ElementKind::ManualTask,
            Self::ReceiveTask(_) => ElementKind::ReceiveTask,
            Self::SendTask(_) => ElementKind::SendTask,
            Self::CallActivity(_) => ElementKind::CallActivity,
            Self::SubProcess(sub) => match sub.kind {
                SubProcessKind::Embedded => ElementKind::SubProcess,
                SubProcessKind::Transaction => ElementKind::Transaction,
                SubProcessKind::AdHoc(_) => ElementKind::AdhocSubProcess,
                SubProcessKind::Event => ElementKind::EventSubProcess,
            },
            Self::Gateway(gateway) => match gateway.kind {
                GatewayKind::Exclusive => ElementKind::ExclusiveGateway,
                GatewayKind::Inclusive => ElementKind::InclusiveGateway,
                GatewayKind::Parallel => ElementKind::ParallelGateway,
                GatewayKind::EventBased => ElementKind::EventGateway,
            },
        }
    }

    pub fn base(&self) -> &BaseElement {
        match self {
            Self::SequenceFlow(flow) => &flow.base,
            Self::DataObject(data) => &data.base,
            Self::DataStoreReference(store) => &store.base,
            Self::StartEvent(e) => &e.event.node.base,
            Self::EndEvent(e) | Self::ThrowEvent(e) | Self::IntermediateCatchEvent(e) => &e.node.base,
            Self::BoundaryEvent(e) => &e.event.node.base,
            Self::Gateway(g) => &g.node.base,
            Self::Task(a) | Self::ManualTask(a) | Self::ReceiveTask(a) => &a.node.base,
            Self::UserTask(t) => &t.activity.node.base,
            Self::ServiceTask(t) | Self::SendTask(t) => &t.activity.node.base,
            Self::ScriptTask(t) => &t.activity.node.base,
            Self::BusinessRuleTask(t) => &t.activity.node.base,
            Self::CallActivity(t) => &t.activity.node.base,
            Self::SubProcess(s) => &s.activity.node.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseElement {
        match self {
            Self::SequenceFlow(flow) => &mut flow.base,
            Self::DataObject(data) => &mut data.base,
            Self::DataStoreReference(store) => &mut store.base,
            Self::StartEvent(e) => &mut e.event.node.base,
            Self::EndEvent(e) | Self::ThrowEvent(e) | Self::IntermediateCatchEvent(e) => {
                &mut e.node.base
            }
            Self::BoundaryEvent(e) => &mut e.event.node.base,
            Self::Gateway(g) => &mut g.node.base,
            Self::Task(a) | Self::ManualTask(a) | Self::ReceiveTask(a) => &mut a.node.base,
            Self::UserTask(t) => &mut t.activity.node.base,
            Self::ServiceTask(t) | Self::SendTask(t) => &mut t.activity.node.base,
            Self::ScriptTask(t) => &mut t.activity.node.base,
            Self::BusinessRuleTask(t) => &mut t.activity.node.base,
            Self::CallActivity(t) => &mut t.activity.node.base,
            Self::SubProcess(s) => &mut s.activity.node.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::SequenceFlow(flow) => flow.name.as_deref(),
            Self::DataObject(data) => data.name.as_deref(),
            Self::DataStoreReference(store) => store.name.as_deref(),
            _ => self.as_flow_node().and_then(|node| node.name.as_deref()),
        }
    }

    pub fn as_flow_node(&self) -> Option<&FlowNode> {
        match self {
            Self::SequenceFlow(_) | Self::DataObject(_) | Self::DataStoreReference(_) => None,
            Self::StartEvent(e) => Some(&e.event.node),
            Self::EndEvent(e) | Self::ThrowEvent(e) | Self::IntermediateCatchEvent(e) => {
                Some(&e.node)
            }
            Self::BoundaryEvent(e) => Some(&e.event.node),
            Self::Gateway(g) => Some(&g.node),
            _ => self.as_activity().map(|activity| &activity.node),
        }
    }

    pub fn as_flow_node_mut(&mut self) -> Option<&mut FlowNode> {
        match self {
            Self::SequenceFlow(_) | Self::DataObject(_) | Self::DataStoreReference(_) => None,
            Self::StartEvent(e) => Some(&mut e.event.node),
            Self::EndEvent(e) | Self::ThrowEvent(e) | Self::IntermediateCatchEvent(e) => {
                Some(&mut e.node)
            }
            Self::BoundaryEvent(e) => Some(&mut e.event.node),
            Self::Gateway(g) => Some(&mut g.node),
            _ => self.as_activity_mut().map(|activity| &mut activity.node),
        }
    }

    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Self::Task(a) | Self::ManualTask(a) | Self::ReceiveTask(a) => Some(a),
            Self::UserTask(t) => Some(&t.activity),
            Self::ServiceTask(t) | Self::SendTask(t) => Some(&t.activity),
            Self::ScriptTask(t) => Some(&t.activity),
            Self::BusinessRuleTask(t) => Some(&t.activity),
            Self::CallActivity(t) => Some(&t.activity),
            Self::SubProcess(s) => Some(&s.activity),
            _ => None,
        }
    }

    pub fn as_activity_mut(&mut self) -> Option<&mut Activity> {
        match self {
            Self::Task(a) | Self::ManualTask(a) | Self::ReceiveTask(a) => Some(a),
            Self::UserTask(t) => Some(&mut t.activity),
            Self::ServiceTask(t) | Self::SendTask(t) => Some(&mut t.activity),
            Self::ScriptTask(t) => Some(&mut t.activity),
            Self::BusinessRuleTask(t) => Some(&mut t.activity),
            Self::CallActivity(t) => Some(&mut t.activity),
            Self::SubProcess(s) => Some(&mut s.activity),
            _ => None,
        }
    }

    pub fn as_sequence_flow(&self) -> Option<&SequenceFlow> {
        match self {
            Self::SequenceFlow(flow) => Some(flow),
            _ => None,
        }
    }

    pub fn as_boundary_event(&self) -> Option<&BoundaryEvent> {
        match self {
            Self::BoundaryEvent(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_sub_process(&self) -> Option<&SubProcess> {
        match self {
            Self::SubProcess(sub) => Some(sub),
            _ => None,
        }
    }

    pub fn as_sub_process_mut(&mut self) -> Option<&mut SubProcess> {
        match self {
            Self::SubProcess(sub) => Some(sub),
            _ => None,
        }
    }

    pub fn as_data_object(&self) -> Option<&ValuedDataObject> {
        match self {
            Self::DataObject(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_flow_node(&self) -> bool {
        self.as_flow_node().is_some()
    }
}

// ============================================================================
// ARTIFACTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAnnotation {
    pub base: BaseElement,
    pub text: Option<String>,
    pub text_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub base: BaseElement,
    pub source_ref: Option<String>,
    pub target_ref: Option<String>,
    pub association_direction: Option<String>,
}

/// Diagram-level annotations held in a scope's artifact list.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    TextAnnotation(TextAnnotation),
    Association(Association),
}

impl Artifact {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::TextAnnotation(_) => ElementKind::TextAnnotation,
            Self::Association(_) => ElementKind::Association,
        }
    }

    pub fn base(&self) -> &BaseElement {
        match self {
            Self::TextAnnotation(annotation) => &annotation.base,
            Self::Association(association) => &association.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }
}

/// An element as produced by a converter, before the driver places it.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Flow(FlowElement),
    Artifact(Artifact),
}

/// A borrowed element handed to a converter for writing.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Flow(&'a FlowElement),
    Artifact(&'a Artifact),
}

impl ElementRef<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Flow(element) => element.kind(),
            Self::Artifact(artifact) => artifact.kind(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Flow(element) => element.id(),
            Self::Artifact(artifact) => artifact.id(),
        }
    }
}
