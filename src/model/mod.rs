//! In-memory BPMN process model.
//!
//! The model is plain data: a typed graph of elements plus diagram metadata,
//! built fresh by every parse and consumed by every write. It has no behavior
//! beyond storage and lookup.
//!
//! ```text
//! BpmnModel
//! ├── processes: Vec<Process>
//! │   └── container: FlowElementsContainer   (id -> FlowElement, id -> Artifact)
//! │       └── SubProcess.container           (nested scope, same shape)
//! ├── pools, message_flows, global_artifacts
//! ├── resources, signals, messages, errors, item_definitions, data_stores   (keyed by id)
//! ├── imports, interfaces
//! ├── namespaces: prefix -> uri, target_namespace
//! ├── location_map, label_location_map, flow_location_map       (diagram)
//! └── user_task_form_types, start_event_form_types               (caller config)
//! ```

pub mod activity;
pub mod container;
pub mod data;
pub mod definitions;
pub mod diagram;
pub mod element;
pub mod event;
pub mod extension;
pub mod flow;
pub mod listener;
pub mod process;

use indexmap::IndexMap;

pub use activity::{
    Activity, AdhocSettings, BusinessRuleTask, CallActivity, MultiInstanceLoopCharacteristics,
    ScriptTask, ServiceTask, SubProcess, SubProcessKind, UserTask, VendorFormExtras,
};
pub use container::FlowElementsContainer;
pub use data::{
    CoercionError, DataObjectKind, DataSpec, DataStoreReference, DataValue, IoSpecification,
    ItemDefinition, ValuedDataObject,
};
pub use definitions::{
    BpmnError, DataStore, Import, Interface, Message, Operation, Resource, Signal,
};
pub use diagram::GraphicInfo;
pub use element::{
    Artifact, Association, BaseElement, Element, ElementKind, ElementRef, FlowElement, FlowNode,
    TextAnnotation,
};
pub use event::{
    BoundaryEvent, CompensateEventDefinition, ErrorEventDefinition, Event, EventDefinition,
    EventDefinitionKind, MessageEventDefinition, SignalEventDefinition, StartEvent,
    TerminateEventDefinition, TimerEventDefinition,
};
pub use extension::{ExtensionAttribute, ExtensionCarrier, ExtensionElement};
pub use flow::{Gateway, GatewayKind, SequenceFlow};
pub use listener::{
    EventListener, FieldExtension, FormProperty, FormValue, Implementation, IoParameter, Listener,
};
pub use process::{Lane, MessageFlow, Pool, Process};

/// The root of a converted document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BpmnModel {
    pub processes: Vec<Process>,
    pub pools: Vec<Pool>,
    pub message_flows: IndexMap<String, MessageFlow>,
    /// Artifacts declared outside any process.
    pub global_artifacts: Vec<Artifact>,
    pub resources: IndexMap<String, Resource>,
    pub signals: IndexMap<String, Signal>,
    pub messages: IndexMap<String, Message>,
    pub errors: IndexMap<String, BpmnError>,
    pub item_definitions: IndexMap<String, ItemDefinition>,
    pub data_stores: IndexMap<String, DataStore>,
    pub imports: Vec<Import>,
    pub interfaces: Vec<Interface>,
    /// Prefix -> namespace URI, as declared on the document root.
    pub namespaces: IndexMap<String, String>,
    pub target_namespace: Option<String>,
    /// Unknown attributes and extension elements of the document root.
    pub definitions: ExtensionCarrier,
    pub location_map: IndexMap<String, GraphicInfo>,
    pub label_location_map: IndexMap<String, GraphicInfo>,
    pub flow_location_map: IndexMap<String, Vec<GraphicInfo>>,
    /// Form keys that select the vendor user task variant.
    pub user_task_form_types: Vec<String>,
    /// Form keys that select the vendor start event variant.
    pub start_event_form_types: Vec<String>,
}

impl BpmnModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&mut self, process: Process) {
        self.processes.push(process);
    }

    /// The first process, which names the diagram when there is no collaboration.
    pub fn main_process(&self) -> Option<&Process> {
        self.processes.first()
    }

    pub fn get_process(&self, id: &str) -> Option<&Process> {
        self.processes.iter().find(|process| process.id() == id)
    }

    pub fn get_process_mut(&mut self, id: &str) -> Option<&mut Process> {
        self.processes.iter_mut().find(|process| process.id() == id)
    }

    /// Looks an id up across all processes and their nested scopes.
    pub fn get_flow_element(&self, id: &str) -> Option<&FlowElement> {
        self.processes
            .iter()
            .find_map(|process| process.container.find_flow_element(id))
    }

    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn add_graphic_info(&mut self, id: impl Into<String>, info: GraphicInfo) {
        self.location_map.insert(id.into(), info);
    }

    pub fn add_label_graphic_info(&mut self, id: impl Into<String>, info: GraphicInfo) {
        self.label_location_map.insert(id.into(), info);
    }

    pub fn add_flow_graphic_info(&mut self, id: impl Into<String>, waypoints: Vec<GraphicInfo>) {
        self.flow_location_map.insert(id.into(), waypoints);
    }

    pub fn graphic_info(&self, id: &str) -> Option<&GraphicInfo> {
        self.location_map.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_element_lookup_across_processes() {
        let mut first = Process::new("p1");
        first
            .container
            .add_flow_element(FlowElement::Task(Activity::new("a")));
        let mut second = Process::new("p2");
        second
            .container
            .add_flow_element(FlowElement::Task(Activity::new("b")));

        let mut model = BpmnModel::new();
        model.add_process(first);
        model.add_process(second);

        assert!(model.get_flow_element("b").is_some());
        assert!(model.get_flow_element("c").is_none());
        assert_eq!(model.main_process().map(Process::id), Some("p1"));
    }
}
