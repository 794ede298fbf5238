//! Model to document: the `definitions` root, the root-level declarations,
//! the collaboration, every process scope, and the diagram.
//!
//! ```text
//! definitions
//! ├── import*, extensionElements?
//! ├── itemDefinition*, resource*, signal*, message*, error*, dataStore*, interface*
//! ├── collaboration?   participant*, messageFlow*, global artifacts
//! ├── process*         laneSet?, ioSpecification?, flow elements, artifacts
//! └── bpmndi:BPMNDiagram?
//! ```

use super::ConvertError;
use super::child::listener::{write_event_listeners, write_listeners};
use super::child::{LazyExtensions, write_carrier_elements, write_custom_attributes};
use super::child::io::write_io_specification;
use super::constants::{
    COLLABORATION_ID, DEFAULT_TARGET_NAMESPACE, EXPRESSION_LANGUAGE, STANDARD_NAMESPACES,
    TYPE_LANGUAGE, namespace, prefix, vendor,
};
use super::registry::ConverterRegistry;
use super::writer::{XmlEmitter, optional_attribute, text_element};
use crate::model::{
    BpmnModel, ElementRef, FlowElementsContainer, GraphicInfo, Interface, Process,
};

/// Read-only state handed to converters while writing.
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
    pub model: &'a BpmnModel,
    pub registry: &'a ConverterRegistry,
}

impl<'a> WriteContext<'a> {
    pub fn new(model: &'a BpmnModel, registry: &'a ConverterRegistry) -> Self {
        Self { model, registry }
    }

    /// Writes one element with the converter registered for its kind.
    pub fn write_element(&self, element: ElementRef<'_>, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
        self.registry.for_kind(element.kind())?.write(element, self, w)
    }

    /// Writes a scope: flow elements first, then artifacts, each in insertion
    /// order.
    pub fn write_scope(&self, container: &FlowElementsContainer, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
        for element in container.flow_elements.values() {
            self.write_element(ElementRef::Flow(element), w)?;
        }
        for artifact in container.artifacts.values() {
            self.write_element(ElementRef::Artifact(artifact), w)?;
        }
        Ok(())
    }

    /// Whether `id` names a sequence flow anywhere in the model.
    pub fn is_sequence_flow(&self, id: &str) -> bool {
        self.model
            .get_flow_element(id)
            .is_some_and(|element| element.as_sequence_flow().is_some())
    }
}

fn is_standard_prefix(candidate: &str) -> bool {
    STANDARD_NAMESPACES.iter().any(|(p, _)| *p == candidate)
}

fn has_collaboration(model: &BpmnModel) -> bool {
    !model.pools.is_empty() || !model.message_flows.is_empty() || !model.global_artifacts.is_empty()
}

/// Writes the whole document, declaration included.
pub fn write_document(
    model: &BpmnModel,
    registry: &ConverterRegistry,
    encoding: &str,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    let ctx = WriteContext::new(model, registry);

    w.write_declaration(encoding)?;
    write_definitions_start(model, w)?;

    for import in &model.imports {
        w.start_element("import")?;
        optional_attribute(w, "importType", import.import_type.as_deref())?;
        optional_attribute(w, "location", import.location.as_deref())?;
        optional_attribute(w, "namespace", import.namespace.as_deref())?;
        w.end_element()?;
    }

    let mut extensions = LazyExtensions::default();
    write_carrier_elements(&model.definitions, model, w, &mut extensions)?;
    extensions.close(w)?;

    write_root_declarations(model, w)?;

    if has_collaboration(model) {
        write_collaboration(&ctx, w)?;
    }
    for process in &model.processes {
        write_process(&ctx, process, w)?;
    }
    write_diagram(model, w)?;

    w.end_element()
}

fn write_definitions_start(model: &BpmnModel, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element("definitions")?;
    w.attribute("xmlns", namespace::BPMN)?;
    for (p, uri) in STANDARD_NAMESPACES {
        w.attribute(&format!("xmlns:{p}"), uri)?;
    }
    for (p, uri) in &model.namespaces {
        if p.is_empty() || p == "xml" || is_standard_prefix(p) {
            continue;
        }
        w.attribute(&format!("xmlns:{p}"), uri)?;
    }
    w.attribute("typeLanguage", TYPE_LANGUAGE)?;
    w.attribute("expressionLanguage", EXPRESSION_LANGUAGE)?;
    let target = model
        .target_namespace
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TARGET_NAMESPACE);
    w.attribute("targetNamespace", target)?;
    write_custom_attributes(&model.definitions.attributes, model, w, &mut Vec::new())
}

fn write_root_declarations(model: &BpmnModel, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    for (id, item) in &model.item_definitions {
        w.start_element("itemDefinition")?;
        w.attribute("id", id)?;
        optional_attribute(w, "structureRef", item.structure_ref.as_deref())?;
        optional_attribute(w, "itemKind", item.item_kind.as_deref())?;
        w.end_element()?;
    }
    for resource in model.resources.values() {
        w.start_element("resource")?;
        w.attribute("id", &resource.id)?;
        optional_attribute(w, "name", resource.name.as_deref())?;
        w.end_element()?;
    }
    for signal in model.signals.values() {
        w.start_element("signal")?;
        w.attribute("id", &signal.id)?;
        optional_attribute(w, "name", signal.name.as_deref())?;
        optional_attribute(w, &vendor("scope"), signal.scope.as_deref())?;
        w.end_element()?;
    }
    for message in model.messages.values() {
        w.start_element("message")?;
        w.attribute("id", &message.id)?;
        optional_attribute(w, "name", message.name.as_deref())?;
        optional_attribute(w, "itemRef", message.item_ref.as_deref())?;
        w.end_element()?;
    }
    for error in model.errors.values() {
        w.start_element("error")?;
        w.attribute("id", &error.id)?;
        optional_attribute(w, "name", error.name.as_deref())?;
        optional_attribute(w, "errorCode", error.error_code.as_deref())?;
        w.end_element()?;
    }
    for store in model.data_stores.values() {
        w.start_element("dataStore")?;
        w.attribute("id", &store.id)?;
        optional_attribute(w, "name", store.name.as_deref())?;
        optional_attribute(w, "itemSubjectRef", store.item_subject_ref.as_deref())?;
        if let Some(state) = store.data_state.as_deref() {
            w.start_element("dataState")?;
            w.attribute("name", state)?;
            w.end_element()?;
        }
        w.end_element()?;
    }
    for interface in &model.interfaces {
        write_interface(interface, w)?;
    }
    Ok(())
}

fn write_interface(interface: &Interface, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element("interface")?;
    w.attribute("id", &interface.id)?;
    optional_attribute(w, "name", interface.name.as_deref())?;
    optional_attribute(w, "implementationRef", interface.implementation_ref.as_deref())?;
    for operation in &interface.operations {
        w.start_element("operation")?;
        w.attribute("id", &operation.id)?;
        optional_attribute(w, "name", operation.name.as_deref())?;
        optional_attribute(w, "implementationRef", operation.implementation_ref.as_deref())?;
        if let Some(reference) = operation.in_message_ref.as_deref() {
            text_element(w, "inMessageRef", reference)?;
        }
        if let Some(reference) = operation.out_message_ref.as_deref() {
            text_element(w, "outMessageRef", reference)?;
        }
        for reference in &operation.error_message_refs {
            text_element(w, "errorRef", reference)?;
        }
        w.end_element()?;
    }
    w.end_element()
}

fn write_collaboration(ctx: &WriteContext<'_>, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    let model = ctx.model;
    w.start_element("collaboration")?;
    w.attribute("id", COLLABORATION_ID)?;
    for pool in &model.pools {
        w.start_element("participant")?;
        w.attribute("id", &pool.base.id)?;
        optional_attribute(w, "name", pool.name.as_deref())?;
        optional_attribute(w, "processRef", pool.process_ref.as_deref())?;
        write_custom_attributes(&pool.base.extensions.attributes, model, w, &mut Vec::new())?;
        w.end_element()?;
    }
    for flow in model.message_flows.values() {
        w.start_element("messageFlow")?;
        w.attribute("id", &flow.base.id)?;
        optional_attribute(w, "name", flow.name.as_deref())?;
        optional_attribute(w, "sourceRef", flow.source_ref.as_deref())?;
        optional_attribute(w, "targetRef", flow.target_ref.as_deref())?;
        optional_attribute(w, "messageRef", flow.message_ref.as_deref())?;
        write_custom_attributes(&flow.base.extensions.attributes, model, w, &mut Vec::new())?;
        w.end_element()?;
    }
    for artifact in &model.global_artifacts {
        ctx.write_element(ElementRef::Artifact(artifact), w)?;
    }
    w.end_element()
}

fn write_process(ctx: &WriteContext<'_>, process: &Process, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    let model = ctx.model;
    w.start_element("process")?;
    w.attribute("id", process.id())?;
    optional_attribute(w, "name", process.name.as_deref())?;
    w.attribute("isExecutable", if process.executable { "true" } else { "false" })?;
    if !process.candidate_starter_users.is_empty() {
        w.attribute(&vendor("candidateStarterUsers"), &process.candidate_starter_users.join(","))?;
    }
    if !process.candidate_starter_groups.is_empty() {
        w.attribute(&vendor("candidateStarterGroups"), &process.candidate_starter_groups.join(","))?;
    }
    write_custom_attributes(&process.base.extensions.attributes, model, w, &mut Vec::new())?;

    if let Some(documentation) = process.documentation.as_deref().filter(|d| !d.is_empty()) {
        text_element(w, "documentation", documentation)?;
    }

    let mut extensions = LazyExtensions::default();
    write_listeners("executionListener", &process.execution_listeners, w, &mut extensions)?;
    write_event_listeners(&process.event_listeners, w, &mut extensions)?;
    write_carrier_elements(&process.base.extensions, model, w, &mut extensions)?;
    extensions.close(w)?;

    if !process.lanes.is_empty() {
        w.start_element("laneSet")?;
        w.attribute("id", &format!("laneSet_{}", process.id()))?;
        for lane in &process.lanes {
            w.start_element("lane")?;
            w.attribute("id", &lane.id)?;
            optional_attribute(w, "name", lane.name.as_deref())?;
            for reference in &lane.flow_references {
                text_element(w, "flowNodeRef", reference)?;
            }
            w.end_element()?;
        }
        w.end_element()?;
    }

    if let Some(specification) = &process.io_specification {
        write_io_specification(specification, w)?;
    }

    ctx.write_scope(&process.container, w)?;
    w.end_element()
}

fn number(value: f64) -> String {
    format!("{value:?}")
}

fn write_bounds(info: &GraphicInfo, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element(&format!("{}:Bounds", prefix::OMGDC))?;
    w.attribute("height", &number(info.height))?;
    w.attribute("width", &number(info.width))?;
    w.attribute("x", &number(info.x))?;
    w.attribute("y", &number(info.y))?;
    w.end_element()
}

fn write_label(model: &BpmnModel, id: &str, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    if let Some(label) = model.label_location_map.get(id) {
        w.start_element(&format!("{}:BPMNLabel", prefix::BPMNDI))?;
        write_bounds(label, w)?;
        w.end_element()?;
    }
    Ok(())
}

fn write_diagram(model: &BpmnModel, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    if model.location_map.is_empty() && model.flow_location_map.is_empty() {
        return Ok(());
    }
    let plane = if has_collaboration(model) {
        COLLABORATION_ID
    } else {
        match model.main_process() {
            Some(process) => process.id(),
            None => {
                tracing::debug!("diagram information without a process or collaboration, not written");
                return Ok(());
            }
        }
    };

    w.start_element(&format!("{}:BPMNDiagram", prefix::BPMNDI))?;
    w.attribute("id", &format!("BPMNDiagram_{plane}"))?;
    w.start_element(&format!("{}:BPMNPlane", prefix::BPMNDI))?;
    w.attribute("bpmnElement", plane)?;
    w.attribute("id", &format!("BPMNPlane_{plane}"))?;

    for (id, info) in &model.location_map {
        w.start_element(&format!("{}:BPMNShape", prefix::BPMNDI))?;
        w.attribute("bpmnElement", id)?;
        w.attribute("id", &format!("BPMNShape_{id}"))?;
        if let Some(expanded) = info.expanded {
            w.attribute("isExpanded", if expanded { "true" } else { "false" })?;
        }
        write_bounds(info, w)?;
        write_label(model, id, w)?;
        w.end_element()?;
    }

    for (id, waypoints) in &model.flow_location_map {
        w.start_element(&format!("{}:BPMNEdge", prefix::BPMNDI))?;
        w.attribute("bpmnElement", id)?;
        w.attribute("id", &format!("BPMNEdge_{id}"))?;
        for point in waypoints {
            w.start_element(&format!("{}:waypoint", prefix::OMGDI))?;
            w.attribute("x", &number(point.x))?;
            w.attribute("y", &number(point.y))?;
            w.end_element()?;
        }
        write_label(model, id, w)?;
        w.end_element()?;
    }

    w.end_element()?;
    w.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::writer::QuickXmlEmitter;
    use crate::model::{Activity, FlowElement, Gateway, GatewayKind, SequenceFlow};

    fn written(model: &BpmnModel) -> String {
        let registry = ConverterRegistry::standard();
        let mut w = QuickXmlEmitter::new();
        write_document(model, &registry, "UTF-8", &mut w).unwrap();
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_default_flow_written_only_for_sequence_flows() {
        let mut process = Process::new("p");
        let mut gateway = Gateway::new("g", GatewayKind::Exclusive);
        gateway.default_flow = Some("f1".to_string());
        let mut task = Activity::new("t");
        task.default_flow = Some("missing".to_string());
        process.container.add_flow_element(FlowElement::Gateway(gateway));
        process.container.add_flow_element(FlowElement::Task(task));
        process
            .container
            .add_flow_element(FlowElement::SequenceFlow(SequenceFlow::new("f1", "g", "t")));
        let mut model = BpmnModel::new();
        model.add_process(process);

        let out = written(&model);
        assert!(out.contains(r#"<exclusiveGateway id="g" default="f1"/>"#));
        assert!(out.contains(r#"<task id="t"/>"#));
    }

    #[test]
    fn test_diagram_plane_uses_first_process() {
        let mut model = BpmnModel::new();
        model.add_process(Process::new("main"));
        model.add_graphic_info("main", GraphicInfo::bounds(10.0, 20.0, 100.0, 80.0));

        let out = written(&model);
        assert!(out.contains(r#"<bpmndi:BPMNPlane bpmnElement="main" id="BPMNPlane_main">"#));
        assert!(out.contains(r#"<omgdc:Bounds height="80.0" width="100.0" x="10.0" y="20.0"/>"#));
        assert!(!out.contains("collaboration"));
    }

    #[test]
    fn test_definitions_root_uses_default_target_namespace() {
        let out = written(&BpmnModel::new());
        assert!(out.starts_with("<?xml"));
        assert!(out.contains(r#"targetNamespace="http://www.activiti.org/test""#));
        assert!(out.contains(r#"xmlns:activiti="http://activiti.org/bpmn""#));
    }
}
