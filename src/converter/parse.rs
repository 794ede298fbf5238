//! Document driver: one forward pass over the token stream.
//!
//! The driver walks the structural levels itself (the `definitions` root,
//! collaboration, processes, lane sets, sub-process scopes and the diagram
//! plane) and hands every other element to a dedicated sub-parser or to the
//! converter registered for its tag. Each sub-parser consumes its element
//! whole, so every end tag the driver sees closes one of its own frames.
//!
//! Sub-process scopes are an explicit stack: a scope is pushed on its start
//! tag, receives the elements that follow, and is popped into its parent on
//! the matching end tag.

use super::ConvertError;
use super::base::finish_flow_node_extensions;
use super::child::identity::{formal_expression, parse_assignment};
use super::child::io::read_io_specification;
use super::child::listener::{read_event_listener, read_listeners};
use super::child::multi_instance::read_multi_instance;
use super::child::{ExtensionBlock, KnownAttributes, collect_custom_attributes};
use super::constants::namespace;
use super::elements::read_sub_process_start;
use super::options::ConverterOptions;
use super::registry::{ConverterRegistry, ParseContext};
use super::stream::{StartTag, XmlStream, XmlToken, parse_flag, split_list};
use crate::model::{
    Artifact, BaseElement, BpmnError, BpmnModel, DataStore, Element, ExtensionAttribute,
    ExtensionElement, FlowElement, GraphicInfo, Import, Interface, ItemDefinition, Lane, Message,
    MessageFlow, Operation, Pool, Process, Resource, Signal, SubProcess, SubProcessKind,
};

/// A structural level the driver is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Definitions,
    Process,
    SubProcess,
    /// Wrapper with no model counterpart: collaboration, laneSet, diagram.
    PassThrough,
}

const PROCESS_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["isExecutable"],
    vendor: &["candidateStarterUsers", "candidateStarterGroups"],
};

const PARTICIPANT_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["processRef"],
    vendor: &[],
};

const MESSAGE_FLOW_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["sourceRef", "targetRef", "messageRef"],
    vendor: &[],
};

/// Root attributes with a fixed value on write.
const DEFINITIONS_ATTRIBUTES: [&str; 3] = ["targetNamespace", "typeLanguage", "expressionLanguage"];

/// Parses a decoded document into an unlinked model.
pub fn parse_document(
    text: &str,
    registry: &ConverterRegistry,
    options: &ConverterOptions,
) -> Result<BpmnModel, ConvertError> {
    let mut stream = XmlStream::new(text);
    let mut driver = DocumentDriver::new(registry, options);
    loop {
        match stream.next_token()? {
            XmlToken::Start(tag) => driver.start(&mut stream, &tag)?,
            XmlToken::End => driver.end(&stream)?,
            XmlToken::Text(_) | XmlToken::CData(_) => {}
            XmlToken::Eof => break,
        }
    }
    if !driver.frames.is_empty() {
        return Err(ConvertError::stream(
            "unexpected end of document",
            stream.position(),
        ));
    }
    Ok(driver.model)
}

struct DocumentDriver<'r> {
    registry: &'r ConverterRegistry,
    model: BpmnModel,
    active_process: Option<Process>,
    scopes: Vec<SubProcess>,
    frames: Vec<Frame>,
}

impl<'r> DocumentDriver<'r> {
    fn new(registry: &'r ConverterRegistry, options: &ConverterOptions) -> Self {
        let model = BpmnModel {
            user_task_form_types: options.user_task_form_types.clone(),
            start_event_form_types: options.start_event_form_types.clone(),
            ..BpmnModel::default()
        };
        Self {
            registry,
            model,
            active_process: None,
            scopes: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// The innermost frame that owns model content.
    fn owner(&self) -> Option<Frame> {
        self.frames
            .iter()
            .rev()
            .copied()
            .find(|frame| *frame != Frame::PassThrough)
    }

    fn start(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<(), ConvertError> {
        if tag.in_namespace(namespace::BPMNDI) {
            return self.start_diagram(stream, tag);
        }
        let Some(name) = tag.bpmn_name() else {
            tracing::trace!(tag = %tag.local_name, at = %tag.position, "skipping foreign element");
            return stream.skip_element(tag);
        };

        match name {
            "definitions" => {
                self.read_definitions(tag);
                self.frames.push(Frame::Definitions);
            }
            "collaboration" | "laneSet" => self.frames.push(Frame::PassThrough),
            "process" => {
                self.start_process(tag);
                self.frames.push(Frame::Process);
            }
            "subProcess" | "transaction" | "adHocSubProcess" => {
                self.scopes.push(read_sub_process_start(tag));
                self.frames.push(Frame::SubProcess);
            }
            "import" => {
                self.model.imports.push(Import {
                    import_type: tag.attr_string("importType"),
                    location: tag.attr_string("location"),
                    namespace: tag.attr_string("namespace"),
                });
                stream.skip_element(tag)?;
            }
            "itemDefinition" => {
                let item = ItemDefinition {
                    id: tag.attr_string("id"),
                    structure_ref: tag.attr_string("structureRef"),
                    item_kind: tag.attr_string("itemKind"),
                };
                self.model.item_definitions.insert(tag.id(), item);
                stream.skip_element(tag)?;
            }
            "resource" => {
                let resource = Resource {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                };
                self.model.resources.insert(resource.id.clone(), resource);
                stream.skip_element(tag)?;
            }
            "signal" => {
                let signal = Signal {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                    scope: tag.vendor_attr_string("scope"),
                };
                self.model.signals.insert(signal.id.clone(), signal);
                stream.skip_element(tag)?;
            }
            "message" => {
                let message = Message {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                    item_ref: tag.attr_string("itemRef"),
                };
                self.model.messages.insert(message.id.clone(), message);
                stream.skip_element(tag)?;
            }
            "error" => {
                let error = BpmnError {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                    error_code: tag.attr_string("errorCode"),
                };
                self.model.errors.insert(error.id.clone(), error);
                stream.skip_element(tag)?;
            }
            "dataStore" => {
                let tree = stream.read_subtree(tag)?;
                let store = DataStore {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                    item_subject_ref: tag.attr_string("itemSubjectRef"),
                    data_state: tree
                        .first_child("dataState")
                        .and_then(|state| plain_attr(state, "name")),
                };
                self.model.data_stores.insert(store.id.clone(), store);
            }
            "interface" => {
                let tree = stream.read_subtree(tag)?;
                self.model.interfaces.push(read_interface(&tree));
            }
            "participant" => {
                let mut pool = Pool {
                    base: base_of(tag),
                    name: tag.attr_string("name"),
                    process_ref: tag.attr_string("processRef"),
                };
                collect_custom_attributes(tag, &PARTICIPANT_ATTRIBUTES, &mut pool.base.extensions);
                self.model.pools.push(pool);
                stream.skip_element(tag)?;
            }
            "messageFlow" => {
                let mut flow = MessageFlow {
                    base: base_of(tag),
                    name: tag.attr_string("name"),
                    source_ref: tag.attr_string("sourceRef"),
                    target_ref: tag.attr_string("targetRef"),
                    message_ref: tag.attr_string("messageRef"),
                };
                collect_custom_attributes(tag, &MESSAGE_FLOW_ATTRIBUTES, &mut flow.base.extensions);
                self.model.message_flows.insert(flow.base.id.clone(), flow);
                stream.skip_element(tag)?;
            }
            "potentialStarter" => {
                let tree = stream.read_subtree(tag)?;
                let assignment = formal_expression(&tree).map(parse_assignment).unwrap_or_default();
                match self.active_process.as_mut() {
                    Some(process) => {
                        process.candidate_starter_users.extend(assignment.users);
                        process.candidate_starter_groups.extend(assignment.groups);
                    }
                    None => tracing::debug!(at = %tag.position, "potentialStarter outside a process, ignored"),
                }
            }
            "lane" => {
                let tree = stream.read_subtree(tag)?;
                let lane = Lane {
                    id: tag.id(),
                    name: tag.attr_string("name"),
                    flow_references: tree
                        .child_elements
                        .get("flowNodeRef")
                        .into_iter()
                        .flatten()
                        .filter_map(|reference| reference.element_text.clone())
                        .collect(),
                };
                match self.active_process.as_mut() {
                    Some(process) => process.lanes.push(lane),
                    None => tracing::debug!(lane = %lane.id, "lane outside a process, ignored"),
                }
            }
            "documentation" => self.read_documentation(stream, tag)?,
            "extensionElements" => self.read_extensions(stream, tag)?,
            "ioSpecification" => self.read_io_specification(stream, tag)?,
            "multiInstanceLoopCharacteristics" => {
                let tree = stream.read_subtree(tag)?;
                match self.scope_child() {
                    Some(sub) => sub.activity.loop_characteristics = Some(read_multi_instance(&tree)),
                    None => tracing::trace!(at = %tag.position, "multi-instance outside a sub-process, ignored"),
                }
            }
            "completionCondition" => {
                let condition = stream.read_trimmed_text(tag)?;
                match self.scope_child().map(|sub| &mut sub.kind) {
                    Some(SubProcessKind::AdHoc(settings)) => settings.completion_condition = condition,
                    _ => tracing::trace!(at = %tag.position, "completionCondition outside an ad-hoc sub-process, ignored"),
                }
            }
            _ => self.dispatch(stream, tag, name)?,
        }
        Ok(())
    }

    fn end(&mut self, stream: &XmlStream<'_>) -> Result<(), ConvertError> {
        match self.frames.pop() {
            Some(Frame::Process) => {
                if let Some(process) = self.active_process.take() {
                    self.model.add_process(process);
                }
            }
            Some(Frame::SubProcess) => {
                if let Some(sub) = self.scopes.pop() {
                    self.place(Element::Flow(FlowElement::SubProcess(sub)));
                }
            }
            Some(Frame::Definitions | Frame::PassThrough) => {}
            None => {
                return Err(ConvertError::stream("end tag without matching start tag", stream.position()));
            }
        }
        Ok(())
    }

    /// The open sub-process, when the current element is its direct child.
    fn scope_child(&mut self) -> Option<&mut SubProcess> {
        match self.frames.last() {
            Some(Frame::SubProcess) => self.scopes.last_mut(),
            _ => None,
        }
    }

    fn dispatch(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag, name: &str) -> Result<(), ConvertError> {
        let registry = self.registry;
        let Some(converter) = registry.for_tag(name) else {
            tracing::trace!(tag = %name, at = %tag.position, "no converter for element, skipped");
            return stream.skip_element(tag);
        };
        let parsed = converter.parse(stream, tag, &ParseContext { model: &self.model })?;
        if let Some(element) = parsed {
            self.place(element);
        }
        Ok(())
    }

    /// Adds an element to the innermost open scope.
    fn place(&mut self, element: Element) {
        let container = match self.scopes.last_mut() {
            Some(sub) => Some(&mut sub.container),
            None => self.active_process.as_mut().map(|process| &mut process.container),
        };
        match (element, container) {
            (Element::Flow(flow), Some(container)) => container.add_flow_element(flow),
            (Element::Artifact(artifact), Some(container)) => container.add_artifact(artifact),
            (Element::Artifact(artifact), None) => self.model.global_artifacts.push(artifact),
            (Element::Flow(flow), None) => {
                tracing::warn!(id = %flow.id(), kind = %flow.kind(), "flow element outside any process, dropped");
            }
        }
    }

    // ------------------------------------------------------------------------
    // definitions and process
    // ------------------------------------------------------------------------

    fn read_definitions(&mut self, tag: &StartTag) {
        self.model.target_namespace = tag.attr_string("targetNamespace");
        for (prefix, uri) in &tag.namespace_declarations {
            if !prefix.is_empty() {
                self.model.add_namespace(prefix.clone(), uri.clone());
            }
        }
        for attr in &tag.attributes {
            if attr.namespace.is_none() && DEFINITIONS_ATTRIBUTES.contains(&attr.local_name.as_str()) {
                continue;
            }
            self.model.definitions.add_attribute(ExtensionAttribute {
                name: attr.local_name.clone(),
                value: attr.value.clone(),
                namespace: attr.namespace.clone(),
                namespace_prefix: attr.prefix.clone(),
            });
        }
    }

    fn start_process(&mut self, tag: &StartTag) {
        if let Some(previous) = self.active_process.take() {
            self.model.add_process(previous);
        }
        let mut process = Process::new(tag.id());
        process.base.position = Some(tag.position);
        process.name = tag.attr_string("name");
        process.executable = tag.attr("isExecutable").and_then(parse_flag).unwrap_or(true);
        process.candidate_starter_users = tag
            .vendor_attr("candidateStarterUsers")
            .map(split_list)
            .unwrap_or_default();
        process.candidate_starter_groups = tag
            .vendor_attr("candidateStarterGroups")
            .map(split_list)
            .unwrap_or_default();
        collect_custom_attributes(tag, &PROCESS_ATTRIBUTES, &mut process.base.extensions);
        self.active_process = Some(process);
    }

    fn read_documentation(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<(), ConvertError> {
        let text = stream.read_trimmed_text(tag)?;
        match self.owner() {
            Some(Frame::SubProcess) => {
                if let Some(sub) = self.scopes.last_mut() {
                    sub.activity.node.documentation = text;
                }
            }
            Some(Frame::Process) => {
                if let Some(process) = self.active_process.as_mut() {
                    process.documentation = text;
                }
            }
            _ => tracing::trace!(at = %tag.position, "documentation without an owner, ignored"),
        }
        Ok(())
    }

    fn read_extensions(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<(), ConvertError> {
        let mut block = ExtensionBlock::read(stream, tag)?;
        match self.owner() {
            Some(Frame::SubProcess) => {
                if let Some(sub) = self.scopes.last_mut() {
                    finish_flow_node_extensions(block, &mut sub.activity.node);
                }
            }
            Some(Frame::Process) => {
                if let Some(process) = self.active_process.as_mut() {
                    process
                        .execution_listeners
                        .extend(read_listeners(&block.take_vendor("executionListener")));
                    process
                        .event_listeners
                        .extend(block.take_vendor("eventListener").iter().map(read_event_listener));
                    block.into_carrier(&mut process.base.extensions);
                }
            }
            _ => block.into_carrier(&mut self.model.definitions),
        }
        Ok(())
    }

    fn read_io_specification(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<(), ConvertError> {
        let specification = read_io_specification(&stream.read_subtree(tag)?);
        match self.owner() {
            Some(Frame::SubProcess) => {
                if let Some(sub) = self.scopes.last_mut() {
                    sub.activity.io_specification = Some(specification);
                }
            }
            Some(Frame::Process) => {
                if let Some(process) = self.active_process.as_mut() {
                    process.io_specification = Some(specification);
                }
            }
            _ => tracing::trace!(at = %tag.position, "ioSpecification without an owner, ignored"),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // diagram
    // ------------------------------------------------------------------------

    fn start_diagram(&mut self, stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<(), ConvertError> {
        match tag.local_name.as_str() {
            "BPMNDiagram" | "BPMNPlane" => {
                self.frames.push(Frame::PassThrough);
                Ok(())
            }
            "BPMNShape" => {
                let shape = stream.read_subtree(tag)?;
                let Some(id) = tag.attr_string("bpmnElement") else {
                    return Ok(());
                };
                if let Some(mut bounds) = shape.first_child("Bounds").map(read_bounds) {
                    bounds.expanded = tag.attr("isExpanded").and_then(parse_flag);
                    self.model.add_graphic_info(id.clone(), bounds);
                }
                if let Some(label) = label_bounds(&shape) {
                    self.model.add_label_graphic_info(id, label);
                }
                Ok(())
            }
            "BPMNEdge" => {
                let edge = stream.read_subtree(tag)?;
                let Some(id) = tag.attr_string("bpmnElement") else {
                    return Ok(());
                };
                let waypoints = edge
                    .child_elements
                    .get("waypoint")
                    .into_iter()
                    .flatten()
                    .map(|point| GraphicInfo::waypoint(number(point, "x"), number(point, "y")))
                    .collect();
                self.model.add_flow_graphic_info(id.clone(), waypoints);
                if let Some(label) = label_bounds(&edge) {
                    self.model.add_label_graphic_info(id, label);
                }
                Ok(())
            }
            _ => stream.skip_element(tag),
        }
    }
}

fn base_of(tag: &StartTag) -> BaseElement {
    BaseElement {
        id: tag.id(),
        position: Some(tag.position),
        ..Default::default()
    }
}

fn plain_attr(element: &ExtensionElement, name: &str) -> Option<String> {
    element
        .attribute_value_ns(None, name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn number(element: &ExtensionElement, name: &str) -> f64 {
    element
        .attribute_value_ns(None, name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0.0)
}

fn read_bounds(bounds: &ExtensionElement) -> GraphicInfo {
    GraphicInfo::bounds(
        number(bounds, "x"),
        number(bounds, "y"),
        number(bounds, "width"),
        number(bounds, "height"),
    )
}

fn label_bounds(element: &ExtensionElement) -> Option<GraphicInfo> {
    element
        .first_child("BPMNLabel")
        .and_then(|label| label.first_child("Bounds"))
        .map(read_bounds)
}

fn read_interface(tree: &ExtensionElement) -> Interface {
    let operations = tree
        .child_elements
        .get("operation")
        .into_iter()
        .flatten()
        .map(|operation| Operation {
            id: plain_attr(operation, "id").unwrap_or_default(),
            name: plain_attr(operation, "name"),
            implementation_ref: plain_attr(operation, "implementationRef"),
            in_message_ref: operation.child_text("inMessageRef").map(str::to_string),
            out_message_ref: operation.child_text("outMessageRef").map(str::to_string),
            error_message_refs: operation
                .child_elements
                .get("errorRef")
                .into_iter()
                .flatten()
                .filter_map(|reference| reference.element_text.clone())
                .collect(),
        })
        .collect();
    Interface {
        id: plain_attr(tree, "id").unwrap_or_default(),
        name: plain_attr(tree, "name"),
        implementation_ref: plain_attr(tree, "implementationRef"),
        operations,
    }
}
