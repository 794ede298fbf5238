//! Parts shared by every element converter: the attributes and children all
//! flow nodes and activities carry, and the canonical write order.

use super::ConvertError;
use super::child::event_definition::{is_event_definition, read_event_definition};
use super::child::io::{read_io_specification, write_io_specification};
use super::child::listener::{read_listeners, write_listeners};
use super::child::multi_instance::{read_multi_instance, write_multi_instance};
use super::child::{ExtensionBlock, LazyExtensions, write_carrier_elements, write_custom_attributes};
use super::constants::vendor;
use super::export::WriteContext;
use super::registry::ElementConverter;
use super::stream::{StartTag, XmlStream, parse_flag};
use super::writer::{XmlEmitter, optional_attribute, text_element};
use crate::model::{
    Activity, Artifact, BaseElement, BpmnModel, ElementKind, ElementRef, Event, FlowElement,
    FlowNode, Listener,
};

// ============================================================================
// PARSE
// ============================================================================

pub fn read_base(tag: &StartTag, base: &mut BaseElement) {
    base.id = tag.id();
    base.position = Some(tag.position);
}

/// `id`, `name`, vendor `async` and vendor `exclusive`.
pub fn read_flow_node(tag: &StartTag, node: &mut FlowNode) {
    read_base(tag, &mut node.base);
    node.name = tag.attr_string("name");
    node.asynchronous = tag.vendor_attr("async").and_then(parse_flag).unwrap_or(false);
    node.not_exclusive = tag.vendor_attr("exclusive").and_then(parse_flag) == Some(false);
}

/// Flow node attributes plus `default` and `isForCompensation`.
pub fn read_activity(tag: &StartTag, activity: &mut Activity) {
    read_flow_node(tag, &mut activity.node);
    activity.default_flow = tag.attr_string("default");
    activity.for_compensation = tag.attr("isForCompensation").and_then(parse_flag).unwrap_or(false);
}

/// Lifts execution listeners out of the block and keeps the rest on the node.
pub fn finish_flow_node_extensions(mut block: ExtensionBlock, node: &mut FlowNode) {
    node.execution_listeners
        .extend(read_listeners(&block.take_vendor("executionListener")));
    block.into_carrier(&mut node.base.extensions);
}

pub fn skip_unknown(stream: &mut XmlStream<'_>, child: &StartTag) -> Result<(), ConvertError> {
    tracing::trace!(tag = %child.local_name, at = %child.position, "skipping unrecognized child element");
    stream.skip_element(child)
}

/// Children every flow node understands: `documentation` and
/// `extensionElements`. Anything else is skipped.
pub fn read_flow_node_child(
    stream: &mut XmlStream<'_>,
    child: &StartTag,
    node: &mut FlowNode,
) -> Result<(), ConvertError> {
    match child.bpmn_name() {
        Some("documentation") => {
            node.documentation = stream.read_trimmed_text(child)?;
            Ok(())
        }
        Some("extensionElements") => {
            let block = ExtensionBlock::read(stream, child)?;
            finish_flow_node_extensions(block, node);
            Ok(())
        }
        _ => skip_unknown(stream, child),
    }
}

/// Flow node children plus multi-instance and `ioSpecification`.
pub fn read_activity_child(
    stream: &mut XmlStream<'_>,
    child: &StartTag,
    activity: &mut Activity,
) -> Result<(), ConvertError> {
    match child.bpmn_name() {
        Some("multiInstanceLoopCharacteristics") => {
            let tree = stream.read_subtree(child)?;
            activity.loop_characteristics = Some(read_multi_instance(&tree));
            Ok(())
        }
        Some("ioSpecification") => {
            let tree = stream.read_subtree(child)?;
            activity.io_specification = Some(read_io_specification(&tree));
            Ok(())
        }
        _ => read_flow_node_child(stream, child, &mut activity.node),
    }
}

/// Flow node children plus nested event definitions.
pub fn read_event_child(
    stream: &mut XmlStream<'_>,
    child: &StartTag,
    event: &mut Event,
    model: &BpmnModel,
) -> Result<(), ConvertError> {
    match child.bpmn_name() {
        Some(name) if is_event_definition(name) => {
            let definition = read_event_definition(stream, child, model)?;
            event.event_definitions.push(definition);
            Ok(())
        }
        _ => read_flow_node_child(stream, child, &mut event.node),
    }
}

// ============================================================================
// WRITE
// ============================================================================

/// Borrowed view of the fields the shared write path needs.
struct CommonParts<'a> {
    base: &'a BaseElement,
    name: Option<&'a str>,
    documentation: Option<&'a str>,
    listeners: &'a [Listener],
    node: Option<&'a FlowNode>,
    activity: Option<&'a Activity>,
    default_flow: Option<&'a str>,
}

impl<'a> CommonParts<'a> {
    fn of(element: ElementRef<'a>) -> Self {
        match element {
            ElementRef::Flow(flow) => {
                let node = flow.as_flow_node();
                let activity = flow.as_activity();
                let (documentation, listeners) = match flow {
                    FlowElement::SequenceFlow(sequence) => {
                        (sequence.documentation.as_deref(), sequence.execution_listeners.as_slice())
                    }
                    FlowElement::DataObject(data) => (data.documentation.as_deref(), &[][..]),
                    FlowElement::DataStoreReference(store) => (store.documentation.as_deref(), &[][..]),
                    _ => node
                        .map(|n| (n.documentation.as_deref(), n.execution_listeners.as_slice()))
                        .unwrap_or((None, &[][..])),
                };
                let default_flow = match flow {
                    FlowElement::Gateway(gateway) => gateway.default_flow.as_deref(),
                    _ => activity.and_then(|a| a.default_flow.as_deref()),
                };
                Self {
                    base: flow.base(),
                    name: flow.name(),
                    documentation,
                    listeners,
                    node,
                    activity,
                    default_flow,
                }
            }
            ElementRef::Artifact(artifact) => Self {
                base: artifact.base(),
                name: None,
                documentation: None,
                listeners: &[],
                node: None,
                activity: None,
                default_flow: None,
            },
        }
    }
}

/// The canonical write order shared by every converter.
pub fn write_element<C: ElementConverter + ?Sized>(
    converter: &C,
    element: ElementRef<'_>,
    ctx: &WriteContext<'_>,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    let parts = CommonParts::of(element);

    w.start_element(converter.xml_element_name(element))?;
    optional_attribute(w, "id", Some(parts.base.id.as_str()))?;
    optional_attribute(w, "name", parts.name)?;
    if let Some(node) = parts.node {
        if node.asynchronous {
            w.attribute(&vendor("async"), "true")?;
        }
        if node.not_exclusive {
            w.attribute(&vendor("exclusive"), "false")?;
        }
    }
    if parts.activity.is_some_and(|activity| activity.for_compensation) {
        w.attribute("isForCompensation", "true")?;
    }
    if let Some(default_flow) = parts.default_flow {
        if ctx.is_sequence_flow(default_flow) {
            w.attribute("default", default_flow)?;
        } else {
            tracing::debug!(element = %parts.base.id, flow = %default_flow, "default flow is not a sequence flow, not written");
        }
    }
    converter.write_attributes(element, ctx, w)?;
    write_custom_attributes(&parts.base.extensions.attributes, ctx.model, w, &mut Vec::new())?;

    if let Some(documentation) = parts.documentation.filter(|d| !d.is_empty()) {
        text_element(w, "documentation", documentation)?;
    }

    let mut extensions = LazyExtensions::default();
    converter.write_extension_children(element, ctx, w, &mut extensions)?;
    write_listeners("executionListener", parts.listeners, w, &mut extensions)?;
    write_carrier_elements(&parts.base.extensions, ctx.model, w, &mut extensions)?;
    extensions.close(w)?;

    if let Some(activity) = parts.activity {
        if let Some(specification) = &activity.io_specification {
            write_io_specification(specification, w)?;
        }
        if let Some(characteristics) = &activity.loop_characteristics {
            write_multi_instance(characteristics, w)?;
        }
    }

    converter.write_children(element, ctx, w)?;
    w.end_element()
}

/// Error for a converter handed an element of a kind it does not write.
pub fn mismatch(tag: &str, kind: ElementKind) -> ConvertError {
    ConvertError::write(format!("<{tag}> converter cannot write {kind}"))
}

/// Borrows the flow element, failing for artifacts.
pub fn flow_element<'a>(element: ElementRef<'a>, tag: &str) -> Result<&'a FlowElement, ConvertError> {
    match element {
        ElementRef::Flow(flow) => Ok(flow),
        ElementRef::Artifact(artifact) => Err(mismatch(tag, artifact.kind())),
    }
}

/// Borrows the artifact, failing for flow elements.
pub fn artifact<'a>(element: ElementRef<'a>, tag: &str) -> Result<&'a Artifact, ConvertError> {
    match element {
        ElementRef::Artifact(artifact) => Ok(artifact),
        ElementRef::Flow(flow) => Err(mismatch(tag, flow.kind())),
    }
}
