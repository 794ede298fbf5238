//! Post-parse linking.
//!
//! Runs after the streaming pass, once every forward reference has a target.
//! Each scope is linked on its own: a reference never resolves to an element
//! of a parent or sibling scope.

use crate::model::{BpmnModel, FlowElement, FlowElementsContainer};

/// Resolves sequence-flow endpoints and boundary-event attachments in every
/// process and nested sub-process.
///
/// Linking is idempotent: derived lists are cleared before they are rebuilt,
/// so a caller that edits the model may link again before writing.
pub fn link(model: &mut BpmnModel) {
    for process in &mut model.processes {
        let _span = tracing::debug_span!("link", process = %process.base.id).entered();
        link_scope(&mut process.container);
    }
}

fn link_scope(scope: &mut FlowElementsContainer) {
    reset(scope);

    let flows: Vec<(String, String, String)> = scope
        .flow_elements
        .values()
        .filter_map(FlowElement::as_sequence_flow)
        .map(|flow| (flow.base.id.clone(), flow.source_ref.clone(), flow.target_ref.clone()))
        .collect();

    for (flow_id, source, target) in flows {
        let source_found = scope.get_flow_element(&source).is_some_and(FlowElement::is_flow_node);
        let target_found = scope.get_flow_element(&target).is_some_and(FlowElement::is_flow_node);

        if source_found {
            if let Some(node) = scope.get_flow_element_mut(&source).and_then(FlowElement::as_flow_node_mut) {
                node.outgoing.push(flow_id.clone());
            }
        } else {
            tracing::debug!(flow = %flow_id, source = %source, "sequence flow source not found in scope");
        }
        if target_found {
            if let Some(node) = scope.get_flow_element_mut(&target).and_then(FlowElement::as_flow_node_mut) {
                node.incoming.push(flow_id.clone());
            }
        } else {
            tracing::debug!(flow = %flow_id, target = %target, "sequence flow target not found in scope");
        }

        if let Some(FlowElement::SequenceFlow(flow)) = scope.get_flow_element_mut(&flow_id) {
            flow.resolved_source = source_found.then_some(source);
            flow.resolved_target = target_found.then_some(target);
        }
    }

    let attachments: Vec<(String, String)> = scope
        .flow_elements
        .values()
        .filter_map(FlowElement::as_boundary_event)
        .filter_map(|event| {
            let attached = event.attached_to_ref_id.clone()?;
            Some((event.event.node.base.id.clone(), attached))
        })
        .collect();

    for (event_id, attached) in attachments {
        let Some(activity) = scope.get_flow_element_mut(&attached).and_then(FlowElement::as_activity_mut) else {
            tracing::debug!(event = %event_id, attached_to = %attached, "boundary event host is not an activity in scope");
            continue;
        };
        activity.boundary_events.push(event_id.clone());
        if let Some(FlowElement::BoundaryEvent(event)) = scope.get_flow_element_mut(&event_id) {
            event.attached_to_ref = Some(attached);
        }
    }

    for element in scope.flow_elements.values_mut() {
        if let Some(sub) = element.as_sub_process_mut() {
            let _span = tracing::trace_span!("scope", sub_process = %sub.activity.node.base.id).entered();
            link_scope(&mut sub.container);
        }
    }
}

fn reset(scope: &mut FlowElementsContainer) {
    for element in scope.flow_elements.values_mut() {
        match element {
            FlowElement::SequenceFlow(flow) => {
                flow.resolved_source = None;
                flow.resolved_target = None;
            }
            FlowElement::BoundaryEvent(event) => event.attached_to_ref = None,
            _ => {}
        }
        if let Some(node) = element.as_flow_node_mut() {
            node.incoming.clear();
            node.outgoing.clear();
        }
        if let Some(activity) = element.as_activity_mut() {
            activity.boundary_events.clear();
        }
    }
}
