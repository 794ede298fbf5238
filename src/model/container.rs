//! Scopes: the id-keyed element maps owned by a process or sub-process.

use indexmap::IndexMap;

use super::activity::SubProcess;
use super::data::ValuedDataObject;
use super::element::{Artifact, FlowElement};

/// Flow elements and artifacts of one scope, in insertion order.
///
/// Ids are expected to be unique within a scope. A duplicate id replaces the
/// earlier element (last write wins) and keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowElementsContainer {
    pub flow_elements: IndexMap<String, FlowElement>,
    pub artifacts: IndexMap<String, Artifact>,
}

impl FlowElementsContainer {
    pub fn add_flow_element(&mut self, element: FlowElement) {
        let id = element.id().to_string();
        if self.flow_elements.insert(id.clone(), element).is_some() {
            tracing::warn!(id = %id, "duplicate flow element id in scope, keeping the last one");
        }
    }

    pub fn add_artifact(&mut self, artifact: Artifact) {
        let id = artifact.id().to_string();
        if self.artifacts.insert(id.clone(), artifact).is_some() {
            tracing::warn!(id = %id, "duplicate artifact id in scope, keeping the last one");
        }
    }

    pub fn get_flow_element(&self, id: &str) -> Option<&FlowElement> {
        self.flow_elements.get(id)
    }

    pub fn get_flow_element_mut(&mut self, id: &str) -> Option<&mut FlowElement> {
        self.flow_elements.get_mut(id)
    }

    /// Looks the id up here, then in nested sub-processes depth-first.
    pub fn find_flow_element(&self, id: &str) -> Option<&FlowElement> {
        self.flow_elements.get(id).or_else(|| {
            self.sub_processes()
                .find_map(|sub| sub.container.find_flow_element(id))
        })
    }

    /// The data objects of this scope (not of nested scopes).
    pub fn data_objects(&self) -> impl Iterator<Item = &ValuedDataObject> {
        self.flow_elements.values().filter_map(FlowElement::as_data_object)
    }

    pub fn sub_processes(&self) -> impl Iterator<Item = &SubProcess> {
        self.flow_elements.values().filter_map(FlowElement::as_sub_process)
    }

    pub fn len(&self) -> usize {
        self.flow_elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flow_elements.is_empty() && self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::{Activity, SubProcessKind};
    use crate::model::data::DataObjectKind;

    #[test]
    fn test_duplicate_id_last_write_wins() {
        let mut container = FlowElementsContainer::default();
        container.add_flow_element(FlowElement::Task(Activity::new("t").with_name("first")));
        container.add_flow_element(FlowElement::ManualTask(Activity::new("other")));
        container.add_flow_element(FlowElement::Task(Activity::new("t").with_name("second")));

        assert_eq!(container.len(), 2);
        assert_eq!(container.get_flow_element("t").and_then(|e| e.name()), Some("second"));
        assert_eq!(container.flow_elements.get_index(0).map(|(id, _)| id.as_str()), Some("t"));
    }

    #[test]
    fn test_find_descends_into_sub_processes() {
        let mut inner = SubProcess::new("sub", SubProcessKind::Embedded);
        inner
            .container
            .add_flow_element(FlowElement::Task(Activity::new("deep")));
        let mut container = FlowElementsContainer::default();
        container.add_flow_element(FlowElement::SubProcess(inner));

        assert!(container.get_flow_element("deep").is_none());
        assert!(container.find_flow_element("deep").is_some());
    }

    #[test]
    fn test_data_objects_view() {
        let mut container = FlowElementsContainer::default();
        container.add_flow_element(FlowElement::DataObject(ValuedDataObject::new(
            "d1",
            DataObjectKind::Long,
        )));
        container.add_flow_element(FlowElement::Task(Activity::new("t")));
        assert_eq!(container.data_objects().count(), 1);
    }
}
