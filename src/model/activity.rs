//! Activities: tasks, call activities and sub-processes.

use indexmap::{IndexMap, IndexSet};

use super::container::FlowElementsContainer;
use super::data::IoSpecification;
use super::element::FlowNode;
use super::listener::{FieldExtension, FormProperty, Implementation, IoParameter, Listener};

/// Multi-instance loop settings of an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiInstanceLoopCharacteristics {
    pub sequential: bool,
    pub input_data_item: Option<String>,
    pub element_variable: Option<String>,
    pub element_index_variable: Option<String>,
    pub loop_cardinality: Option<String>,
    pub completion_condition: Option<String>,
}

impl MultiInstanceLoopCharacteristics {
    /// Only loops with a cardinality, collection or completion condition are written.
    pub fn is_writable(&self) -> bool {
        self.loop_cardinality.is_some()
            || self.input_data_item.is_some()
            || self.completion_condition.is_some()
    }
}

/// Fields shared by every activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub node: FlowNode,
    /// Id of the default sequence flow; written only while it still names one.
    pub default_flow: Option<String>,
    pub for_compensation: bool,
    pub loop_characteristics: Option<MultiInstanceLoopCharacteristics>,
    pub io_specification: Option<IoSpecification>,
    /// Attached boundary event ids, populated by the linker.
    pub boundary_events: Vec<String>,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            node: FlowNode::new(id),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.node.name = Some(name.into());
        self
    }
}

/// Extra fields carried by the vendor variant of user tasks and start events,
/// selected by a recognized form key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorFormExtras {
    pub run_as: Option<String>,
    pub script_processor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTask {
    pub activity: Activity,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub priority: Option<String>,
    pub form_key: Option<String>,
    pub due_date: Option<String>,
    pub business_calendar_name: Option<String>,
    pub category: Option<String>,
    pub skip_expression: Option<String>,
    pub candidate_users: Vec<String>,
    pub candidate_groups: Vec<String>,
    pub form_properties: Vec<FormProperty>,
    pub task_listeners: Vec<Listener>,
    /// Identity link type -> user ids.
    pub custom_user_identity_links: IndexMap<String, IndexSet<String>>,
    /// Identity link type -> group ids.
    pub custom_group_identity_links: IndexMap<String, IndexSet<String>>,
    pub vendor: Option<VendorFormExtras>,
}

impl UserTask {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            activity: Activity::new(id),
            ..Default::default()
        }
    }

    pub fn add_custom_user_identity_link(&mut self, user: impl Into<String>, link_type: impl Into<String>) {
        self.custom_user_identity_links
            .entry(link_type.into())
            .or_default()
            .insert(user.into());
    }

    pub fn add_custom_group_identity_link(&mut self, group: impl Into<String>, link_type: impl Into<String>) {
        self.custom_group_identity_links
            .entry(link_type.into())
            .or_default()
            .insert(group.into());
    }
}

/// Service and send tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceTask {
    pub activity: Activity,
    pub implementation: Option<Implementation>,
    /// Vendor built-in task type (mail, shell, ...).
    pub task_type: Option<String>,
    pub result_variable_name: Option<String>,
    pub skip_expression: Option<String>,
    pub field_extensions: Vec<FieldExtension>,
}

impl ServiceTask {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            activity: Activity::new(id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptTask {
    pub activity: Activity,
    pub script_format: Option<String>,
    pub script: Option<String>,
    pub result_variable: Option<String>,
    pub auto_store_variables: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessRuleTask {
    pub activity: Activity,
    pub input_variables: Vec<String>,
    pub rule_names: Vec<String>,
    pub result_variable: Option<String>,
    pub exclude: bool,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallActivity {
    pub activity: Activity,
    pub called_element: Option<String>,
    pub business_key: Option<String>,
    pub inherit_business_key: bool,
    pub in_parameters: Vec<IoParameter>,
    pub out_parameters: Vec<IoParameter>,
}

/// Settings specific to an ad-hoc sub-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdhocSettings {
    pub completion_condition: Option<String>,
    pub ordering: Option<String>,
    pub cancel_remaining_instances: bool,
}

impl Default for AdhocSettings {
    fn default() -> Self {
        Self {
            completion_condition: None,
            ordering: None,
            cancel_remaining_instances: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubProcessKind {
    #[default]
    Embedded,
    Transaction,
    AdHoc(AdhocSettings),
    /// A sub-process with `triggeredByEvent="true"`.
    Event,
}

/// A nested scope: an activity owning its own flow elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubProcess {
    pub activity: Activity,
    pub kind: SubProcessKind,
    pub container: FlowElementsContainer,
}

impl SubProcess {
    pub fn new(id: impl Into<String>, kind: SubProcessKind) -> Self {
        Self {
            activity: Activity::new(id),
            kind,
            container: FlowElementsContainer::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.activity.node.base.id
    }
}
