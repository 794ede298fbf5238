//! Identity link expressions: `user(kermit), group(management), sales`.
//!
//! A bare name is a group. The same syntax appears in `potentialOwner`,
//! `potentialStarter` and vendor `customResource` elements.

use indexmap::IndexSet;

use super::super::ConvertError;
use super::super::constants::{GROUP_PREFIX, USER_PREFIX, namespace, vendor};
use super::super::writer::XmlEmitter;
use super::extension::LazyExtensions;
use crate::model::{ExtensionElement, UserTask};

/// Users and groups named by one assignment expression.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

fn unwrap_call<'a>(item: &'a str, prefix: &str) -> Option<&'a str> {
    item.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

pub fn parse_assignment(expression: &str) -> Assignment {
    let mut assignment = Assignment::default();
    for item in expression.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if let Some(user) = unwrap_call(item, USER_PREFIX) {
            assignment.users.push(user.to_string());
        } else if let Some(group) = unwrap_call(item, GROUP_PREFIX) {
            assignment.groups.push(group.to_string());
        } else {
            assignment.groups.push(item.to_string());
        }
    }
    assignment
}

/// Text of `resourceAssignmentExpression/formalExpression` under `element`.
pub fn formal_expression(element: &ExtensionElement) -> Option<&str> {
    element
        .first_child("resourceAssignmentExpression")
        .and_then(|expression| expression.child_text("formalExpression"))
}

/// Adds the links of a `customResource` element, typed by its `name`.
pub fn read_custom_resource(element: &ExtensionElement, task: &mut UserTask) {
    let link_type = element
        .attribute_value_ns(Some(namespace::VENDOR), "name")
        .or_else(|| element.attribute_value_ns(None, "name"))
        .filter(|name| !name.is_empty());
    let (Some(link_type), Some(expression)) = (link_type, formal_expression(element)) else {
        tracing::debug!("customResource without name or expression, ignoring");
        return;
    };
    let assignment = parse_assignment(expression);
    for user in assignment.users {
        task.add_custom_user_identity_link(user, link_type);
    }
    for group in assignment.groups {
        task.add_custom_group_identity_link(group, link_type);
    }
}

/// One `customResource` per link type seen across users and groups.
pub fn write_custom_identity_links(
    task: &UserTask,
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    let link_types: IndexSet<&String> = task
        .custom_user_identity_links
        .keys()
        .chain(task.custom_group_identity_links.keys())
        .collect();

    for link_type in link_types {
        let users = task
            .custom_user_identity_links
            .get(link_type)
            .into_iter()
            .flatten()
            .map(|user| format!("{USER_PREFIX}{user})"));
        let groups = task
            .custom_group_identity_links
            .get(link_type)
            .into_iter()
            .flatten()
            .map(|group| format!("{GROUP_PREFIX}{group})"));
        let expression = users.chain(groups).collect::<Vec<_>>().join(", ");

        extensions.open(w)?;
        w.start_element(&vendor("customResource"))?;
        w.attribute(&vendor("name"), link_type)?;
        w.start_element("resourceAssignmentExpression")?;
        w.start_element("formalExpression")?;
        w.characters(&expression)?;
        w.end_element()?;
        w.end_element()?;
        w.end_element()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtensionAttribute;
    use rstest::rstest;

    #[rstest]
    #[case("user(kermit)", &["kermit"], &[])]
    #[case("group(management)", &[], &["management"])]
    #[case("sales", &[], &["sales"])]
    #[case("user(kermit), group(management), sales", &["kermit"], &["management", "sales"])]
    fn test_parse_assignment(#[case] expression: &str, #[case] users: &[&str], #[case] groups: &[&str]) {
        let assignment = parse_assignment(expression);
        assert_eq!(assignment.users, users);
        assert_eq!(assignment.groups, groups);
    }

    #[test]
    fn test_custom_resource_groups_links_by_type() {
        let resource = ExtensionElement::new("customResource")
            .with_namespace("activiti", namespace::VENDOR)
            .with_attribute(
                ExtensionAttribute::new("name", "businessAdministrator")
                    .with_namespace("activiti", namespace::VENDOR),
            )
            .with_child(
                ExtensionElement::new("resourceAssignmentExpression").with_child(
                    ExtensionElement::new("formalExpression").with_text("user(kermit), group(management)"),
                ),
            );
        let mut task = UserTask::new("t");
        read_custom_resource(&resource, &mut task);

        assert!(task.custom_user_identity_links["businessAdministrator"].contains("kermit"));
        assert!(task.custom_group_identity_links["businessAdministrator"].contains("management"));
    }
}
