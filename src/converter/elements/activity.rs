//! Task and call activity converters.

use super::super::ConvertError;
use super::super::base::{
    finish_flow_node_extensions, flow_element, mismatch, read_activity, read_activity_child,
};
use super::super::child::form::{read_form_properties, write_form_properties};
use super::super::child::identity::{
    formal_expression, parse_assignment, read_custom_resource, write_custom_identity_links,
};
use super::super::child::io::{read_io_parameters, write_io_parameters};
use super::super::child::listener::{read_fields, read_listeners, write_fields, write_listeners};
use super::super::child::{ExtensionBlock, KnownAttributes, LazyExtensions, collect_custom_attributes};
use super::super::constants::{WEB_SERVICE_IMPLEMENTATION, vendor};
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream, parse_flag, split_list};
use super::super::writer::{XmlEmitter, optional_attribute};
use crate::model::{
    Activity, BusinessRuleTask, CallActivity, Element, ElementRef, FlowElement, Implementation,
    ScriptTask, ServiceTask, UserTask, VendorFormExtras,
};

const ACTIVITY_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation"],
    vendor: &[],
};

fn optional_list(w: &mut dyn XmlEmitter, name: &str, items: &[String]) -> Result<(), ConvertError> {
    if items.is_empty() {
        return Ok(());
    }
    w.attribute(name, &items.join(","))
}

// ============================================================================
// TASK / MANUAL TASK / RECEIVE TASK
// ============================================================================

/// Activities with no fields of their own: `task`, `manualTask`,
/// `receiveTask`.
#[derive(Debug, Clone, Copy)]
pub struct TaskConverter {
    tag: &'static str,
}

impl TaskConverter {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl ElementConverter for TaskConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        self.tag
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut activity = Activity::default();
        read_activity(tag, &mut activity);
        collect_custom_attributes(tag, &ACTIVITY_ATTRIBUTES, &mut activity.node.base.extensions);
        stream.read_children(tag, |stream, child| read_activity_child(stream, child, &mut activity))?;

        let element = match self.tag {
            "manualTask" => FlowElement::ManualTask(activity),
            "receiveTask" => FlowElement::ReceiveTask(activity),
            _ => FlowElement::Task(activity),
        };
        Ok(Some(Element::Flow(element)))
    }
}

// ============================================================================
// USER TASK
// ============================================================================

const USER_TASK_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation"],
    vendor: &[
        "assignee",
        "owner",
        "candidateUsers",
        "candidateGroups",
        "dueDate",
        "businessCalendarName",
        "category",
        "formKey",
        "priority",
        "skipExpression",
    ],
};

const VENDOR_USER_TASK_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation"],
    vendor: &[
        "assignee",
        "owner",
        "candidateUsers",
        "candidateGroups",
        "dueDate",
        "businessCalendarName",
        "category",
        "formKey",
        "priority",
        "skipExpression",
        "runAs",
        "scriptProcessor",
    ],
};

/// `userTask`, plus the vendor variant selected by a configured form key.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserTaskConverter;

fn user_task<'a>(element: ElementRef<'a>) -> Result<&'a UserTask, ConvertError> {
    match flow_element(element, "userTask")? {
        FlowElement::UserTask(task) => Ok(task),
        other => Err(mismatch("userTask", other.kind())),
    }
}

impl ElementConverter for UserTaskConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "userTask"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut task = UserTask::default();
        read_activity(tag, &mut task.activity);
        task.assignee = tag.vendor_attr_string("assignee");
        task.owner = tag.vendor_attr_string("owner");
        task.candidate_users = tag.vendor_attr("candidateUsers").map(split_list).unwrap_or_default();
        task.candidate_groups = tag.vendor_attr("candidateGroups").map(split_list).unwrap_or_default();
        task.due_date = tag.vendor_attr_string("dueDate");
        task.business_calendar_name = tag.vendor_attr_string("businessCalendarName");
        task.category = tag.vendor_attr_string("category");
        task.form_key = tag.vendor_attr_string("formKey");
        task.priority = tag.vendor_attr_string("priority");
        task.skip_expression = tag.vendor_attr_string("skipExpression");

        let vendor_form = task
            .form_key
            .as_deref()
            .is_some_and(|key| ctx.model.user_task_form_types.iter().any(|t| t == key));
        let known = if vendor_form {
            task.vendor = Some(VendorFormExtras {
                run_as: tag.vendor_attr_string("runAs"),
                script_processor: tag.vendor_attr_string("scriptProcessor"),
            });
            &VENDOR_USER_TASK_ATTRIBUTES
        } else {
            &USER_TASK_ATTRIBUTES
        };
        collect_custom_attributes(tag, known, &mut task.activity.node.base.extensions);

        stream.read_children(tag, |stream, child| {
            if child.vendor_name() == Some("customResource") {
                let resource = stream.read_subtree(child)?;
                read_custom_resource(&resource, &mut task);
                return Ok(());
            }
            match child.bpmn_name() {
                Some("extensionElements") => {
                    let mut block = ExtensionBlock::read(stream, child)?;
                    task.form_properties
                        .extend(read_form_properties(&block.take_vendor("formProperty")));
                    task.task_listeners
                        .extend(read_listeners(&block.take_vendor("taskListener")));
                    for resource in block.take_vendor("customResource") {
                        read_custom_resource(&resource, &mut task);
                    }
                    finish_flow_node_extensions(block, &mut task.activity.node);
                    Ok(())
                }
                Some("humanPerformer") => {
                    let performer = stream.read_subtree(child)?;
                    if let Some(expression) = formal_expression(&performer) {
                        task.assignee = Some(expression.to_string());
                    }
                    Ok(())
                }
                Some("potentialOwner") => {
                    let owner = stream.read_subtree(child)?;
                    if let Some(expression) = formal_expression(&owner) {
                        let assignment = parse_assignment(expression);
                        task.candidate_users.extend(assignment.users);
                        task.candidate_groups.extend(assignment.groups);
                    }
                    Ok(())
                }
                _ => read_activity_child(stream, child, &mut task.activity),
            }
        })?;

        Ok(Some(Element::Flow(FlowElement::UserTask(task))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let task = user_task(element)?;
        optional_attribute(w, &vendor("assignee"), task.assignee.as_deref())?;
        optional_attribute(w, &vendor("owner"), task.owner.as_deref())?;
        optional_list(w, &vendor("candidateUsers"), &task.candidate_users)?;
        optional_list(w, &vendor("candidateGroups"), &task.candidate_groups)?;
        optional_attribute(w, &vendor("dueDate"), task.due_date.as_deref())?;
        optional_attribute(w, &vendor("businessCalendarName"), task.business_calendar_name.as_deref())?;
        optional_attribute(w, &vendor("category"), task.category.as_deref())?;
        optional_attribute(w, &vendor("formKey"), task.form_key.as_deref())?;
        optional_attribute(w, &vendor("priority"), task.priority.as_deref())?;
        optional_attribute(w, &vendor("skipExpression"), task.skip_expression.as_deref())?;
        if let Some(extras) = &task.vendor {
            optional_attribute(w, &vendor("runAs"), extras.run_as.as_deref())?;
            optional_attribute(w, &vendor("scriptProcessor"), extras.script_processor.as_deref())?;
        }
        Ok(())
    }

    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        let task = user_task(element)?;
        write_form_properties(&task.form_properties, w, extensions)?;
        write_listeners("taskListener", &task.task_listeners, w, extensions)?;
        write_custom_identity_links(task, w, extensions)
    }
}

// ============================================================================
// SERVICE TASK / SEND TASK
// ============================================================================

const SERVICE_TASK_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation", "implementation", "operationRef"],
    vendor: &[
        "class",
        "expression",
        "delegateExpression",
        "type",
        "resultVariableName",
        "resultVariable",
        "skipExpression",
    ],
};

/// `serviceTask` and `sendTask`, which share one shape.
#[derive(Debug, Clone, Copy)]
pub struct ServiceTaskConverter {
    tag: &'static str,
}

impl ServiceTaskConverter {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }

    fn task<'a>(&self, element: ElementRef<'a>) -> Result<&'a ServiceTask, ConvertError> {
        match flow_element(element, self.tag)? {
            FlowElement::ServiceTask(task) | FlowElement::SendTask(task) => Ok(task),
            other => Err(mismatch(self.tag, other.kind())),
        }
    }
}

/// First match wins: class, expression, delegate expression, web service,
/// bare `implementation`.
fn read_service_implementation(tag: &StartTag) -> Option<Implementation> {
    if let Some(class) = tag.vendor_attr_string("class") {
        Some(Implementation::Class(class))
    } else if let Some(expression) = tag.vendor_attr_string("expression") {
        Some(Implementation::Expression(expression))
    } else if let Some(delegate) = tag.vendor_attr_string("delegateExpression") {
        Some(Implementation::DelegateExpression(delegate))
    } else if tag.attr("implementation") == Some(WEB_SERVICE_IMPLEMENTATION) {
        Some(Implementation::WebService {
            operation_ref: tag.attr_string("operationRef"),
        })
    } else {
        tag.attr_string("implementation").map(Implementation::Other)
    }
}

impl ElementConverter for ServiceTaskConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        self.tag
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut task = ServiceTask::default();
        read_activity(tag, &mut task.activity);
        task.implementation = read_service_implementation(tag);
        task.task_type = tag.vendor_attr_string("type");
        task.result_variable_name = tag
            .vendor_attr_string("resultVariableName")
            .or_else(|| tag.vendor_attr_string("resultVariable"));
        task.skip_expression = tag.vendor_attr_string("skipExpression");
        collect_custom_attributes(tag, &SERVICE_TASK_ATTRIBUTES, &mut task.activity.node.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("extensionElements") => {
                let mut block = ExtensionBlock::read(stream, child)?;
                task.field_extensions.extend(read_fields(&block.take_vendor("field")));
                finish_flow_node_extensions(block, &mut task.activity.node);
                Ok(())
            }
            _ => read_activity_child(stream, child, &mut task.activity),
        })?;

        let element = if self.tag == "sendTask" {
            FlowElement::SendTask(task)
        } else {
            FlowElement::ServiceTask(task)
        };
        Ok(Some(Element::Flow(element)))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let task = self.task(element)?;
        match &task.implementation {
            Some(Implementation::Class(class)) => w.attribute(&vendor("class"), class)?,
            Some(Implementation::Expression(expression)) => w.attribute(&vendor("expression"), expression)?,
            Some(Implementation::DelegateExpression(delegate)) => {
                w.attribute(&vendor("delegateExpression"), delegate)?
            }
            Some(Implementation::WebService { operation_ref }) => {
                w.attribute("implementation", WEB_SERVICE_IMPLEMENTATION)?;
                optional_attribute(w, "operationRef", operation_ref.as_deref())?;
            }
            Some(Implementation::Other(implementation)) => {
                optional_attribute(w, "implementation", Some(implementation.as_str()))?
            }
            None => {}
        }
        optional_attribute(w, &vendor("type"), task.task_type.as_deref())?;
        optional_attribute(w, &vendor("resultVariableName"), task.result_variable_name.as_deref())?;
        optional_attribute(w, &vendor("skipExpression"), task.skip_expression.as_deref())
    }

    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        write_fields(&self.task(element)?.field_extensions, w, extensions)
    }
}

// ============================================================================
// SCRIPT TASK
// ============================================================================

const SCRIPT_TASK_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation", "scriptFormat"],
    vendor: &["resultVariable", "autoStoreVariables"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTaskConverter;

fn script_task<'a>(element: ElementRef<'a>) -> Result<&'a ScriptTask, ConvertError> {
    match flow_element(element, "scriptTask")? {
        FlowElement::ScriptTask(task) => Ok(task),
        other => Err(mismatch("scriptTask", other.kind())),
    }
}

impl ElementConverter for ScriptTaskConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "scriptTask"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut task = ScriptTask::default();
        read_activity(tag, &mut task.activity);
        task.script_format = tag.attr_string("scriptFormat");
        task.result_variable = tag.vendor_attr_string("resultVariable");
        task.auto_store_variables = tag
            .vendor_attr("autoStoreVariables")
            .and_then(parse_flag)
            .unwrap_or(false);
        collect_custom_attributes(tag, &SCRIPT_TASK_ATTRIBUTES, &mut task.activity.node.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("script") => {
                // Script bodies are kept verbatim, whitespace included.
                let script = stream.read_text(child)?;
                task.script = (!script.trim().is_empty()).then_some(script);
                Ok(())
            }
            _ => read_activity_child(stream, child, &mut task.activity),
        })?;

        Ok(Some(Element::Flow(FlowElement::ScriptTask(task))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let task = script_task(element)?;
        optional_attribute(w, "scriptFormat", task.script_format.as_deref())?;
        optional_attribute(w, &vendor("resultVariable"), task.result_variable.as_deref())?;
        if task.auto_store_variables {
            w.attribute(&vendor("autoStoreVariables"), "true")?;
        }
        Ok(())
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        if let Some(script) = script_task(element)?.script.as_deref() {
            w.start_element("script")?;
            w.cdata(script)?;
            w.end_element()?;
        }
        Ok(())
    }
}

// ============================================================================
// BUSINESS RULE TASK
// ============================================================================

const BUSINESS_RULE_TASK_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation"],
    vendor: &["ruleVariablesInput", "rules", "resultVariable", "exclude", "class"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessRuleTaskConverter;

impl ElementConverter for BusinessRuleTaskConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "businessRuleTask"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut task = BusinessRuleTask::default();
        read_activity(tag, &mut task.activity);
        task.input_variables = tag.vendor_attr("ruleVariablesInput").map(split_list).unwrap_or_default();
        task.rule_names = tag.vendor_attr("rules").map(split_list).unwrap_or_default();
        task.result_variable = tag.vendor_attr_string("resultVariable");
        task.exclude = tag.vendor_attr("exclude").and_then(parse_flag).unwrap_or(false);
        task.class_name = tag.vendor_attr_string("class");
        collect_custom_attributes(
            tag,
            &BUSINESS_RULE_TASK_ATTRIBUTES,
            &mut task.activity.node.base.extensions,
        );
        stream.read_children(tag, |stream, child| read_activity_child(stream, child, &mut task.activity))?;

        Ok(Some(Element::Flow(FlowElement::BusinessRuleTask(task))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let FlowElement::BusinessRuleTask(task) = flow_element(element, "businessRuleTask")? else {
            return Err(mismatch("businessRuleTask", element.kind()));
        };
        optional_list(w, &vendor("ruleVariablesInput"), &task.input_variables)?;
        optional_list(w, &vendor("rules"), &task.rule_names)?;
        optional_attribute(w, &vendor("resultVariable"), task.result_variable.as_deref())?;
        if task.exclude {
            w.attribute(&vendor("exclude"), "true")?;
        }
        optional_attribute(w, &vendor("class"), task.class_name.as_deref())
    }
}

// ============================================================================
// CALL ACTIVITY
// ============================================================================

const CALL_ACTIVITY_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default", "isForCompensation", "calledElement"],
    vendor: &["businessKey", "inheritBusinessKey"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CallActivityConverter;

fn call_activity<'a>(element: ElementRef<'a>) -> Result<&'a CallActivity, ConvertError> {
    match flow_element(element, "callActivity")? {
        FlowElement::CallActivity(call) => Ok(call),
        other => Err(mismatch("callActivity", other.kind())),
    }
}

impl ElementConverter for CallActivityConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "callActivity"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut call = CallActivity::default();
        read_activity(tag, &mut call.activity);
        call.called_element = tag.attr_string("calledElement");
        call.business_key = tag.vendor_attr_string("businessKey");
        call.inherit_business_key = tag
            .vendor_attr("inheritBusinessKey")
            .and_then(parse_flag)
            .unwrap_or(false);
        collect_custom_attributes(tag, &CALL_ACTIVITY_ATTRIBUTES, &mut call.activity.node.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("extensionElements") => {
                let mut block = ExtensionBlock::read(stream, child)?;
                call.in_parameters.extend(read_io_parameters(&block.take_vendor("in")));
                call.out_parameters.extend(read_io_parameters(&block.take_vendor("out")));
                finish_flow_node_extensions(block, &mut call.activity.node);
                Ok(())
            }
            _ => read_activity_child(stream, child, &mut call.activity),
        })?;

        Ok(Some(Element::Flow(FlowElement::CallActivity(call))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let call = call_activity(element)?;
        optional_attribute(w, "calledElement", call.called_element.as_deref())?;
        optional_attribute(w, &vendor("businessKey"), call.business_key.as_deref())?;
        if call.inherit_business_key {
            w.attribute(&vendor("inheritBusinessKey"), "true")?;
        }
        Ok(())
    }

    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        let call = call_activity(element)?;
        write_io_parameters("in", &call.in_parameters, w, extensions)?;
        write_io_parameters("out", &call.out_parameters, w, extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::model::BpmnModel;

    const HEADER: &str = r#"xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" xmlns:activiti="http://activiti.org/bpmn""#;

    fn parse_with(converter: &dyn ElementConverter, model: &BpmnModel, body: &str) -> FlowElement {
        let text = body.replace("HEADER", HEADER);
        let mut stream = XmlStream::new(&text);
        let XmlToken::Start(tag) = stream.next_token().unwrap() else {
            panic!("expected start tag");
        };
        match converter.parse(&mut stream, &tag, &ParseContext { model }).unwrap() {
            Some(Element::Flow(flow)) => flow,
            other => panic!("expected flow element, got {other:?}"),
        }
    }

    #[test]
    fn test_service_task_implementation_priority() {
        let element = parse_with(
            &ServiceTaskConverter::new("serviceTask"),
            &BpmnModel::new(),
            r#"<serviceTask HEADER id="s" activiti:expression="${bean.run()}"
                activiti:delegateExpression="${delegate}" activiti:resultVariable="out"/>"#,
        );
        let FlowElement::ServiceTask(task) = element else {
            panic!("expected service task");
        };
        assert_eq!(task.implementation, Some(Implementation::Expression("${bean.run()}".to_string())));
        assert_eq!(task.result_variable_name.as_deref(), Some("out"));
        assert!(task.activity.node.base.extensions.attributes.is_empty());
    }

    #[test]
    fn test_web_service_implementation() {
        let element = parse_with(
            &ServiceTaskConverter::new("sendTask"),
            &BpmnModel::new(),
            r###"<sendTask HEADER id="s" implementation="##WebService" operationRef="op1"/>"###,
        );
        let FlowElement::SendTask(task) = element else {
            panic!("expected send task");
        };
        assert_eq!(
            task.implementation,
            Some(Implementation::WebService {
                operation_ref: Some("op1".to_string())
            })
        );
    }

    #[test]
    fn test_user_task_assignment_children() {
        let element = parse_with(
            &UserTaskConverter,
            &BpmnModel::new(),
            r#"<userTask HEADER id="u" activiti:candidateUsers="a, b">
                <humanPerformer><resourceAssignmentExpression>
                    <formalExpression>kermit</formalExpression>
                </resourceAssignmentExpression></humanPerformer>
                <potentialOwner><resourceAssignmentExpression>
                    <formalExpression>user(fozzie), group(management), sales</formalExpression>
                </resourceAssignmentExpression></potentialOwner>
            </userTask>"#,
        );
        let FlowElement::UserTask(task) = element else {
            panic!("expected user task");
        };
        assert_eq!(task.assignee.as_deref(), Some("kermit"));
        assert_eq!(task.candidate_users, ["a", "b", "fozzie"]);
        assert_eq!(task.candidate_groups, ["management", "sales"]);
        assert!(task.vendor.is_none());
    }

    #[test]
    fn test_user_task_vendor_variant_from_form_key() {
        let mut model = BpmnModel::new();
        model.user_task_form_types.push("custom-form".to_string());
        let element = parse_with(
            &UserTaskConverter,
            &model,
            r#"<userTask HEADER id="u" activiti:formKey="custom-form" activiti:runAs="admin"/>"#,
        );
        assert_eq!(element.kind(), crate::model::ElementKind::VendorUserTask);
        let FlowElement::UserTask(task) = element else {
            panic!("expected user task");
        };
        assert_eq!(task.vendor.and_then(|v| v.run_as).as_deref(), Some("admin"));
    }

    #[test]
    fn test_script_keeps_body_verbatim() {
        let element = parse_with(
            &ScriptTaskConverter,
            &BpmnModel::new(),
            "<scriptTask HEADER id=\"s\" scriptFormat=\"groovy\"><script><![CDATA[if (a < b) {\n  x = 1\n}]]></script></scriptTask>",
        );
        let FlowElement::ScriptTask(task) = element else {
            panic!("expected script task");
        };
        assert_eq!(task.script.as_deref(), Some("if (a < b) {\n  x = 1\n}"));
        assert_eq!(task.script_format.as_deref(), Some("groovy"));
    }

    #[test]
    fn test_call_activity_parameters() {
        let element = parse_with(
            &CallActivityConverter,
            &BpmnModel::new(),
            r#"<callActivity HEADER id="c" calledElement="child">
                <extensionElements>
                    <activiti:in source="a" target="b"/>
                    <activiti:out sourceExpression="${x}" target="y"/>
                </extensionElements>
            </callActivity>"#,
        );
        let FlowElement::CallActivity(call) = element else {
            panic!("expected call activity");
        };
        assert_eq!(call.called_element.as_deref(), Some("child"));
        assert_eq!(call.in_parameters.len(), 1);
        assert_eq!(call.out_parameters[0].source_expression.as_deref(), Some("${x}"));
        assert!(!call.activity.node.base.extensions.has_elements());
    }
}
