//! Namespace URIs, prefixes and fixed literals of the BPMN 2.0 XML dialect.

/// Namespace URIs.
pub mod namespace {
    /// BPMN 2.0 semantic model.
    pub const BPMN: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
    /// Vendor extension attributes and elements.
    pub const VENDOR: &str = "http://activiti.org/bpmn";
    /// BPMN diagram interchange.
    pub const BPMNDI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
    /// Diagram common (bounds).
    pub const OMGDC: &str = "http://www.omg.org/spec/DD/20100524/DC";
    /// Diagram interchange (waypoints).
    pub const OMGDI: &str = "http://www.omg.org/spec/DD/20100524/DI";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";
}

/// Prefixes declared on every written document root.
pub mod prefix {
    pub const VENDOR: &str = "activiti";
    pub const BPMNDI: &str = "bpmndi";
    pub const OMGDC: &str = "omgdc";
    pub const OMGDI: &str = "omgdi";
    pub const XSI: &str = "xsi";
    pub const XSD: &str = "xsd";
}

/// Prefix bindings written on every document root, after the default BPMN
/// namespace.
pub const STANDARD_NAMESPACES: [(&str, &str); 6] = [
    (prefix::XSI, namespace::XSI),
    (prefix::XSD, namespace::XSD),
    (prefix::VENDOR, namespace::VENDOR),
    (prefix::BPMNDI, namespace::BPMNDI),
    (prefix::OMGDC, namespace::OMGDC),
    (prefix::OMGDI, namespace::OMGDI),
];

/// Target namespace written when the model has none.
pub const DEFAULT_TARGET_NAMESPACE: &str = "http://www.activiti.org/test";

pub const TYPE_LANGUAGE: &str = "http://www.w3.org/2001/XMLSchema";
pub const EXPRESSION_LANGUAGE: &str = "http://www.w3.org/1999/XPath";

/// Id of the single collaboration element written for pools and message flows.
pub const COLLABORATION_ID: &str = "Collaboration";

/// `implementation` marker selecting a web service operation.
pub const WEB_SERVICE_IMPLEMENTATION: &str = "##WebService";

/// `xsi:type` written on sequence flow conditions.
pub const FORMAL_EXPRESSION_TYPE: &str = "tFormalExpression";

/// Prefix form used in identity link expressions, `user(kermit)`.
pub const USER_PREFIX: &str = "user(";
/// Prefix form used in identity link expressions, `group(management)`.
pub const GROUP_PREFIX: &str = "group(";

/// Returns `prefix:local`, the qualified name written for a vendor attribute
/// or element.
pub fn vendor(local: &str) -> String {
    format!("{}:{local}", prefix::VENDOR)
}
