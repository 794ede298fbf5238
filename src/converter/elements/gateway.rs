//! Gateway converters.

use super::super::ConvertError;
use super::super::base::{read_flow_node, read_flow_node_child};
use super::super::child::{KnownAttributes, collect_custom_attributes};
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream};
use crate::model::{Element, ElementRef, FlowElement, Gateway, GatewayKind};

const GATEWAY_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["default"],
    vendor: &[],
};

/// One converter per gateway tag; `default` is written by the shared path.
#[derive(Debug, Clone, Copy)]
pub struct GatewayConverter {
    tag: &'static str,
    kind: GatewayKind,
}

impl GatewayConverter {
    pub fn new(tag: &'static str, kind: GatewayKind) -> Self {
        Self { tag, kind }
    }
}

impl ElementConverter for GatewayConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        self.tag
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut gateway = Gateway::new("", self.kind);
        read_flow_node(tag, &mut gateway.node);
        gateway.default_flow = tag.attr_string("default");
        collect_custom_attributes(tag, &GATEWAY_ATTRIBUTES, &mut gateway.node.base.extensions);
        stream.read_children(tag, |stream, child| read_flow_node_child(stream, child, &mut gateway.node))?;
        Ok(Some(Element::Flow(FlowElement::Gateway(gateway))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::model::BpmnModel;

    #[test]
    fn test_complex_gateway_reads_as_exclusive() {
        let model = BpmnModel::new();
        let converter = GatewayConverter::new("exclusiveGateway", GatewayKind::Exclusive);
        let mut stream = XmlStream::new(r#"<complexGateway id="g" default="f1"><documentation>pick</documentation></complexGateway>"#);
        let XmlToken::Start(tag) = stream.next_token().unwrap() else {
            panic!("expected start tag");
        };
        let parsed = converter.parse(&mut stream, &tag, &ParseContext { model: &model }).unwrap();
        let Some(Element::Flow(FlowElement::Gateway(gateway))) = parsed else {
            panic!("expected gateway");
        };
        assert_eq!(gateway.kind, GatewayKind::Exclusive);
        assert_eq!(gateway.default_flow.as_deref(), Some("f1"));
        assert_eq!(gateway.node.documentation.as_deref(), Some("pick"));
    }
}
