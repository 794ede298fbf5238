//! Artifacts: text annotations and associations.

use super::super::ConvertError;
use super::super::base::{artifact, mismatch, read_base, skip_unknown};
use super::super::child::{ExtensionBlock, KnownAttributes, collect_custom_attributes};
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream};
use super::super::writer::{XmlEmitter, optional_attribute, text_element};
use crate::model::{Artifact, Association, Element, ElementRef, TextAnnotation};

const TEXT_ANNOTATION_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["textFormat"],
    vendor: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextAnnotationConverter;

impl ElementConverter for TextAnnotationConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "textAnnotation"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut annotation = TextAnnotation {
            text_format: tag.attr_string("textFormat"),
            ..Default::default()
        };
        read_base(tag, &mut annotation.base);
        collect_custom_attributes(tag, &TEXT_ANNOTATION_ATTRIBUTES, &mut annotation.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("text") => {
                let text = stream.read_text(child)?;
                annotation.text = (!text.trim().is_empty()).then_some(text);
                Ok(())
            }
            Some("extensionElements") => {
                ExtensionBlock::read(stream, child)?.into_carrier(&mut annotation.base.extensions);
                Ok(())
            }
            _ => skip_unknown(stream, child),
        })?;

        Ok(Some(Element::Artifact(Artifact::TextAnnotation(annotation))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let Artifact::TextAnnotation(annotation) = artifact(element, "textAnnotation")? else {
            return Err(mismatch("textAnnotation", element.kind()));
        };
        optional_attribute(w, "textFormat", annotation.text_format.as_deref())
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let Artifact::TextAnnotation(annotation) = artifact(element, "textAnnotation")? else {
            return Err(mismatch("textAnnotation", element.kind()));
        };
        match annotation.text.as_deref() {
            Some(text) => text_element(w, "text", text),
            None => Ok(()),
        }
    }
}

const ASSOCIATION_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["sourceRef", "targetRef", "associationDirection"],
    vendor: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationConverter;

impl ElementConverter for AssociationConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "association"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut association = Association {
            source_ref: tag.attr_string("sourceRef"),
            target_ref: tag.attr_string("targetRef"),
            association_direction: tag.attr_string("associationDirection"),
            ..Default::default()
        };
        read_base(tag, &mut association.base);
        collect_custom_attributes(tag, &ASSOCIATION_ATTRIBUTES, &mut association.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("extensionElements") => {
                ExtensionBlock::read(stream, child)?.into_carrier(&mut association.base.extensions);
                Ok(())
            }
            _ => skip_unknown(stream, child),
        })?;

        Ok(Some(Element::Artifact(Artifact::Association(association))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let Artifact::Association(association) = artifact(element, "association")? else {
            return Err(mismatch("association", element.kind()));
        };
        optional_attribute(w, "sourceRef", association.source_ref.as_deref())?;
        optional_attribute(w, "targetRef", association.target_ref.as_deref())?;
        optional_attribute(w, "associationDirection", association.association_direction.as_deref())
    }
}
