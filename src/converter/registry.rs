//! Converter registry: tag name to converter for reading, concrete element
//! kind to converter for writing.
//!
//! The standard registry is built once per process and shared read-only
//! behind an `Arc`; conversions on different threads use it concurrently.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;

use super::ConvertError;
use super::base;
use super::child::LazyExtensions;
use super::elements::{
    AssociationConverter, BoundaryEventConverter, BusinessRuleTaskConverter, CallActivityConverter,
    CatchEventConverter, DataObjectConverter, DataStoreReferenceConverter, EndEventConverter,
    GatewayConverter, ScriptTaskConverter, SequenceFlowConverter, ServiceTaskConverter,
    StartEventConverter, SubProcessConverter, TaskConverter, TextAnnotationConverter,
    ThrowEventConverter, UserTaskConverter,
};
use super::export::WriteContext;
use super::stream::{StartTag, XmlStream};
use super::writer::XmlEmitter;
use crate::model::{BpmnModel, Element, ElementKind, ElementRef, GatewayKind, SubProcessKind};

/// Read-only state handed to converters while parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// The model under construction: namespaces, target namespace and the
    /// form key lists are already set.
    pub model: &'a BpmnModel,
}

/// Reads and writes one concrete element kind.
///
/// `write` has a default implementation that emits the shared parts of every
/// element (id, name, flow node flags, custom attributes, documentation,
/// extension content, multi-instance) and calls the three hooks at their
/// fixed places in between.
pub trait ElementConverter: Send + Sync {
    /// Tag written for this converter's elements.
    fn xml_element_name(&self, element: ElementRef<'_>) -> &'static str;

    /// Consumes the element whose start tag is `tag`. `None` drops the
    /// element without failing the parse.
    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError>;

    /// Kind-specific attributes, written after the shared ones.
    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let _ = (element, ctx, w);
        Ok(())
    }

    /// Kind-specific children of `extensionElements`, written before the
    /// execution listeners.
    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        let _ = (element, ctx, w, extensions);
        Ok(())
    }

    /// Kind-specific child elements, written last.
    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let _ = (element, ctx, w);
        Ok(())
    }

    fn write(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        base::write_element(self, element, ctx, w)
    }
}

/// The two lookup tables.
#[derive(Default, Clone)]
pub struct ConverterRegistry {
    by_tag: FxHashMap<&'static str, Arc<dyn ElementConverter>>,
    by_kind: FxHashMap<ElementKind, Arc<dyn ElementConverter>>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.by_tag.keys().collect();
        tags.sort();
        f.debug_struct("ConverterRegistry")
            .field("tags", &tags)
            .field("kinds", &self.by_kind.len())
            .finish()
    }
}

static STANDARD: LazyLock<Arc<ConverterRegistry>> = LazyLock::new(|| Arc::new(ConverterRegistry::standard()));

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide standard registry.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    /// Registers `converter` for reading `tag` and for writing every kind in
    /// `kinds`. Later registrations replace earlier ones.
    pub fn register(
        &mut self,
        tag: &'static str,
        kinds: &[ElementKind],
        converter: Arc<dyn ElementConverter>,
    ) {
        self.by_tag.insert(tag, Arc::clone(&converter));
        self.register_writer(kinds, converter);
    }

    /// Registers `converter` for writing only.
    pub fn register_writer(&mut self, kinds: &[ElementKind], converter: Arc<dyn ElementConverter>) {
        for kind in kinds {
            self.by_kind.insert(*kind, Arc::clone(&converter));
        }
    }

    pub fn for_tag(&self, tag: &str) -> Option<&dyn ElementConverter> {
        self.by_tag.get(tag).map(|converter| converter.as_ref())
    }

    pub fn for_kind(&self, kind: ElementKind) -> Result<&dyn ElementConverter, ConvertError> {
        self.by_kind
            .get(&kind)
            .map(|converter| converter.as_ref())
            .ok_or(ConvertError::Unregistered(kind))
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Every converter this crate ships.
    pub fn standard() -> Self {
        use ElementKind as K;

        let mut registry = Self::new();

        // Events
        registry.register(
            "startEvent",
            &[K::StartEvent, K::VendorStartEvent],
            Arc::new(StartEventConverter),
        );
        registry.register("endEvent", &[K::EndEvent], Arc::new(EndEventConverter));
        registry.register("boundaryEvent", &[K::BoundaryEvent], Arc::new(BoundaryEventConverter));
        registry.register(
            "intermediateThrowEvent",
            &[K::ThrowEvent],
            Arc::new(ThrowEventConverter),
        );
        registry.register(
            "intermediateCatchEvent",
            &[K::IntermediateCatchEvent],
            Arc::new(CatchEventConverter),
        );

        // Tasks
        registry.register("task", &[K::Task], Arc::new(TaskConverter::new("task")));
        registry.register("manualTask", &[K::ManualTask], Arc::new(TaskConverter::new("manualTask")));
        registry.register("receiveTask", &[K::ReceiveTask], Arc::new(TaskConverter::new("receiveTask")));
        registry.register(
            "userTask",
            &[K::UserTask, K::VendorUserTask],
            Arc::new(UserTaskConverter),
        );
        registry.register(
            "serviceTask",
            &[K::ServiceTask],
            Arc::new(ServiceTaskConverter::new("serviceTask")),
        );
        registry.register("sendTask", &[K::SendTask], Arc::new(ServiceTaskConverter::new("sendTask")));
        registry.register("scriptTask", &[K::ScriptTask], Arc::new(ScriptTaskConverter));
        registry.register(
            "businessRuleTask",
            &[K::BusinessRuleTask],
            Arc::new(BusinessRuleTaskConverter),
        );
        registry.register("callActivity", &[K::CallActivity], Arc::new(CallActivityConverter));

        // Sub-processes are streamed by the document driver.
        registry.register_writer(
            &[K::SubProcess, K::Transaction, K::AdhocSubProcess, K::EventSubProcess],
            Arc::new(SubProcessConverter),
        );

        // Gateways
        registry.register(
            "exclusiveGateway",
            &[K::ExclusiveGateway],
            Arc::new(GatewayConverter::new("exclusiveGateway", GatewayKind::Exclusive)),
        );
        registry.register(
            "inclusiveGateway",
            &[K::InclusiveGateway],
            Arc::new(GatewayConverter::new("inclusiveGateway", GatewayKind::Inclusive)),
        );
        registry.register(
            "parallelGateway",
            &[K::ParallelGateway],
            Arc::new(GatewayConverter::new("parallelGateway", GatewayKind::Parallel)),
        );
        registry.register(
            "eventBasedGateway",
            &[K::EventGateway],
            Arc::new(GatewayConverter::new("eventBasedGateway", GatewayKind::EventBased)),
        );
        // Read as exclusive, written back as exclusive.
        registry.register(
            "complexGateway",
            &[],
            Arc::new(GatewayConverter::new("exclusiveGateway", GatewayKind::Exclusive)),
        );

        // Data
        registry.register(
            "dataObject",
            &[
                K::StringDataObject,
                K::BooleanDataObject,
                K::IntegerDataObject,
                K::LongDataObject,
                K::DoubleDataObject,
                K::DateDataObject,
            ],
            Arc::new(DataObjectConverter),
        );
        registry.register(
            "dataStoreReference",
            &[K::DataStoreReference],
            Arc::new(DataStoreReferenceConverter),
        );

        // Connections and artifacts
        registry.register("sequenceFlow", &[K::SequenceFlow], Arc::new(SequenceFlowConverter));
        registry.register("textAnnotation", &[K::TextAnnotation], Arc::new(TextAnnotationConverter));
        registry.register("association", &[K::Association], Arc::new(AssociationConverter));

        registry
    }
}

/// Tag written for a sub-process of the given kind.
pub fn sub_process_tag(kind: &SubProcessKind) -> &'static str {
    match kind {
        SubProcessKind::Embedded | SubProcessKind::Event => "subProcess",
        SubProcessKind::Transaction => "transaction",
        SubProcessKind::AdHoc(_) => "adHocSubProcess",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_written_kind() {
        use ElementKind as K;
        let registry = ConverterRegistry::shared();
        let kinds = [
            K::SequenceFlow,
            K::StringDataObject,
            K::BooleanDataObject,
            K::IntegerDataObject,
            K::LongDataObject,
            K::DoubleDataObject,
            K::DateDataObject,
            K::DataStoreReference,
            K::StartEvent,
            K::VendorStartEvent,
            K::EndEvent,
            K::BoundaryEvent,
            K::ThrowEvent,
            K::IntermediateCatchEvent,
            K::Task,
            K::UserTask,
            K::VendorUserTask,
            K::ServiceTask,
            K::ScriptTask,
            K::BusinessRuleTask,
            K::ManualTask,
            K::ReceiveTask,
            K::SendTask,
            K::CallActivity,
            K::SubProcess,
            K::Transaction,
            K::AdhocSubProcess,
            K::EventSubProcess,
            K::ExclusiveGateway,
            K::InclusiveGateway,
            K::ParallelGateway,
            K::EventGateway,
            K::TextAnnotation,
            K::Association,
        ];
        for kind in kinds {
            assert!(registry.for_kind(kind).is_ok(), "{kind} is not registered");
        }
    }

    #[test]
    fn test_sub_process_tags_are_not_read_through_registry() {
        let registry = ConverterRegistry::standard();
        assert!(!registry.contains_tag("subProcess"));
        assert!(registry.contains_tag("complexGateway"));
    }

    #[test]
    fn test_empty_registry_reports_kind() {
        let registry = ConverterRegistry::new();
        let error = registry.for_kind(ElementKind::UserTask).err();
        assert!(matches!(error, Some(ConvertError::Unregistered(ElementKind::UserTask))));
    }
}
