//! One converter per concrete element kind.
//!
//! Each converter reads its own start tag and consumes its subtree, and adds
//! its kind-specific attributes and children to the shared write order in
//! [`base::write_element`](super::base::write_element).

mod activity;
mod artifact;
mod data;
mod event;
mod flow;
mod gateway;
mod sub_process;

pub use activity::{
    BusinessRuleTaskConverter, CallActivityConverter, ScriptTaskConverter, ServiceTaskConverter,
    TaskConverter, UserTaskConverter,
};
pub use artifact::{AssociationConverter, TextAnnotationConverter};
pub use data::{DataObjectConverter, DataStoreReferenceConverter};
pub use event::{
    BoundaryEventConverter, CatchEventConverter, EndEventConverter, StartEventConverter,
    ThrowEventConverter,
};
pub use flow::SequenceFlowConverter;
pub use gateway::GatewayConverter;
pub use sub_process::{SubProcessConverter, read_sub_process_start};
