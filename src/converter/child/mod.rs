//! Reusable readers and writers for constructs nested in many element kinds.
//!
//! Readers work on [`ExtensionElement`](crate::model::ExtensionElement) trees
//! produced by [`XmlStream::read_subtree`](super::stream::XmlStream::read_subtree),
//! so each handler sees a whole construct at once. Writers append to an open
//! element, opening the shared `extensionElements` wrapper lazily where the
//! construct lives inside it.

pub mod event_definition;
pub mod extension;
pub mod form;
pub mod identity;
pub mod io;
pub mod listener;
pub mod multi_instance;

pub use extension::{
    ExtensionBlock, KnownAttributes, LazyExtensions, collect_custom_attributes,
    write_carrier_elements, write_custom_attributes, write_extension_element,
};
