//! # bpmn-xml
//!
//! Converts BPMN 2.0 XML documents to a typed process model and back,
//! preserving vendor extensions and unknown attributes.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! converter → registry, document driver, linker, writer, validation
//!   ↓
//! model     → BpmnModel, processes, flow elements, extension carrier
//!   ↓
//! base      → Primitives (Position, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → converter)
// ============================================================================

/// Foundation types: Position, LineIndex
pub mod base;

/// In-memory process model
pub mod model;

/// XML parsing, linking and writing
pub mod converter;

// Re-export the entry points
pub use base::{LineIndex, Position};
pub use converter::{BpmnXmlConverter, ConvertError, ConverterOptions, ConverterRegistry, link};
pub use model::BpmnModel;
