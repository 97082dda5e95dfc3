//! Trait definitions

mod element;
mod mapping;

pub use element::{PhysicallyMappedElement, ReferenceEdgeFrame, ReferenceElement};
pub use mapping::CoordinateMapping;
