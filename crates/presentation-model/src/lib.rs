//! Recast Presentation Model
//!
//! Defines the data contracts of a recorded conferencing session:
//! - **Metadata:** authoritative recording facts (`metadata.xml`)
//! - **Slides:** per-slide image intervals (`shapes.svg`)
//! - **Timeline:** reconciled per-slide clip durations
//! - **Naming:** deterministic staging file names
//!
//! All times are seconds relative to recording start unless a field name
//! says otherwise.

pub mod metadata;
pub mod naming;
pub mod slides;
pub mod timeline;

pub use metadata::*;
pub use slides::*;
pub use timeline::*;
