//! Recast Assembler
//!
//! Sequences a whole run: resolve the session, fetch and parse descriptors,
//! reconcile the timeline, download assets into a staging directory, drive
//! the encode steps, and clean up.
//!
//! ```text
//! metadata.xml ─┐
//!               ├── reconcile ── timeline ──┐
//! shapes.svg ───┘                           │
//! slide images (worker pool) ───────────────┼── render clips (worker pool) ── concat ──┐
//! webcams.webm | webcams.mp4 ── reformat ───┴──────────────────────────────────────────┴── compose
//! ```

pub mod driver;
pub mod progress;
pub mod staging;

pub use driver::*;
pub use progress::*;
pub use staging::StagingDir;
