//! Recast Render Engine
//!
//! Drives an external transcoder (ffmpeg) through the four encode steps
//! that turn slide stills and a webcam recording into one composite video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! s1.png ── render ── v1.mp4 ─┐
//! s2.png ── render ── v2.mp4 ─┼── concat (stream copy) ── slides.mp4 ─┐
//! sN.png ── render ── vN.mp4 ─┘                                       │
//!                                                                     ├── hstack ── <meeting>.mp4
//! webcams.webm ── scale/pad ── webcams_right.mp4 ─────────────────────┘   (webcam audio,
//!                                                                          truncated to total)
//! ```

pub mod encode;
pub mod process;

pub use encode::*;
pub use process::*;
