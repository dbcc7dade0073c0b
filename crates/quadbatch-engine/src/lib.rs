//! Quad batch engine.
//!
//! Collects 2D quads on the CPU each frame, keeps them in GPU buffers that
//! grow only when a frame outgrows them, and draws them through a pipeline
//! chosen by the batch's [`render::Capabilities`].

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod window;
