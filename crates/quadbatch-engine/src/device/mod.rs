//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue for the window, keeps the
//! surface configured across resizes and hands out one frame at a time.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
