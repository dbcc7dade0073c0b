//! Contract between the window runtime and the application driving it.

mod app;
mod ctx;

pub use app::{is_exit_key, App, AppControl};
pub use ctx::FrameCtx;
