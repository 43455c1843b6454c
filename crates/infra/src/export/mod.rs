//! Document export adapters: surface capture from rendered images and
//! PDF/PNG encoding.

mod capture;
mod pdf;
mod png;
mod renderer;

pub use capture::ImageFileCapture;
pub use renderer::ReportRenderer;
