//! Document export: paginating a captured report into a PDF or a PNG.

pub mod paginator;
pub mod ports;
pub mod service;

pub use paginator::{paginate, paginate_dimensions, PaginationError};
pub use ports::{DocumentRenderer, SurfaceCapture};
pub use service::{DocumentService, ExportedDocument};
