//! # pageproof – reactive pagination & print-layout engine
//!
//! This crate implements the core of a live Markdown print preview: it turns
//! a continuously re-rendered content block into page-bounded visual slices
//! that match configurable paper geometry. The pipeline stages are:
//!
//! 1. **Render** – submit Markdown to the external converter with debouncing
//!    and stale-result rejection ([`render`])
//! 2. **Tune** – hold and validate the print parameters ([`params`])
//! 3. **Resolve** – convert symbolic lengths to device pixels ([`units`])
//! 4. **Measure** – estimate the fragment's vertical extent ([`measure`])
//! 5. **Paginate** – slice the content into page windows ([`paginate`])
//!
//! [`session::PreviewSession`] wires the stages together for a presentation
//! layer to drive.

pub mod measure;
pub mod paginate;
pub mod params;
pub mod render;
pub mod session;
pub mod templates;
pub mod units;

// Re-exports for convenience
pub use paginate::{PageGeometry, PageSlice, Pagination};
pub use params::{Field, ParamStore, ParameterSeed, PrintParameters};
pub use render::{HttpConverter, LiveDebouncer, RenderPipeline};
pub use session::PreviewSession;
