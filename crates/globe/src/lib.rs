//! Animated wireframe globe: scene construction, boundary loading, arc
//! animation and lifecycle, written against the `gpu::GraphicsBackend` seam
//! so any host surface can drive it.

pub mod arc;
pub mod builder;
pub mod config;
pub mod connections;
pub mod error;
pub mod grid;
pub mod loader;
pub mod motion;
pub mod widget;

pub use config::{ConfigWarning, GlobeConfig, ParsedConfig};
pub use connections::{FlowConnection, default_connections};
pub use error::GlobeError;
pub use loader::{
    ContentOrigin, DatasetFetcher, FetchError, GeoContent, SourceFailure, load_boundaries,
};
pub use widget::Globe;
