//! Client-side core for a plant-health analysis service.
//!
//! Decodes backend responses into result values, maps them to display models
//! with [`ResultRenderer`], and lays those out as HTML with [`HtmlAdapter`].

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod html;
pub mod model;
pub mod palette;
pub mod render;
pub mod session;
pub mod upload;
pub mod view_state;

pub use client::{Backend, HttpBackend};
pub use config::{ClassEntry, ClientConfig};
pub use error::{ClientError, ConfigError, MalformedResultError};
pub use html::HtmlAdapter;
pub use model::{
    ChartKind, ClassificationResult, ColorAnalysis, IdentificationResult, ModelConfiguration,
    OutOfDistribution, SimilarImage, TaxonRank,
};
pub use palette::{ClassPalette, Color};
pub use render::{DisplayModel, Recommendation, ResultRenderer};
pub use session::{Operation, Session};
pub use upload::{ImageUpload, ModelUpload};
pub use view_state::{Event, Phase, ViewState};
