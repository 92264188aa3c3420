//! Flat export core: document model, content transforms, metadata assembly and rendering.
//!
//! Everything in this crate is pure. Filesystem work lives in `flatexport_engine`.
mod config;
mod document;
mod filename;
mod footnotes;
mod headers;
mod images;
mod markup;
mod metadata;
mod render;
mod transform;

pub use config::{ConfigError, ImageLinks, TransformConfig};
pub use document::{
    Attachment, Author, Comment, CommentKind, CommentRecord, Document, DocumentError, DocumentId,
    DocumentKind, DocumentRecord, FeaturedImage, GeoPoint, Term,
};
pub use filename::{is_safe_component, sanitize_component};
pub use footnotes::LinksToFootnotes;
pub use headers::{display_width, underline, SetextHeaders};
pub use images::{FeaturedImageInsertion, ImageMarkers, ResizedImages, UploadImages};
pub use markup::{DefinitionLists, Emphasis, LiteralCleanup};
pub use metadata::{
    assemble, fingerprint, format_timestamp, AuthorMeta, Location, MetadataRecord,
};
pub use render::{render, render_comment, OutputFormat, RenderError};
pub use transform::{Transform, TransformChain};
