use crate::config::{ConfigError, TransformConfig};
use crate::document::Document;
use crate::footnotes::LinksToFootnotes;
use crate::headers::SetextHeaders;
use crate::images::{FeaturedImageInsertion, ImageMarkers, ResizedImages, UploadImages};
use crate::markup::{DefinitionLists, Emphasis, LiteralCleanup};

/// One rewriting stage of the body pipeline.
///
/// Implementations must be total: malformed markup passes through unchanged.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, body: &str, document: &Document) -> String;
}

/// Statically ordered list of stages; each stage sees the previous stage's output.
pub struct TransformChain {
    stages: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// The standard export pipeline.
    ///
    /// Image URLs are normalized and `{#img-ID}` markers stripped before the
    /// footnote and header stages, which rely on that.
    pub fn standard(config: &TransformConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::empty()
            .with_stage(ResizedImages::new(config)?)
            .with_stage(UploadImages::new(config)?)
            .with_stage(FeaturedImageInsertion::new(config)?)
            .with_stage(ImageMarkers)
            .with_stage(Emphasis)
            .with_stage(DefinitionLists)
            .with_stage(LiteralCleanup)
            .with_stage(LinksToFootnotes::new(config)?)
            .with_stage(SetextHeaders::new(config)))
    }

    pub fn with_stage(mut self, stage: impl Transform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, body: &str, document: &Document) -> String {
        self.stages
            .iter()
            .fold(body.trim().to_string(), |current, stage| {
                stage.apply(&current, document)
            })
            .trim()
            .to_string()
    }
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::empty()
    }
}
