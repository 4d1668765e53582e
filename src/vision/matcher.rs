//! Template matching
//!
//! Normalized cross-correlation matching of grayscale reference images
//! against the most recent screen capture.

use std::collections::HashMap;
use std::path::Path;

use image::{DynamicImage, GrayImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use super::Matcher;
use crate::BotError;

/// Matcher backed by [`imageproc`] template matching.
pub struct TemplateMatcher {
    templates: HashMap<String, GrayImage>,
    screen: Option<GrayImage>,
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateMatcher {
    /// Create an empty matcher.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            screen: None,
        }
    }

    /// Register a reference image under a name.
    pub fn load(&mut self, name: impl Into<String>, template: GrayImage) {
        let name = name.into();
        log::debug!("loaded reference image '{name}'");
        self.templates.insert(name, template);
    }

    /// Register a reference image from a file.
    pub fn load_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<(), BotError> {
        let name = name.into();
        let template = image::open(path.as_ref())
            .map_err(|source| BotError::Template {
                name: name.clone(),
                source,
            })?
            .to_luma8();
        self.load(name, template);
        Ok(())
    }

    /// Register every `*.png` in a directory under its file stem, e.g.
    /// `attack.png` becomes the `attack` marker.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), BotError> {
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                self.load_file(stem.to_string(), &path)?;
            }
        }
        Ok(())
    }

    /// Run the match and return `(confidence, location)` of the best hit.
    fn best_match(&self, name: &str) -> Option<(f32, (u32, u32))> {
        let Some(screen) = &self.screen else {
            log::warn!("no screen frame to match against");
            return None;
        };
        let Some(template) = self.templates.get(name) else {
            log::error!("unknown reference image '{name}'");
            return None;
        };
        if template.width() > screen.width() || template.height() > screen.height() {
            log::warn!("reference image '{name}' is larger than the screen");
            return None;
        }

        let scores = match_template(
            screen,
            template,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let extremes = find_extremes(&scores);
        log::debug!(
            "match '{name}': confidence {:.3} at {:?}",
            extremes.max_value,
            extremes.max_value_location
        );
        Some((extremes.max_value, extremes.max_value_location))
    }
}

impl Matcher for TemplateMatcher {
    fn refresh(&mut self, frame: DynamicImage) {
        self.screen = Some(frame.to_luma8());
    }

    fn probability(&self, name: &str) -> f32 {
        self.best_match(name).map_or(0.0, |(confidence, _)| confidence)
    }

    fn find(&self, name: &str, threshold: f32) -> Option<(u32, u32)> {
        let (confidence, location) = self.best_match(name)?;
        (confidence >= threshold).then_some(location)
    }

    fn size(&self, name: &str) -> Option<(u32, u32)> {
        self.templates.get(name).map(|t| t.dimensions())
    }
}
