//! Page composition: the one piece of state shared between the upload
//! workflow and the renderer.
//!
//! A [`GuidePage`] holds the most recent guide, or nothing. A new guide
//! replaces the old one wholesale; there is no merging and no history.

use crate::guide::GuideData;
use crate::render::{render, OutputFormat};

#[derive(Debug, Clone, Default)]
pub struct GuidePage {
    guide: Option<GuideData>,
}

impl GuidePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success callback target for [`crate::workflow::UploadWorkflow::submit`].
    pub fn show(&mut self, guide: GuideData) {
        self.guide = Some(guide);
    }

    pub fn guide(&self) -> Option<&GuideData> {
        self.guide.as_ref()
    }

    /// Render the current guide; empty when there is none.
    pub fn render(&self, format: OutputFormat) -> String {
        render(self.guide.as_ref(), format)
    }
}
