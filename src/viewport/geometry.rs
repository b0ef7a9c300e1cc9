use super::SectionId;

/// Visible region of the scroll container, in document pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Laid-out position of one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionLayout {
    pub section: SectionId,
    pub top: f64,
    pub height: f64,
}

impl SectionLayout {
    pub fn new(section: SectionId, top: f64, height: f64) -> Self {
        Self {
            section,
            top,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True if the section overlaps the viewport grown by `margin` on both edges.
    pub fn is_near(&self, viewport: &Viewport, margin: f64) -> bool {
        self.bottom() >= viewport.top - margin && self.top <= viewport.bottom() + margin
    }
}
