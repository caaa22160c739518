//! Page-space geometry. All lengths are millimetres with a top-left origin,
//! the coordinate system the composer lays pages out in.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Physical paper formats, in portrait millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    pub fn portrait_mm(self) -> Size {
        match self {
            PaperSize::A4 => Size::new(210.0, 297.0),
            PaperSize::Letter => Size::new(215.9, 279.4),
            PaperSize::Legal => Size::new(215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

/// The single page geometry shared by every page of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub paper: PaperSize,
    pub orientation: Orientation,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(PaperSize::A4, Orientation::Landscape)
    }
}

impl PageGeometry {
    pub fn new(paper: PaperSize, orientation: Orientation) -> Self {
        Self { paper, orientation }
    }

    pub fn size_mm(&self) -> Size {
        let portrait = self.paper.portrait_mm();
        match self.orientation {
            Orientation::Portrait => portrait,
            Orientation::Landscape => Size::new(portrait.height, portrait.width),
        }
    }

    pub fn width_mm(&self) -> f32 {
        self.size_mm().width
    }

    pub fn height_mm(&self) -> f32 {
        self.size_mm().height
    }
}
