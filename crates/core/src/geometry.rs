//! EMU-based lengths and rectangles for slide layout arithmetic.
//!
//! OOXML drawing coordinates are English Metric Units: 914,400 per inch,
//! 12,700 per point. All placement math in this workspace stays in EMU and
//! only converts at the display boundary.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// A length in English Metric Units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Emu(pub i64);

impl Emu {
    pub const ZERO: Emu = Emu(0);

    /// Length from inches.
    pub fn inches(value: f64) -> Self {
        Emu((value * EMU_PER_INCH as f64).round() as i64)
    }

    /// Length from points.
    pub fn points(value: f64) -> Self {
        Emu((value * EMU_PER_POINT as f64).round() as i64)
    }

    pub fn to_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    pub fn to_points(self) -> f64 {
        self.0 as f64 / EMU_PER_POINT as f64
    }

    /// Fraction of this length, rounded to the nearest EMU.
    pub fn scaled(self, factor: f64) -> Self {
        Emu((self.0 as f64 * factor).round() as i64)
    }
}

impl Add for Emu {
    type Output = Emu;

    fn add(self, rhs: Emu) -> Emu {
        Emu(self.0 + rhs.0)
    }
}

impl Sub for Emu {
    type Output = Emu;

    fn sub(self, rhs: Emu) -> Emu {
        Emu(self.0 - rhs.0)
    }
}

impl Mul<i64> for Emu {
    type Output = Emu;

    fn mul(self, rhs: i64) -> Emu {
        Emu(self.0 * rhs)
    }
}

/// Axis-aligned bounding box of a shape: offset plus extent, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: Emu,
    /// Top edge.
    pub y: Emu,
    /// Width.
    pub cx: Emu,
    /// Height.
    pub cy: Emu,
}

impl Rect {
    pub fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }

    pub fn bottom(&self) -> Emu {
        self.y + self.cy
    }

    pub fn right(&self) -> Emu {
        self.x + self.cx
    }

    /// Same box, re-anchored so it is horizontally centered on a slide of
    /// width `slide_cx`.
    pub fn centered_horizontally(&self, slide_cx: Emu) -> Rect {
        Rect {
            x: Emu((slide_cx.0 - self.cx.0) / 2),
            ..*self
        }
    }
}

/// The lowest bottom edge among the given frames.
///
/// Frames are optional so callers can pass lookups of sibling shapes that
/// may be absent; `None` entries are skipped. Returns `None` when nothing
/// was present, letting the caller fall back to a slide-relative guess.
pub fn max_bottom<I>(frames: I) -> Option<Emu>
where
    I: IntoIterator<Item = Option<Rect>>,
{
    frames
        .into_iter()
        .flatten()
        .map(|frame| frame.bottom())
        .max()
}
