//! L4 Atomic Layer: Layout measurement
//!
//! The sequencer reads geometry once, at build time, through [`Measurable`].

use serde::Serialize;

/// Rendered geometry of an element-like value
pub trait Measurable {
    /// Rendered width in pixels
    fn width(&self) -> f64;

    /// Left edge relative to the rail container
    fn offset_left(&self) -> f64;

    /// Current pixel translation
    fn x(&self) -> f64 {
        0.0
    }

    /// Current translation as percent of width
    fn x_percent(&self) -> f64 {
        0.0
    }

    /// Horizontal scale factor
    fn scale_x(&self) -> f64 {
        1.0
    }
}

/// A snapshot of measured geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub width: f64,
    pub offset_left: f64,
    pub x: f64,
    pub x_percent: f64,
    pub scale_x: f64,
}

impl Measurement {
    pub fn new(width: f64, offset_left: f64) -> Self {
        Self {
            width,
            offset_left,
            x: 0.0,
            x_percent: 0.0,
            scale_x: 1.0,
        }
    }

    /// Lay widths out left to right with `gap` pixels after each item,
    /// the way a flex row with a trailing margin would.
    pub fn row<I>(widths: I, gap: f64) -> Vec<Measurement>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut left = 0.0;
        widths
            .into_iter()
            .map(|width| {
                let m = Measurement::new(width, left);
                left += width.max(0.0) + gap;
                m
            })
            .collect()
    }
}

impl Measurable for Measurement {
    fn width(&self) -> f64 {
        self.width
    }

    fn offset_left(&self) -> f64 {
        self.offset_left
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn x_percent(&self) -> f64 {
        self.x_percent
    }

    fn scale_x(&self) -> f64 {
        self.scale_x
    }
}

impl<M: Measurable + ?Sized> Measurable for &M {
    fn width(&self) -> f64 {
        (**self).width()
    }

    fn offset_left(&self) -> f64 {
        (**self).offset_left()
    }

    fn x(&self) -> f64 {
        (**self).x()
    }

    fn x_percent(&self) -> f64 {
        (**self).x_percent()
    }

    fn scale_x(&self) -> f64 {
        (**self).scale_x()
    }
}
