use opencv::core::{Mat, Rect, Scalar};
use serde::{Deserialize, Serialize};

use crate::app::VisionError;

pub mod compat;
mod draw;
mod pixel;
mod team_prop;
mod utils;

pub use draw::{Annotation, Overlay};
pub use pixel::{PixelColour, PixelProcessor};
pub use team_prop::{PropLocation, TeamPropProcessor};

/// Inclusive HSV bounds in OpenCV units (H 0-179, S and V 0-255).
#[derive(PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HsvRange {
    pub low: [f64; 3],
    pub high: [f64; 3],
}

impl HsvRange {
    pub const RED_LOWER_SPECTRUM: Self = HsvRange {
        low: [0.0, 100.0, 20.0],
        high: [10.0, 255.0, 255.0],
    };
    pub const RED_UPPER_SPECTRUM: Self = HsvRange {
        low: [160.0, 100.0, 20.0],
        high: [179.0, 255.0, 255.0],
    };
    pub const GREEN: Self = HsvRange {
        low: [35.0, 100.0, 20.0],
        high: [78.0, 255.0, 255.0],
    };
    pub const BLUE: Self = HsvRange {
        low: [93.0, 100.0, 20.0],
        high: [138.0, 255.0, 255.0],
    };
    pub const YELLOW: Self = HsvRange {
        low: [20.0, 100.0, 20.0],
        high: [33.0, 255.0, 255.0],
    };
    pub const WHITE: Self = HsvRange {
        low: [15.0, 10.0, 200.0],
        high: [25.0, 30.0, 255.0],
    };

    const MAX: [f64; 3] = [179.0, 255.0, 255.0];

    pub fn validate(&self) -> Result<(), VisionError> {
        for c in 0..3 {
            let (lo, hi) = (self.low[c], self.high[c]);
            if !(0.0..=Self::MAX[c]).contains(&lo) || !(0.0..=Self::MAX[c]).contains(&hi) {
                return Err(VisionError::Config(format!(
                    "HSV channel {} bound out of range in {:?}",
                    c, self
                )));
            }
            if lo > hi {
                return Err(VisionError::Config(format!(
                    "HSV channel {} has low > high in {:?}",
                    c, self
                )));
            }
        }
        Ok(())
    }
}

/// Region of interest as two opposite corners, each a fraction of the frame size.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct RegionSpec {
    pub name: &'static str,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl RegionSpec {
    pub const PROP_LEFT: Self = RegionSpec {
        name: "left",
        x0: 0.0,
        y0: 0.286,
        x1: 0.33,
        y1: 0.66,
    };
    pub const PROP_MIDDLE: Self = RegionSpec {
        name: "middle",
        x0: 0.33,
        y0: 0.286,
        x1: 0.66,
        y1: 0.66,
    };
    pub const PROP_RIGHT: Self = RegionSpec {
        name: "right",
        x0: 0.66,
        y0: 0.286,
        x1: 1.0,
        y1: 0.66,
    };
    pub const PIXEL_TOP: Self = RegionSpec {
        name: "top",
        x0: 0.16,
        y0: 0.07,
        x1: 0.85,
        y1: 0.425,
    };
    pub const PIXEL_BOTTOM: Self = RegionSpec {
        name: "bottom",
        x0: 0.16,
        y0: 0.425,
        x1: 0.85,
        y1: 0.8,
    };

    /// Corners are truncated to whole pixels, top left of the frame is (0, 0).
    pub fn resolve(&self, width: i32, height: i32) -> Region {
        let (w, h) = (width as f64, height as f64);
        let ax = (self.x0 * w) as i32;
        let ay = (self.y0 * h) as i32;
        let bx = (self.x1 * w) as i32;
        let by = (self.y1 * h) as i32;
        let x = ax.min(bx);
        let y = ay.min(by);
        Region {
            name: self.name,
            rect: Rect::new(x, y, ax.max(bx) - x, ay.max(by) - y),
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Region {
    pub name: &'static str,
    pub rect: Rect,
}

impl Region {
    pub fn area(&self) -> f64 {
        self.rect.width as f64 * self.rect.height as f64
    }
}

/// Border colour in the frame's RGB channel order.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Self = Rgb(255, 0, 0);
    pub const GREEN: Self = Rgb(0, 255, 0);
    pub const BLUE: Self = Rgb(0, 0, 255);
    pub const YELLOW: Self = Rgb(255, 255, 0);
    pub const WHITE: Self = Rgb(255, 255, 255);

    pub fn scalar(&self) -> Scalar {
        Scalar::new(self.0 as f64, self.1 as f64, self.2 as f64, 0.0)
    }
}

/// Lifecycle hooks the host vision framework calls on every processor.
pub trait VisionProcessor {
    /// Called once the stream dimensions are known, before any frame.
    fn init(&mut self, width: i32, height: i32);

    /// Classify one RGB frame, annotating it in place.
    fn process_frame(
        &mut self,
        frame: &mut Mat,
        capture_time_nanos: i64,
    ) -> Result<Option<Overlay>, VisionError>;

    fn on_draw_frame(
        &self,
        canvas: &mut Mat,
        onscreen_width: i32,
        onscreen_height: i32,
        scale_bmp_px_to_canvas_px: f32,
        scale_canvas_density: f32,
        user_context: Option<&Overlay>,
    ) -> Result<(), VisionError> {
        match user_context {
            Some(overlay) => overlay.render(
                canvas,
                onscreen_width,
                onscreen_height,
                scale_bmp_px_to_canvas_px,
                scale_canvas_density,
            ),
            None => Ok(()),
        }
    }
}
