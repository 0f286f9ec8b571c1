use opencv::{core::Rect, imgproc::LINE_8, prelude::*};

use crate::app::VisionError;
use crate::vision::{Region, Rgb};

#[derive(PartialEq, Clone, Debug)]
pub struct Annotation {
    pub region: Region,
    pub colour: Rgb,
}

/// Outlines drawn on the last processed frame, handed back to the host as draw context.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Overlay {
    pub annotations: Vec<Annotation>,
}

impl Overlay {
    pub fn push(&mut self, region: Region, colour: Rgb) {
        self.annotations.push(Annotation { region, colour });
    }

    /// Colour a named region was outlined with, if it was drawn.
    pub fn colour_of(&self, name: &str) -> Option<Rgb> {
        self.annotations
            .iter()
            .find(|a| a.region.name == name)
            .map(|a| a.colour)
    }

    pub(crate) fn draw_on_frame(&self, frame: &mut Mat) -> Result<(), VisionError> {
        for a in &self.annotations {
            opencv::imgproc::rectangle(frame, a.region.rect, a.colour.scalar(), 1, LINE_8, 0)?;
        }
        Ok(())
    }

    /// Draw onto a display canvas whose pixels are `scale_bmp_px_to_canvas_px` times the frame's.
    pub fn render(
        &self,
        canvas: &mut Mat,
        onscreen_width: i32,
        onscreen_height: i32,
        scale_bmp_px_to_canvas_px: f32,
        scale_canvas_density: f32,
    ) -> Result<(), VisionError> {
        if canvas.empty() || onscreen_width <= 0 || onscreen_height <= 0 {
            return Ok(());
        }
        let scale = scale_bmp_px_to_canvas_px as f64;
        if scale <= 0.0 || !scale.is_finite() {
            log::warn!("Skipping overlay, bad canvas scale {}", scale);
            return Ok(());
        }
        let thickness = (scale_canvas_density.round() as i32).max(1);

        for a in &self.annotations {
            let r = a.region.rect;
            let scaled = Rect::new(
                (r.x as f64 * scale) as i32,
                (r.y as f64 * scale) as i32,
                (r.width as f64 * scale) as i32,
                (r.height as f64 * scale) as i32,
            );
            log::trace!("Overlay {} at {:?}", a.region.name, scaled);
            opencv::imgproc::rectangle(canvas, scaled, a.colour.scalar(), thickness, LINE_8, 0)?;
        }
        Ok(())
    }
}
