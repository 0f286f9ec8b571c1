use opencv::prelude::*;
use serde::Serialize;

use crate::app::{PixelConfig, VisionError};
use crate::vision::utils::MaskBuffers;
use crate::vision::{HsvRange, Overlay, Region, RegionSpec, Rgb, VisionProcessor, utils};

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum PixelColour {
    Green,
    Blue,
    Yellow,
    White,
}

impl PixelColour {
    /// Order colours are tried in, first match wins.
    pub const SEARCH_ORDER: [PixelColour; 4] = [
        PixelColour::Green,
        PixelColour::Blue,
        PixelColour::Yellow,
        PixelColour::White,
    ];

    pub fn border(&self) -> Rgb {
        match self {
            Self::Green => Rgb::GREEN,
            Self::Blue => Rgb::BLUE,
            Self::Yellow => Rgb::YELLOW,
            Self::White => Rgb::WHITE,
        }
    }

    fn range(&self, config: &PixelConfig) -> HsvRange {
        match self {
            Self::Green => config.green,
            Self::Blue => config.blue,
            Self::Yellow => config.yellow,
            Self::White => config.white,
        }
    }
}

/// Classifies the pixels held in the top and bottom intake slots.
pub struct PixelProcessor {
    config: PixelConfig,
    regions: Option<(Region, Region)>,
    hsv: Mat,
    buffers: MaskBuffers,
    top: Option<PixelColour>,
    bottom: Option<PixelColour>,
}

impl PixelProcessor {
    pub fn new(config: PixelConfig) -> Self {
        Self {
            config,
            regions: None,
            hsv: Mat::default(),
            buffers: MaskBuffers::default(),
            top: None,
            bottom: None,
        }
    }

    pub fn top_colour(&self) -> Option<PixelColour> {
        self.top
    }

    pub fn bottom_colour(&self) -> Option<PixelColour> {
        self.bottom
    }

    pub fn config(&self) -> &PixelConfig {
        &self.config
    }

    fn classify(
        &mut self,
        region: &Region,
        threshold: f64,
    ) -> Result<Option<PixelColour>, VisionError> {
        for colour in PixelColour::SEARCH_ORDER {
            let range = colour.range(&self.config);
            utils::colour_mask(&self.hsv, &[range], &mut self.buffers)?;
            let density = utils::region_fraction(&self.buffers.mask, region)?;
            log::debug!("{} {:?} = {:.4}", region.name, colour, density);
            if density > threshold {
                return Ok(Some(colour));
            }
        }
        Ok(None)
    }
}

impl Default for PixelProcessor {
    fn default() -> Self {
        PixelProcessor::new(PixelConfig::default())
    }
}

impl VisionProcessor for PixelProcessor {
    fn init(&mut self, width: i32, height: i32) {
        let top = RegionSpec::PIXEL_TOP.resolve(width, height);
        let bottom = RegionSpec::PIXEL_BOTTOM.resolve(width, height);
        log::debug!(
            "Pixel regions for {}x{}: {:?} {:?}",
            width,
            height,
            top.rect,
            bottom.rect
        );
        self.regions = Some((top, bottom));
    }

    fn process_frame(
        &mut self,
        frame: &mut Mat,
        capture_time_nanos: i64,
    ) -> Result<Option<Overlay>, VisionError> {
        let (top_region, bottom_region) = self.regions.ok_or(VisionError::NotInitialised)?;
        utils::check_frame(frame)?;
        utils::check_regions(&[top_region, bottom_region], frame)?;

        utils::rgb_to_hsv(frame, &mut self.hsv)?;

        let top = self.classify(&top_region, self.config.top_threshold)?;
        let bottom = self.classify(&bottom_region, self.config.bottom_threshold)?;
        if (top, bottom) != (self.top, self.bottom) {
            log::info!(
                "[{}] Pixels top = {:?}, bottom = {:?}",
                capture_time_nanos,
                top,
                bottom
            );
        }
        self.top = top;
        self.bottom = bottom;

        let mut overlay = Overlay::default();
        overlay.push(top_region, top.map_or(Rgb::RED, |c| c.border()));
        overlay.push(bottom_region, bottom.map_or(Rgb::RED, |c| c.border()));
        overlay.draw_on_frame(frame)?;

        Ok(self.config.annotate.then_some(overlay))
    }
}
