use opencv::prelude::*;
use serde::Serialize;

use crate::app::{TeamPropConfig, VisionError};
use crate::vision::utils::MaskBuffers;
use crate::vision::{Overlay, Region, RegionSpec, Rgb, VisionProcessor, utils};

/// Spike mark the team prop was placed on.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum PropLocation {
    Left,
    Middle,
    Right,
    NotFound,
}

impl PropLocation {
    pub fn pos_num(&self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
            Self::NotFound => 0,
        }
    }

    /// A region only wins when it is strictly denser than both others and its own threshold.
    pub fn decide(densities: [f64; 3], thresholds: [f64; 3]) -> Self {
        let [left, middle, right] = densities;
        if left > middle && left > right && left > thresholds[0] {
            Self::Left
        } else if middle > left && middle > right && middle > thresholds[1] {
            Self::Middle
        } else if right > left && right > middle && right > thresholds[2] {
            Self::Right
        } else {
            Self::NotFound
        }
    }
}

struct PropRegions {
    left: Region,
    middle: Region,
    right: Region,
}

pub struct TeamPropProcessor {
    config: TeamPropConfig,
    regions: Option<PropRegions>,
    hsv: Mat,
    buffers: MaskBuffers,
    location: PropLocation,
}

impl TeamPropProcessor {
    pub fn new(config: TeamPropConfig) -> Self {
        Self {
            config,
            regions: None,
            hsv: Mat::default(),
            buffers: MaskBuffers::default(),
            location: PropLocation::NotFound,
        }
    }

    pub fn prop_location(&self) -> PropLocation {
        self.location
    }

    pub fn config(&self) -> &TeamPropConfig {
        &self.config
    }
}

impl Default for TeamPropProcessor {
    fn default() -> Self {
        TeamPropProcessor::new(TeamPropConfig::default())
    }
}

impl VisionProcessor for TeamPropProcessor {
    fn init(&mut self, width: i32, height: i32) {
        let regions = PropRegions {
            left: RegionSpec::PROP_LEFT.resolve(width, height),
            middle: RegionSpec::PROP_MIDDLE.resolve(width, height),
            right: RegionSpec::PROP_RIGHT.resolve(width, height),
        };
        log::debug!(
            "Prop regions for {}x{}: {:?} {:?} {:?}",
            width,
            height,
            regions.left.rect,
            regions.middle.rect,
            regions.right.rect
        );
        self.regions = Some(regions);
    }

    fn process_frame(
        &mut self,
        frame: &mut Mat,
        capture_time_nanos: i64,
    ) -> Result<Option<Overlay>, VisionError> {
        let regions = self.regions.as_ref().ok_or(VisionError::NotInitialised)?;
        let ordered = [regions.left, regions.middle, regions.right];
        utils::check_frame(frame)?;
        utils::check_regions(&ordered, frame)?;

        utils::rgb_to_hsv(frame, &mut self.hsv)?;
        utils::colour_mask(&self.hsv, &self.config.bands, &mut self.buffers)?;

        let mut densities = [0.0; 3];
        for (density, region) in densities.iter_mut().zip(ordered.iter()) {
            *density = utils::region_fraction(&self.buffers.mask, region)?;
        }
        log::debug!(
            "[{}] left = {:.4}, middle = {:.4}, right = {:.4}",
            capture_time_nanos,
            densities[0],
            densities[1],
            densities[2]
        );

        let thresholds = [
            self.config.left_threshold,
            self.config.middle_threshold,
            self.config.right_threshold,
        ];
        let location = PropLocation::decide(densities, thresholds);
        if location != self.location {
            log::info!("Team prop {:?} -> {:?}", self.location, location);
        }
        self.location = location;

        let winner = match location {
            PropLocation::Left => Some(0),
            PropLocation::Middle => Some(1),
            PropLocation::Right => Some(2),
            PropLocation::NotFound => None,
        };
        let mut overlay = Overlay::default();
        for (i, region) in ordered.into_iter().enumerate() {
            let colour = if winner == Some(i) {
                Rgb::GREEN
            } else {
                Rgb::RED
            };
            overlay.push(region, colour);
        }
        overlay.draw_on_frame(frame)?;

        Ok(self.config.annotate.then_some(overlay))
    }
}
