use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::app::VisionError;
use crate::vision::HsvRange;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

impl FromStr for Alliance {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(Alliance::Red),
            "blue" => Ok(Alliance::Blue),
            _ => Err(format!("unknown alliance '{}'", s)),
        }
    }
}

impl Alliance {
    pub fn prop_bands(&self) -> Vec<HsvRange> {
        match self {
            // Red wraps around hue 0 so needs both ends of the spectrum
            Alliance::Red => vec![HsvRange::RED_LOWER_SPECTRUM, HsvRange::RED_UPPER_SPECTRUM],
            Alliance::Blue => vec![HsvRange::BLUE],
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct TeamPropConfig {
    pub bands: Vec<HsvRange>,
    pub left_threshold: f64,
    pub middle_threshold: f64,
    pub right_threshold: f64,
    pub annotate: bool,
}

impl TeamPropConfig {
    pub fn for_alliance(alliance: Alliance) -> Self {
        Self {
            bands: alliance.prop_bands(),
            ..Default::default()
        }
    }
}

impl Default for TeamPropConfig {
    fn default() -> Self {
        Self {
            bands: Alliance::Red.prop_bands(),
            left_threshold: 0.01,
            middle_threshold: 0.01,
            right_threshold: 0.01,
            annotate: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct PixelConfig {
    pub green: HsvRange,
    pub blue: HsvRange,
    pub yellow: HsvRange,
    pub white: HsvRange,
    pub top_threshold: f64,
    pub bottom_threshold: f64,
    pub annotate: bool,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            green: HsvRange::GREEN,
            blue: HsvRange::BLUE,
            yellow: HsvRange::YELLOW,
            white: HsvRange::WHITE,
            top_threshold: 0.01,
            bottom_threshold: 0.01,
            annotate: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct ProcessorConfig {
    pub team_prop: TeamPropConfig,
    pub pixel: PixelConfig,
}

impl ProcessorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VisionError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ProcessorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VisionError> {
        let thresholds = [
            ("team_prop.left_threshold", self.team_prop.left_threshold),
            ("team_prop.middle_threshold", self.team_prop.middle_threshold),
            ("team_prop.right_threshold", self.team_prop.right_threshold),
            ("pixel.top_threshold", self.pixel.top_threshold),
            ("pixel.bottom_threshold", self.pixel.bottom_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(VisionError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.team_prop.bands.is_empty() {
            return Err(VisionError::Config(
                "team_prop.bands must not be empty".to_string(),
            ));
        }
        for band in &self.team_prop.bands {
            band.validate()?;
        }
        for band in [
            &self.pixel.green,
            &self.pixel.blue,
            &self.pixel.yellow,
            &self.pixel.white,
        ] {
            band.validate()?;
        }
        Ok(())
    }
}
