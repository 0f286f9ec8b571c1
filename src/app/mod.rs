use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

use opencv::{
    core::Vector,
    imgcodecs::IMREAD_COLOR,
    prelude::*,
    videoio::{CAP_ANY, VideoCapture},
};
use serde::Serialize;

mod config;
mod error;
mod main;

pub use config::{Alliance, PixelConfig, ProcessorConfig, TeamPropConfig};
pub use error::VisionError;
pub use main::main;

use crate::vision::{
    Overlay, PixelColour, PixelProcessor, PropLocation, TeamPropProcessor, VisionProcessor,
    compat,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProcessorKind {
    TeamProp,
    Pixel,
}

impl FromStr for ProcessorKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prop" | "team-prop" => Ok(ProcessorKind::TeamProp),
            "pixel" => Ok(ProcessorKind::Pixel),
            _ => Err(format!("unknown processor '{}'", s)),
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "kind")]
pub enum Detection {
    TeamProp {
        location: PropLocation,
        pos_num: i32,
    },
    Pixels {
        top: Option<PixelColour>,
        bottom: Option<PixelColour>,
    },
}

pub enum Processor {
    TeamProp(TeamPropProcessor),
    Pixel(PixelProcessor),
}

impl Processor {
    pub fn new(kind: ProcessorKind, config: &ProcessorConfig) -> Self {
        match kind {
            ProcessorKind::TeamProp => {
                Processor::TeamProp(TeamPropProcessor::new(config.team_prop.clone()))
            }
            ProcessorKind::Pixel => Processor::Pixel(PixelProcessor::new(config.pixel.clone())),
        }
    }

    pub fn vision(&mut self) -> &mut dyn VisionProcessor {
        match self {
            Processor::TeamProp(p) => p as &mut dyn VisionProcessor,
            Processor::Pixel(p) => p as &mut dyn VisionProcessor,
        }
    }

    pub fn detection(&self) -> Detection {
        match self {
            Processor::TeamProp(p) => Detection::TeamProp {
                location: p.prop_location(),
                pos_num: p.prop_location().pos_num(),
            },
            Processor::Pixel(p) => Detection::Pixels {
                top: p.top_colour(),
                bottom: p.bottom_colour(),
            },
        }
    }
}

/// Feeds recorded frames through a processor the way the robot's camera pipeline would.
pub struct Replay {
    processor: Processor,
    output_dir: Option<PathBuf>,
    size: Option<(i32, i32)>,
    started: Instant,
    frames: usize,
    last_overlay: Option<Overlay>,
}

impl Replay {
    pub fn new(processor: Processor, output_dir: Option<PathBuf>) -> Self {
        Self {
            processor,
            output_dir,
            size: None,
            started: Instant::now(),
            frames: 0,
            last_overlay: None,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Draw context returned for the most recent frame, `None` when annotation is off.
    pub fn last_overlay(&self) -> Option<&Overlay> {
        self.last_overlay.as_ref()
    }

    /// Process one RGB frame, calling init whenever the frame size changes.
    pub fn process(&mut self, frame: &mut Mat) -> Result<Detection, VisionError> {
        let size = (frame.cols(), frame.rows());
        if self.size != Some(size) {
            log::debug!("Initialising processor for {}x{}", size.0, size.1);
            self.processor.vision().init(size.0, size.1);
            self.size = Some(size);
        }
        let capture_time_nanos = self.started.elapsed().as_nanos() as i64;
        self.last_overlay = self
            .processor
            .vision()
            .process_frame(frame, capture_time_nanos)?;
        self.frames += 1;
        Ok(self.processor.detection())
    }

    pub fn run_image(&mut self, path: &Path) -> Result<Detection, VisionError> {
        let path_str = path.to_string_lossy();
        let bgr = opencv::imgcodecs::imread(&path_str, IMREAD_COLOR)?;
        if bgr.empty() {
            return Err(VisionError::InvalidFrame(format!(
                "could not read image {}",
                path_str
            )));
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "frame".to_string());
        self.run_bgr(&bgr, &stem)
    }

    pub fn run_video(&mut self, path: &Path) -> Result<Vec<Detection>, VisionError> {
        let path_str = path.to_string_lossy();
        log::info!("Opening video {}", path_str);
        let mut cap = VideoCapture::from_file(&path_str, CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(VisionError::InvalidFrame(format!(
                "could not open video {}",
                path_str
            )));
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        let mut results = Vec::new();
        let mut bgr = Mat::default();
        let mut index = 0;
        while cap.read(&mut bgr)? && !bgr.empty() {
            results.push(self.run_bgr(&bgr, &format!("{}_{:05}", stem, index))?);
            index += 1;
        }
        log::info!("Processed {} frames from {}", index, path_str);
        Ok(results)
    }

    fn run_bgr(&mut self, bgr: &Mat, label: &str) -> Result<Detection, VisionError> {
        let mut rgb = Mat::default();
        compat::cvt_color(bgr, &mut rgb, opencv::imgproc::COLOR_BGR2RGB)?;

        // Written frames are drawn through the display hook on an untouched copy
        let mut canvas = match self.output_dir {
            Some(_) => Some(rgb.try_clone()?),
            None => None,
        };

        let detection = self.process(&mut rgb)?;
        log::info!("{}: {:?}", label, detection);

        if let (Some(dir), Some(canvas)) = (&self.output_dir, canvas.as_mut()) {
            let (cols, rows) = (canvas.cols(), canvas.rows());
            self.processor.vision().on_draw_frame(
                canvas,
                cols,
                rows,
                1.0,
                1.0,
                self.last_overlay.as_ref(),
            )?;
            let mut annotated = Mat::default();
            compat::cvt_color(&*canvas, &mut annotated, opencv::imgproc::COLOR_RGB2BGR)?;
            let out = dir.join(format!("{}.png", label));
            opencv::imgcodecs::imwrite(&out.to_string_lossy(), &annotated, &Vector::new())?;
            log::debug!("Wrote {}", out.display());
        }
        Ok(detection)
    }
}
