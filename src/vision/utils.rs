use opencv::{
    core::{CV_8UC1, CV_8UC3, Vector},
    prelude::*,
};

use crate::app::VisionError;
use crate::vision::{HsvRange, Region, compat};

pub(crate) fn check_frame(frame: &Mat) -> Result<(), VisionError> {
    if frame.empty() {
        return Err(VisionError::InvalidFrame("frame is empty".to_string()));
    }
    if frame.typ() != CV_8UC3 {
        return Err(VisionError::InvalidFrame(format!(
            "expected 8-bit 3 channel frame, got type {}",
            frame.typ()
        )));
    }
    Ok(())
}

pub(crate) fn check_regions(regions: &[Region], frame: &Mat) -> Result<(), VisionError> {
    let (cols, rows) = (frame.cols(), frame.rows());
    for region in regions {
        let r = region.rect;
        if r.x < 0 || r.y < 0 || r.x + r.width > cols || r.y + r.height > rows {
            return Err(VisionError::RegionOutOfBounds {
                region: region.name,
                frame_width: cols,
                frame_height: rows,
            });
        }
    }
    Ok(())
}

pub(crate) fn rgb_to_hsv(frame: &Mat, hsv: &mut Mat) -> Result<(), VisionError> {
    compat::cvt_color(frame, hsv, opencv::imgproc::COLOR_RGB2HSV)?;
    Ok(())
}

/// Per-processor scratch Mats kept across frames.
#[derive(Default)]
pub(crate) struct MaskBuffers {
    pub mask: Mat,
    band: Mat,
    spare: Mat,
}

/// Leaves `buffers.mask` white (255) where a pixel falls in any of the bands, black (0) elsewhere.
pub(crate) fn colour_mask(
    hsv: &Mat,
    bands: &[HsvRange],
    buffers: &mut MaskBuffers,
) -> Result<(), VisionError> {
    let Some((first, rest)) = bands.split_first() else {
        buffers.mask = Mat::zeros(hsv.rows(), hsv.cols(), CV_8UC1)?.to_mat()?;
        return Ok(());
    };

    in_range(hsv, first, &mut buffers.mask)?;
    for band in rest {
        in_range(hsv, band, &mut buffers.band)?;
        opencv::core::bitwise_or(
            &buffers.mask,
            &buffers.band,
            &mut buffers.spare,
            &opencv::core::no_array(),
        )?;
        std::mem::swap(&mut buffers.mask, &mut buffers.spare);
    }
    Ok(())
}

fn in_range(hsv: &Mat, band: &HsvRange, dst: &mut Mat) -> Result<(), VisionError> {
    let lower = Vector::from_slice(&band.low);
    let upper = Vector::from_slice(&band.high);
    opencv::core::in_range(hsv, &lower, &upper, dst)?;
    Ok(())
}

/// Proportion of white pixels of `mask` inside `region`.
pub(crate) fn region_fraction(mask: &Mat, region: &Region) -> Result<f64, VisionError> {
    let area = region.area();
    if area <= 0.0 {
        return Ok(0.0);
    }
    let sub = mask.roi(region.rect)?.clone_pointee();
    let sum = opencv::core::sum_elems(&sub)?;
    log::trace!("{} sum = {} over {} px", region.name, sum[0], area);
    Ok((sum[0] / 255.0) / area)
}
