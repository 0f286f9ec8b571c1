use opencv::core::ToInputArray;
use opencv::core::ToOutputArray;

/// Colour conversion without the trailing parameters that differ between OpenCV releases.
pub fn cvt_color(
    src: &impl ToInputArray,
    dst: &mut impl ToOutputArray,
    code: i32,
) -> Result<(), opencv::Error> {
    opencv::imgproc::cvt_color_def(src, dst, code)
}
