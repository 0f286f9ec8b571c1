use centerstage_vision::app::{
    Alliance, Detection, Processor, ProcessorConfig, ProcessorKind, Replay, TeamPropConfig,
    VisionError,
};
use centerstage_vision::vision::{
    PixelColour, PixelProcessor, PropLocation, Rgb, TeamPropProcessor, VisionProcessor,
};
use opencv::{
    core::{CV_8UC3, Rect, Scalar, Vec3b, VecN, Vector},
    imgproc::{FILLED, LINE_8},
    prelude::*,
};

fn frame(width: i32, height: i32) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap()
}

fn fill(frame: &mut Mat, rect: Rect, colour: Rgb) {
    opencv::imgproc::rectangle(frame, rect, colour.scalar(), FILLED, LINE_8, 0).unwrap();
}

fn write_bgr(dir: &std::path::Path, name: &str, rgb: &Mat) -> std::path::PathBuf {
    let mut bgr = Mat::default();
    opencv::imgproc::cvt_color_def(rgb, &mut bgr, opencv::imgproc::COLOR_RGB2BGR).unwrap();
    let path = dir.join(name);
    assert!(opencv::imgcodecs::imwrite(&path.to_string_lossy(), &bgr, &Vector::new()).unwrap());
    path
}

#[test]
fn prop_in_each_third() {
    let cases = [
        (Rect::new(20, 80, 40, 40), PropLocation::Left),
        (Rect::new(130, 80, 40, 40), PropLocation::Middle),
        (Rect::new(230, 80, 40, 40), PropLocation::Right),
    ];
    for (rect, expected) in cases {
        let mut processor = TeamPropProcessor::default();
        processor.init(300, 200);
        let mut f = frame(300, 200);
        fill(&mut f, rect, Rgb(255, 0, 0));

        processor.process_frame(&mut f, 0).unwrap();
        assert_eq!(processor.prop_location(), expected);
    }
}

#[test]
fn equal_props_in_two_regions_not_found() {
    let mut processor = TeamPropProcessor::default();
    processor.init(300, 200);
    let mut f = frame(300, 200);
    fill(&mut f, Rect::new(20, 80, 40, 40), Rgb(255, 0, 0));
    fill(&mut f, Rect::new(230, 80, 40, 40), Rgb(255, 0, 0));

    processor.process_frame(&mut f, 0).unwrap();
    assert_eq!(processor.prop_location(), PropLocation::NotFound);
}

#[test]
fn prop_outside_band_of_interest_ignored() {
    // Red above and below the spike marks is out of every region
    let mut processor = TeamPropProcessor::default();
    processor.init(300, 200);
    let mut f = frame(300, 200);
    fill(&mut f, Rect::new(0, 0, 300, 50), Rgb(255, 0, 0));
    fill(&mut f, Rect::new(0, 140, 300, 60), Rgb(255, 0, 0));

    processor.process_frame(&mut f, 0).unwrap();
    assert_eq!(processor.prop_location(), PropLocation::NotFound);
}

#[test]
fn frame_is_annotated_in_place() {
    let mut processor = TeamPropProcessor::default();
    processor.init(300, 200);
    let mut f = frame(300, 200);
    fill(&mut f, Rect::new(20, 80, 40, 40), Rgb(255, 0, 0));
    processor.process_frame(&mut f, 0).unwrap();

    // Top left corner of the middle region, outlined red
    let corner: Vec3b = *f.at_2d::<Vec3b>(57, 150).unwrap();
    assert_eq!(corner, VecN([255, 0, 0]));
    // Left region outlined green
    let left_edge: Vec3b = *f.at_2d::<Vec3b>(100, 0).unwrap();
    assert_eq!(left_edge, VecN([0, 255, 0]));
}

#[test]
fn overlay_drawn_through_trait_hook() {
    let mut processor = PixelProcessor::default();
    processor.init(300, 200);
    let mut f = frame(300, 200);
    fill(&mut f, Rect::new(100, 30, 40, 40), Rgb(0, 0, 255));
    let overlay = processor.process_frame(&mut f, 0).unwrap();
    assert_eq!(processor.top_colour(), Some(PixelColour::Blue));

    let mut canvas = frame(600, 400);
    processor
        .on_draw_frame(&mut canvas, 600, 400, 2.0, 1.0, overlay.as_ref())
        .unwrap();
    // Top region starts at (48, 14) in the frame, doubled on the canvas
    let corner: Vec3b = *canvas.at_2d::<Vec3b>(28, 96).unwrap();
    assert_eq!(corner, VecN([0, 0, 255]));

    let mut untouched = frame(600, 400);
    processor
        .on_draw_frame(&mut untouched, 600, 400, 2.0, 1.0, None)
        .unwrap();
    let sum = opencv::core::sum_elems(&untouched).unwrap();
    assert_eq!((sum[0], sum[1], sum[2]), (0.0, 0.0, 0.0));
}

#[test]
fn replay_images_and_write_annotations() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let mut left = frame(320, 240);
    fill(&mut left, Rect::new(30, 100, 50, 50), Rgb(220, 20, 20));
    let left_path = write_bgr(input.path(), "left.png", &left);

    let mut right = frame(320, 240);
    fill(&mut right, Rect::new(240, 100, 50, 50), Rgb(220, 20, 20));
    let right_path = write_bgr(input.path(), "right.png", &right);

    let config = ProcessorConfig::default();
    let mut replay = Replay::new(
        Processor::new(ProcessorKind::TeamProp, &config),
        Some(output.path().to_path_buf()),
    );

    let first = replay.run_image(&left_path).unwrap();
    let second = replay.run_image(&right_path).unwrap();

    assert_eq!(
        first,
        Detection::TeamProp {
            location: PropLocation::Left,
            pos_num: 1
        }
    );
    assert_eq!(
        second,
        Detection::TeamProp {
            location: PropLocation::Right,
            pos_num: 3
        }
    );
    assert_eq!(replay.frames(), 2);
    assert!(output.path().join("left.png").exists());
    assert!(output.path().join("right.png").exists());
}

fn left_prop_image(dir: &std::path::Path) -> std::path::PathBuf {
    let mut left = frame(320, 240);
    fill(&mut left, Rect::new(30, 100, 50, 50), Rgb(220, 20, 20));
    write_bgr(dir, "left.png", &left)
}

#[test]
fn written_frames_carry_rendered_overlay() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let path = left_prop_image(input.path());

    let mut replay = Replay::new(
        Processor::new(ProcessorKind::TeamProp, &ProcessorConfig::default()),
        Some(output.path().to_path_buf()),
    );
    replay.run_image(&path).unwrap();
    let overlay = replay.last_overlay().unwrap();
    assert_eq!(overlay.colour_of("left"), Some(Rgb::GREEN));

    let written = opencv::imgcodecs::imread(
        &output.path().join("left.png").to_string_lossy(),
        opencv::imgcodecs::IMREAD_COLOR,
    )
    .unwrap();
    // Left region spans rows 68..158 from column 0 in a 320x240 frame
    let left_edge: Vec3b = *written.at_2d::<Vec3b>(100, 0).unwrap();
    assert_eq!(left_edge, VecN([0, 255, 0]));
    // Middle region outlined red, stored BGR on disk
    let middle_corner: Vec3b = *written.at_2d::<Vec3b>(68, 150).unwrap();
    assert_eq!(middle_corner, VecN([0, 0, 255]));
}

#[test]
fn written_frames_plain_when_annotation_off() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let path = left_prop_image(input.path());

    let mut config = ProcessorConfig::default();
    config.team_prop.annotate = false;
    let mut replay = Replay::new(
        Processor::new(ProcessorKind::TeamProp, &config),
        Some(output.path().to_path_buf()),
    );
    assert_eq!(
        replay.run_image(&path).unwrap(),
        Detection::TeamProp {
            location: PropLocation::Left,
            pos_num: 1
        }
    );
    assert!(replay.last_overlay().is_none());

    let written = opencv::imgcodecs::imread(
        &output.path().join("left.png").to_string_lossy(),
        opencv::imgcodecs::IMREAD_COLOR,
    )
    .unwrap();
    let left_edge: Vec3b = *written.at_2d::<Vec3b>(100, 0).unwrap();
    assert_eq!(left_edge, VecN([0, 0, 0]));
}

#[test]
fn replay_reinitialises_on_size_change() {
    let mut replay = Replay::new(
        Processor::new(ProcessorKind::Pixel, &ProcessorConfig::default()),
        None,
    );

    let mut small = frame(300, 200);
    fill(&mut small, Rect::new(100, 100, 40, 40), Rgb(255, 255, 0));
    let mut large = frame(640, 480);
    fill(&mut large, Rect::new(200, 60, 80, 80), Rgb(0, 255, 0));

    assert_eq!(
        replay.process(&mut small).unwrap(),
        Detection::Pixels {
            top: None,
            bottom: Some(PixelColour::Yellow)
        }
    );
    assert_eq!(
        replay.process(&mut large).unwrap(),
        Detection::Pixels {
            top: Some(PixelColour::Green),
            bottom: None
        }
    );
}

#[test]
fn replay_missing_image_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut replay = Replay::new(
        Processor::new(ProcessorKind::TeamProp, &ProcessorConfig::default()),
        None,
    );
    assert!(matches!(
        replay.run_image(&dir.path().join("nothing.png")),
        Err(VisionError::InvalidFrame(_))
    ));
    assert_eq!(replay.frames(), 0);
}

#[test]
fn blue_alliance_replay() {
    let config = ProcessorConfig {
        team_prop: TeamPropConfig::for_alliance(Alliance::Blue),
        ..Default::default()
    };
    let mut replay = Replay::new(Processor::new(ProcessorKind::TeamProp, &config), None);

    let mut f = frame(300, 200);
    fill(&mut f, Rect::new(130, 80, 40, 40), Rgb(0, 0, 255));
    fill(&mut f, Rect::new(20, 80, 40, 40), Rgb(255, 0, 0));

    assert_eq!(
        replay.process(&mut f).unwrap(),
        Detection::TeamProp {
            location: PropLocation::Middle,
            pos_num: 2
        }
    );
}
