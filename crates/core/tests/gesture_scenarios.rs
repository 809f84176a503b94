use std::f64::consts::PI;

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use rstest::rstest;

use palm_gesture_core::detection::infrastructure::fixed_face_locator::FixedFaceLocator;
use palm_gesture_core::hands::domain::gesture_classifier::GestureClassifier;
use palm_gesture_core::hands::domain::hand::{GestureState, Hand};
use palm_gesture_core::hands::domain::hand_region_extractor::HandRegionExtractor;
use palm_gesture_core::hands::domain::shape_descriptors::ShapeDescriptors;
use palm_gesture_core::pipeline::pipeline_logger::NullPipelineLogger;
use palm_gesture_core::pipeline::recognize_gestures_use_case::{
    FrameGestures, RecognizeGesturesUseCase,
};
use palm_gesture_core::shared::constants::{BACKGROUND, SKIN};
use palm_gesture_core::shared::face_region::FaceRegion;
use palm_gesture_core::shared::frame::Frame;
use palm_gesture_core::shared::recognition_config::{
    GestureThresholds, HandFilterParams, RecognitionConfig, SkinMaskParams,
};
use palm_gesture_core::skin::domain::skin_mask::SkinMask;
use palm_gesture_core::skin::domain::skin_mask_builder::SkinMaskBuilder;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const BACKDROP: [u8; 3] = [20, 40, 90];
const SKIN_TONE: [u8; 3] = [200, 150, 120];

/// Located face; the painted face patch extends a few pixels past the
/// sampling window so its statistics see a single tone.
const FACE: FaceRegion = FaceRegion {
    x: 250,
    y: 40,
    width: 100,
    height: 100,
};

fn in_face_patch(x: f64, y: f64) -> bool {
    (245.0..356.0).contains(&x) && (36.0..150.0).contains(&y)
}

/// Renders a frame with the face patch plus every pixel `blob` accepts.
fn scene(blob: impl Fn(f64, f64) -> bool) -> Frame {
    let mut data = Vec::with_capacity((WIDTH * HEIGHT) as usize * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let (fx, fy) = (x as f64, y as f64);
            let skin = in_face_patch(fx, fy) || blob(fx, fy);
            data.extend_from_slice(if skin { &SKIN_TONE } else { &BACKDROP });
        }
    }
    Frame::new(data, WIDTH, HEIGHT, 0)
}

fn ellipse(cx: f64, cy: f64, a: f64, b: f64) -> impl Fn(f64, f64) -> bool {
    move |x, y| ((x - cx) / a).powi(2) + ((y - cy) / b).powi(2) <= 1.0
}

fn disc(cx: f64, cy: f64, r: f64) -> impl Fn(f64, f64) -> bool {
    ellipse(cx, cy, r, r)
}

/// Five-lobed star: r(θ) = base + amplitude·cos(5θ).
fn star(cx: f64, cy: f64, base: f64, amplitude: f64) -> impl Fn(f64, f64) -> bool {
    move |x, y| {
        let (dx, dy) = (x - cx, y - cy);
        let theta = dy.atan2(dx);
        (dx * dx + dy * dy).sqrt() <= base + amplitude * (5.0 * theta).cos()
    }
}

fn recognize(frame: &Frame) -> FrameGestures {
    let mut use_case = RecognizeGesturesUseCase::new(
        Box::new(FixedFaceLocator::new(vec![FACE])),
        RecognitionConfig::default(),
        Box::new(NullPipelineLogger),
    );
    use_case.process_frame(frame).unwrap()
}

fn hands(frame: &Frame) -> Vec<Hand> {
    recognize(frame).hands().copied().collect()
}

// ── end-to-end scenarios ──

#[test]
fn elliptical_blob_yields_one_hand_at_its_centroid() {
    let frame = scene(ellipse(160.0, 300.0, 75.0, 60.0));
    let found = hands(&frame);
    assert_eq!(found.len(), 1);
    let hand = found[0];
    assert_eq!(hand.id, 1);
    assert!((hand.x - 160).abs() <= 2, "x = {}", hand.x);
    assert!((hand.y - 300).abs() <= 2, "y = {}", hand.y);
    assert_ne!(hand.state, GestureState::Unknown);
}

#[test]
fn five_lobed_star_is_spread_palm() {
    let frame = scene(star(180.0, 300.0, 70.0, 35.0));
    let found = hands(&frame);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].state, GestureState::SpreadPalm);
}

#[test]
fn round_blob_is_open_palm() {
    let frame = scene(disc(150.0, 300.0, 70.0));
    let found = hands(&frame);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].state, GestureState::OpenPalm);
}

#[test]
fn blob_below_radius_gate_yields_no_hands() {
    // radius 0.4 × face height
    let frame = scene(disc(150.0, 300.0, 40.0));
    assert!(hands(&frame).is_empty());
}

#[test]
fn face_alone_yields_no_hands() {
    assert!(hands(&scene(|_, _| false)).is_empty());
}

#[test]
fn hand_ids_are_unique_within_a_frame() {
    let left = disc(130.0, 330.0, 70.0);
    let right = disc(500.0, 330.0, 70.0);
    let frame = scene(move |x, y| left(x, y) || right(x, y));
    let ids: Vec<u32> = hands(&frame).iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn recognition_is_repeatable_on_the_same_frame() {
    let frame = scene(star(180.0, 300.0, 70.0, 35.0));
    let original = frame.clone();
    let first = recognize(&frame);
    let second = recognize(&frame);
    assert_eq!(first, second);
    assert_eq!(frame, original);
}

// ── closed palm ──

#[test]
fn elongated_cap_blob_is_closed_palm() {
    // top of a tall ellipse whose lower part is cut off
    let cap = ellipse(150.0, 440.0, 60.0, 200.0);
    let frame = scene(move |x, y| y <= 330.0 && cap(x, y));
    let found = hands(&frame);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].state, GestureState::ClosedPalm);
    assert!((found[0].x - 150).abs() <= 2, "x = {}", found[0].x);
}

#[test]
fn elongated_cap_classifies_as_closed_palm() {
    // Top cap of a tall ellipse: the fitted ellipse keeps the full height
    // while the enclosing circle only spans the cap.
    let cap: Vec<Point<i32>> = (0..=80)
        .map(|i| {
            let t = (30.0 + 120.0 * i as f64 / 80.0) * PI / 180.0;
            Point::new(
                (320.0 + 60.0 * t.cos()).round() as i32,
                (240.0 - 200.0 * t.sin()).round() as i32,
            )
        })
        .collect();
    let descriptors = ShapeDescriptors::describe(&cap).unwrap();
    assert!(descriptors.radius() < 80.0);
    let classifier = GestureClassifier::new(GestureThresholds::default());
    assert_eq!(
        classifier.classify(&descriptors, 100).unwrap(),
        GestureState::ClosedPalm
    );
}

// ── classification totality ──

#[test]
fn concave_pentagon_is_classified() {
    let pentagon = [(243, 262), (198, 326), (85, 283), (146, 168), (169, 232)]
        .map(|(x, y)| Point::new(x, y));
    let mut image = GrayImage::new(WIDTH, HEIGHT);
    draw_polygon_mut(&mut image, &pentagon, Luma([SKIN]));
    let mask = SkinMask::from_gray(image);

    let extraction = HandRegionExtractor::new(HandFilterParams::default()).extract(&mask, &FACE);
    assert_eq!(extraction.candidates.len(), 1);
    let descriptors = &extraction.candidates[0].descriptors;
    assert!(descriptors.ellipse.is_some());

    let classifier = GestureClassifier::new(GestureThresholds::default());
    let state = classifier.classify(descriptors, FACE.height).unwrap();
    assert_ne!(state, GestureState::Unknown);
}

#[test]
fn accepted_candidates_always_classify() {
    let shapes: [Box<dyn Fn(f64, f64) -> bool>; 3] = [
        Box::new(star(180.0, 300.0, 70.0, 35.0)),
        Box::new(ellipse(160.0, 300.0, 75.0, 60.0)),
        Box::new(star(470.0, 320.0, 80.0, 20.0)),
    ];
    let builder = SkinMaskBuilder::new(SkinMaskParams::default());
    let extractor = HandRegionExtractor::new(HandFilterParams::default());
    let classifier = GestureClassifier::new(GestureThresholds::default());
    for shape in &shapes {
        let mask = builder.build(&scene(shape), &FACE).unwrap();
        for candidate in extractor.extract(&mask, &FACE).candidates {
            assert!(classifier.classify(&candidate.descriptors, FACE.height).is_ok());
        }
    }
}

// ── skin mask properties ──

#[rstest]
#[case::face_only(scene(|_, _| false))]
#[case::with_star(scene(star(180.0, 300.0, 70.0, 35.0)))]
fn skin_mask_matches_frame_and_is_binary(#[case] frame: Frame) {
    let mask = SkinMaskBuilder::new(SkinMaskParams::default())
        .build(&frame, &FACE)
        .unwrap();
    assert_eq!((mask.width(), mask.height()), (frame.width(), frame.height()));
    assert!(mask
        .as_image()
        .pixels()
        .all(|p| p.0[0] == SKIN || p.0[0] == BACKGROUND));
}

#[test]
fn tightened_region_stays_inside_face() {
    let tighten = SkinMaskParams::default().tighten;
    for x in (0..600).step_by(37) {
        for size in [2, 7, 60, 133, 300] {
            let face = FaceRegion::new(x, x / 3, size, size + 11);
            // the scaled origin can slide past a narrow face entirely
            let Some(t) = face.tightened(tighten) else {
                continue;
            };
            assert!(t.x >= face.x && t.y >= face.y, "{face:?} -> {t:?}");
            assert!(t.right() <= face.right() && t.bottom() <= face.bottom());
        }
    }
}

// ── radius gate ──

/// Filled diamond |dx| + |dy| <= r; its enclosing radius is exactly `r`.
fn diamond_mask(cx: i32, cy: i32, r: i32) -> SkinMask {
    let mut image = GrayImage::new(WIDTH, HEIGHT);
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            if (x - cx).abs() + (y - cy).abs() <= r {
                image.put_pixel(x as u32, y as u32, Luma([SKIN]));
            }
        }
    }
    SkinMask::from_gray(image)
}

#[rstest]
#[case::at_lower_bound(120, 0)]
#[case::above_lower_bound(119, 1)]
#[case::at_upper_bound(40, 0)]
#[case::below_upper_bound(41, 1)]
fn radius_gate_is_exclusive(#[case] face_height: i32, #[case] expected: usize) {
    let mask = diamond_mask(150, 250, 60);
    let face = FaceRegion::new(560, 10, 30, face_height);
    let extraction = HandRegionExtractor::new(HandFilterParams::default()).extract(&mask, &face);
    assert_eq!(extraction.regions.len(), expected);
}
