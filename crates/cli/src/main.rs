use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde_json::json;

use palm_gesture_core::detection::domain::face_locator::FaceLocator;
use palm_gesture_core::detection::infrastructure::fixed_face_locator::FixedFaceLocator;
use palm_gesture_core::detection::infrastructure::model_resolver::{self, SEETA_FRONTAL};
use palm_gesture_core::detection::infrastructure::rustface_locator::RustfaceLocator;
use palm_gesture_core::hands::domain::hand::GestureState;
use palm_gesture_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use palm_gesture_core::pipeline::recognize_gestures_use_case::{
    FrameGestures, RecognizeGesturesUseCase,
};
use palm_gesture_core::shared::constants::{MAX_FACE_SIZE, MIN_FACE_SIZE};
use palm_gesture_core::shared::face_region::FaceRegion;
use palm_gesture_core::shared::recognition_config::RecognitionConfig;
use palm_gesture_core::video::domain::image_writer::ImageWriter;
use palm_gesture_core::video::infrastructure::image_file_writer::ImageFileWriter;
use palm_gesture_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Palm gesture recognition on still images and frame sequences.
#[derive(Parser)]
#[command(name = "palm-gesture")]
struct Cli {
    /// Input image file, or a directory of frames read in file-name order.
    input: PathBuf,

    /// Write a hand visualization mask per frame into this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip face location and use this rectangle: X,Y,W,H.
    #[arg(long, value_parser = parse_face)]
    face: Option<FaceRegion>,

    /// JSON file overriding recognition thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// SeetaFace model file (downloaded and cached when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Smallest face searched for, in pixels.
    #[arg(long, default_value_t = MIN_FACE_SIZE)]
    min_face_size: u32,

    /// Faces larger than this are ignored, in pixels.
    #[arg(long, default_value_t = MAX_FACE_SIZE)]
    max_face_size: u32,

    /// Print one JSON object per frame instead of text.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = match &cli.config {
        Some(path) => RecognitionConfig::load(path)?,
        None => RecognitionConfig::default(),
    };
    let locator = build_locator(&cli)?;

    let mut use_case =
        RecognizeGesturesUseCase::new(locator, config, Box::new(StdoutPipelineLogger::default()));
    if cli.output_dir.is_some() {
        use_case = use_case.with_visualization();
    }

    let writer = ImageFileWriter::new();
    let mut reader = ImageSequenceReader::new();
    let processed = use_case.execute(&mut reader, &cli.input, |gestures| {
        report(&gestures, cli.json);
        if let (Some(dir), Some(mask)) = (&cli.output_dir, &gestures.visualization) {
            writer.write(&visualization_path(dir, gestures.index), mask)?;
        }
        Ok(())
    })?;

    log::info!("Processed {processed} frames");
    if let Some(dir) = &cli.output_dir {
        log::info!("Visualizations written to {}", dir.display());
    }
    Ok(())
}

fn build_locator(cli: &Cli) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    if let Some(face) = cli.face {
        log::info!("Using fixed face rectangle {face:?}");
        return Ok(Box::new(FixedFaceLocator::new(vec![face])));
    }

    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {}", SEETA_FRONTAL.file_name);
            let path = model_resolver::resolve(
                SEETA_FRONTAL,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };
    let locator = RustfaceLocator::from_file(&model_path)?
        .with_face_size_range(cli.min_face_size, cli.max_face_size)?;
    Ok(Box::new(locator))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if let Some(model) = &cli.model {
        if !model.is_file() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if cli.min_face_size == 0 || cli.min_face_size > cli.max_face_size {
        return Err(format!(
            "Face size bounds must satisfy 0 < min <= max, got {}..{}",
            cli.min_face_size, cli.max_face_size
        )
        .into());
    }
    if let Some(face) = cli.face {
        if face.is_degenerate() {
            return Err(format!("Face rectangle must have a positive size, got {face:?}").into());
        }
    }
    Ok(())
}

fn report(gestures: &FrameGestures, as_json: bool) {
    if as_json {
        println!("{}", frame_json(gestures));
        return;
    }
    for hand in gestures.hands() {
        println!(
            "frame {:05}: hand {} at ({}, {}) {}",
            gestures.index,
            hand.id,
            hand.x,
            hand.y,
            gesture_label(hand.state)
        );
    }
}

fn frame_json(gestures: &FrameGestures) -> serde_json::Value {
    let faces: Vec<_> = gestures
        .faces
        .iter()
        .map(|f| {
            let hands: Vec<_> = f
                .hands
                .iter()
                .map(|h| {
                    json!({
                        "id": h.id,
                        "x": h.x,
                        "y": h.y,
                        "state": gesture_label(h.state),
                    })
                })
                .collect();
            json!({ "face": f.face, "hands": hands })
        })
        .collect();
    json!({ "frame": gestures.index, "faces": faces })
}

fn gesture_label(state: GestureState) -> &'static str {
    match state {
        GestureState::Unknown => "UNKNOWN",
        GestureState::OpenPalm => "OPEN_PALM",
        GestureState::SpreadPalm => "SPREAD_PALM",
        GestureState::ClosedPalm => "CLOSED_PALM",
    }
}

fn visualization_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

fn parse_face(value: &str) -> Result<FaceRegion, String> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("expected X,Y,W,H integers: {e}"))?;
    match parts[..] {
        [x, y, w, h] => Ok(FaceRegion::new(x, y, w, h)),
        _ => Err(format!("expected 4 values X,Y,W,H, got {}", parts.len())),
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face model... {pct}%");
    } else {
        eprint!("\rDownloading face model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palm_gesture_core::hands::domain::hand::Hand;
    use palm_gesture_core::pipeline::recognize_gestures_use_case::FaceGestures;

    #[test]
    fn test_parse_face() {
        assert_eq!(
            parse_face("250, 40,100,120"),
            Ok(FaceRegion::new(250, 40, 100, 120))
        );
        assert!(parse_face("1,2,3").is_err());
        assert!(parse_face("a,b,c,d").is_err());
    }

    #[test]
    fn test_labels_are_owned_by_the_binary() {
        assert_eq!(gesture_label(GestureState::SpreadPalm), "SPREAD_PALM");
        assert_eq!(gesture_label(GestureState::ClosedPalm), "CLOSED_PALM");
    }

    #[test]
    fn test_frame_json_layout() {
        let gestures = FrameGestures {
            index: 3,
            faces: vec![FaceGestures {
                face: FaceRegion::new(1, 2, 3, 4),
                hands: vec![Hand::new(10, 20, 1).with_state(GestureState::OpenPalm)],
            }],
            visualization: None,
        };
        let value = frame_json(&gestures);
        assert_eq!(value["frame"], 3);
        assert_eq!(value["faces"][0]["face"]["width"], 3);
        assert_eq!(value["faces"][0]["hands"][0]["state"], "OPEN_PALM");
        assert_eq!(value["faces"][0]["hands"][0]["x"], 10);
    }

    #[test]
    fn test_visualization_path_is_zero_padded() {
        assert_eq!(
            visualization_path(Path::new("out"), 7),
            PathBuf::from("out/frame_00007.png")
        );
    }
}
