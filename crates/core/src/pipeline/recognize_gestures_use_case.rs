use std::path::Path;
use std::time::Instant;

use image::GrayImage;

use crate::detection::domain::face_locator::FaceLocator;
use crate::hands::domain::gesture_classifier::GestureClassifier;
use crate::hands::domain::hand::Hand;
use crate::hands::domain::hand_region_extractor::HandRegionExtractor;
use crate::pipeline::pipeline_logger::{metric, stage, PipelineLogger};
use crate::rendering::hand_annotator::HandAnnotator;
use crate::shared::error::RecognitionError;
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;
use crate::shared::recognition_config::RecognitionConfig;
use crate::skin::domain::skin_mask_builder::SkinMaskBuilder;
use crate::video::domain::frame_reader::FrameReader;

/// Hands recognized relative to one located face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceGestures {
    pub face: FaceRegion,
    pub hands: Vec<Hand>,
}

/// Everything recognized in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGestures {
    pub index: usize,
    pub faces: Vec<FaceGestures>,
    /// Hand visualization mask, when enabled.
    pub visualization: Option<GrayImage>,
}

impl FrameGestures {
    pub fn hands(&self) -> impl Iterator<Item = &Hand> {
        self.faces.iter().flat_map(|f| f.hands.iter())
    }
}

/// Per-frame gesture pipeline: locate → skin mask → extract → classify.
///
/// Frames are independent. Hand ids restart at 1 for every frame and run
/// across all of its faces.
pub struct RecognizeGesturesUseCase {
    locator: Box<dyn FaceLocator>,
    skin: SkinMaskBuilder,
    extractor: HandRegionExtractor,
    classifier: GestureClassifier,
    annotator: Option<HandAnnotator>,
    logger: Box<dyn PipelineLogger>,
}

impl RecognizeGesturesUseCase {
    pub fn new(
        locator: Box<dyn FaceLocator>,
        config: RecognitionConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            locator,
            skin: SkinMaskBuilder::new(config.skin),
            extractor: HandRegionExtractor::new(config.hands),
            classifier: GestureClassifier::new(config.gestures),
            annotator: None,
            logger,
        }
    }

    /// Also render a visualization mask for every frame.
    pub fn with_visualization(mut self) -> Self {
        self.annotator = Some(HandAnnotator::new());
        self
    }

    pub fn process_frame(
        &mut self,
        frame: &Frame,
    ) -> Result<FrameGestures, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let faces = self.locator.locate(&frame.to_gray())?;
        self.logger.timing(stage::LOCATE, elapsed_ms(t0));

        let mut canvas = self
            .annotator
            .as_ref()
            .map(|_| GrayImage::new(frame.width(), frame.height()));
        let mut next_id = 1;
        let mut results = Vec::with_capacity(faces.len());
        for face in faces {
            let t_face = Instant::now();
            match self.process_face(frame, &face, &mut next_id, canvas.as_mut()) {
                Ok(hands) => results.push(FaceGestures { face, hands }),
                Err(e) => log::warn!("Frame {}: skipping face {face:?}: {e}", frame.index()),
            }
            self.logger.timing(stage::FACE, elapsed_ms(t_face));
        }

        let gestures = FrameGestures {
            index: frame.index(),
            faces: results,
            visualization: canvas,
        };
        self.logger.metric(metric::FACES, gestures.faces.len() as f64);
        self.logger.metric(metric::HANDS, gestures.hands().count() as f64);
        Ok(gestures)
    }

    fn process_face(
        &mut self,
        frame: &Frame,
        face: &FaceRegion,
        next_id: &mut u32,
        canvas: Option<&mut GrayImage>,
    ) -> Result<Vec<Hand>, RecognitionError> {
        let t0 = Instant::now();
        let mask = self.skin.build(frame, face)?;
        self.logger.timing(stage::SKIN_MASK, elapsed_ms(t0));

        let t0 = Instant::now();
        let extraction = self.extractor.extract(&mask, face);
        self.logger.timing(stage::EXTRACT, elapsed_ms(t0));

        let t0 = Instant::now();
        let mut hands = Vec::with_capacity(extraction.candidates.len());
        for candidate in &extraction.candidates {
            let d = &candidate.descriptors;
            let state = match self.classifier.classify(d, face.height) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!(
                        "Frame {}: unclassifiable hand region at {:?}: {e}",
                        frame.index(),
                        d.center()
                    );
                    continue;
                }
            };
            let (cx, cy) = d.center();
            hands.push(Hand::new(cx as i32, cy as i32, *next_id).with_state(state));
            *next_id += 1;
        }
        self.logger.timing(stage::CLASSIFY, elapsed_ms(t0));

        if let (Some(annotator), Some(canvas)) = (&self.annotator, canvas) {
            annotator.annotate(canvas, &extraction);
        }
        Ok(hands)
    }

    /// Runs every frame of `input` through [`Self::process_frame`], handing
    /// each result to `on_frame`. Returns the number of frames processed.
    pub fn execute(
        &mut self,
        reader: &mut dyn FrameReader,
        input: &Path,
        mut on_frame: impl FnMut(FrameGestures) -> Result<(), Box<dyn std::error::Error>>,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let metadata = reader.open(input)?;
        let total = metadata.total_frames;
        self.logger.info(&format!(
            "Recognizing gestures in {} ({total} frames, {}x{})",
            input.display(),
            metadata.width,
            metadata.height
        ));

        let mut processed = 0;
        for frame in reader.frames() {
            let frame = frame?;
            let gestures = self.process_frame(&frame)?;
            on_frame(gestures)?;
            processed += 1;
            self.logger.progress(processed, total);
        }
        reader.close();
        self.logger.summary();
        Ok(processed)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
