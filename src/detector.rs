// src/detector.rs - Black-box object detection seam with simulation fallback
use anyhow::Result;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One labeled box from the underlying model. Boxes themselves are not used
/// by this app, only the label and its confidence.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub class_name: String,
    pub score: f32,
}

/// The pretrained model behind this trait is a black box: it takes a frame
/// and returns labeled detections with confidence scores, unordered.
pub trait ObjectDetector {
    fn detect(&mut self, frame: &DynamicImage) -> Result<Vec<RawDetection>>;

    /// Short human-readable backend name for the status line.
    fn name(&self) -> &'static str;
}

/// Bridge to an external SSD-style detection model.
///
/// The model binary is loaded from `models/` next to the executable. This is
/// the integration point for a real backend; without a model file on disk
/// construction fails and the app falls back to simulation.
pub struct SsdBridge {
    model_path: PathBuf,
}

impl SsdBridge {
    pub const DEFAULT_MODEL_PATH: &'static str = "models/ssd_lite.onnx";

    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref().to_path_buf();
        if !model_path.exists() {
            anyhow::bail!("detection model not found at {}", model_path.display());
        }
        info!(model = %model_path.display(), "detection model located");
        Ok(Self { model_path })
    }
}

impl ObjectDetector for SsdBridge {
    fn detect(&mut self, _frame: &DynamicImage) -> Result<Vec<RawDetection>> {
        // Inference hook for the external runtime. Until a backend is wired
        // in, report no detections; an empty frame is not an error.
        debug!(model = %self.model_path.display(), "ssd bridge invoked");
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "ssd-lite"
    }
}

/// Parades recognizable objects past the pipeline on a fixed cycle so the
/// whole app is exercisable without a model or even a camera.
pub struct SimulatedDetector {
    sim_time: f64,
}

impl SimulatedDetector {
    const PHASE_SECONDS: f64 = 4.0;

    pub fn new() -> Self {
        Self { sim_time: 0.0 }
    }

    fn phase(&self) -> usize {
        (self.sim_time / Self::PHASE_SECONDS) as usize % 4
    }
}

impl ObjectDetector for SimulatedDetector {
    fn detect(&mut self, _frame: &DynamicImage) -> Result<Vec<RawDetection>> {
        let t = self.sim_time;
        self.sim_time += 0.033;

        // Confidence wobbles so threshold changes in the UI visibly alter
        // which phases get through.
        let wobble = 0.15 * (t * 2.0).sin().abs() as f32;

        let detections = match self.phase() {
            0 => vec![
                RawDetection {
                    class_name: "chair".to_string(),
                    score: 0.55 + wobble,
                },
                RawDetection {
                    class_name: "person".to_string(),
                    score: 0.80,
                },
            ],
            1 => vec![
                RawDetection {
                    class_name: "Pencil".to_string(),
                    score: 0.70 + wobble,
                },
                RawDetection {
                    class_name: "person".to_string(),
                    score: 0.60,
                },
            ],
            2 => vec![RawDetection {
                class_name: "Cell Phone".to_string(),
                score: 0.75 + wobble,
            }],
            _ => vec![
                RawDetection {
                    class_name: "remote".to_string(),
                    score: 0.65 + wobble,
                },
                RawDetection {
                    class_name: "cup".to_string(),
                    score: 0.40,
                },
            ],
        };

        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "simulation"
    }
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the best available detector: the real bridge when a model file is
/// present, the simulated parade otherwise.
pub fn make_detector() -> Box<dyn ObjectDetector> {
    match SsdBridge::new(SsdBridge::DEFAULT_MODEL_PATH) {
        Ok(bridge) => {
            eprintln!("✓ Detection model loaded");
            Box::new(bridge)
        }
        Err(e) => {
            eprintln!("✗ Detection model unavailable: {}", e);
            eprintln!("  Will use simulation mode for detection");
            Box::new(SimulatedDetector::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_detector_cycles_through_object_phases() {
        let mut sim = SimulatedDetector::new();
        let frame = DynamicImage::new_rgb8(4, 4);

        let mut seen_classes = Vec::new();
        // ~20 seconds of simulated frames covers every phase.
        for _ in 0..600 {
            for d in sim.detect(&frame).unwrap() {
                let lower = d.class_name.to_lowercase();
                if !seen_classes.contains(&lower) {
                    seen_classes.push(lower);
                }
            }
        }

        assert!(seen_classes.iter().any(|c| c == "pencil"));
        assert!(seen_classes.iter().any(|c| c == "cell phone"));
        assert!(seen_classes.iter().any(|c| c == "remote"));
    }

    #[test]
    fn missing_model_file_fails_bridge_construction() {
        assert!(SsdBridge::new("definitely/not/a/model.onnx").is_err());
    }
}
