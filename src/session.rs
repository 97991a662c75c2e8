// src/session.rs - Single context object owning the recognition loop state
use crate::adapter::{frame_label, AdapterSettings, Category};
use crate::debounce::{Debouncer, LogicalState, Verdict};
use crate::detector::ObjectDetector;
use image::DynamicImage;
use std::time::Instant;
use tracing::{info, trace, warn};
use uuid::Uuid;

/// Why a tick performed no detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Locked,
    Frozen,
    NoFrame,
    DetectorFailed,
}

/// Result of a single recognition tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    Skipped(SkipReason),
    Observed(Category, Verdict),
}

/// Owns everything the per-frame loop touches: the detector handle, adapter
/// settings, the debouncer, and the lock flag. One `tick` per display frame;
/// the loop is strictly serial, so at most one detection is ever in flight.
pub struct RecognitionSession {
    id: Uuid,
    detector: Box<dyn ObjectDetector>,
    adapter: AdapterSettings,
    debouncer: Debouncer,
    locked: bool,
    hud: String,
}

impl RecognitionSession {
    pub fn new(detector: Box<dyn ObjectDetector>, adapter: AdapterSettings) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, backend = detector.name(), "recognition session started");
        Self {
            id,
            detector,
            adapter,
            debouncer: Debouncer::new(),
            locked: false,
            hud: String::from("Waiting for detections"),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> LogicalState {
        self.debouncer.state()
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn frozen(&self, now: Instant) -> bool {
        self.debouncer.frozen(now)
    }

    pub fn hud(&self) -> &str {
        &self.hud
    }

    pub fn backend_name(&self) -> &'static str {
        self.detector.name()
    }

    pub fn set_adapter(&mut self, adapter: AdapterSettings) {
        self.adapter = adapter;
    }

    /// One iteration of the recognition loop.
    ///
    /// Locked and frozen ticks short-circuit before the camera frame is
    /// consumed, so the history buffer does not advance while either holds.
    pub fn tick(&mut self, frame: Option<&DynamicImage>, now: Instant) -> TickReport {
        if self.locked {
            self.hud = String::from("Frozen...");
            return TickReport::Skipped(SkipReason::Locked);
        }

        if self.debouncer.frozen(now) {
            self.hud = String::from("Frozen...");
            return TickReport::Skipped(SkipReason::Frozen);
        }

        let Some(frame) = frame else {
            return TickReport::Skipped(SkipReason::NoFrame);
        };

        let detections = match self.detector.detect(frame) {
            Ok(detections) => detections,
            Err(e) => {
                warn!(session = %self.id, error = %e, "detector call failed");
                return TickReport::Skipped(SkipReason::DetectorFailed);
            }
        };

        let label = frame_label(&detections, &self.adapter);
        self.hud = format!("Detections: {}", label);

        let verdict = self.debouncer.observe(label, now);
        match verdict {
            Verdict::Committed(state) => {
                info!(session = %self.id, ?state, "transition committed");
            }
            _ => trace!(
                session = %self.id,
                %label,
                history = self.debouncer.history_len(),
                "frame observed"
            ),
        }

        TickReport::Observed(label, verdict)
    }

    /// Manual simulation trigger; bypasses smoothing entirely.
    pub fn simulate(&mut self, state: LogicalState, now: Instant) {
        info!(session = %self.id, ?state, "manual state override");
        self.debouncer.simulate(state, now);
    }

    /// Suspends recognition until `relax` is called.
    pub fn lock(&mut self) {
        info!(session = %self.id, "lock engaged, recognition paused");
        self.locked = true;
    }

    /// Releases the lock and drops back to the relaxed state.
    pub fn relax(&mut self, now: Instant) {
        info!(session = %self.id, "lock released");
        self.locked = false;
        self.debouncer.simulate(LogicalState::Relaxed, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::RawDetection;
    use anyhow::Result;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Feeds a prepared list of per-frame detection batches and counts how
    /// often the model is actually invoked.
    struct ScriptedDetector {
        frames: Vec<Vec<RawDetection>>,
        cursor: usize,
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl ScriptedDetector {
        fn scripted(classes: &[&str]) -> (Self, Rc<Cell<usize>>) {
            let frames = classes
                .iter()
                .map(|name| {
                    if name.is_empty() {
                        Vec::new()
                    } else {
                        vec![RawDetection {
                            class_name: name.to_string(),
                            score: 0.9,
                        }]
                    }
                })
                .collect();
            let calls = Rc::new(Cell::new(0));
            let detector = Self {
                frames,
                cursor: 0,
                calls: Rc::clone(&calls),
                fail: false,
            };
            (detector, calls)
        }
    }

    impl ObjectDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &DynamicImage) -> Result<Vec<RawDetection>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                anyhow::bail!("scripted failure");
            }
            let batch = self.frames.get(self.cursor).cloned().unwrap_or_default();
            self.cursor = (self.cursor + 1).min(self.frames.len().saturating_sub(1));
            Ok(batch)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn frame() -> DynamicImage {
        DynamicImage::new_rgb8(2, 2)
    }

    #[test]
    fn three_pen_frames_commit_and_freeze_the_loop() {
        let (detector, _calls) = ScriptedDetector::scripted(&["pen", "pen", "pen", "pen"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let start = Instant::now();

        session.tick(Some(&frame), start);
        session.tick(Some(&frame), start);
        let report = session.tick(Some(&frame), start);

        assert_eq!(
            report,
            TickReport::Observed(Category::Pen, Verdict::Committed(LogicalState::Pen))
        );
        assert_eq!(session.state(), LogicalState::Pen);

        // The next tick lands inside the 2000 ms freeze window and must not
        // reach the detector.
        let frozen_report = session.tick(Some(&frame), start + Duration::from_millis(500));
        assert_eq!(frozen_report, TickReport::Skipped(SkipReason::Frozen));
        assert_eq!(session.hud(), "Frozen...");
    }

    #[test]
    fn frozen_ticks_consume_no_frames() {
        let (detector, calls) = ScriptedDetector::scripted(&["pen", "pen", "pen"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let start = Instant::now();

        for _ in 0..3 {
            session.tick(Some(&frame), start);
        }
        assert_eq!(calls.get(), 3);

        // Several ticks inside the freeze window...
        for i in 0..5 {
            session.tick(Some(&frame), start + Duration::from_millis(100 * i));
        }

        // ...never reach the detector, so the history did not advance.
        assert_eq!(calls.get(), 3);
        let after = start + Duration::from_millis(2100);
        let report = session.tick(Some(&frame), after);
        assert_eq!(calls.get(), 4);
        assert_eq!(
            report,
            TickReport::Observed(Category::Pen, Verdict::Committed(LogicalState::Pen))
        );
    }

    #[test]
    fn locked_session_skips_detection_entirely() {
        let (detector, calls) = ScriptedDetector::scripted(&["pen"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let now = Instant::now();

        session.lock();
        assert!(session.locked());
        let report = session.tick(Some(&frame), now);
        assert_eq!(report, TickReport::Skipped(SkipReason::Locked));
        assert_eq!(calls.get(), 0);

        session.relax(now);
        assert!(!session.locked());
        assert_eq!(session.state(), LogicalState::Relaxed);
        assert!(!session.frozen(now));
    }

    #[test]
    fn missing_frame_skips_without_touching_history() {
        let (detector, calls) = ScriptedDetector::scripted(&["pen", "pen", "pen"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let now = Instant::now();

        assert_eq!(
            session.tick(None, now),
            TickReport::Skipped(SkipReason::NoFrame)
        );
        assert_eq!(calls.get(), 0);

        // Two live frames after the gap are still only 2 of the history.
        session.tick(Some(&frame), now);
        let report = session.tick(Some(&frame), now);
        assert_eq!(report, TickReport::Observed(Category::Pen, Verdict::Unchanged));
    }

    #[test]
    fn detector_errors_are_skipped_and_survivable() {
        let (mut detector, _calls) = ScriptedDetector::scripted(&["pen"]);
        detector.fail = true;
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let now = Instant::now();

        let report = session.tick(Some(&frame), now);
        assert_eq!(report, TickReport::Skipped(SkipReason::DetectorFailed));
        assert_eq!(session.state(), LogicalState::Relaxed);
    }

    #[test]
    fn unmapped_classes_drive_the_relaxed_state() {
        let (detector, _calls) = ScriptedDetector::scripted(&["chair", "chair"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let now = Instant::now();

        let report = session.tick(Some(&frame), now);
        assert_eq!(report, TickReport::Observed(Category::None, Verdict::Relaxed));
        assert_eq!(session.hud(), "Detections: none");
    }

    #[test]
    fn manual_override_beats_detection_history() {
        let (detector, _calls) = ScriptedDetector::scripted(&["pen", "pen", "pen"]);
        let mut session = RecognitionSession::new(Box::new(detector), AdapterSettings::default());
        let frame = frame();
        let now = Instant::now();

        for _ in 0..3 {
            session.tick(Some(&frame), now);
        }
        assert_eq!(session.state(), LogicalState::Pen);

        session.simulate(LogicalState::Salute, now);
        assert_eq!(session.state(), LogicalState::Salute);
        // Manual freeze is the shorter 1000 ms window.
        assert!(session.frozen(now + Duration::from_millis(999)));
        assert!(!session.frozen(now + Duration::from_millis(1000)));
    }
}
