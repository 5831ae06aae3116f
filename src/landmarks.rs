// Hand landmarks and the detector seam.
//
// The landmark model itself is a black box. `LandmarkSource` is all the
// pipeline sees of it: give it a frame, get back zero or more hands, each as
// 21 pixel coordinates in frame space. `HelperProcessSource` talks to an
// external helper process; tests script their own sources.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::config::DetectorConfig;
use crate::draw::{draw_line, fill_circle};
use crate::error::Error;
use crate::types::{Color, FrameBuffer, Point};

/// Landmark indices, MediaPipe hand model convention.
#[allow(dead_code)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;

    /// Tips of thumb, index, middle, ring, pinky.
    pub const FINGER_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

pub const LANDMARK_COUNT: usize = 21;

/// Bone pairs drawn by the debug skeleton.
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

/// One detected hand: 21 landmarks in pixel coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandLandmarks {
    points: [Point; LANDMARK_COUNT],
}

impl HandLandmarks {
    #[cfg(test)]
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// `None` unless exactly 21 points are given.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let points: [Point; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }

    pub fn index_tip(&self) -> Point {
        self.points[index::INDEX_TIP]
    }

    pub fn middle_tip(&self) -> Point {
        self.points[index::MIDDLE_TIP]
    }

    /// Copy with every point pulled inside the frame.
    pub fn clamped(&self, width: usize, height: usize) -> Self {
        Self { points: self.points.map(|p| p.clamped(width, height)) }
    }
}

/// Hand-landmark detector seam.
pub trait LandmarkSource {
    /// Hands found in `frame`, most relevant first.
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error>;

    /// Visual feedback only; never part of gesture logic.
    fn draw_debug(&self, frame: &mut FrameBuffer, hands: &[HandLandmarks]) {
        for hand in hands {
            draw_skeleton(frame, hand);
        }
    }
}

/// Bones in white, joints as small red dots.
pub fn draw_skeleton(frame: &mut FrameBuffer, hand: &HandLandmarks) {
    for (a, b) in HAND_CONNECTIONS {
        draw_line(frame, hand.point(a), hand.point(b), Color::WHITE);
    }
    for p in hand.points() {
        fill_circle(frame, *p, 3, Color::new(255, 0, 0));
    }
}

/* ---------------------- external helper process ---------------------- */

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Detector backed by a helper process.
///
/// The helper is started with `--min-detection-confidence <c>` appended to the
/// configured arguments and applies that threshold inside the model.
/// Protocol: the helper prints `READY` once. Per frame we write width, height
/// and channel count as little-endian `u32`s followed by raw RGB bytes; it
/// answers with one JSON line `{"hands":[{"landmarks":[{"x":..,"y":..},..]}]}`
/// where coordinates are normalised to `[0, 1]`.
pub struct HelperProcessSource {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    scratch: Vec<u8>,
}

impl HelperProcessSource {
    pub fn spawn(config: &DetectorConfig, min_detection_confidence: f32) -> Result<Self, Error> {
        let args = helper_args(config, min_detection_confidence);
        info!("starting landmark helper {:?} {:?}", config.program, args);
        let mut process = Command::new(&config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("spawn {:?}: {e}", config.program)))?;

        match handshake(&mut process) {
            Ok((stdin, stdout)) => {
                info!("landmark helper ready");
                Ok(Self { process, stdin, stdout, scratch: Vec::new() })
            }
            Err(e) => {
                stop_helper(&mut process);
                Err(e)
            }
        }
    }

    fn send_frame(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        self.scratch.clear();
        self.scratch.reserve(12 + frame.pixels.len() * 3);
        self.scratch.extend_from_slice(&(frame.width as u32).to_le_bytes());
        self.scratch.extend_from_slice(&(frame.height as u32).to_le_bytes());
        self.scratch.extend_from_slice(&3u32.to_le_bytes());
        for px in &frame.pixels {
            self.scratch.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, *px as u8]);
        }
        self.stdin.write_all(&self.scratch)?;
        self.stdin.flush()?;
        Ok(())
    }
}

/// Configured arguments plus the detection threshold the model should use.
fn helper_args(config: &DetectorConfig, min_detection_confidence: f32) -> Vec<String> {
    let mut args = config.args.clone();
    args.push("--min-detection-confidence".to_string());
    args.push(min_detection_confidence.to_string());
    args
}

/// Take the pipes and wait for `READY`.
fn handshake(process: &mut Child) -> Result<(ChildStdin, BufReader<ChildStdout>), Error> {
    let stdin = process.stdin.take().ok_or_else(|| Error::Detector("helper has no stdin".into()))?;
    let stdout = process.stdout.take().ok_or_else(|| Error::Detector("helper has no stdout".into()))?;
    let mut stdout = BufReader::new(stdout);

    let mut ready = String::new();
    stdout.read_line(&mut ready)?;
    if ready.trim() != "READY" {
        return Err(Error::Detector(format!("helper did not signal ready, got {:?}", ready.trim())));
    }
    Ok((stdin, stdout))
}

/// Kill and reap, so no zombie outlives us.
fn stop_helper(process: &mut Child) {
    let _ = process.kill();
    let _ = process.wait();
}

impl LandmarkSource for HelperProcessSource {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error> {
        self.send_frame(frame)?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(Error::Detector("helper closed its output".into()));
        }
        Ok(parse_detection(&line, frame.width, frame.height))
    }
}

impl Drop for HelperProcessSource {
    fn drop(&mut self) {
        stop_helper(&mut self.process);
    }
}

/// Decode one helper reply. Anything unusable is dropped with a warning so a
/// bad frame reads as "no hand" instead of ending the session.
fn parse_detection(line: &str, width: usize, height: usize) -> Vec<HandLandmarks> {
    let reply: DetectionJson = match serde_json::from_str(line) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("unreadable detector reply: {e}");
            return Vec::new();
        }
    };
    if let Some(error) = reply.error {
        warn!("detector reported: {error}");
        return Vec::new();
    }

    let mut hands = Vec::with_capacity(reply.hands.len());
    for hand in reply.hands {
        let points: Vec<Point> = hand
            .landmarks
            .iter()
            .map(|lm| Point::new((lm.x * width as f32) as i32, (lm.y * height as f32) as i32))
            .collect();
        match HandLandmarks::from_points(&points) {
            Some(h) => hands.push(h.clamped(width, height)),
            None => warn!("expected {LANDMARK_COUNT} landmarks, got {}", points.len()),
        }
    }
    debug!("helper found {} usable hand(s)", hands.len());
    hands
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed script of detections, one entry per tick.
    pub(crate) struct ScriptedSource {
        pub(crate) frames: VecDeque<Vec<HandLandmarks>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(frames: impl IntoIterator<Item = Vec<HandLandmarks>>) -> Self {
            Self { frames: frames.into_iter().collect() }
        }
    }

    impl LandmarkSource for ScriptedSource {
        fn detect(&mut self, _frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error> {
            Ok(self.frames.pop_front().unwrap_or_default())
        }
    }

    /// A hand with every point at `base`; tests move individual landmarks.
    pub(crate) fn hand_at(base: Point) -> [Point; LANDMARK_COUNT] {
        [base; LANDMARK_COUNT]
    }

    fn reply_with(count: usize) -> String {
        let landmarks: Vec<String> = (0..count).map(|_| r#"{"x":0.5,"y":0.25}"#.to_string()).collect();
        format!(r#"{{"hands":[{{"landmarks":[{}]}}]}}"#, landmarks.join(","))
    }

    #[test]
    fn helper_reply_converts_normalised_coordinates_to_pixels() {
        let hands = parse_detection(&reply_with(21), 640, 480);
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].index_tip(), Point::new(320, 120));
    }

    #[test]
    fn handedness_score_in_reply_does_not_filter_hands() {
        let reply = reply_with(21).replace(r#"{"landmarks""#, r#"{"score":0.1,"landmarks""#);
        assert_eq!(parse_detection(&reply, 640, 480).len(), 1);
    }

    #[test]
    fn detection_threshold_is_handed_to_the_helper() {
        let config = DetectorConfig { program: "python3".into(), args: vec!["detect.py".into()] };
        assert_eq!(
            helper_args(&config, 0.85),
            vec!["detect.py", "--min-detection-confidence", "0.85"]
        );
    }

    #[test]
    fn wrong_landmark_count_is_dropped_not_fatal() {
        assert!(parse_detection(&reply_with(20), 640, 480).is_empty());
    }

    #[test]
    fn garbage_or_error_reply_reads_as_no_hand() {
        assert!(parse_detection("not json", 640, 480).is_empty());
        assert!(parse_detection(r#"{"error":"model crashed"}"#, 640, 480).is_empty());
    }

    #[test]
    fn out_of_frame_landmarks_are_clamped() {
        let reply = reply_with(21).replace(r#""x":0.5"#, r#""x":1.7"#);
        let hands = parse_detection(&reply, 640, 480);
        assert_eq!(hands[0].index_tip(), Point::new(639, 120));
    }

    #[cfg(unix)]
    #[test]
    fn helper_without_ready_line_is_rejected() {
        let config = DetectorConfig { program: "sh".into(), args: vec!["-c".into(), "echo nope".into()] };
        let err = HelperProcessSource::spawn(&config, 0.5).err().expect("spawn should fail");
        assert!(matches!(err, Error::Detector(_)));
    }

    #[cfg(unix)]
    #[test]
    fn stopping_a_helper_reaps_it() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        stop_helper(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn from_points_requires_exactly_21() {
        assert!(HandLandmarks::from_points(&[Point::default(); 21]).is_some());
        assert!(HandLandmarks::from_points(&[Point::default(); 5]).is_none());
    }

    #[test]
    fn scripted_source_runs_dry_to_no_hands() {
        let hand = HandLandmarks::new(hand_at(Point::new(1, 1)));
        let mut src = ScriptedSource::new([vec![hand]]);
        let frame = FrameBuffer::blank(2, 2);
        assert_eq!(src.detect(&frame).unwrap().len(), 1);
        assert!(src.detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn debug_skeleton_marks_landmarks() {
        let mut frame = FrameBuffer::blank(50, 50);
        let mut points = hand_at(Point::new(10, 10));
        points[index::INDEX_TIP] = Point::new(40, 40);
        ScriptedSource::new([]).draw_debug(&mut frame, &[HandLandmarks::new(points)]);
        assert_eq!(frame.get(40, 40), Some(Color::new(255, 0, 0).packed()));
        assert_ne!(frame.get(25, 25), Some(0));
    }
}
