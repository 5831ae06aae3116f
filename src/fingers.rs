// Finger up/down classification for a single hand, one frame at a time.

use crate::landmarks::{HandLandmarks, index};

/// Up = extended. Order: thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    #[cfg(test)]
    pub fn thumb(self) -> bool { self.0[0] }
    pub fn index(self) -> bool { self.0[1] }
    pub fn middle(self) -> bool { self.0[2] }
    #[cfg(test)]
    pub fn ring(self) -> bool { self.0[3] }
    #[cfg(test)]
    pub fn pinky(self) -> bool { self.0[4] }
}

/// Classify every finger of `hand`.
///
/// Thumb: up when its tip is left of the joint just below it. This assumes a
/// mirrored right hand facing the camera and is reproduced as such.
/// Other fingers: up when the tip is above the joint two below it (smaller y).
pub fn classify(hand: &HandLandmarks) -> FingerStates {
    let mut up = [false; 5];

    let thumb_tip = index::FINGER_TIPS[0];
    up[0] = hand.point(thumb_tip).x < hand.point(thumb_tip - 1).x;

    for (finger, &tip) in index::FINGER_TIPS.iter().enumerate().skip(1) {
        up[finger] = hand.point(tip).y < hand.point(tip - 2).y;
    }

    FingerStates(up)
}
