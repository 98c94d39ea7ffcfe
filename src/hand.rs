//! Hand data model shared by the detector, the adapter and the sinks.

use crate::{constants::NUM_HAND_LANDMARKS, Error, Result};
use std::fmt;
use std::str::FromStr;

/// Landmark indices of the 21-point hand skeleton
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Landmarks that outline the palm, used to seed the next frame's region
    pub const PALM: [usize; 12] = [
        WRIST,
        THUMB_CMC,
        THUMB_MCP,
        INDEX_FINGER_MCP,
        INDEX_FINGER_PIP,
        MIDDLE_FINGER_MCP,
        MIDDLE_FINGER_PIP,
        RING_FINGER_MCP,
        RING_FINGER_PIP,
        PINKY_MCP,
        PINKY_PIP,
        THUMB_IP,
    ];
}

/// Skeleton edges drawn by the preview overlay
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Left/right classification of a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// The opposite side
    #[must_use]
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Label used by the model and by consumers
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Left" => Ok(Self::Left),
            "Right" => Ok(Self::Right),
            other => Err(Error::InvalidInput(format!("Unknown handedness label: {other}"))),
        }
    }
}

/// Model output for one landmark, normalized to the captured frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedLandmark {
    /// X coordinate as a fraction of frame width
    pub x: f32,
    /// Y coordinate as a fraction of frame height
    pub y: f32,
    /// Depth relative to the wrist, in units of frame width
    pub z: f32,
}

impl NormalizedLandmark {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One hand as reported by the model, before any conversion
#[derive(Debug, Clone, PartialEq)]
pub struct RawHand {
    pub landmarks: [NormalizedLandmark; NUM_HAND_LANDMARKS],
    /// Classification as reported by the model, before side correction
    pub label: Handedness,
    /// Hand presence confidence (0.0-1.0)
    pub score: f32,
}

/// Pixel-space landmark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Landmark {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The same point with y measured from the bottom edge of a frame of `height` pixels
    ///
    /// Saturates instead of overflowing for y values far outside the frame.
    #[must_use]
    pub const fn bottom_up(self, height: i32) -> Self {
        Self {
            x: self.x,
            y: height.saturating_sub(self.y),
            z: self.z,
        }
    }
}

/// A detected hand in pixel coordinates with its corrected side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    pub landmarks: [Landmark; NUM_HAND_LANDMARKS],
    pub side: Handedness,
}

impl Hand {
    /// Landmarks in index order as a flat `x, y, z` sequence, y measured from the bottom
    pub fn bottom_up_values(&self, height: i32) -> impl Iterator<Item = i32> + '_ {
        self.landmarks
            .iter()
            .flat_map(move |lm| {
                let lm = lm.bottom_up(height);
                [lm.x, lm.y, lm.z]
            })
    }
}

/// All hands found in one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameResult {
    pub hands: Vec<Hand>,
    /// Width of the frame the coordinates refer to
    pub width: i32,
    /// Height of the frame the coordinates refer to
    pub height: i32,
}

impl FrameResult {
    #[must_use]
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            hands: Vec::new(),
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Number of hands reported with the given side
    #[must_use]
    pub fn count_side(&self, side: Handedness) -> usize {
        self.hands.iter().filter(|hand| hand.side == side).count()
    }
}
