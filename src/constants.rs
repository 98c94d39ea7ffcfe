//! Constants used throughout the application

/// Number of landmarks in one hand skeleton
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Values per landmark (x, y, z)
pub const COORDS_PER_LANDMARK: usize = 3;

/// Integers carried per hand in a datagram or animation line
pub const VALUES_PER_HAND: usize = NUM_HAND_LANDMARKS * COORDS_PER_LANDMARK;

/// Default UDP destination
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8055;

/// Default capture window size
pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;

/// Default video file used outside camera mode
pub const DEFAULT_VIDEO_FILE: &str = "video3.mp4";

/// Animation output files, one per corrected side
pub const RIGHT_ANIMATION_FILE: &str = "Animation1.txt";
pub const LEFT_ANIMATION_FILE: &str = "Animation2.txt";

/// Run mode that selects live tracking
pub const CAMERA_MODE: &str = "camera";

/// Default detector parameters
pub const DEFAULT_MAX_HANDS: usize = 2;
pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.4;
pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.4;
pub const DEFAULT_MODEL_COMPLEXITY: u8 = 0;

/// Palm detector geometry
pub const PALM_INPUT_SIZE: i32 = 192;
pub const PALM_NUM_KEYPOINTS: usize = 7;
pub const PALM_BOX_VALUES: usize = 4 + PALM_NUM_KEYPOINTS * 2;
pub const PALM_NMS_THRESHOLD: f32 = 0.3;
pub const PALM_SCORE_CLIP: f32 = 100.0;

/// Landmark model geometry
pub const LANDMARK_INPUT_SIZE: i32 = 224;
pub const LANDMARK_Z_NORMALIZATION: f32 = 0.4;

/// Region of interest transforms
pub const PALM_ROI_SCALE: f32 = 2.6;
pub const PALM_ROI_SHIFT_Y: f32 = -0.5;
pub const TRACKED_ROI_SCALE: f32 = 2.0;
pub const TRACKED_ROI_SHIFT_Y: f32 = -0.1;
pub const TRACKED_ROI_IOU_THRESHOLD: f32 = 0.5;

/// Preview overlay
pub const PREVIEW_SCALE: f64 = 0.75;
pub const PREVIEW_WINDOW: &str = "Image";
pub const LANDMARK_RADIUS: i32 = 5;
