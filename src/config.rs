//! Configuration management for the hand tracking bridge

use crate::{
    constants::{
        DEFAULT_DETECTION_CONFIDENCE, DEFAULT_HOST, DEFAULT_MAX_HANDS, DEFAULT_MODEL_COMPLEXITY, DEFAULT_PORT,
        DEFAULT_TRACKING_CONFIDENCE, DEFAULT_VIDEO_FILE, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH,
        LEFT_ANIMATION_FILE, PREVIEW_SCALE, PREVIEW_WINDOW, RIGHT_ANIMATION_FILE,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Hand detection configuration
    pub detection: DetectionConfig,

    /// Frame source configuration
    pub capture: CaptureConfig,

    /// UDP destination for live tracking
    pub network: NetworkConfig,

    /// Output files for animation runs
    pub animation: AnimationConfig,

    /// Preview window configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Palm detector used at model complexity 0
    pub palm_detector_lite: PathBuf,

    /// Palm detector used at model complexity 1
    pub palm_detector_full: PathBuf,

    /// Landmark model used at model complexity 0
    pub hand_landmark_lite: PathBuf,

    /// Landmark model used at model complexity 1
    pub hand_landmark_full: PathBuf,
}

/// Hand detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Run palm detection on every frame instead of tracking regions
    pub static_image_mode: bool,

    /// Maximum number of hands reported per frame
    pub max_num_hands: usize,

    /// 0 selects the lite models, 1 the full ones
    pub model_complexity: u8,

    /// Palm score threshold (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Hand presence threshold (0.0-1.0)
    pub min_tracking_confidence: f32,

    /// Swap the model's left/right label back to the user's side
    pub flip_type: bool,
}

/// Frame source parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index used in camera mode
    pub camera_index: i32,

    /// Video file used in animation mode
    pub video_file: PathBuf,

    /// Requested capture width
    pub window_width: i32,

    /// Requested capture height; also the height datagrams are inverted against
    pub window_height: i32,
}

/// UDP destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

/// Animation output files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// File receiving right hands
    pub right_output: PathBuf,

    /// File receiving left hands
    pub left_output: PathBuf,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the preview window
    pub enabled: bool,

    /// Draw landmarks and connections on the preview
    pub draw_landmarks: bool,

    /// Preview scale factor
    pub scale: f64,

    /// Preview window title
    pub window_title: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            palm_detector_lite: PathBuf::from("assets/palm_detection_lite.onnx"),
            palm_detector_full: PathBuf::from("assets/palm_detection_full.onnx"),
            hand_landmark_lite: PathBuf::from("assets/hand_landmark_lite.onnx"),
            hand_landmark_full: PathBuf::from("assets/hand_landmark_full.onnx"),
        }
    }
}

impl ModelConfig {
    /// (palm detector, landmark model) paths for a model complexity
    ///
    /// # Errors
    ///
    /// Returns an error for complexities other than 0 and 1
    pub fn paths_for(&self, model_complexity: u8) -> Result<(&Path, &Path)> {
        match model_complexity {
            0 => Ok((self.palm_detector_lite.as_path(), self.hand_landmark_lite.as_path())),
            1 => Ok((self.palm_detector_full.as_path(), self.hand_landmark_full.as_path())),
            other => Err(Error::ConfigError(format!(
                "Model complexity must be 0 or 1, got {other}"
            ))),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            max_num_hands: DEFAULT_MAX_HANDS,
            model_complexity: DEFAULT_MODEL_COMPLEXITY,
            min_detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_TRACKING_CONFIDENCE,
            flip_type: true,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            video_file: PathBuf::from(DEFAULT_VIDEO_FILE),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            right_output: PathBuf::from(RIGHT_ANIMATION_FILE),
            left_output: PathBuf::from(LEFT_ANIMATION_FILE),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            draw_landmarks: true,
            scale: PREVIEW_SCALE,
            window_title: PREVIEW_WINDOW.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate every setting except the model files
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting
    pub fn validate_settings(&self) -> Result<()> {
        // Validate thresholds
        if !(0.0..=1.0).contains(&self.detection.min_detection_confidence) {
            return Err(Error::ConfigError(
                "Detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.min_tracking_confidence) {
            return Err(Error::ConfigError(
                "Tracking confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.max_num_hands == 0 {
            return Err(Error::ConfigError(
                "Maximum number of hands must be greater than 0".to_string(),
            ));
        }
        self.models.paths_for(self.detection.model_complexity)?;

        // Validate capture and display settings
        if self.capture.window_width <= 0 || self.capture.window_height <= 0 {
            return Err(Error::ConfigError(format!(
                "Window size must be positive, got {}x{}",
                self.capture.window_width, self.capture.window_height
            )));
        }
        if self.display.scale <= 0.0 {
            return Err(Error::ConfigError("Display scale must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Validate configuration, including that the selected models exist
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting or missing model
    pub fn validate(&self) -> Result<()> {
        self.validate_settings()?;

        // Validate model paths exist
        let (palm, landmark) = self.models.paths_for(self.detection.model_complexity)?;
        if !palm.exists() {
            return Err(Error::ConfigError(format!(
                "Palm detector model not found: {}",
                palm.display()
            )));
        }
        if !landmark.exists() {
            return Err(Error::ConfigError(format!(
                "Hand landmark model not found: {}",
                landmark.display()
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Tracking Bridge Configuration

# Model paths
models:
  palm_detector_lite: "assets/palm_detection_lite.onnx"
  palm_detector_full: "assets/palm_detection_full.onnx"
  hand_landmark_lite: "assets/hand_landmark_lite.onnx"
  hand_landmark_full: "assets/hand_landmark_full.onnx"

# Hand detection parameters
detection:
  static_image_mode: false
  max_num_hands: 2
  model_complexity: 0
  min_detection_confidence: 0.4
  min_tracking_confidence: 0.4
  flip_type: true

# Frame source
capture:
  camera_index: 0
  video_file: "video3.mp4"
  window_width: 800
  window_height: 600

# Live tracking destination
network:
  host: "127.0.0.1"
  port: 8055

# Animation output files
animation:
  right_output: "Animation1.txt"
  left_output: "Animation2.txt"

# Preview window
display:
  enabled: true
  draw_landmarks: true
  scale: 0.75
  window_title: "Image"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("network:\n  port: 9000\n").unwrap();
        assert_eq!(config.network.port, 9000);
        assert_eq!(config.network.host, "127.0.0.1");
        assert_eq!(config.detection.max_num_hands, 2);
    }

    #[test]
    fn test_validate_settings() {
        assert!(Config::default().validate_settings().is_ok());

        let mut config = Config::default();
        config.detection.min_detection_confidence = 1.5;
        assert!(config.validate_settings().is_err());

        let mut config = Config::default();
        config.detection.max_num_hands = 0;
        assert!(config.validate_settings().is_err());

        let mut config = Config::default();
        config.detection.model_complexity = 2;
        assert!(config.validate_settings().is_err());

        let mut config = Config::default();
        config.capture.window_height = 0;
        assert!(config.validate_settings().is_err());
    }

    #[test]
    fn test_missing_models_fail_validation() {
        let mut config = Config::default();
        config.models.palm_detector_lite = PathBuf::from("/nonexistent/palm.onnx");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Palm detector"));
    }

    #[test]
    fn test_paths_for_complexity() {
        let models = ModelConfig::default();
        let (palm, _) = models.paths_for(1).unwrap();
        assert_eq!(palm, Path::new("assets/palm_detection_full.onnx"));
    }
}
