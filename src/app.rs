//! Main application module: the per-frame capture, detect, dispatch loop.

use crate::{
    config::Config,
    constants::CAMERA_MODE,
    detector::{draw_hands, Detection, LandmarkDetector},
    error::{Error, Result},
    sinks::{AnimationWriter, FrameSink, UdpSender},
    utils::FpsCounter,
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Point, Scalar, Size},
    highgui::{self, WINDOW_AUTOSIZE},
    imgproc::{self, InterpolationFlags, FONT_HERSHEY_PLAIN, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::path::PathBuf;

/// Where detected hands go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Live camera, one UDP datagram per frame
    Tracking,
    /// Video file, two animation files at the end
    Animation,
}

impl RunMode {
    /// `camera` selects live tracking, anything else an animation run
    #[must_use]
    pub fn from_arg(mode: &str) -> Self {
        if mode == CAMERA_MODE {
            Self::Tracking
        } else {
            Self::Animation
        }
    }
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(PathBuf),
}

impl VideoSource {
    /// Source used by a run mode
    #[must_use]
    pub fn for_mode(mode: RunMode, config: &Config) -> Self {
        match mode {
            RunMode::Tracking => Self::Camera(config.capture.camera_index),
            RunMode::Animation => Self::File(config.capture.video_file.clone()),
        }
    }
}

/// Create the sink a run mode writes to
///
/// # Errors
///
/// Returns an error if the UDP destination cannot be set up
pub fn create_sink(mode: RunMode, config: &Config) -> Result<Box<dyn FrameSink>> {
    let sink: Box<dyn FrameSink> = match mode {
        RunMode::Tracking => Box::new(UdpSender::new(
            &config.network.host,
            config.network.port,
            config.capture.window_height,
        )?),
        RunMode::Animation => Box::new(AnimationWriter::new(
            &config.animation.right_output,
            &config.animation.left_output,
        )),
    };
    info!("Using {} sink", sink.name());
    Ok(sink)
}

/// Counters reported when a run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub hands: u64,
}

/// Detector and sink, fed one frame at a time
pub struct FramePipeline {
    detector: LandmarkDetector,
    sink: Box<dyn FrameSink>,
    summary: RunSummary,
}

impl FramePipeline {
    #[must_use]
    pub fn new(detector: LandmarkDetector, sink: Box<dyn FrameSink>) -> Self {
        Self {
            detector,
            sink,
            summary: RunSummary::default(),
        }
    }

    /// Detect hands in one frame and hand them to the sink
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails or the sink rejects the frame
    pub fn process(&mut self, frame: &Mat) -> Result<Detection> {
        let detection = self.detector.find_hands(frame)?;
        self.sink.accept(&detection.result)?;

        self.summary.frames += 1;
        self.summary.hands += detection.result.hands.len() as u64;
        Ok(detection)
    }

    /// Flush the sink
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot persist its data
    pub fn finish(&mut self) -> Result<RunSummary> {
        self.sink.finish()?;
        Ok(self.summary)
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

/// Open a camera or video file at the requested capture size
///
/// # Errors
///
/// Returns an error if the source cannot be opened
pub fn open_capture(source: &VideoSource, width: i32, height: i32) -> Result<VideoCapture> {
    let mut capture = match source {
        VideoSource::Camera(index) => {
            info!("Opening camera {}", index);
            VideoCapture::new(*index, videoio::CAP_ANY)?
        }
        VideoSource::File(path) => {
            info!("Opening video file: {}", path.display());
            VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?
        }
    };

    if !capture.is_opened()? {
        return Err(Error::IoError(format!("Failed to open video source {source:?}")));
    }

    capture.set(CAP_PROP_FRAME_WIDTH, f64::from(width))?;
    capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
    Ok(capture)
}

/// Main application struct
pub struct HandTrackingApp {
    config: Config,
    mode: RunMode,
    pipeline: FramePipeline,
    video_capture: VideoCapture,
    fps: FpsCounter,
}

impl HandTrackingApp {
    /// Load the models, open the source and create the sink for `mode`
    ///
    /// # Errors
    ///
    /// Returns an error if any of them cannot be set up
    pub fn new(config: Config, mode: RunMode) -> Result<Self> {
        info!("Initializing hand tracking bridge in {:?} mode", mode);

        let detector = LandmarkDetector::from_config(&config.models, &config.detection)?;
        info!("Hand model ready: {}", detector.model_name());
        let sink = create_sink(mode, &config)?;

        let source = VideoSource::for_mode(mode, &config);
        let video_capture = open_capture(&source, config.capture.window_width, config.capture.window_height)?;

        if config.display.enabled {
            highgui::named_window(&config.display.window_title, WINDOW_AUTOSIZE)?;
        }

        Ok(Self {
            config,
            mode,
            pipeline: FramePipeline::new(detector, sink),
            video_capture,
            fps: FpsCounter::new(),
        })
    }

    /// Run until the source runs dry or the user quits, then finish the sink
    ///
    /// # Errors
    ///
    /// Returns an error if detection, the sink, or the display fails
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main application loop");

        loop {
            let mut frame = Mat::default();
            match self.video_capture.read(&mut frame) {
                Ok(true) if !frame.empty() => {}
                Ok(_) => {
                    info!("Frame source exhausted");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read frame: {}", e);
                    break;
                }
            }

            let mut detection = self.pipeline.process(&frame)?;
            let fps = self.fps.tick();
            debug!("Frame {}: {} hands", self.pipeline.summary().frames, detection.result.hands.len());

            if self.config.display.enabled && self.show(&mut detection, fps)? {
                info!("Exit requested by user");
                break;
            }
        }

        let summary = self.pipeline.finish()?;
        self.video_capture.release()?;
        if self.config.display.enabled {
            highgui::destroy_all_windows()?;
        }

        info!(
            "{:?} run finished: {} frames, {} hands",
            self.mode, summary.frames, summary.hands
        );
        Ok(summary)
    }

    /// Draw the overlay and show the preview; true when the user asked to quit
    fn show(&self, detection: &mut Detection, fps: f64) -> Result<bool> {
        let display = &self.config.display;
        if display.draw_landmarks {
            draw_hands(&mut detection.image, &detection.result)?;
        }

        imgproc::put_text(
            &mut detection.image,
            &FpsCounter::label(fps),
            Point::new(10, 70),
            FONT_HERSHEY_PLAIN,
            3.0,
            Scalar::new(255.0, 0.0, 255.0, 0.0),
            3,
            LINE_8,
            false,
        )?;

        let mut preview = Mat::default();
        imgproc::resize(
            &detection.image,
            &mut preview,
            Size::new(0, 0),
            display.scale,
            display.scale,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;
        highgui::imshow(&display.window_title, &preview)?;

        let key = highgui::wait_key(1)?;
        Ok(key == 27 || key == i32::from(b'q'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_arg() {
        assert_eq!(RunMode::from_arg("camera"), RunMode::Tracking);
        assert_eq!(RunMode::from_arg("video"), RunMode::Animation);
        assert_eq!(RunMode::from_arg(""), RunMode::Animation);
    }

    #[test]
    fn test_source_for_mode() {
        let config = Config::default();
        assert_eq!(VideoSource::for_mode(RunMode::Tracking, &config), VideoSource::Camera(0));
        assert_eq!(
            VideoSource::for_mode(RunMode::Animation, &config),
            VideoSource::File(PathBuf::from("video3.mp4"))
        );
    }

    #[test]
    fn test_animation_sink_needs_no_network() {
        let sink = create_sink(RunMode::Animation, &Config::default()).unwrap();
        assert_eq!(sink.name(), "animation");
    }
}
