use super::{join_values, parse_values, FrameSink};
use crate::{
    constants::{NUM_HAND_LANDMARKS, VALUES_PER_HAND},
    hand::{FrameResult, Hand, Handedness, Landmark},
    Error, Result,
};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Serialize one hand as `x,y,z,...` with y measured from the bottom of the frame
#[must_use]
pub fn format_animation_line(hand: &Hand, frame_height: i32) -> String {
    join_values(hand.bottom_up_values(frame_height), ",")
}

/// Parse one animation line back into its 21 landmarks
///
/// # Errors
///
/// Returns an error if the line does not hold exactly 63 integers
pub fn parse_animation_line(line: &str) -> Result<[Landmark; NUM_HAND_LANDMARKS]> {
    let values = parse_values(line)?;
    if values.len() != VALUES_PER_HAND {
        return Err(Error::Sink(format!(
            "Animation line has {} values, expected {}",
            values.len(),
            VALUES_PER_HAND
        )));
    }

    let mut landmarks = [Landmark::default(); NUM_HAND_LANDMARKS];
    for (out, xyz) in landmarks.iter_mut().zip(values.chunks_exact(3)) {
        *out = Landmark::new(xyz[0], xyz[1], xyz[2]);
    }
    Ok(landmarks)
}

/// Records every frame's hands and writes them when the run ends
///
/// Nothing reaches disk before [`FrameSink::finish`]; a run that dies early
/// leaves no output.
pub struct AnimationWriter {
    right_path: PathBuf,
    left_path: PathBuf,
    right: Vec<String>,
    left: Vec<String>,
}

impl AnimationWriter {
    /// Create a writer for the given output files
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(right_path: P, left_path: Q) -> Self {
        Self {
            right_path: right_path.as_ref().to_path_buf(),
            left_path: left_path.as_ref().to_path_buf(),
            right: Vec::new(),
            left: Vec::new(),
        }
    }

    /// Lines buffered so far for one side
    #[must_use]
    pub fn lines(&self, side: Handedness) -> &[String] {
        match side {
            Handedness::Right => &self.right,
            Handedness::Left => &self.left,
        }
    }

    /// Output file for one side
    #[must_use]
    pub fn path(&self, side: Handedness) -> &Path {
        match side {
            Handedness::Right => &self.right_path,
            Handedness::Left => &self.left_path,
        }
    }

    fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FrameSink for AnimationWriter {
    fn accept(&mut self, frame: &FrameResult) -> Result<()> {
        for hand in &frame.hands {
            let line = format_animation_line(hand, frame.height);
            match hand.side {
                Handedness::Right => self.right.push(line),
                Handedness::Left => self.left.push(line),
            }
        }
        debug!(
            "Animation buffer: {} right, {} left",
            self.right.len(),
            self.left.len()
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Self::write_lines(&self.right_path, &self.right)?;
        Self::write_lines(&self.left_path, &self.left)?;
        info!(
            "Wrote {} frames to {} and {} frames to {}",
            self.right.len(),
            self.right_path.display(),
            self.left.len(),
            self.left_path.display()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "animation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_at(x: i32, y: i32, side: Handedness) -> Hand {
        let mut landmarks = [Landmark::default(); NUM_HAND_LANDMARKS];
        for (i, lm) in landmarks.iter_mut().enumerate() {
            *lm = Landmark::new(x + i as i32, y, -(i as i32));
        }
        Hand { landmarks, side }
    }

    #[test]
    fn test_line_inverts_y() {
        let line = format_animation_line(&hand_at(100, 150, Handedness::Right), 600);
        assert!(line.starts_with("100,450,0,101,450,-1,"));
        assert_eq!(line.split(',').count(), VALUES_PER_HAND);
        assert!(!line.ends_with(','));
    }

    #[test]
    fn test_line_parses_back() {
        let hand = hand_at(10, 20, Handedness::Left);
        let parsed = parse_animation_line(&format_animation_line(&hand, 0)).unwrap();
        assert_eq!(parsed[3], Landmark::new(13, -20, -3));
        assert!(parse_animation_line("1,2,3").is_err());
    }

    #[test]
    fn test_buffers_by_side() {
        let mut writer = AnimationWriter::new("right.txt", "left.txt");
        let frame = FrameResult {
            hands: vec![
                hand_at(1, 1, Handedness::Right),
                hand_at(2, 2, Handedness::Left),
                hand_at(3, 3, Handedness::Right),
            ],
            width: 800,
            height: 600,
        };
        writer.accept(&frame).unwrap();
        writer.accept(&FrameResult::empty(800, 600)).unwrap();

        assert_eq!(writer.lines(Handedness::Right).len(), 2);
        assert_eq!(writer.lines(Handedness::Left).len(), 1);
        assert_eq!(writer.path(Handedness::Left), Path::new("left.txt"));
        assert_eq!(writer.name(), "animation");
    }
}
