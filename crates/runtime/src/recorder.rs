//! Records sampled trajectories as marker points for an external viewer.
//!
//! File layout, one frame per controller step:
//! `step: u32 LE`, `count: u32 LE`, then `count` native-endian `[f32; 3]`
//! points (x, y, marker height).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use control::{TrajectoryObserver, TrajectoryView};

/// Height at which sample markers are drawn above the ground plane.
pub const MARKER_HEIGHT: f32 = 0.2;

pub struct MarkerRecorder<W: Write = BufWriter<File>> {
    writer: W,
    frames: usize,
    error: Option<io::Error>,
}

impl MarkerRecorder {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> MarkerRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0, error: None }
    }

    fn write_frame(&mut self, step: usize, samples: &TrajectoryView<'_>) -> io::Result<()> {
        let to_u32 = |v: usize| {
            u32::try_from(v).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))
        };
        let bytes = samples.to_bytes(MARKER_HEIGHT);
        self.writer.write_all(&to_u32(step)?.to_le_bytes())?;
        self.writer.write_all(&to_u32(bytes.len() / 12)?.to_le_bytes())?;
        self.writer.write_all(&bytes)
    }

    /// Flushes the output, surfacing the first write error seen.
    pub fn finish(mut self) -> io::Result<(usize, W)> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok((self.frames, self.writer))
    }
}

impl<W: Write> TrajectoryObserver for MarkerRecorder<W> {
    fn observe(&mut self, step: usize, samples: &TrajectoryView<'_>) {
        if self.error.is_some() {
            return;
        }
        match self.write_frame(step, samples) {
            Ok(()) => self.frames += 1,
            Err(e) => {
                tracing::error!("Failed to record markers for step {step}: {e}");
                self.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control::{ControllerConfig, ExecutionTarget, ObservationBuilder, PathIntegralController};

    #[test]
    fn frames_carry_step_and_point_count() {
        let config = ControllerConfig {
            horizon: 0.5,
            sample_count: 4,
            target: ExecutionTarget::Cpu,
            ..ControllerConfig::navigation_scenario()
        };
        let obs = ObservationBuilder::new().position(1.0, 1.0).build();
        let mut controller = PathIntegralController::new(config).unwrap();
        controller.reset(&obs).unwrap();

        let mut recorder = MarkerRecorder::new(Vec::new());
        controller.step_observed(&obs, &mut recorder).unwrap();
        controller.step_observed(&obs, &mut recorder).unwrap();
        let (frames, bytes) = recorder.finish().unwrap();

        assert_eq!(frames, 2);
        // Horizon of 5 steps: 6 path states x 4 samples, then 5 x 4.
        assert_eq!(&bytes[0..4], &0u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &24u32.to_le_bytes());
        let second = 8 + 24 * 12;
        assert_eq!(&bytes[second..second + 4], &1u32.to_le_bytes());
        assert_eq!(&bytes[second + 4..second + 8], &20u32.to_le_bytes());
        assert_eq!(bytes.len(), second + 8 + 20 * 12);
    }
}
