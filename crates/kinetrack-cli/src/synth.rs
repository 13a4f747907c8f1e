use std::io::{self, BufWriter, Write};

use anyhow::{ensure, Result};
use kinetrack_core::synthetic::RaiseProfile;
use tracing::info;

pub struct SynthOptions {
    pub reps: u32,
    pub fps: f64,
    pub hold_secs: f64,
    pub peak: f64,
}

impl SynthOptions {
    fn profile(&self) -> Result<RaiseProfile> {
        ensure!(
            self.fps.is_finite() && self.fps > 0.0,
            "fps must be positive, got {}",
            self.fps
        );
        ensure!(
            self.hold_secs.is_finite() && self.hold_secs >= 0.0,
            "hold-secs must be non-negative, got {}",
            self.hold_secs
        );
        ensure!(
            (0.0..=180.0).contains(&self.peak),
            "peak must be within 0-180 degrees, got {}",
            self.peak
        );

        Ok(RaiseProfile {
            reps: self.reps,
            fps: self.fps,
            hold_secs: self.hold_secs,
            peak_angle: self.peak,
            ..RaiseProfile::default()
        })
    }
}

pub fn run_synth(options: SynthOptions) -> Result<()> {
    let profile = options.profile()?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = write_session(&profile, &mut out)?;
    out.flush()?;

    info!(frames, reps = profile.reps, "synthetic session written");
    Ok(())
}

/// Write one JSON frame per line; returns the number of frames
pub fn write_session<W: Write>(profile: &RaiseProfile, out: &mut W) -> Result<usize> {
    let frames = profile.frames();
    for frame in &frames {
        serde_json::to_writer(&mut *out, frame)?;
        writeln!(out)?;
    }
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetrack_core::PoseFrame;

    fn options() -> SynthOptions {
        SynthOptions {
            reps: 1,
            fps: 30.0,
            hold_secs: 3.5,
            peak: 90.0,
        }
    }

    #[test]
    fn test_writes_parseable_frames() {
        let profile = options().profile().unwrap();
        let mut out = Vec::new();
        let count = write_session(&profile, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), count);
        for line in text.lines() {
            let frame: PoseFrame = serde_json::from_str(line).unwrap();
            assert!(frame.is_complete());
        }
    }

    #[test]
    fn test_rejects_bad_options() {
        let zero_fps = SynthOptions {
            fps: 0.0,
            ..options()
        };
        assert!(zero_fps.profile().is_err());

        let too_high = SynthOptions {
            peak: 200.0,
            ..options()
        };
        assert!(too_high.profile().is_err());
    }
}
