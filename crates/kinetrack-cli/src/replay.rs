use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use kinetrack_core::PoseFrame;
use kinetrack_motion::{AnalyzerConfig, MovementAnalyzer, SessionSummary};
use serde_json::json;
use tracing::{info, warn};

pub struct ReplayOptions {
    pub input: String,
    pub config: AnalyzerConfig,
    pub summary: bool,
}

/// Frames read from the input and what happened to them
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub lines: usize,
    pub analyzed: usize,
    pub skipped: usize,
}

pub fn run_replay(options: ReplayOptions) -> Result<()> {
    let mut analyzer =
        MovementAnalyzer::try_new(options.config).context("invalid analyzer configuration")?;

    let reader: Box<dyn BufRead> = if options.input == "-" {
        Box::new(BufReader::new(io::stdin().lock()))
    } else {
        let file = File::open(&options.input)
            .with_context(|| format!("failed to open {}", options.input))?;
        Box::new(BufReader::new(file))
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let stats = replay(&mut analyzer, reader, &mut out)?;
    info!(
        lines = stats.lines,
        analyzed = stats.analyzed,
        skipped = stats.skipped,
        reps = analyzer.progress().rep_count,
        "replay finished"
    );

    if options.summary {
        write_summary(&mut out, &analyzer.summary())?;
    }
    out.flush()?;
    Ok(())
}

/// Analyze every JSON-lines frame from `reader`, writing one result per
/// accepted frame to `out`
pub fn replay<R: BufRead, W: Write>(
    analyzer: &mut MovementAnalyzer,
    reader: R,
    out: &mut W,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        stats.lines += 1;

        let frame: PoseFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(line = line_no, %err, "skipping unparseable frame");
                stats.skipped += 1;
                continue;
            }
        };

        match analyzer.analyze(&frame) {
            Some(result) => {
                serde_json::to_writer(&mut *out, &result)?;
                writeln!(out)?;
                stats.analyzed += 1;
            }
            None => {
                warn!(
                    line = line_no,
                    landmarks = frame.landmarks.len(),
                    "skipping frame that could not be measured"
                );
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

fn write_summary<W: Write>(out: &mut W, summary: &SessionSummary) -> Result<()> {
    serde_json::to_writer(&mut *out, &json!({ "summary": summary }))?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetrack_core::synthetic::RaiseProfile;
    use kinetrack_motion::AnalysisResult;

    fn jsonl(frames: &[PoseFrame]) -> String {
        frames
            .iter()
            .map(|f| serde_json::to_string(f).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_replay_synthetic_session() {
        let frames = RaiseProfile {
            reps: 2,
            ..RaiseProfile::default()
        }
        .frames();
        let input = jsonl(&frames);

        let mut analyzer = MovementAnalyzer::with_defaults();
        let mut out = Vec::new();
        let stats = replay(&mut analyzer, input.as_bytes(), &mut out).unwrap();

        assert_eq!(stats.analyzed, frames.len());
        assert_eq!(stats.skipped, 0);
        assert_eq!(analyzer.progress().rep_count, 2);

        let results: Vec<AnalysisResult> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(results.len(), frames.len());
        assert_eq!(results.last().unwrap().rep_count, 2);
    }

    #[test]
    fn test_replay_skips_bad_lines() {
        let good = RaiseProfile::default().frames();
        let short = PoseFrame::new(good[0].timestamp, good[0].landmarks[..20].to_vec());
        let input = format!(
            "{}\n\nnot json\n{}\n{}\n",
            serde_json::to_string(&good[0]).unwrap(),
            serde_json::to_string(&short).unwrap(),
            serde_json::to_string(&good[1]).unwrap(),
        );

        let mut analyzer = MovementAnalyzer::with_defaults();
        let mut out = Vec::new();
        let stats = replay(&mut analyzer, input.as_bytes(), &mut out).unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                lines: 4,
                analyzed: 2,
                skipped: 2,
            }
        );
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_summary_line() {
        let mut out = Vec::new();
        write_summary(&mut out, &SessionSummary::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["summary"]["reps_counted"], 0);
    }
}
