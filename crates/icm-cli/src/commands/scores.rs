//! Scores command: per-dimension and fused scores per activity.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use icm_core::{ActivityKey, ActivityScores, MinerConfig, MiningReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    activity: &'a ActivityKey,
    #[serde(flatten)]
    scores: ActivityScores,
    fused: f64,
}

fn rows(report: &MiningReport) -> Vec<ScoreRow<'_>> {
    report
        .ranking
        .iter()
        .map(|ranked| ScoreRow {
            activity: &ranked.activity,
            scores: report.scores_for(&ranked.activity),
            fused: ranked.score,
        })
        .collect()
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

pub fn run<W: Write>(
    writer: &mut W,
    log_path: &Path,
    config: &MinerConfig,
    json: bool,
) -> Result<()> {
    let report = super::load_and_mine(log_path, config)?;
    let rows = rows(&report);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(writer, "No activities found.")?;
        return Ok(());
    }

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", row.activity)?;
        writeln!(writer, "  temporal     {}", format_score(row.scores.temporal))?;
        writeln!(writer, "  contextual   {}", format_score(row.scores.contextual))?;
        writeln!(writer, "  multidim     {}", format_score(row.scores.multidim))?;
        writeln!(writer, "  uncertainty  {}", format_score(row.scores.uncertainty))?;
        writeln!(writer, "  fused        {:.4}", row.fused)?;
    }
    Ok(())
}
