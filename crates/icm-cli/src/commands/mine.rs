//! Mine command: ranking, relations and process model.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use icm_core::{MinerConfig, MiningReport};

use crate::render;

pub fn run<W: Write>(
    writer: &mut W,
    log_path: &Path,
    config: &MinerConfig,
    dot: Option<&Path>,
    json: bool,
) -> Result<()> {
    let report = super::load_and_mine(log_path, config)?;

    if let Some(dot_path) = dot {
        std::fs::write(dot_path, render::to_dot(&report.model)?)
            .with_context(|| format!("failed to write {}", dot_path.display()))?;
        tracing::debug!(path = ?dot_path, "wrote DOT model");
    }

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_summary(writer, &report)?;
    }
    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, report: &MiningReport) -> Result<()> {
    writeln!(
        writer,
        "Mined {} traces ({} events)",
        report.trace_count, report.event_count
    )?;

    if report.ranking.is_empty() {
        writeln!(writer, "No activities found.")?;
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "Ranking:")?;
    for (i, ranked) in report.ranking.iter().enumerate() {
        writeln!(writer, "  {}. {}  {:.4}", i + 1, ranked.activity, ranked.score)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Relations:")?;
    if report.relations.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for edge in &report.relations {
        writeln!(writer, "  {} -> {}  {}", edge.source, edge.target, edge.kind)?;
    }

    let net = &report.model.net;
    writeln!(writer)?;
    writeln!(
        writer,
        "Model: {} places, {} transitions, {} arcs",
        net.place_count(),
        net.transition_count(),
        net.arcs().len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    const LOG: &str = r#"[
        [
            {"concept:name": "A", "time:timestamp": "2025-01-15T09:00:00Z"},
            {"concept:name": "B", "time:timestamp": "2025-01-15T09:01:00Z"}
        ],
        [
            {"concept:name": "A", "time:timestamp": "2025-01-15T09:10:00Z"},
            {"concept:name": "C", "time:timestamp": "2025-01-15T09:11:00Z"}
        ]
    ]"#;

    fn write_log(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("log.json");
        std::fs::write(&path, LOG).unwrap();
        path
    }

    #[test]
    fn mine_command_prints_summary() {
        let temp = tempfile::tempdir().unwrap();
        let log = write_log(temp.path());

        let mut output = Vec::new();
        run(&mut output, &log, &MinerConfig::default(), None, false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Mined 2 traces (4 events)

        Ranking:
          1. B  1.2925
          2. C  1.2925
          3. A  1.1149

        Relations:
          B -> C  sequence
          C -> A  sequence

        Model: 6 places, 5 transitions, 11 arcs
        ");
    }

    #[test]
    fn mine_command_writes_dot_file() {
        let temp = tempfile::tempdir().unwrap();
        let log = write_log(temp.path());
        let dot = temp.path().join("model.dot");

        let mut output = Vec::new();
        run(&mut output, &log, &MinerConfig::default(), Some(&dot), false).unwrap();

        let dot = std::fs::read_to_string(&dot).unwrap();
        assert!(dot.starts_with("digraph process {"));
        assert!(dot.contains(r#"label="End""#));
    }

    #[test]
    fn mine_command_json_output() {
        let temp = tempfile::tempdir().unwrap();
        let log = write_log(temp.path());

        let mut output = Vec::new();
        run(&mut output, &log, &MinerConfig::default(), None, true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["trace_count"], 2);
        assert_eq!(value["ranking"][0]["activity"], "B");
        assert_eq!(value["relations"][1]["kind"], "sequence");
        assert_eq!(value["model"]["initial_marking"]["0"], 1);
        // Singletons A, B, C and pairs {A, B}, {A, C}.
        assert_eq!(value["multidim"].as_array().unwrap().len(), 5);
        assert_eq!(value["multidim"][1]["activities"], serde_json::json!(["A", "B"]));
    }

    #[test]
    fn mine_command_reports_missing_log() {
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        let err = run(
            &mut output,
            &temp.path().join("missing.json"),
            &MinerConfig::default(),
            None,
            false,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("log not found"));
    }
}
