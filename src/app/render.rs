//! Terminal rendering for lesson output and experiment tables.

use crate::Config;
use crate::observations::{Analysis, ExperimentVariant, Observation};
use crate::tutor::QuizReport;
use console::{Alignment, measure_text_width, pad_str, style};
use std::fmt::Write;

const MISSING_CELL: &str = "-";

fn value(measurement: f64) -> String {
    format!("{measurement:.1}")
}

/// Left-align every column to its widest cell.
fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .chain(std::iter::once(&header[col]))
                .map(|cell| measure_text_width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "  {}", style(line(header)).bold());
    let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "  {}", style("─".repeat(rule)).dim());
    for row in rows {
        let _ = writeln!(out, "  {}", line(row.as_slice()));
    }
    out
}

pub fn records_table(variant: ExperimentVariant, records: &[Observation]) -> String {
    let mut out = format!("{}\n\n", style(variant.title()).white().bold());
    if records.is_empty() {
        let _ = writeln!(out, "  {}", style(t!("observations.empty")).dim());
        return out;
    }

    let header: Vec<String> = variant.header().iter().map(ToString::to_string).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.group.clone(),
                value(r.measurement),
                r.note.clone(),
            ]
        })
        .collect();
    out.push_str(&table(&header, &rows));
    let _ = write!(out, "\n  {}", style(t!("observations.count", count = records.len())).dim());
    out
}

pub fn analysis_report(analysis: &Analysis) -> String {
    let variant = analysis.variant;
    let mut out = format!("{}\n\n", style(variant.title()).white().bold());
    if analysis.record_count == 0 {
        let _ = writeln!(out, "  {}", style(t!("observations.empty")).dim());
        return out;
    }

    let _ = writeln!(
        out,
        "  {} {}\n",
        style("◆").cyan().bold(),
        t!("observations.group_means", label = variant.measurement_label())
    );
    let header = vec![
        t!("observations.column_group").into_owned(),
        t!("observations.column_count").into_owned(),
        t!("observations.column_mean").into_owned(),
        t!("observations.column_min").into_owned(),
        t!("observations.column_max").into_owned(),
    ];
    let rows: Vec<Vec<String>> = analysis
        .summaries
        .iter()
        .map(|s| {
            vec![
                s.group.clone(),
                s.count.to_string(),
                value(s.mean),
                value(s.min),
                value(s.max),
            ]
        })
        .collect();
    out.push_str(&table(&header, &rows));

    let _ = writeln!(
        out,
        "\n  {} {}\n",
        style("◆").cyan().bold(),
        t!("observations.by_date")
    );
    let mut header = vec![variant.header()[0].to_string()];
    header.extend(analysis.pivot.groups.iter().cloned());
    let rows: Vec<Vec<String>> = analysis
        .pivot
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.date.to_string())
                .chain(
                    row.values
                        .iter()
                        .map(|v| v.map_or_else(|| MISSING_CELL.to_string(), value)),
                )
                .collect()
        })
        .collect();
    out.push_str(&table(&header, &rows));
    out
}

pub fn tutor_message(text: &str) -> String {
    format!("{} {}", style("Sinu ›").green().bold(), text)
}

pub fn report_card(report: &QuizReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n  {}", style(t!("report.title")).white().bold());
    let _ = writeln!(out, "  {}", style("─".repeat(32)).dim());
    let _ = writeln!(
        out,
        "  {}  {}",
        style(t!("report.score")).cyan(),
        style(format!(
            "{} / {}",
            report.correct_answers, report.total_questions
        ))
        .green()
        .bold()
    );
    let _ = writeln!(
        out,
        "  {}  {}",
        style(t!("report.accuracy")).cyan(),
        style(format!("{:.0}%", report.accuracy_percent())).green()
    );
    let _ = writeln!(
        out,
        "  {}  {}",
        style(t!("report.guidance")).cyan(),
        style(report.guidance_count).green()
    );
    if !report.remark.is_empty() {
        let _ = writeln!(out, "\n  {}", style(t!("report.remark")).cyan());
        for line in report.remark.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

pub fn config_summary(config: &Config) -> String {
    let key = if config.api_key.is_some() {
        t!("config.api_key_set")
    } else {
        t!("config.api_key_missing")
    };
    let fields = [
        ("config", config.config_path.display().to_string()),
        ("model", config.model().to_string()),
        ("temperature", config.default_temperature.to_string()),
        ("api_key", key.into_owned()),
        ("api_base_url", config.api_base_url.clone()),
        (
            "provider_retries",
            config.reliability.provider_retries.to_string(),
        ),
        (
            "provider_backoff_ms",
            config.reliability.provider_backoff_ms.to_string(),
        ),
        (
            "count_help_turns",
            config.tutor.count_help_turns.to_string(),
        ),
        (
            "default_quiz_total",
            config.tutor.default_quiz_total.to_string(),
        ),
        ("locale", config.tutor.locale.clone()),
        (
            "observations",
            config.observations_dir().display().to_string(),
        ),
    ];

    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, val) in fields {
        let _ = writeln!(out, "  {}  {}", style(format!("{name:width$}")).cyan(), style(val).green());
    }
    out
}
