//! Report rendering: ranked feature CSV, coefficient chart, console tables.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::{DominanceScore, OlsReport, RidgeReport, SignificanceResult};
use crate::features::{ColumnName, EncodedFeatureMatrix, FeatureTable, LabelTally};
use crate::lexicon::LexiconContext;

const CHART_BAR_WIDTH: f64 = 60.0;
const CHART_BAR_GAP: f64 = 20.0;
const CHART_PLOT_HEIGHT: f64 = 400.0;
const CHART_MARGIN: f64 = 40.0;
const CHART_LABEL_SPACE: f64 = 220.0;

/// One row of the ranked feature CSV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "Significance")]
    pub significance: usize,
    #[serde(rename = "Data Count")]
    pub data_count: usize,
    #[serde(rename = "Weight (abs)")]
    pub weight: f64,
    #[serde(rename = "Weight sign")]
    pub sign: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Results sorted by absolute weight, highest first, with data counts
pub fn rank_features(results: &[SignificanceResult], tally: &LabelTally) -> Vec<RankedFeature> {
    let mut sorted: Vec<&SignificanceResult> = results.iter().collect();
    sorted.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    sorted
        .into_iter()
        .map(|result| RankedFeature {
            feature: result.feature.clone(),
            significance: result.significance,
            data_count: ColumnName::parse(&result.feature).map_or(0, |name| tally.count(name.tally_key())),
            weight: round2(result.weight),
            sign: result.sign,
        })
        .collect()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_ranking_csv<P: AsRef<Path>>(path: P, rows: &[RankedFeature]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} ranked features to {}", rows.len(), path.display());
    Ok(())
}

/// The `top_n` most negative and `top_n` most positive signed coefficients,
/// ascending
pub fn chart_selection(results: &[SignificanceResult], top_n: usize) -> Vec<(String, f64)> {
    let mut signed: Vec<(String, f64)> = results
        .iter()
        .map(|result| (result.feature.clone(), result.weight * result.sign))
        .collect();
    signed.sort_by(|a, b| a.1.total_cmp(&b.1));
    if signed.len() > 2 * top_n {
        let positives = signed.split_off(signed.len() - top_n);
        signed.truncate(top_n);
        signed.extend(positives);
    }
    signed
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Bar chart of selected coefficients as an SVG document
pub fn coefficient_chart_svg(bars: &[(String, f64)]) -> String {
    let width = 2.0 * CHART_MARGIN + bars.len() as f64 * (CHART_BAR_WIDTH + CHART_BAR_GAP);
    let height = 2.0 * CHART_MARGIN + CHART_PLOT_HEIGHT + CHART_LABEL_SPACE;
    let max_abs = bars.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max);
    let scale = if max_abs > 0.0 {
        CHART_PLOT_HEIGHT / (2.0 * max_abs)
    } else {
        0.0
    };
    let zero_y = CHART_MARGIN + CHART_PLOT_HEIGHT / 2.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" font-family="sans-serif" font-size="12">"#,
        width, height
    );
    let _ = writeln!(
        svg,
        r#"  <line x1="{m}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="black"/>"#,
        m = CHART_MARGIN,
        y = zero_y,
        x2 = width - CHART_MARGIN
    );
    for (i, (name, value)) in bars.iter().enumerate() {
        let x = CHART_MARGIN + i as f64 * (CHART_BAR_WIDTH + CHART_BAR_GAP) + CHART_BAR_GAP / 2.0;
        let bar_height = value.abs() * scale;
        let y = if *value < 0.0 { zero_y } else { zero_y - bar_height };
        let color = if *value < 0.0 { "red" } else { "green" };
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{:.4}</title></rect>"#,
            x, y, CHART_BAR_WIDTH, bar_height, color, value
        );
        let label_x = x + CHART_BAR_WIDTH / 2.0;
        let label_y = CHART_MARGIN + CHART_PLOT_HEIGHT + 12.0;
        let _ = writeln!(
            svg,
            r#"  <text x="{lx:.1}" y="{ly:.1}" text-anchor="end" transform="rotate(-45 {lx:.1} {ly:.1})">{}</text>"#,
            escape_xml(name),
            lx = label_x,
            ly = label_y
        );
    }
    svg.push_str("</svg>\n");
    svg
}

pub fn write_coefficient_chart<P: AsRef<Path>>(path: P, results: &[SignificanceResult], top_n: usize) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let bars = chart_selection(results, top_n);
    fs::write(path, coefficient_chart_svg(&bars)).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote coefficient chart with {} bars to {}", bars.len(), path.display());
    Ok(())
}

/// Lexicon totals, label counts and matrix shape
pub fn metrics_summary(lexicons: &LexiconContext, table: &FeatureTable, matrix: &EncodedFeatureMatrix) -> String {
    let levin = &lexicons.levin;
    let semantic = levin.semantic_classes().count();
    let alternations = levin.alternations().count();

    let mut out = String::new();
    let _ = writeln!(out, "Total classes before filtering:");
    let _ = writeln!(out, "--Levin semantic_broad nb classes: {}", levin.semantic_broad().len());
    let _ = writeln!(out, "--Levin semantic_all nb classes: {}", semantic);
    let _ = writeln!(out, "--Levin alternations nb classes: {}", alternations);
    let _ = writeln!(out, "--Levin alternations + semantic_all nb classes: {}", levin.classes().len());
    let _ = writeln!(out, "LIWC total number of classes: {}", lexicons.liwc.categories().len());
    let _ = writeln!(out);

    let positive = table.records.iter().filter(|r| r.label).count();
    let mut families: BTreeMap<&str, usize> = BTreeMap::new();
    for column in matrix.columns() {
        *families.entry(column.name.family.name()).or_insert(0) += 1;
    }
    let families = families
        .iter()
        .map(|(family, count)| format!("{}: {}", family, count))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(out, "Counts after filtering:");
    let _ = writeln!(out, "Counter all labels: pos: {}, neg: {}", positive, table.len() - positive);
    let _ = writeln!(out, "Features size: {} -- {}", matrix.n_cols(), families);
    let _ = writeln!(out, "Features shape: ({}, {})", matrix.n_rows(), matrix.n_cols());
    out
}

pub fn format_ols(report: &OlsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "OLS R^2: {:.4}", report.r_squared);
    let _ = writeln!(out, "{:<48} {:>10} {:>10} {:>8} {:>8}", "", "coef", "std err", "t", "P>|t|");
    for row in &report.coefficients {
        let _ = writeln!(
            out,
            "{:<48} {:>10.4} {:>10.4} {:>8.3} {:>8.3}",
            row.feature, row.coefficient, row.std_error, row.t_value, row.p_value
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Significant features:");
    for row in &report.significant {
        let _ = writeln!(out, "{:<48} {:>10.4} {:>8.3}", row.feature, row.coefficient, row.p_value);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Example words from the significant features:");
    for example in &report.examples {
        let words = example
            .words
            .iter()
            .map(|(word, count)| format!("{} ({})", word, count))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{} -- {}", example.feature, words);
    }
    out
}

pub fn format_ridge(report: &RidgeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ridge regression R^2: {}", report.r_squared);
    for row in &report.coefficients {
        let _ = writeln!(out, "{:<48} {:>10.4}", row.feature, row.coefficient);
    }
    out
}

pub fn format_dominance(scores: &[DominanceScore]) -> String {
    let mut out = String::from("Dominance scores:\n");
    for score in scores {
        let _ = writeln!(out, "{} {}", score.score, score.feature);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(feature: &str, weight: f64, sign: f64, significance: usize) -> SignificanceResult {
        SignificanceResult {
            feature: feature.to_string(),
            weight,
            sign,
            significance,
        }
    }

    #[test]
    fn test_ranking_uses_tally_keys() {
        let mut tally = LabelTally::new();
        tally.add_many("posemo", 7);
        tally.add_many("text_similarity", 40);
        let results = vec![
            result("LIWC_change_posemo", 0.314, -1.0, 90),
            result("text_similarity", 1.276, 1.0, 99),
        ];

        let ranked = rank_features(&results, &tally);
        assert_eq!(ranked[0].feature, "text_similarity");
        assert_eq!(ranked[0].weight, 1.28);
        assert_eq!(ranked[0].data_count, 40);
        assert_eq!(ranked[1].data_count, 7);
        assert_eq!(ranked[1].sign, -1.0);
    }

    #[test]
    fn test_ranking_csv_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sorted_features.csv");
        let rows = vec![RankedFeature {
            feature: "LIWC_change_posemo".to_string(),
            significance: 12,
            data_count: 3,
            weight: 0.5,
            sign: 1.0,
        }];
        write_ranking_csv(&path, &rows).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("Feature,Significance,Data Count,Weight (abs),Weight sign"));
        assert_eq!(lines.next(), Some("LIWC_change_posemo,12,3,0.5,1.0"));
    }

    #[test]
    fn test_chart_selection_takes_both_tails() {
        let results: Vec<SignificanceResult> = (0..8)
            .map(|i| result(&format!("f{}", i), i as f64, if i % 2 == 0 { -1.0 } else { 1.0 }, 0))
            .collect();
        let bars = chart_selection(&results, 2);
        let names: Vec<&str> = bars.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["f6", "f4", "f5", "f7"]);

        let svg = coefficient_chart_svg(&bars);
        assert_eq!(svg.matches("fill=\"red\"").count(), 2);
        assert_eq!(svg.matches("fill=\"green\"").count(), 2);
    }

    #[test]
    fn test_dominance_formatting() {
        let scores = vec![DominanceScore {
            feature: "LIWC-original_posemo".to_string(),
            score: f64::INFINITY,
            positive_coverage: 1.0,
            negative_coverage: 0.0,
        }];
        assert_eq!(format_dominance(&scores), "Dominance scores:\ninf LIWC-original_posemo\n");
    }
}
