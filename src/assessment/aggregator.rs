//! Score aggregator for the self-assessment.
//!
//! Responsible for:
//! - Grouping flat evaluation rows into sheets
//! - Building the section → chapter → criterion tree of a sheet
//! - Computing the hierarchical average score
//! - Ordering sheets newest first

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::evaluation::{EvaluationRow, SheetSummary};

use super::level::AchievedLevel;

/// Bucket for rows without section, chapter or criterion code.
pub const OTHER_BUCKET: &str = "Other";

/// Default decimal places of a sheet score.
pub const DEFAULT_PRECISION: u32 = 2;

/// Leaf of the score tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub code: String,
    /// Highest level reached across the criterion's rows.
    pub level: AchievedLevel,
    pub rows: usize,
}

/// Chapter node: mean of its criteria levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterScore {
    pub name: String,
    pub score: f64,
    pub criteria: Vec<CriterionScore>,
}

/// Section node: mean of its chapter scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionScore {
    pub name: String,
    pub score: f64,
    pub chapters: Vec<ChapterScore>,
}

/// Full score tree of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub sections: Vec<SectionScore>,
    /// Unrounded sheet score.
    pub score: f64,
}

type Tree = BTreeMap<String, BTreeMap<String, BTreeMap<String, (AchievedLevel, usize)>>>;

/// Score aggregator.
pub struct ScoreAggregator;

impl ScoreAggregator {
    /// Summarizes every sheet found in `rows`, newest sheet first.
    ///
    /// Rows without a sheet id are dropped. Identity fields come from the
    /// first row of each sheet in input order.
    pub fn summarize(rows: &[EvaluationRow]) -> Vec<SheetSummary> {
        Self::summarize_with_precision(rows, DEFAULT_PRECISION)
    }

    /// Same as [`ScoreAggregator::summarize`] with a custom score precision.
    pub fn summarize_with_precision(rows: &[EvaluationRow], precision: u32) -> Vec<SheetSummary> {
        let groups = Self::group_by_sheet(rows);

        let mut summaries: Vec<SheetSummary> = groups
            .into_iter()
            .map(|(sheet_id, group)| Self::summarize_sheet(sheet_id, &group, precision))
            .collect();

        // Stable: sheets with equal timestamps keep first-encounter order.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Groups rows by sheet id, keeping first-encounter order.
    pub fn group_by_sheet(rows: &[EvaluationRow]) -> Vec<(&str, Vec<&EvaluationRow>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&EvaluationRow>)> = Vec::new();
        let mut dropped = 0usize;

        for row in rows {
            let Some(key) = row.grouping_key() else {
                dropped += 1;
                continue;
            };

            let slot = *index.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row);
        }

        if dropped > 0 {
            tracing::warn!(dropped, "Evaluation rows without sheet id ignored");
        }

        groups
    }

    /// Builds the score tree of a set of rows belonging to one sheet.
    pub fn breakdown<'a, I>(rows: I) -> ScoreBreakdown
    where
        I: IntoIterator<Item = &'a EvaluationRow>,
    {
        let tree = Self::build_tree(rows);

        let sections: Vec<SectionScore> = tree
            .into_iter()
            .map(|(section, chapters)| {
                let chapters: Vec<ChapterScore> = chapters
                    .into_iter()
                    .map(|(chapter, leaves)| {
                        let criteria: Vec<CriterionScore> = leaves
                            .into_iter()
                            .map(|(code, (level, rows))| CriterionScore { code, level, rows })
                            .collect();
                        let score =
                            mean(criteria.iter().map(|c| f64::from(c.level.value()))).unwrap_or(0.0);
                        ChapterScore {
                            name: chapter,
                            score,
                            criteria,
                        }
                    })
                    .collect();
                let score = mean(chapters.iter().map(|c| c.score)).unwrap_or(0.0);
                SectionScore {
                    name: section,
                    score,
                    chapters,
                }
            })
            .collect();

        let score = mean(sections.iter().map(|s| s.score)).unwrap_or(0.0);

        ScoreBreakdown { sections, score }
    }

    /// Computes the sheet score of a set of rows, unrounded.
    pub fn calculate_score<'a, I>(rows: I) -> f64
    where
        I: IntoIterator<Item = &'a EvaluationRow>,
    {
        Self::breakdown(rows).score
    }

    fn summarize_sheet(sheet_id: &str, rows: &[&EvaluationRow], precision: u32) -> SheetSummary {
        let first = rows.first().copied();
        let score = Self::calculate_score(rows.iter().copied());

        SheetSummary {
            sheet_id: sheet_id.to_string(),
            evaluated_at: first.and_then(|r| r.evaluated_at),
            evaluated_by: first.and_then(|r| r.evaluated_by.clone()),
            evaluated_unit: first.and_then(|r| r.evaluated_unit.clone()),
            created_at: first.and_then(|r| r.created_at),
            total_criteria: rows.len(),
            passed_criteria: rows.iter().filter(|r| r.passed).count(),
            score: round_to(score, precision),
        }
    }

    fn build_tree<'a, I>(rows: I) -> Tree
    where
        I: IntoIterator<Item = &'a EvaluationRow>,
    {
        let mut tree = Tree::new();

        for row in rows {
            let section = bucket(row.section.as_deref());
            let chapter = bucket(row.chapter.as_deref());
            let code = row.criterion_code().unwrap_or(OTHER_BUCKET).to_string();
            let level = row.level();

            let leaf = tree
                .entry(section)
                .or_default()
                .entry(chapter)
                .or_default()
                .entry(code)
                .or_insert((AchievedLevel::Unrated, 0));
            leaf.0 = leaf.0.max(level);
            leaf.1 += 1;
        }

        tree
    }
}

fn bucket(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => OTHER_BUCKET.to_string(),
    }
}

/// Arithmetic mean, `None` for an empty input.
fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Rounds half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
