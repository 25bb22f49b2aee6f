//! crates/exam_tracker_core/src/scoring.rs
//!
//! Net and score arithmetic. Everything here works at full precision;
//! `round_to` is for presentation only and is never fed back into sums.

use crate::config::{canonical_name, CaseLocale, CompositeScoreConfig};
use crate::domain::{ExamSubjectResult, NewExam, NewExamSubject};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Each incorrect answer cancels a quarter of a correct one.
pub const INCORRECT_PENALTY: f64 = 0.25;

/// `correct − incorrect × 0.25`. Negative nets are kept as they are.
pub fn compute_net(correct: u32, incorrect: u32) -> f64 {
    f64::from(correct) - f64::from(incorrect) * INCORRECT_PENALTY
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExamTotals {
    pub score: f64,
    pub max_questions: u32,
}

/// Sums nets and question counts across an exam's subject results.
pub fn compute_exam_score_and_max(results: &[ExamSubjectResult]) -> ExamTotals {
    results.iter().fold(
        ExamTotals {
            score: 0.0,
            max_questions: 0,
        },
        |acc, r| ExamTotals {
            score: acc.score + r.net,
            max_questions: acc.max_questions.saturating_add(r.total_questions()),
        },
    )
}

/// Composite admission score: `base_offset + Σ net × weight`.
///
/// `subject_nets` may be keyed by any casing; keys are canonicalized before the
/// weight lookup. Weighted subjects with no net contribute nothing.
pub fn compute_goal_total_score(
    subject_nets: &BTreeMap<String, f64>,
    composite: &CompositeScoreConfig,
    locale: CaseLocale,
) -> f64 {
    let nets: BTreeMap<String, f64> = subject_nets
        .iter()
        .map(|(name, net)| (canonical_name(name, locale), *net))
        .collect();

    composite.base_offset
        + composite
            .weights
            .iter()
            .map(|(subject, weight)| {
                nets.get(&canonical_name(subject, locale))
                    .copied()
                    .unwrap_or(0.0)
                    * weight
            })
            .sum::<f64>()
}

/// Score as a percentage of the maximum. Zero when there is no maximum.
pub fn exam_percentage(score: f64, max_score: u32) -> f64 {
    if max_score == 0 {
        0.0
    } else {
        score / f64::from(max_score) * 100.0
    }
}

/// Builds a persistable exam from raw counts, computing every net and the totals.
pub fn prepare_new_exam(name: &str, date: NaiveDate, counts: &[NewExamSubject]) -> NewExam {
    let subjects: Vec<ExamSubjectResult> = counts
        .iter()
        .map(|c| ExamSubjectResult {
            subject_id: c.subject_id,
            correct: c.correct,
            incorrect: c.incorrect,
            empty: c.empty,
            net: compute_net(c.correct, c.incorrect),
        })
        .collect();
    let totals = compute_exam_score_and_max(&subjects);

    NewExam {
        name: name.trim().to_string(),
        date,
        score: totals.score,
        max_score: totals.max_questions,
        subjects,
    }
}

/// Rounds to `decimals` places for display.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn result(correct: u32, incorrect: u32, empty: u32) -> ExamSubjectResult {
        ExamSubjectResult {
            subject_id: Uuid::new_v4(),
            correct,
            incorrect,
            empty,
            net: compute_net(correct, incorrect),
        }
    }

    #[test]
    fn net_matches_reference_example() {
        assert_eq!(compute_net(30, 8), 28.0);
    }

    #[test]
    fn negative_net_is_preserved() {
        assert_eq!(compute_net(1, 12), -2.0);
    }

    #[test]
    fn exam_totals_sum_nets_and_questions() {
        let totals = compute_exam_score_and_max(&[result(30, 8, 2), result(10, 4, 6)]);
        assert_eq!(totals.score, 28.0 + 9.0);
        assert_eq!(totals.max_questions, 60);
    }

    #[test]
    fn oversized_counts_do_not_overflow_totals() {
        let exam = prepare_new_exam(
            "Deneme",
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &[NewExamSubject {
                subject_id: Uuid::new_v4(),
                correct: u32::MAX,
                incorrect: 1,
                empty: 0,
            }],
        );
        assert_eq!(exam.max_score, u32::MAX);
        assert_eq!(exam.subjects[0].total_questions(), u32::MAX);
    }

    #[test]
    fn empty_exam_totals_are_zero() {
        assert_eq!(
            compute_exam_score_and_max(&[]),
            ExamTotals {
                score: 0.0,
                max_questions: 0
            }
        );
    }

    #[test]
    fn composite_score_weights_known_subjects() {
        let nets = BTreeMap::from([
            ("Türkçe".to_string(), 30.0),
            ("matematik".to_string(), 20.0),
        ]);
        let total =
            compute_goal_total_score(&nets, &CompositeScoreConfig::default(), CaseLocale::Turkish);
        assert!((total - (100.0 + 30.0 * 3.3 + 20.0 * 3.3)).abs() < 1e-9);
    }

    #[test]
    fn composite_score_with_no_nets_is_base_offset() {
        let total = compute_goal_total_score(
            &BTreeMap::new(),
            &CompositeScoreConfig::default(),
            CaseLocale::Turkish,
        );
        assert_eq!(total, 100.0);
    }

    #[test]
    fn unweighted_subject_is_ignored() {
        let nets = BTreeMap::from([("Felsefe".to_string(), 12.0)]);
        let total =
            compute_goal_total_score(&nets, &CompositeScoreConfig::default(), CaseLocale::Turkish);
        assert_eq!(total, 100.0);
    }

    #[test]
    fn percentage_of_zero_max_is_zero() {
        assert_eq!(exam_percentage(12.0, 0), 0.0);
        assert_eq!(exam_percentage(30.0, 120), 25.0);
    }

    #[test]
    fn new_exam_gets_nets_and_totals() {
        let counts = [NewExamSubject {
            subject_id: Uuid::nil(),
            correct: 35,
            incorrect: 4,
            empty: 1,
        }];
        let exam = prepare_new_exam(
            "  TYT Deneme 3 ",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            &counts,
        );
        assert_eq!(exam.name, "TYT Deneme 3");
        assert_eq!(exam.subjects[0].net, 34.0);
        assert_eq!(exam.score, 34.0);
        assert_eq!(exam.max_score, 40);
    }

    #[test]
    fn rounding_is_display_only() {
        assert_eq!(round_to(28.756, 2), 28.76);
        assert_eq!(round_to(-1.25, 1), -1.3);
    }
}
