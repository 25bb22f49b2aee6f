//! crates/exam_tracker_core/src/config.rs
//!
//! Explicit configuration for the metrics calculators.
//!
//! Category tables, scoring weights and goal constants live here instead of in
//! module-level constants so callers (and tests) can substitute their own. The
//! defaults reproduce the YKS exam layout the application was built around.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How subject names are uppercased when canonicalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseLocale {
    /// Unicode default case mapping.
    Root,
    /// Turkish mapping: `i` → `İ`, `ı` → `I`.
    #[default]
    Turkish,
}

/// Trims and uppercases a subject or category name.
///
/// This is the only place names are normalized. Every lookup keyed by a
/// subject name goes through it, which makes those lookups case-insensitive.
pub fn canonical_name(raw: &str, locale: CaseLocale) -> String {
    let trimmed = raw.trim();
    match locale {
        CaseLocale::Root => trimmed.to_uppercase(),
        CaseLocale::Turkish => trimmed
            .chars()
            .flat_map(|c| match c {
                'i' => vec!['İ'],
                'ı' => vec!['I'],
                other => other.to_uppercase().collect(),
            })
            .collect(),
    }
}

/// Base offset and per-subject weights of the composite admission score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScoreConfig {
    pub base_offset: f64,
    /// Keyed by canonical subject name.
    pub weights: BTreeMap<String, f64>,
}

impl Default for CompositeScoreConfig {
    fn default() -> Self {
        let weights = [
            ("TÜRKÇE", 3.3),
            ("MATEMATİK", 3.3),
            ("FEN BİLİMLERİ", 3.4),
            ("SOSYAL BİLİMLER", 3.4),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        Self {
            base_offset: 100.0,
            weights,
        }
    }
}

/// All tunables consumed by the calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub locale: CaseLocale,
    /// Umbrella category → member subject names.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Denominator for the per-subject net percentage.
    pub max_net_per_subject: f64,
    pub composite: CompositeScoreConfig,
    pub daily_goal_minutes: u32,
    pub weekly_goal_minutes: u32,
    /// Window used for the weekly per-subject study total.
    pub weekly_window_days: u32,
    /// Subjects under this net percentage are reported as weak.
    pub weak_subject_threshold: f64,
    pub weak_subject_limit: usize,
    pub upcoming_exam_window_days: u32,
    pub upcoming_exam_limit: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let categories = [
            ("FEN BİLİMLERİ", &["FİZİK", "KİMYA", "BİYOLOJİ"][..]),
            (
                "SOSYAL BİLİMLER",
                &[
                    "TARİH",
                    "COĞRAFYA",
                    "SOSYAL",
                    "FELSEFE",
                    "DİN KÜLTÜRÜ VE AHLAK BİLGİSİ",
                ][..],
            ),
            ("MATEMATİK", &["MATEMATİK", "GEOMETRİ"][..]),
            (
                "TÜRKÇE",
                &["TÜRKÇE", "EDEBİYAT", "TÜRK DİLİ VE EDEBİYATI"][..],
            ),
        ]
        .into_iter()
        .map(|(category, members)| {
            (
                category.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            )
        })
        .collect();

        Self {
            locale: CaseLocale::Turkish,
            categories,
            max_net_per_subject: 40.0,
            composite: CompositeScoreConfig::default(),
            daily_goal_minutes: 240,
            weekly_goal_minutes: 600,
            weekly_window_days: 7,
            weak_subject_threshold: 60.0,
            weak_subject_limit: 2,
            upcoming_exam_window_days: 30,
            upcoming_exam_limit: 3,
        }
    }
}

impl MetricsConfig {
    pub fn canonical(&self, raw: &str) -> String {
        canonical_name(raw, self.locale)
    }

    /// Maps a raw subject name to its umbrella category.
    ///
    /// Members and category names are compared in canonical form. Membership is
    /// checked before category names, so a category listed as another category's
    /// member resolves to the parent. A name that is neither a member nor a
    /// category becomes its own singleton category.
    pub fn category_of(&self, subject: &str) -> String {
        let wanted = self.canonical(subject);

        for (category, members) in &self.categories {
            if members.iter().any(|m| self.canonical(m) == wanted) {
                return self.canonical(category);
            }
        }

        if let Some(category) = self
            .categories
            .keys()
            .find(|category| self.canonical(category) == wanted)
        {
            return self.canonical(category);
        }

        wanted
    }
}
