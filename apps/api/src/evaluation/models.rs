use serde::{Deserialize, Serialize};

/// Structured evaluation of one resume against one job description.
///
/// Built only by `parser::parse_evaluation`, which guarantees every score is finite
/// and within 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub match_percentage: f64,
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
    pub technical_skills: f64,
    pub soft_skills: f64,
    pub experience: f64,
    pub education: f64,
    pub projects: f64,
}

/// One axis of the strength chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthAxis {
    pub label: String,
    pub score: f64,
}

/// The five sub-scores as ordered chart axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthProfile {
    pub title: String,
    pub axes: Vec<StrengthAxis>,
}

impl EvaluationResult {
    pub fn strength_profile(&self) -> StrengthProfile {
        let axes = [
            ("Technical Skills", self.technical_skills),
            ("Soft Skills", self.soft_skills),
            ("Experience", self.experience),
            ("Education", self.education),
            ("Projects", self.projects),
        ]
        .into_iter()
        .map(|(label, score)| StrengthAxis {
            label: label.to_string(),
            score,
        })
        .collect();

        StrengthProfile {
            title: "Resume Strength Analysis".to_string(),
            axes,
        }
    }

    /// Match score as shown to users, e.g. `91.0%`.
    pub fn match_display(&self) -> String {
        format!("{:.1}%", self.match_percentage)
    }
}
