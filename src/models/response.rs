use serde::Serialize;

use crate::models::{AnalysisReport, CoverLetterDraft, Summary};

/// Formatting advice returned with every analysis.
pub const ATS_SUGGESTIONS: [&str; 5] = [
    "Use standard section titles: Experience, Education, Skills",
    "Stick to common fonts (Arial, Calibri, Times New Roman)",
    "Include measurable achievements (e.g., \"Improved efficiency by 25%\")",
    "Avoid using graphics, tables, or columns",
    "Use bullet points instead of paragraphs for readability",
];

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: AnalysisData,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisData {
    pub job_summary: Summary,
    pub resume_summary: Summary,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub ranked_extra: Vec<String>,
    pub counts: SkillCounts,
    pub resume_characters: usize,
    pub ats_suggestions: Vec<&'static str>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SkillCounts {
    pub matched: usize,
    pub missing: usize,
    pub extra: usize,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub success: bool,
    pub data: CoverLetterDraft,
    pub processing_time_ms: u64,
}

impl AnalyzeResponse {
    pub fn new(report: AnalysisReport, processing_time_ms: u64) -> Self {
        let comparison = report.comparison;
        let counts = SkillCounts {
            matched: comparison.matched.len(),
            missing: comparison.missing.len(),
            extra: comparison.extra.len(),
        };

        Self {
            success: true,
            data: AnalysisData {
                job_summary: report.job_summary,
                resume_summary: report.resume_summary,
                matched: comparison.matched.iter().cloned().collect(),
                missing: comparison.missing.iter().cloned().collect(),
                ranked_extra: comparison.ranked_extra,
                counts,
                resume_characters: report.resume_text.chars().count(),
                ats_suggestions: ATS_SUGGESTIONS.to_vec(),
            },
            processing_time_ms,
        }
    }
}

impl CoverLetterResponse {
    pub fn new(draft: CoverLetterDraft, processing_time_ms: u64) -> Self {
        Self {
            success: true,
            data: draft,
            processing_time_ms,
        }
    }
}
