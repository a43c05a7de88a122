use crate::models::{ComparisonResult, PhraseSet};

pub const RANKED_EXTRA_LIMIT: usize = 10;

/// Three-way comparison of job and résumé phrases by exact set membership.
pub fn compare(job_skills: &PhraseSet, resume_skills: &PhraseSet) -> ComparisonResult {
    let matched = job_skills.intersection(resume_skills);
    let missing = job_skills.difference(resume_skills);
    let extra = resume_skills.difference(job_skills);
    let ranked_extra = rank_extra(&extra, RANKED_EXTRA_LIMIT);

    tracing::debug!(
        job_skills = job_skills.len(),
        resume_skills = resume_skills.len(),
        matched = matched.len(),
        missing = missing.len(),
        extra = extra.len(),
        "Skill comparison completed"
    );

    ComparisonResult {
        matched,
        missing,
        extra,
        ranked_extra,
    }
}

/// Longest phrases first, ties broken lexicographically.
pub fn rank_extra(extra: &PhraseSet, limit: usize) -> Vec<String> {
    let mut ranked: Vec<&String> = extra.iter().collect();
    ranked.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    ranked.into_iter().take(limit).cloned().collect()
}
