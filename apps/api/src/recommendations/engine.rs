//! Ranks candidate programs for a student.

use uuid::Uuid;

use crate::models::program::ProgramRow;
use crate::models::student::StudentProfileRow;
use crate::programs::compatibility::{
    evaluate, recommendation_notes, RecommendationNotes, StudentSignals, SubScores,
};

/// Hard ceiling on stored recommendations, whatever the requested limit.
pub const MAX_RECOMMENDATIONS: usize = 20;

/// Program levels a fresh bachelor can enter directly.
pub static ENTRY_LEVELS: [&str; 2] = ["Licence", "Ingenieur"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecommendation {
    pub program_id: Uuid,
    pub ranking: i32,
    pub total_score: i32,
    pub scores: SubScores,
    pub notes: RecommendationNotes,
}

/// Level restriction for the candidate set, if any.
pub fn candidate_levels(profile: &StudentProfileRow) -> Option<&'static [&'static str]> {
    profile.is_new_bachelor().then_some(&ENTRY_LEVELS[..])
}

/// Scores every program, keeps the best `min(limit, MAX_RECOMMENDATIONS)` and
/// numbers them from 1. Equal totals keep the candidate order.
pub fn rank_programs(
    signals: &StudentSignals<'_>,
    programs: &[ProgramRow],
    limit: usize,
) -> Vec<NewRecommendation> {
    let mut scored: Vec<(Uuid, _)> = programs
        .iter()
        .map(|program| (program.id, evaluate(signals, program)))
        .collect();
    scored.sort_by(|a, b| b.1.total.cmp(&a.1.total));

    scored
        .into_iter()
        .take(limit.min(MAX_RECOMMENDATIONS))
        .enumerate()
        .map(|(idx, (program_id, compat))| NewRecommendation {
            program_id,
            ranking: idx as i32 + 1,
            total_score: compat.total,
            scores: compat.scores,
            notes: recommendation_notes(&compat),
        })
        .collect()
}
