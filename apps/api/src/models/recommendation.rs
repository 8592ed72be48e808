use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::program::ProgramResponse;

pub const ALGORITHM_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub program_id: Uuid,
    pub total_score: i32,
    pub ranking: i32,
    pub riasec_score: i32,
    pub grades_score: i32,
    pub values_score: i32,
    pub employment_score: i32,
    pub financial_score: i32,
    pub strengths: Option<Json<Vec<String>>>,
    pub weaknesses: Option<Json<Vec<String>>>,
    pub advice: Option<String>,
    pub algorithm_version: String,
    pub created_at: DateTime<Utc>,
}

/// Stored recommendation joined with its program.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub recommendation: RecommendationRow,
    pub program: ProgramResponse,
    pub compatibility_score: i32,
    pub recommendations: Vec<String>,
}

impl RecommendationResponse {
    pub fn new(recommendation: RecommendationRow, program: ProgramResponse) -> Self {
        let compatibility_score = recommendation.total_score;
        let recommendations = recommendation
            .strengths
            .as_ref()
            .map(|s| s.0.clone())
            .unwrap_or_default();
        RecommendationResponse {
            recommendation,
            program,
            compatibility_score,
            recommendations,
        }
    }
}
