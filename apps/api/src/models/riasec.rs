use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiasecDimensionRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiasecQuestionRow {
    pub id: Uuid,
    pub dimension_id: Uuid,
    pub question_number: i32,
    pub text: String,
    pub reverse_scored: i32,
}

/// Question joined with its dimension code, the shape the scorer needs.
#[derive(Debug, Clone, FromRow)]
pub struct ScoredQuestion {
    pub question_number: i32,
    pub dimension_code: String,
    pub reverse_scored: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiasecTestRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub realistic_score: i32,
    pub investigative_score: i32,
    pub artistic_score: i32,
    pub social_score: i32,
    pub enterprising_score: i32,
    pub conventional_score: i32,
    pub holland_code: String,
    pub raw_answers: Json<BTreeMap<String, i32>>,
    pub test_version: String,
    pub duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiasecDraftRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub answers: Json<BTreeMap<String, i32>>,
    pub current_question_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
