use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::CurrentStudent;
use crate::errors::AppError;
use crate::models::program::{ProgramDetailResponse, ProgramResponse, ProgramRow};
use crate::models::student::ValueRatings;
use crate::programs::compatibility::{
    check_advice, criteria, criterion_highlights, evaluate, CriterionContext, CriterionScore,
    Ranking, StudentSignals, SubScores, Weights, WEIGHTS,
};
use crate::programs::statistics::{summarize, ProgramStatistics};
use crate::programs::store::{self, ProgramFilters};
use crate::riasec::store::latest_test;
use crate::state::AppState;
use crate::student::store::{find_values, list_grades};

// ────────────────────────────────────────────────────────────────────────────
// Query / response payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    pub level: Option<String>,
    pub domain: Option<String>,
    pub department: Option<String>,
    pub riasec_code: Option<String>,
    pub max_budget: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be non-negative"))]
    pub offset: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl ListQuery {
    fn filters(&self) -> ProgramFilters {
        ProgramFilters {
            level: self.level.clone(),
            domain: self.domain.clone(),
            department: self.department.clone(),
            riasec_code: self.riasec_code.clone(),
            max_budget: self.max_budget,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramListResponse {
    pub programs: Vec<ProgramResponse>,
    pub total: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[serde(default)]
    #[validate(length(min = 2, message = "Search query must be at least 2 characters"))]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityComponents {
    pub riasec_score: i32,
    pub riasec_weight: f64,
    pub grades_score: i32,
    pub grades_weight: f64,
    pub values_score: i32,
    pub values_weight: f64,
    pub employment_score: i32,
    pub employment_weight: f64,
    pub financial_score: i32,
    pub financial_weight: f64,
}

impl From<&SubScores> for CompatibilityComponents {
    fn from(s: &SubScores) -> Self {
        CompatibilityComponents {
            riasec_score: s.riasec,
            riasec_weight: Weights::fraction(WEIGHTS.riasec),
            grades_score: s.grades,
            grades_weight: Weights::fraction(WEIGHTS.grades),
            values_score: s.values,
            values_weight: Weights::fraction(WEIGHTS.values),
            employment_score: s.employment,
            employment_weight: Weights::fraction(WEIGHTS.employment),
            financial_score: s.financial,
            financial_weight: Weights::fraction(WEIGHTS.financial),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompatibilityResponse {
    pub program_id: Uuid,
    pub program_code: String,
    pub program_name: String,
    pub total_score: i32,
    pub ranking: Ranking,
    pub scores: Vec<CriterionScore>,
    pub components: CompatibilityComponents,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub advice: String,
}

fn program_not_found() -> AppError {
    AppError::NotFound("Program not found".to_string())
}

async fn require_program(state: &AppState, id: Uuid) -> Result<ProgramRow, AppError> {
    store::find_program(&state.db, id)
        .await?
        .ok_or_else(program_not_found)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/programs
pub async fn handle_list_programs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProgramListResponse>, AppError> {
    query.validate()?;
    let (programs, total) =
        store::list_programs(&state.db, &query.filters(), query.offset, query.limit).await?;
    let programs = store::with_masters(&state.db, programs).await?;
    Ok(Json(ProgramListResponse { programs, total }))
}

/// GET /api/v1/programs/search?q=
pub async fn handle_search_programs(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProgramResponse>>, AppError> {
    query.validate()?;
    let programs = store::search_programs(&state.db, query.q.trim()).await?;
    Ok(Json(store::with_masters(&state.db, programs).await?))
}

/// GET /api/v1/programs/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<ProgramStatistics>, AppError> {
    let rows = store::stats_rows(&state.db).await?;
    Ok(Json(summarize(&rows)))
}

/// GET /api/v1/programs/:id
pub async fn handle_get_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgramDetailResponse>, AppError> {
    let program = require_program(&state, id).await?;
    let subjects = store::list_subjects(&state.db, program.id).await?;
    let master_program = match program.master_program_id {
        Some(master_id) => store::master_briefs(&state.db, &[master_id])
            .await?
            .remove(&master_id),
        None => None,
    };
    Ok(Json(ProgramDetailResponse {
        program,
        subjects,
        master_program,
    }))
}

/// GET /api/v1/programs/:id/compatibility
pub async fn handle_compatibility(
    State(state): State<AppState>,
    student: CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<CompatibilityResponse>, AppError> {
    let program = require_program(&state, id).await?;
    let profile = &student.profile;

    let test = latest_test(&state.db, profile.id).await?;
    let grades = list_grades(&state.db, profile.id).await?;
    let values = find_values(&state.db, profile.id).await?;

    let holland_code = test.as_ref().map(|t| t.holland_code.as_str());
    let signals = StudentSignals {
        holland_code,
        bac_grade: profile.bac_grade,
        max_annual_budget: profile.max_annual_budget,
        grades: &grades,
        values: values.as_ref().map(ValueRatings::from),
    };
    let compat = evaluate(&signals, &program);

    let ctx = CriterionContext {
        holland_code,
        bac_grade: profile.bac_grade,
        max_annual_budget: profile.max_annual_budget,
    };
    let scores = criteria(&compat, &ctx, &program);
    let (strengths, weaknesses) = criterion_highlights(&scores);

    Ok(Json(CompatibilityResponse {
        program_id: program.id,
        program_code: program.code.clone(),
        program_name: program.name.clone(),
        total_score: compat.total,
        ranking: compat.ranking(),
        components: CompatibilityComponents::from(&compat.scores),
        scores,
        strengths,
        weaknesses,
        advice: check_advice(&compat),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, 50);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_list_query_bounds() {
        let too_big: ListQuery = serde_json::from_str(r#"{"limit": 101}"#).unwrap();
        assert!(too_big.validate().is_err());
        let negative: ListQuery = serde_json::from_str(r#"{"offset": -1}"#).unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_search_requires_two_chars() {
        let short = SearchQuery { q: "a".to_string() };
        assert!(short.validate().is_err());
        let ok = SearchQuery { q: "info".to_string() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_components_carry_weights() {
        let components = CompatibilityComponents::from(&SubScores {
            riasec: 90,
            grades: 80,
            values: 70,
            employment: 60,
            financial: 50,
        });
        assert_eq!(components.riasec_weight, 0.3);
        assert_eq!(components.financial_weight, 0.1);
        assert_eq!(components.values_score, 70);
    }
}
