use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::CurrentStudent;
use crate::errors::AppError;
use crate::models::recommendation::{RecommendationResponse, RecommendationRow};
use crate::models::student::ValueRatings;
use crate::programs::compatibility::StudentSignals;
use crate::programs::store::active_programs;
use crate::recommendations::engine::{candidate_levels, rank_programs};
use crate::recommendations::store;
use crate::riasec::store::latest_test;
use crate::state::AppState;
use crate::student::store::{find_values, list_grades};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateRequest {
    /// Accepted for client compatibility; generation always replaces the set.
    #[serde(default)]
    pub force_regenerate: bool,
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    pub limit: Option<i64>,
}

const DEFAULT_LIMIT: i64 = 10;

/// An absent or blank body means defaults; anything else must be a valid request.
fn parse_generate_request(body: &[u8]) -> Result<GenerateRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }
    let req: GenerateRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
    req.validate()?;
    Ok(req)
}

/// GET /api/v1/recommendations
pub async fn handle_list(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<Vec<RecommendationResponse>>, AppError> {
    let recommendations = store::list_for_student(&state.db, student.profile.id, 0).await?;
    Ok(Json(recommendations))
}

/// POST /api/v1/recommendations/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    student: CurrentStudent,
    body: Bytes,
) -> Result<Json<Vec<RecommendationResponse>>, AppError> {
    let req = parse_generate_request(&body)?;
    let limit = req.limit.unwrap_or(DEFAULT_LIMIT) as usize;
    let profile = &student.profile;

    let test = latest_test(&state.db, profile.id).await?.ok_or_else(|| {
        AppError::Validation(
            "Vous devez compléter le test RIASEC avant de générer des recommandations".to_string(),
        )
    })?;
    let values = find_values(&state.db, profile.id).await?.ok_or_else(|| {
        AppError::Validation(
            "Vous devez compléter vos valeurs professionnelles avant de générer des recommandations"
                .to_string(),
        )
    })?;

    let programs = active_programs(&state.db, candidate_levels(profile)).await?;
    if programs.is_empty() {
        return Err(AppError::NotFound("Aucun programme disponible".to_string()));
    }

    let grades = list_grades(&state.db, profile.id).await?;
    let signals = StudentSignals {
        holland_code: Some(&test.holland_code),
        bac_grade: profile.bac_grade,
        max_annual_budget: profile.max_annual_budget,
        grades: &grades,
        values: Some(ValueRatings::from(&values)),
    };
    let ranked = rank_programs(&signals, &programs, limit);

    store::replace_for_student(&state.db, profile.id, &ranked).await?;
    info!(
        student_id = %profile.id,
        candidates = programs.len(),
        stored = ranked.len(),
        "recommendations generated"
    );

    let recommendations = store::list_for_student(&state.db, profile.id, 0).await?;
    Ok(Json(recommendations))
}

/// GET /api/v1/recommendations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    student: CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<RecommendationRow>, AppError> {
    store::find_for_student(&state.db, student.profile.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Recommendation not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.force_regenerate);
        assert!(req.limit.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_generate_limit_bounds() {
        let req: GenerateRequest = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        assert!(req.validate().is_err());
        let req: GenerateRequest = serde_json::from_str(r#"{"limit": 51}"#).unwrap();
        assert!(req.validate().is_err());
        let req: GenerateRequest = serde_json::from_str(r#"{"limit": 50, "force_regenerate": true}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_generate_body_parsing() {
        let req = parse_generate_request(b"").unwrap();
        assert!(req.limit.is_none());
        let req = parse_generate_request(b"  \n").unwrap();
        assert!(req.limit.is_none());
        let req = parse_generate_request(br#"{"limit": 3}"#).unwrap();
        assert_eq!(req.limit, Some(3));

        let rejected: [&[u8]; 4] = [br#"{"limit": "five"}"#, br#"{"limit": 3"#, b"null", br#"{"limit": 99}"#];
        for body in rejected {
            match parse_generate_request(body) {
                Err(AppError::Validation(_)) => {}
                other => panic!("{:?} accepted: {other:?}", String::from_utf8_lossy(body)),
            }
        }
    }
}
