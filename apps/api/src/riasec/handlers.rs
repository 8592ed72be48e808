use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::CurrentStudent;
use crate::auth::handlers::MessageResponse;
use crate::errors::AppError;
use crate::models::riasec::{RiasecDimensionRow, RiasecQuestionRow, RiasecTestRow};
use crate::models::student::StudentProfileRow;
use crate::recommendations::store::list_for_student;
use crate::riasec::careers::{careers_for_code, dimension, CareerSuggestions};
use crate::riasec::pdf::{render_report, report_filename, ReportCareers, ReportProgram, RiasecReport};
use crate::riasec::scoring::{
    parse_holland_code, score_answers, validate_answers, AnswerInput, RiasecScores, QUESTION_COUNT,
    TEST_VERSION,
};
use crate::riasec::store;
use crate::state::AppState;

const ANSWER_SCALE: [(&str, &str); 5] = [
    ("1", "Pas du tout d'accord"),
    ("2", "Peu d'accord"),
    ("3", "Moyennement d'accord"),
    ("4", "D'accord"),
    ("5", "Tout à fait d'accord"),
];
const TYPICAL_CAREERS_SHOWN: usize = 5;
const PDF_MIN_RECOMMENDATION_SCORE: i32 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub dimension_id: Uuid,
    pub question_number: i32,
    pub text: String,
    pub reverse_scored: bool,
}

impl From<RiasecQuestionRow> for QuestionView {
    fn from(row: RiasecQuestionRow) -> Self {
        QuestionView {
            id: row.id,
            dimension_id: row.dimension_id,
            question_number: row.question_number,
            text: row.text,
            reverse_scored: row.reverse_scored != 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub version: &'static str,
    pub dimensions: Vec<RiasecDimensionRow>,
    pub questions: Vec<QuestionView>,
    pub answer_scale: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    pub answers: Vec<AnswerInput>,
    #[validate(range(
        min = 60,
        max = 7200,
        message = "Test duration must be between 60 seconds and 2 hours"
    ))]
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct Interpretation {
    pub dimension_code: String,
    pub dimension_name: String,
    pub score: i32,
    pub description: String,
    pub typical_careers: Vec<String>,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub test_id: Uuid,
    pub scores: RiasecScores,
    pub holland_code: String,
    pub interpretations: Vec<Interpretation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub holland_code: String,
    pub realistic_score: i32,
    pub investigative_score: i32,
    pub artistic_score: i32,
    pub social_score: i32,
    pub enterprising_score: i32,
    pub conventional_score: i32,
    pub duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<RiasecTestRow> for HistoryItem {
    fn from(test: RiasecTestRow) -> Self {
        HistoryItem {
            id: test.id,
            holland_code: test.holland_code,
            realistic_score: test.realistic_score,
            investigative_score: test.investigative_score,
            artistic_score: test.artistic_score,
            social_score: test.social_score,
            enterprising_score: test.enterprising_score,
            conventional_score: test.conventional_score,
            duration_seconds: test.duration_seconds,
            created_at: test.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DraftSaveRequest {
    #[serde(default)]
    pub answers: BTreeMap<String, i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 29, message = "current_question_index must be between 0 and 29"))]
    pub current_question_index: i32,
}

#[derive(Debug, Serialize)]
pub struct DraftSaveResponse {
    pub message: &'static str,
    pub answers_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub answers: BTreeMap<String, i32>,
    pub current_question_index: i32,
    pub updated_at: DateTime<Utc>,
}

fn no_test_found() -> AppError {
    AppError::NotFound("No RIASEC test found. Please take the test first.".to_string())
}

/// Interpretations for each letter of the Holland code, in code order.
fn build_result(test: &RiasecTestRow, dimensions: &[RiasecDimensionRow]) -> ResultResponse {
    let scores = RiasecScores::from_test(test);
    let by_code: HashMap<&str, &RiasecDimensionRow> =
        dimensions.iter().map(|d| (d.code.as_str(), d)).collect();

    let interpretations = test
        .holland_code
        .chars()
        .filter_map(|code| {
            let profile = dimension(code)?;
            let row = by_code.get(code.to_string().as_str()).copied();
            Some(Interpretation {
                dimension_code: code.to_string(),
                dimension_name: row.map_or(profile.name, |d| d.name.as_str()).to_string(),
                score: scores.get(code),
                description: profile.description.to_string(),
                typical_careers: profile
                    .careers
                    .iter()
                    .take(TYPICAL_CAREERS_SHOWN)
                    .map(|c| c.to_string())
                    .collect(),
                color: row.map(|d| d.color.clone()).unwrap_or_default(),
            })
        })
        .collect();

    ResultResponse {
        test_id: test.id,
        scores,
        holland_code: test.holland_code.clone(),
        interpretations,
        created_at: test.created_at,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/riasec/questions
pub async fn handle_get_questions(
    State(state): State<AppState>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let dimensions = store::list_dimensions(&state.db).await?;
    let questions = store::list_questions(&state.db).await?;
    Ok(Json(QuestionsResponse {
        version: TEST_VERSION,
        dimensions,
        questions: questions.into_iter().map(QuestionView::from).collect(),
        answer_scale: ANSWER_SCALE.into_iter().collect(),
    }))
}

/// POST /api/v1/riasec/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<ResultResponse>), AppError> {
    req.validate()?;
    let answers = validate_answers(&req.answers)?;

    let questions = store::scored_questions(&state.db).await?;
    if questions.len() != QUESTION_COUNT {
        return Err(AppError::Internal(anyhow::anyhow!(
            "question bank has {} questions, expected {QUESTION_COUNT}",
            questions.len()
        )));
    }

    let scores = score_answers(&questions, &answers);
    let holland_code = scores.holland_code();
    let test = store::insert_test(
        &state.db,
        student.profile.id,
        &scores,
        &holland_code,
        &answers,
        req.duration_seconds,
    )
    .await?;
    info!(student_id = %student.profile.id, holland_code = %holland_code, "riasec test submitted");

    let dimensions = store::list_dimensions(&state.db).await?;
    Ok((StatusCode::CREATED, Json(build_result(&test, &dimensions))))
}

/// GET /api/v1/riasec/results/latest
pub async fn handle_latest_result(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<ResultResponse>, AppError> {
    let test = store::latest_test(&state.db, student.profile.id)
        .await?
        .ok_or_else(no_test_found)?;
    let dimensions = store::list_dimensions(&state.db).await?;
    Ok(Json(build_result(&test, &dimensions)))
}

/// GET /api/v1/riasec/results/history
pub async fn handle_history(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<Vec<HistoryItem>>, AppError> {
    let tests = store::test_history(&state.db, student.profile.id).await?;
    Ok(Json(tests.into_iter().map(HistoryItem::from).collect()))
}

fn profile_details(profile: &StudentProfileRow) -> Vec<(String, String)> {
    let mut details = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            details.push((label.to_string(), v));
        }
    };
    push("Téléphone", profile.phone.clone());
    push("Ville", profile.city.clone());
    push("Région", profile.region.clone());
    push("Niveau d'études", profile.current_education_level.clone());
    push("Série du Bac", profile.bac_series.clone());
    push("Note au Bac", profile.bac_grade.map(|g| format!("{g}/20")));
    push("Établissement", profile.university_establishment.clone());
    push("Département", profile.university_department.clone());
    push("Niveau universitaire", profile.university_level.clone());
    details
}

/// GET /api/v1/riasec/results/latest/download-pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Response, AppError> {
    let profile = &student.profile;
    let test = store::latest_test(&state.db, profile.id)
        .await?
        .ok_or_else(no_test_found)?;
    let dimensions = store::list_dimensions(&state.db).await?;
    let scores = RiasecScores::from_test(&test);

    let name_of = |code: char| {
        dimensions
            .iter()
            .find(|d| d.code.starts_with(code))
            .map(|d| d.name.clone())
            .or_else(|| dimension(code).map(|p| p.name.to_string()))
            .unwrap_or_else(|| code.to_string())
    };

    let careers = test
        .holland_code
        .chars()
        .filter_map(|code| {
            dimension(code).map(|profile| ReportCareers {
                code,
                name: name_of(code),
                description: profile.description.to_string(),
                careers: profile.careers.iter().map(|c| c.to_string()).collect(),
            })
        })
        .collect();

    let programs = list_for_student(&state.db, profile.id, PDF_MIN_RECOMMENDATION_SCORE)
        .await?
        .into_iter()
        .map(|rec| {
            let program = rec.program.program;
            let master = rec.program.master_program.filter(|_| program.is_licence());
            ReportProgram {
                total_score: rec.recommendation.total_score,
                master_name: master.as_ref().map(|m| m.name.clone()),
                master_duration_years: master.and_then(|m| m.duration_years),
                name: program.name,
                level: program.level,
                department: program.department,
                university: program.university,
                duration_years: program.duration_years,
            }
        })
        .collect();

    let today = Utc::now().date_naive();
    let report = RiasecReport {
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        profile_details: profile_details(profile),
        holland_code: test.holland_code.clone(),
        test_date: test.created_at.date_naive(),
        scores: scores
            .ranked()
            .into_iter()
            .map(|(code, score)| (name_of(code), score))
            .collect(),
        careers,
        programs,
        generated_on: today,
    };

    let bytes = render_report(&report)?;
    let filename = report_filename(&profile.first_name, &profile.last_name, today);
    let disposition = HeaderValue::from_str(&format!("attachment; filename={filename}"))
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}

/// GET /api/v1/riasec/careers/:code
pub async fn handle_careers(Path(code): Path<String>) -> Result<Json<CareerSuggestions>, AppError> {
    let code = parse_holland_code(&code).ok_or_else(|| {
        let len = code.trim().chars().count();
        if (1..=3).contains(&len) {
            AppError::Validation(
                "Invalid Holland Code. Must contain only letters R, I, A, S, E, C".to_string(),
            )
        } else {
            AppError::Validation("Holland Code must be 1-3 characters".to_string())
        }
    })?;
    Ok(Json(careers_for_code(&code)))
}

/// POST /api/v1/riasec/draft/save
pub async fn handle_save_draft(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<DraftSaveRequest>,
) -> Result<Json<DraftSaveResponse>, AppError> {
    req.validate()?;
    store::upsert_draft(
        &state.db,
        student.profile.id,
        &req.answers,
        req.current_question_index,
    )
    .await?;
    Ok(Json(DraftSaveResponse {
        message: "Progrès sauvegardé avec succès",
        answers_count: req.answers.len(),
    }))
}

/// GET /api/v1/riasec/draft
pub async fn handle_get_draft(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = store::find_draft(&state.db, student.profile.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No saved progress found".to_string()))?;
    Ok(Json(DraftResponse {
        answers: draft.answers.0,
        current_question_index: draft.current_question_index,
        updated_at: draft.updated_at,
    }))
}

/// DELETE /api/v1/riasec/draft
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<MessageResponse>, AppError> {
    store::delete_draft(&state.db, student.profile.id).await?;
    Ok(Json(MessageResponse {
        message: "Progrès supprimé avec succès".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json as SqlJson;

    use super::*;

    fn test_row(holland_code: &str) -> RiasecTestRow {
        RiasecTestRow {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            realistic_score: 40,
            investigative_score: 92,
            artistic_score: 84,
            social_score: 76,
            enterprising_score: 20,
            conventional_score: 56,
            holland_code: holland_code.to_string(),
            raw_answers: SqlJson(BTreeMap::new()),
            test_version: TEST_VERSION.to_string(),
            duration_seconds: Some(600),
            created_at: Utc::now(),
        }
    }

    fn dimension_row(code: &str, name: &str, color: &str) -> RiasecDimensionRow {
        RiasecDimensionRow {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            description: String::new(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_build_result_interprets_each_holland_letter() {
        let dimensions = vec![
            dimension_row("I", "Investigateur", "#3498DB"),
            dimension_row("A", "Artistique", "#9B59B6"),
        ];
        let result = build_result(&test_row("IAS"), &dimensions);

        assert_eq!(result.holland_code, "IAS");
        assert_eq!(result.interpretations.len(), 3);
        let first = &result.interpretations[0];
        assert_eq!(first.dimension_code, "I");
        assert_eq!(first.score, 92);
        assert_eq!(first.color, "#3498DB");
        assert_eq!(first.typical_careers.len(), TYPICAL_CAREERS_SHOWN);
        // falls back to the built-in name when the dimension row is missing
        assert_eq!(result.interpretations[2].dimension_name, "Social");
    }

    #[test]
    fn test_draft_index_bounds() {
        let ok: DraftSaveRequest =
            serde_json::from_str(r#"{"answers": {"1": 4, "2": 5}, "current_question_index": 2}"#).unwrap();
        assert!(ok.validate().is_ok());
        let bad: DraftSaveRequest =
            serde_json::from_str(r#"{"answers": {}, "current_question_index": 30}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_submit_duration_bounds() {
        let short: SubmitRequest = serde_json::from_str(r#"{"answers": [], "duration_seconds": 30}"#).unwrap();
        assert!(short.validate().is_err());
        let none: SubmitRequest = serde_json::from_str(r#"{"answers": []}"#).unwrap();
        assert!(none.validate().is_ok());
    }

    #[tokio::test]
    async fn test_careers_handler_normalizes_code() {
        let Json(body) = handle_careers(Path("sa".to_string())).await.unwrap();
        assert_eq!(body.holland_code, "SA");
        assert!(handle_careers(Path("XYZ".to_string())).await.is_err());
    }
}
