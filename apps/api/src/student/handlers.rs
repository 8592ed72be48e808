use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::extractor::CurrentStudent;
use crate::auth::handlers::MessageResponse;
use crate::errors::AppError;
use crate::models::student::{AcademicGradeRow, ProfessionalValueRow, StudentProfileRow};
use crate::state::AppState;
use crate::student::store;
use crate::student::validation::{
    validate_academic_year, validate_bac_year, validate_date_of_birth, validate_gender,
    validate_person_name, validate_phone, validate_user_type,
};

const VALUES_EXIST: &str = "Professional values already exist. Use PUT to update.";

// ────────────────────────────────────────────────────────────────────────────
// Request payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_profile_dates"))]
pub struct ProfileUpdate {
    #[validate(custom(function = "validate_user_type"))]
    pub user_type: Option<String>,
    #[validate(length(max = 50))]
    pub university_establishment: Option<String>,
    #[validate(length(max = 100))]
    pub university_department: Option<String>,
    #[validate(length(max = 50))]
    pub university_level: Option<String>,
    #[validate(custom(function = "validate_person_name"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "validate_person_name"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 50))]
    pub current_education_level: Option<String>,
    #[validate(length(max = 20))]
    pub bac_series: Option<String>,
    pub bac_year: Option<i32>,
    #[validate(range(min = 0, max = 20, message = "Bac grade must be between 0 and 20"))]
    pub bac_grade: Option<i32>,
    #[validate(range(min = 0, message = "Budget cannot be negative"))]
    pub max_annual_budget: Option<i32>,
    #[validate(length(max = 50))]
    pub financial_situation: Option<String>,
    #[validate(range(min = 0, max = 1, message = "financial_aid_eligible must be 0 or 1"))]
    pub financial_aid_eligible: Option<i32>,
}

fn validate_profile_dates(update: &ProfileUpdate) -> Result<(), ValidationError> {
    if let Some(born) = &update.date_of_birth {
        validate_date_of_birth(born)?;
    }
    if let Some(year) = update.bac_year {
        validate_bac_year(year)?;
    }
    Ok(())
}

fn default_coefficient() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradeCreate {
    #[validate(length(min = 2, max = 100, message = "Subject must be between 2 and 100 characters"))]
    pub subject: String,
    #[validate(range(min = 0, max = 20, message = "Grade must be between 0 and 20"))]
    pub grade: i32,
    #[serde(default = "default_coefficient")]
    #[validate(range(min = 1, max = 10, message = "Coefficient must be between 1 and 10"))]
    pub coefficient: i32,
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: String,
    #[validate(length(min = 1, max = 20))]
    pub term: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GradeUpdate {
    #[validate(length(min = 2, max = 100, message = "Subject must be between 2 and 100 characters"))]
    pub subject: Option<String>,
    #[validate(range(min = 0, max = 20, message = "Grade must be between 0 and 20"))]
    pub grade: Option<i32>,
    #[validate(range(min = 1, max = 10, message = "Coefficient must be between 1 and 10"))]
    pub coefficient: Option<i32>,
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub term: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValuesPayload {
    #[validate(range(min = 1, max = 5))]
    pub autonomy: i32,
    #[validate(range(min = 1, max = 5))]
    pub creativity: i32,
    #[validate(range(min = 1, max = 5))]
    pub helping_others: i32,
    #[validate(range(min = 1, max = 5))]
    pub job_security: i32,
    #[validate(range(min = 1, max = 5))]
    pub salary: i32,
    #[validate(range(min = 1, max = 5))]
    pub work_life_balance: i32,
    #[validate(range(min = 1, max = 5))]
    pub prestige: i32,
    #[validate(range(min = 1, max = 5))]
    pub variety: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ValuesUpdate {
    #[validate(range(min = 1, max = 5))]
    pub autonomy: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub creativity: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub helping_others: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub job_security: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub salary: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub work_life_balance: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub prestige: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub variety: Option<i32>,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/student/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<StudentProfileRow>, AppError> {
    let profile = store::refresh_completion(&state.db, student.profile).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/student/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<StudentProfileRow>, AppError> {
    req.validate()?;
    let updated = store::update_profile(&state.db, student.profile.id, &req).await?;
    let profile = store::refresh_completion(&state.db, updated).await?;
    info!(profile_id = %profile.id, "student profile updated");
    Ok(Json(profile))
}

// ────────────────────────────────────────────────────────────────────────────
// Grades
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/student/grades
pub async fn handle_list_grades(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<Vec<AcademicGradeRow>>, AppError> {
    Ok(Json(store::list_grades(&state.db, student.profile.id).await?))
}

/// POST /api/v1/student/grades
pub async fn handle_create_grade(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<GradeCreate>,
) -> Result<(StatusCode, Json<AcademicGradeRow>), AppError> {
    req.validate()?;
    let grade = store::insert_grade(&state.db, student.profile.id, &req).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

/// PUT /api/v1/student/grades/:id
pub async fn handle_update_grade(
    State(state): State<AppState>,
    student: CurrentStudent,
    Path(grade_id): Path<Uuid>,
    Json(req): Json<GradeUpdate>,
) -> Result<Json<AcademicGradeRow>, AppError> {
    req.validate()?;
    store::update_grade(&state.db, student.profile.id, grade_id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Grade not found".to_string()))
}

/// DELETE /api/v1/student/grades/:id
pub async fn handle_delete_grade(
    State(state): State<AppState>,
    student: CurrentStudent,
    Path(grade_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !store::delete_grade(&state.db, student.profile.id, grade_id).await? {
        return Err(AppError::NotFound("Grade not found".to_string()));
    }
    Ok(message("Grade deleted successfully"))
}

// ────────────────────────────────────────────────────────────────────────────
// Professional values
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/student/values
pub async fn handle_get_values(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<ProfessionalValueRow>, AppError> {
    store::find_values(&state.db, student.profile.id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound("Professional values not found. Please create them first.".to_string())
        })
}

/// POST /api/v1/student/values
pub async fn handle_create_values(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<ValuesPayload>,
) -> Result<(StatusCode, Json<ProfessionalValueRow>), AppError> {
    req.validate()?;
    if store::find_values(&state.db, student.profile.id).await?.is_some() {
        return Err(AppError::Validation(VALUES_EXIST.to_string()));
    }
    let values = store::insert_values(&state.db, student.profile.id, &req)
        .await
        .map_err(|e| AppError::on_conflict(e, VALUES_EXIST))?;
    Ok((StatusCode::CREATED, Json(values)))
}

/// PUT /api/v1/student/values
pub async fn handle_update_values(
    State(state): State<AppState>,
    student: CurrentStudent,
    Json(req): Json<ValuesUpdate>,
) -> Result<Json<ProfessionalValueRow>, AppError> {
    req.validate()?;
    store::update_values(&state.db, student.profile.id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound("Professional values not found. Use POST to create.".to_string())
        })
}

/// DELETE /api/v1/student/values
pub async fn handle_delete_values(
    State(state): State<AppState>,
    student: CurrentStudent,
) -> Result<Json<MessageResponse>, AppError> {
    if !store::delete_values(&state.db, student.profile.id).await? {
        return Err(AppError::NotFound("Professional values not found".to_string()));
    }
    Ok(message("Professional values deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_accepts_partial_payload() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"city": "Bertoua", "gender": "F", "bac_grade": 14}"#).unwrap();
        assert!(update.validate().is_ok());
        assert!(update.first_name.is_none());
    }

    #[test]
    fn test_profile_update_rejects_bad_fields() {
        let cases = [
            r#"{"user_type": "teacher"}"#,
            r#"{"gender": "X"}"#,
            r#"{"phone": "12345"}"#,
            r#"{"bac_grade": 21}"#,
            r#"{"bac_year": 1900}"#,
            r#"{"financial_aid_eligible": 2}"#,
            r#"{"date_of_birth": "2020-01-01"}"#,
            r#"{"first_name": "X"}"#,
        ];
        for case in cases {
            let update: ProfileUpdate = serde_json::from_str(case).unwrap();
            assert!(update.validate().is_err(), "{case} should be rejected");
        }
    }

    #[test]
    fn test_schema_errors_surface_without_placeholder_key() {
        let update = ProfileUpdate {
            bac_year: Some(1900),
            ..Default::default()
        };
        match AppError::from(update.validate().unwrap_err()) {
            AppError::Validation(msg) => assert!(msg.starts_with("Bac year"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_grade_coefficient_defaults_to_one() {
        let grade: GradeCreate = serde_json::from_str(
            r#"{"subject": "Mathématiques", "grade": 15, "academic_year": "2023-2024", "term": "Trimestre 1"}"#,
        )
        .unwrap();
        assert_eq!(grade.coefficient, 1);
        assert!(grade.validate().is_ok());
    }

    #[test]
    fn test_grade_validation() {
        let bad: GradeCreate = serde_json::from_str(
            r#"{"subject": "M", "grade": 25, "coefficient": 11, "academic_year": "2023-2025", "term": ""}"#,
        )
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["subject", "grade", "coefficient", "academic_year", "term"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_values_bounds() {
        let values: ValuesPayload = serde_json::from_str(
            r#"{"autonomy": 5, "creativity": 1, "helping_others": 3, "job_security": 4,
                "salary": 2, "work_life_balance": 3, "prestige": 0, "variety": 6}"#,
        )
        .unwrap();
        let errors = values.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("prestige"));
        assert!(errors.field_errors().contains_key("variety"));
        assert!(!errors.field_errors().contains_key("autonomy"));
    }
}
