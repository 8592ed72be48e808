use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgramRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub university: Option<String>,
    pub level: String,
    pub domain: Option<String>,
    pub duration_years: Option<i32>,
    pub department: String,
    pub description: String,
    pub objectives: Option<String>,
    pub career_prospects: Option<String>,
    pub required_bac_series: Json<Vec<String>>,
    pub min_bac_grade: Option<i32>,
    pub required_subjects: Option<Json<Vec<String>>>,
    pub riasec_match: String,
    pub registration_fee: i32,
    pub annual_tuition: i32,
    pub total_cost_3years: i32,
    pub employment_rate: Option<i32>,
    pub average_starting_salary: Option<i32>,
    pub capacity: i32,
    pub is_active: bool,
    pub master_program_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgramRow {
    pub fn required_subjects(&self) -> &[String] {
        self.required_subjects
            .as_ref()
            .map(|s| s.0.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_licence(&self) -> bool {
        self.level.eq_ignore_ascii_case("licence")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgramSubjectRow {
    pub id: Uuid,
    pub program_id: Uuid,
    pub name: String,
    pub credits: i32,
    pub semester: i32,
    pub is_mandatory: bool,
}

/// Continuation program offered after a Licence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MasterProgramBrief {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub duration_years: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramResponse {
    #[serde(flatten)]
    pub program: ProgramRow,
    pub master_program: Option<MasterProgramBrief>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramDetailResponse {
    #[serde(flatten)]
    pub program: ProgramRow,
    pub subjects: Vec<ProgramSubjectRow>,
    pub master_program: Option<MasterProgramBrief>,
}
