use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const USER_TYPE_NEW_BACHELOR: &str = "new_bachelor";
pub const USER_TYPE_UNIVERSITY_STUDENT: &str = "university_student";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_type: Option<String>,
    pub university_establishment: Option<String>,
    pub university_department: Option<String>,
    pub university_level: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub current_education_level: Option<String>,
    pub bac_series: Option<String>,
    pub bac_year: Option<i32>,
    pub bac_grade: Option<i32>,
    pub max_annual_budget: Option<i32>,
    pub financial_situation: Option<String>,
    pub financial_aid_eligible: Option<i32>,
    pub completion_percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentProfileRow {
    pub fn is_university_student(&self) -> bool {
        self.user_type.as_deref() == Some(USER_TYPE_UNIVERSITY_STUDENT)
    }

    pub fn is_new_bachelor(&self) -> bool {
        self.user_type.as_deref() == Some(USER_TYPE_NEW_BACHELOR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicGradeRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub grade: i32,
    pub coefficient: i32,
    pub academic_year: String,
    pub term: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfessionalValueRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub autonomy: i32,
    pub creativity: i32,
    pub helping_others: i32,
    pub job_security: i32,
    pub salary: i32,
    pub work_life_balance: i32,
    pub prestige: i32,
    pub variety: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The eight work-value ratings, detached from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRatings {
    pub autonomy: i32,
    pub creativity: i32,
    pub helping_others: i32,
    pub job_security: i32,
    pub salary: i32,
    pub work_life_balance: i32,
    pub prestige: i32,
    pub variety: i32,
}

impl From<&ProfessionalValueRow> for ValueRatings {
    fn from(row: &ProfessionalValueRow) -> Self {
        ValueRatings {
            autonomy: row.autonomy,
            creativity: row.creativity,
            helping_others: row.helping_others,
            job_security: row.job_security,
            salary: row.salary,
            work_life_balance: row.work_life_balance,
            prestige: row.prestige,
            variety: row.variety,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkValue {
    Autonomy,
    Creativity,
    HelpingOthers,
    JobSecurity,
    Salary,
    WorkLifeBalance,
    Prestige,
    Variety,
}

impl ValueRatings {
    pub fn get(&self, value: WorkValue) -> i32 {
        match value {
            WorkValue::Autonomy => self.autonomy,
            WorkValue::Creativity => self.creativity,
            WorkValue::HelpingOthers => self.helping_others,
            WorkValue::JobSecurity => self.job_security,
            WorkValue::Salary => self.salary,
            WorkValue::WorkLifeBalance => self.work_life_balance,
            WorkValue::Prestige => self.prestige,
            WorkValue::Variety => self.variety,
        }
    }
}
