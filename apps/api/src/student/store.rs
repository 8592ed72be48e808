use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::student::{AcademicGradeRow, ProfessionalValueRow, StudentProfileRow};
use crate::student::completion::completion_percentage;
use crate::student::handlers::{GradeCreate, GradeUpdate, ProfileUpdate, ValuesPayload, ValuesUpdate};
use crate::student::validation::normalize_phone;

/// Completion stored for a profile created at registration (names only).
pub const INITIAL_COMPLETION: i32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

pub async fn find_profile_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<StudentProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfileRow>("SELECT * FROM student_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    first_name: &str,
    last_name: &str,
) -> Result<StudentProfileRow, sqlx::Error> {
    sqlx::query_as::<_, StudentProfileRow>(
        r#"
        INSERT INTO student_profiles (id, user_id, first_name, last_name, completion_percentage)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(first_name)
    .bind(last_name)
    .bind(INITIAL_COMPLETION)
    .fetch_one(&mut **tx)
    .await
}

/// Applies the provided fields; absent fields keep their stored value.
pub async fn update_profile(
    pool: &PgPool,
    profile_id: Uuid,
    update: &ProfileUpdate,
) -> Result<StudentProfileRow, sqlx::Error> {
    sqlx::query_as::<_, StudentProfileRow>(
        r#"
        UPDATE student_profiles SET
            user_type                = COALESCE($2, user_type),
            university_establishment = COALESCE($3, university_establishment),
            university_department    = COALESCE($4, university_department),
            university_level         = COALESCE($5, university_level),
            first_name               = COALESCE($6, first_name),
            last_name                = COALESCE($7, last_name),
            phone                    = COALESCE($8, phone),
            gender                   = COALESCE($9, gender),
            date_of_birth            = COALESCE($10, date_of_birth),
            city                     = COALESCE($11, city),
            region                   = COALESCE($12, region),
            current_education_level  = COALESCE($13, current_education_level),
            bac_series               = COALESCE($14, bac_series),
            bac_year                 = COALESCE($15, bac_year),
            bac_grade                = COALESCE($16, bac_grade),
            max_annual_budget        = COALESCE($17, max_annual_budget),
            financial_situation      = COALESCE($18, financial_situation),
            financial_aid_eligible   = COALESCE($19, financial_aid_eligible),
            updated_at               = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&update.user_type)
    .bind(&update.university_establishment)
    .bind(&update.university_department)
    .bind(&update.university_level)
    .bind(update.first_name.as_deref().map(str::trim))
    .bind(update.last_name.as_deref().map(str::trim))
    .bind(update.phone.as_deref().map(normalize_phone))
    .bind(&update.gender)
    .bind(update.date_of_birth)
    .bind(&update.city)
    .bind(&update.region)
    .bind(&update.current_education_level)
    .bind(&update.bac_series)
    .bind(update.bac_year)
    .bind(update.bac_grade)
    .bind(update.max_annual_budget)
    .bind(&update.financial_situation)
    .bind(update.financial_aid_eligible)
    .fetch_one(pool)
    .await
}

/// Recomputes the completion percentage and persists it only when it changed.
pub async fn refresh_completion(
    pool: &PgPool,
    mut profile: StudentProfileRow,
) -> Result<StudentProfileRow, sqlx::Error> {
    let grade_count = count_grades(pool, profile.id).await?;
    let has_values = find_values(pool, profile.id).await?.is_some();
    let percentage = completion_percentage(&profile, grade_count, has_values);

    if percentage != profile.completion_percentage {
        sqlx::query("UPDATE student_profiles SET completion_percentage = $2, updated_at = NOW() WHERE id = $1")
            .bind(profile.id)
            .bind(percentage)
            .execute(pool)
            .await?;
        info!(
            profile_id = %profile.id,
            from = profile.completion_percentage,
            to = percentage,
            "profile completion updated"
        );
        profile.completion_percentage = percentage;
    }
    Ok(profile)
}

// ────────────────────────────────────────────────────────────────────────────
// Grades
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_grades(pool: &PgPool, student_id: Uuid) -> Result<Vec<AcademicGradeRow>, sqlx::Error> {
    sqlx::query_as::<_, AcademicGradeRow>(
        "SELECT * FROM academic_grades WHERE student_id = $1 ORDER BY academic_year DESC, term ASC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn count_grades(pool: &PgPool, student_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM academic_grades WHERE student_id = $1")
        .bind(student_id)
        .fetch_one(pool)
        .await
}

pub async fn insert_grade(
    pool: &PgPool,
    student_id: Uuid,
    grade: &GradeCreate,
) -> Result<AcademicGradeRow, sqlx::Error> {
    sqlx::query_as::<_, AcademicGradeRow>(
        r#"
        INSERT INTO academic_grades (id, student_id, subject, grade, coefficient, academic_year, term)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(grade.subject.trim())
    .bind(grade.grade)
    .bind(grade.coefficient)
    .bind(&grade.academic_year)
    .bind(&grade.term)
    .fetch_one(pool)
    .await
}

/// `None` when the grade does not exist or belongs to another student.
pub async fn update_grade(
    pool: &PgPool,
    student_id: Uuid,
    grade_id: Uuid,
    update: &GradeUpdate,
) -> Result<Option<AcademicGradeRow>, sqlx::Error> {
    sqlx::query_as::<_, AcademicGradeRow>(
        r#"
        UPDATE academic_grades SET
            subject       = COALESCE($3, subject),
            grade         = COALESCE($4, grade),
            coefficient   = COALESCE($5, coefficient),
            academic_year = COALESCE($6, academic_year),
            term          = COALESCE($7, term),
            updated_at    = NOW()
        WHERE id = $1 AND student_id = $2
        RETURNING *
        "#,
    )
    .bind(grade_id)
    .bind(student_id)
    .bind(update.subject.as_deref().map(str::trim))
    .bind(update.grade)
    .bind(update.coefficient)
    .bind(&update.academic_year)
    .bind(&update.term)
    .fetch_optional(pool)
    .await
}

pub async fn delete_grade(pool: &PgPool, student_id: Uuid, grade_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM academic_grades WHERE id = $1 AND student_id = $2")
        .bind(grade_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ────────────────────────────────────────────────────────────────────────────
// Professional values
// ────────────────────────────────────────────────────────────────────────────

pub async fn find_values(pool: &PgPool, student_id: Uuid) -> Result<Option<ProfessionalValueRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfessionalValueRow>("SELECT * FROM professional_values WHERE student_id = $1")
        .bind(student_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_values(
    pool: &PgPool,
    student_id: Uuid,
    values: &ValuesPayload,
) -> Result<ProfessionalValueRow, sqlx::Error> {
    sqlx::query_as::<_, ProfessionalValueRow>(
        r#"
        INSERT INTO professional_values
            (id, student_id, autonomy, creativity, helping_others, job_security,
             salary, work_life_balance, prestige, variety)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(values.autonomy)
    .bind(values.creativity)
    .bind(values.helping_others)
    .bind(values.job_security)
    .bind(values.salary)
    .bind(values.work_life_balance)
    .bind(values.prestige)
    .bind(values.variety)
    .fetch_one(pool)
    .await
}

pub async fn update_values(
    pool: &PgPool,
    student_id: Uuid,
    update: &ValuesUpdate,
) -> Result<Option<ProfessionalValueRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfessionalValueRow>(
        r#"
        UPDATE professional_values SET
            autonomy          = COALESCE($2, autonomy),
            creativity        = COALESCE($3, creativity),
            helping_others    = COALESCE($4, helping_others),
            job_security      = COALESCE($5, job_security),
            salary            = COALESCE($6, salary),
            work_life_balance = COALESCE($7, work_life_balance),
            prestige          = COALESCE($8, prestige),
            variety           = COALESCE($9, variety),
            updated_at        = NOW()
        WHERE student_id = $1
        RETURNING *
        "#,
    )
    .bind(student_id)
    .bind(update.autonomy)
    .bind(update.creativity)
    .bind(update.helping_others)
    .bind(update.job_security)
    .bind(update.salary)
    .bind(update.work_life_balance)
    .bind(update.prestige)
    .bind(update.variety)
    .fetch_optional(pool)
    .await
}

pub async fn delete_values(pool: &PgPool, student_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM professional_values WHERE student_id = $1")
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
