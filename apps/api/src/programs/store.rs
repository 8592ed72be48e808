use std::collections::HashMap;

use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::program::{MasterProgramBrief, ProgramResponse, ProgramRow, ProgramSubjectRow};

pub const SEARCH_LIMIT: i64 = 50;

/// Optional list filters; unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramFilters {
    pub level: Option<String>,
    pub domain: Option<String>,
    pub department: Option<String>,
    pub riasec_code: Option<String>,
    pub max_budget: Option<i32>,
}

const FILTER_CLAUSE: &str = r#"
    is_active = TRUE
    AND ($1::text IS NULL OR level = $1)
    AND ($2::text IS NULL OR domain = $2)
    AND ($3::text IS NULL OR department ILIKE '%' || $3 || '%')
    AND ($4::text IS NULL OR riasec_match LIKE $4 || '%')
    AND ($5::int IS NULL OR annual_tuition <= $5)
"#;

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Active programs matching `filters`, ordered by department then name, plus
/// the unpaginated match count.
pub async fn list_programs(
    pool: &PgPool,
    filters: &ProgramFilters,
    offset: i64,
    limit: i64,
) -> Result<(Vec<ProgramRow>, i64), sqlx::Error> {
    let level = blank_to_none(&filters.level);
    let domain = blank_to_none(&filters.domain);
    let department = blank_to_none(&filters.department);
    let riasec = blank_to_none(&filters.riasec_code).map(str::to_uppercase);
    // a zero budget is treated as no budget
    let max_budget = filters.max_budget.filter(|b| *b > 0);

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM programs WHERE {FILTER_CLAUSE}"
    ))
    .bind(level)
    .bind(domain)
    .bind(department)
    .bind(riasec.as_deref())
    .bind(max_budget)
    .fetch_one(pool)
    .await?;

    let programs = sqlx::query_as::<_, ProgramRow>(&format!(
        "SELECT * FROM programs WHERE {FILTER_CLAUSE} ORDER BY department, name OFFSET $6 LIMIT $7"
    ))
    .bind(level)
    .bind(domain)
    .bind(department)
    .bind(riasec.as_deref())
    .bind(max_budget)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok((programs, total))
}

pub async fn search_programs(pool: &PgPool, term: &str) -> Result<Vec<ProgramRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgramRow>(
        r#"
        SELECT * FROM programs
        WHERE is_active = TRUE
          AND (name ILIKE '%' || $1 || '%'
               OR code ILIKE '%' || $1 || '%'
               OR description ILIKE '%' || $1 || '%'
               OR department ILIKE '%' || $1 || '%')
        ORDER BY name
        LIMIT $2
        "#,
    )
    .bind(term)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn find_program(pool: &PgPool, id: Uuid) -> Result<Option<ProgramRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgramRow>("SELECT * FROM programs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_programs(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<ProgramRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgramRow>("SELECT * FROM programs WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

/// Active programs, optionally restricted to the given levels.
pub async fn active_programs(
    pool: &PgPool,
    levels: Option<&[&str]>,
) -> Result<Vec<ProgramRow>, sqlx::Error> {
    let levels: Option<Vec<String>> = levels.map(|l| l.iter().map(|s| s.to_string()).collect());
    sqlx::query_as::<_, ProgramRow>(
        r#"
        SELECT * FROM programs
        WHERE is_active = TRUE
          AND ($1::text[] IS NULL OR level = ANY($1))
        ORDER BY department, name
        "#,
    )
    .bind(levels)
    .fetch_all(pool)
    .await
}

pub async fn list_subjects(pool: &PgPool, program_id: Uuid) -> Result<Vec<ProgramSubjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgramSubjectRow>(
        "SELECT * FROM program_subjects WHERE program_id = $1 ORDER BY semester, name",
    )
    .bind(program_id)
    .fetch_all(pool)
    .await
}

pub async fn master_briefs(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, MasterProgramBrief>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, MasterProgramBrief>(
        "SELECT id, code, name, duration_years FROM programs WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

/// Attaches each program's Master brief, preserving order.
pub async fn with_masters(
    pool: &PgPool,
    programs: Vec<ProgramRow>,
) -> Result<Vec<ProgramResponse>, sqlx::Error> {
    let mut master_ids: Vec<Uuid> = programs.iter().filter_map(|p| p.master_program_id).collect();
    master_ids.sort_unstable();
    master_ids.dedup();
    let masters = master_briefs(pool, &master_ids).await?;

    Ok(programs
        .into_iter()
        .map(|program| {
            let master_program = program
                .master_program_id
                .and_then(|id| masters.get(&id).cloned());
            ProgramResponse {
                program,
                master_program,
            }
        })
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Statistics
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow)]
pub struct ProgramStatsRow {
    pub level: String,
    pub department: String,
    pub riasec_match: String,
    pub annual_tuition: i32,
    pub employment_rate: Option<i32>,
}

pub async fn stats_rows(pool: &PgPool) -> Result<Vec<ProgramStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgramStatsRow>(
        r#"
        SELECT level, department, riasec_match, annual_tuition, employment_rate
        FROM programs
        WHERE is_active = TRUE
        "#,
    )
    .fetch_all(pool)
    .await
}
