//! Startup seeding of reference data: the RIASEC question bank and the program
//! catalog. Each dataset is only loaded into an empty table.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

const RIASEC_SEED: &str = include_str!("../seeds/riasec_questions.json");
const PROGRAMS_SEED: &str = include_str!("../seeds/programs.json");

#[derive(Debug, Deserialize)]
struct RiasecSeed {
    dimensions: Vec<DimensionSeed>,
    questions: Vec<QuestionSeed>,
}

#[derive(Debug, Deserialize)]
struct DimensionSeed {
    code: String,
    name: String,
    description: String,
    color: String,
}

#[derive(Debug, Deserialize)]
struct QuestionSeed {
    question_number: i32,
    dimension: String,
    text: String,
    #[serde(default)]
    reverse_scored: bool,
}

#[derive(Debug, Deserialize)]
struct ProgramCatalogSeed {
    programs: Vec<ProgramSeed>,
}

#[derive(Debug, Deserialize)]
struct ProgramSeed {
    code: String,
    name: String,
    level: String,
    department: String,
    domain: Option<String>,
    university: Option<String>,
    duration_years: Option<i32>,
    description: String,
    objectives: Option<String>,
    career_prospects: Option<String>,
    prerequisites: PrerequisitesSeed,
    riasec_match: String,
    costs: CostsSeed,
    employment_rate: Option<i32>,
    average_starting_salary: Option<i32>,
    capacity: i32,
    master_code: Option<String>,
    #[serde(default)]
    subjects: Vec<SubjectSeed>,
}

#[derive(Debug, Deserialize)]
struct PrerequisitesSeed {
    #[serde(default)]
    required_bac_series: Vec<String>,
    min_bac_grade: Option<i32>,
    required_subjects: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CostsSeed {
    registration_fee: i32,
    annual_tuition: i32,
    total_cost_3years: i32,
}

#[derive(Debug, Deserialize)]
struct SubjectSeed {
    name: String,
    credits: i32,
    semester: i32,
    #[serde(default = "default_mandatory")]
    is_mandatory: bool,
}

fn default_mandatory() -> bool {
    true
}

fn riasec_seed() -> Result<RiasecSeed> {
    serde_json::from_str(RIASEC_SEED).context("invalid RIASEC seed file")
}

fn program_seed() -> Result<ProgramCatalogSeed> {
    serde_json::from_str(PROGRAMS_SEED).context("invalid program seed file")
}

async fn table_is_empty(pool: &PgPool, table: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count == 0)
}

pub async fn run(pool: &PgPool) -> Result<()> {
    seed_riasec(pool).await?;
    seed_programs(pool).await?;
    Ok(())
}

async fn seed_riasec(pool: &PgPool) -> Result<()> {
    if !table_is_empty(pool, "riasec_questions").await? {
        info!("RIASEC question bank already present, skipping seed");
        return Ok(());
    }
    let seed = riasec_seed()?;

    let mut tx = pool.begin().await?;
    let mut dimension_ids = HashMap::new();
    for d in &seed.dimensions {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO riasec_dimensions (id, code, name, description, color)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&d.code)
        .bind(&d.name)
        .bind(&d.description)
        .bind(&d.color)
        .fetch_one(&mut *tx)
        .await?;
        dimension_ids.insert(d.code.clone(), id);
    }

    for q in &seed.questions {
        let dimension_id = dimension_ids
            .get(&q.dimension)
            .with_context(|| format!("question {} references unknown dimension {}", q.question_number, q.dimension))?;
        sqlx::query(
            r#"
            INSERT INTO riasec_questions (id, dimension_id, question_number, text, reverse_scored)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(dimension_id)
        .bind(q.question_number)
        .bind(&q.text)
        .bind(i32::from(q.reverse_scored))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(
        dimensions = seed.dimensions.len(),
        questions = seed.questions.len(),
        "seeded RIASEC question bank"
    );
    Ok(())
}

async fn seed_programs(pool: &PgPool) -> Result<()> {
    if !table_is_empty(pool, "programs").await? {
        info!("program catalog already present, skipping seed");
        return Ok(());
    }
    let seed = program_seed()?;

    let mut tx = pool.begin().await?;
    let mut ids_by_code = HashMap::new();
    for p in &seed.programs {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO programs
                (id, code, name, university, level, domain, duration_years, department,
                 description, objectives, career_prospects, required_bac_series,
                 min_bac_grade, required_subjects, riasec_match, registration_fee,
                 annual_tuition, total_cost_3years, employment_rate,
                 average_starting_salary, capacity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(id)
        .bind(&p.code)
        .bind(&p.name)
        .bind(&p.university)
        .bind(&p.level)
        .bind(&p.domain)
        .bind(p.duration_years)
        .bind(&p.department)
        .bind(&p.description)
        .bind(&p.objectives)
        .bind(&p.career_prospects)
        .bind(Json(&p.prerequisites.required_bac_series))
        .bind(p.prerequisites.min_bac_grade)
        .bind(p.prerequisites.required_subjects.as_ref().map(Json))
        .bind(&p.riasec_match)
        .bind(p.costs.registration_fee)
        .bind(p.costs.annual_tuition)
        .bind(p.costs.total_cost_3years)
        .bind(p.employment_rate)
        .bind(p.average_starting_salary)
        .bind(p.capacity)
        .execute(&mut *tx)
        .await?;

        for s in &p.subjects {
            sqlx::query(
                r#"
                INSERT INTO program_subjects (id, program_id, name, credits, semester, is_mandatory)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(&s.name)
            .bind(s.credits)
            .bind(s.semester)
            .bind(s.is_mandatory)
            .execute(&mut *tx)
            .await?;
        }
        ids_by_code.insert(p.code.clone(), id);
    }

    for p in &seed.programs {
        let Some(master_code) = &p.master_code else {
            continue;
        };
        let master_id = ids_by_code
            .get(master_code)
            .with_context(|| format!("{} links to unknown master {master_code}", p.code))?;
        sqlx::query("UPDATE programs SET master_program_id = $1 WHERE id = $2")
            .bind(master_id)
            .bind(ids_by_code[&p.code])
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!(programs = seed.programs.len(), "seeded program catalog");
    Ok(())
}
