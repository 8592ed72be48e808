use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::recommendation::{RecommendationResponse, RecommendationRow, ALGORITHM_VERSION};
use crate::programs::store::{find_programs, with_masters};
use crate::recommendations::engine::NewRecommendation;

/// Replaces the student's recommendation set in one transaction.
pub async fn replace_for_student(
    pool: &PgPool,
    student_id: Uuid,
    recommendations: &[NewRecommendation],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM recommendations WHERE student_id = $1")
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

    for rec in recommendations {
        sqlx::query(
            r#"
            INSERT INTO recommendations
                (id, student_id, program_id, total_score, ranking, riasec_score,
                 grades_score, values_score, employment_score, financial_score,
                 strengths, weaknesses, advice, algorithm_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(rec.program_id)
        .bind(rec.total_score)
        .bind(rec.ranking)
        .bind(rec.scores.riasec)
        .bind(rec.scores.grades)
        .bind(rec.scores.values)
        .bind(rec.scores.employment)
        .bind(rec.scores.financial)
        .bind(Json(&rec.notes.strengths))
        .bind(Json(&rec.notes.weaknesses))
        .bind(&rec.notes.advice)
        .bind(ALGORITHM_VERSION)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// The student's recommendations with at least `min_total`, best first, each
/// joined with its program and Master brief.
pub async fn list_for_student(
    pool: &PgPool,
    student_id: Uuid,
    min_total: i32,
) -> Result<Vec<RecommendationResponse>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RecommendationRow>(
        r#"
        SELECT * FROM recommendations
        WHERE student_id = $1 AND total_score >= $2
        ORDER BY total_score DESC, ranking
        "#,
    )
    .bind(student_id)
    .bind(min_total)
    .fetch_all(pool)
    .await?;

    let program_ids: Vec<Uuid> = rows.iter().map(|r| r.program_id).collect();
    let programs = with_masters(pool, find_programs(pool, &program_ids).await?).await?;
    let by_id: HashMap<Uuid, _> = programs.into_iter().map(|p| (p.program.id, p)).collect();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let program = by_id.get(&row.program_id).cloned()?;
            Some(RecommendationResponse::new(row, program))
        })
        .collect())
}

pub async fn find_for_student(
    pool: &PgPool,
    student_id: Uuid,
    id: Uuid,
) -> Result<Option<RecommendationRow>, sqlx::Error> {
    sqlx::query_as::<_, RecommendationRow>(
        "SELECT * FROM recommendations WHERE id = $1 AND student_id = $2",
    )
    .bind(id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}
