use std::collections::BTreeMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::riasec::{
    RiasecDimensionRow, RiasecDraftRow, RiasecQuestionRow, RiasecTestRow, ScoredQuestion,
};
use crate::riasec::scoring::{RiasecScores, TEST_VERSION};

pub async fn list_dimensions(pool: &PgPool) -> Result<Vec<RiasecDimensionRow>, sqlx::Error> {
    sqlx::query_as::<_, RiasecDimensionRow>(
        "SELECT * FROM riasec_dimensions ORDER BY position(code in 'RIASEC')",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_questions(pool: &PgPool) -> Result<Vec<RiasecQuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, RiasecQuestionRow>("SELECT * FROM riasec_questions ORDER BY question_number")
        .fetch_all(pool)
        .await
}

pub async fn scored_questions(pool: &PgPool) -> Result<Vec<ScoredQuestion>, sqlx::Error> {
    sqlx::query_as::<_, ScoredQuestion>(
        r#"
        SELECT q.question_number, d.code AS dimension_code, q.reverse_scored
        FROM riasec_questions q
        JOIN riasec_dimensions d ON d.id = q.dimension_id
        ORDER BY q.question_number
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Stores a completed test and discards the student's draft atomically.
pub async fn insert_test(
    pool: &PgPool,
    student_id: Uuid,
    scores: &RiasecScores,
    holland_code: &str,
    answers: &BTreeMap<i32, i32>,
    duration_seconds: Option<i32>,
) -> Result<RiasecTestRow, sqlx::Error> {
    let raw_answers: BTreeMap<String, i32> = answers.iter().map(|(q, a)| (q.to_string(), *a)).collect();

    let mut tx = pool.begin().await?;

    let test = sqlx::query_as::<_, RiasecTestRow>(
        r#"
        INSERT INTO riasec_tests
            (id, student_id, realistic_score, investigative_score, artistic_score,
             social_score, enterprising_score, conventional_score, holland_code,
             raw_answers, test_version, duration_seconds)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(scores.realistic)
    .bind(scores.investigative)
    .bind(scores.artistic)
    .bind(scores.social)
    .bind(scores.enterprising)
    .bind(scores.conventional)
    .bind(holland_code)
    .bind(Json(raw_answers))
    .bind(TEST_VERSION)
    .bind(duration_seconds)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM riasec_test_drafts WHERE student_id = $1")
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(test)
}

pub async fn latest_test(pool: &PgPool, student_id: Uuid) -> Result<Option<RiasecTestRow>, sqlx::Error> {
    sqlx::query_as::<_, RiasecTestRow>(
        "SELECT * FROM riasec_tests WHERE student_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub async fn test_history(pool: &PgPool, student_id: Uuid) -> Result<Vec<RiasecTestRow>, sqlx::Error> {
    sqlx::query_as::<_, RiasecTestRow>(
        "SELECT * FROM riasec_tests WHERE student_id = $1 ORDER BY created_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn upsert_draft(
    pool: &PgPool,
    student_id: Uuid,
    answers: &BTreeMap<String, i32>,
    current_question_index: i32,
) -> Result<RiasecDraftRow, sqlx::Error> {
    sqlx::query_as::<_, RiasecDraftRow>(
        r#"
        INSERT INTO riasec_test_drafts (id, student_id, answers, current_question_index)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (student_id) DO UPDATE SET
            answers = EXCLUDED.answers,
            current_question_index = EXCLUDED.current_question_index,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(Json(answers))
    .bind(current_question_index)
    .fetch_one(pool)
    .await
}

pub async fn find_draft(pool: &PgPool, student_id: Uuid) -> Result<Option<RiasecDraftRow>, sqlx::Error> {
    sqlx::query_as::<_, RiasecDraftRow>("SELECT * FROM riasec_test_drafts WHERE student_id = $1")
        .bind(student_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_draft(pool: &PgPool, student_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM riasec_test_drafts WHERE student_id = $1")
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(())
}
