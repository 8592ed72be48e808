use sqlx::PgPool;
use uuid::Uuid;

use crate::models::student::StudentProfileRow;
use crate::models::user::{UserRow, ROLE_STUDENT};
use crate::student::store::insert_profile;

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Creates an active, unverified student account together with its profile.
pub async fn create_student(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(UserRow, StudentProfileRow), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, email, password_hash, role, is_active, is_verified)
        VALUES ($1, $2, $3, $4, TRUE, FALSE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(ROLE_STUDENT)
    .fetch_one(&mut *tx)
    .await?;

    let profile = insert_profile(&mut tx, user.id, first_name, last_name).await?;

    tx.commit().await?;
    Ok((user, profile))
}
