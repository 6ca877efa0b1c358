//! Repository for the `verification_codes` table.

use sqlx::PgPool;

use crate::models::verification_code::VerificationCode;

const COLUMNS: &str = "key, email, code, created_at, expires_at";

pub struct VerificationCodeRepo;

impl VerificationCodeRepo {
    /// Store a code, replacing any earlier code for the same key.
    pub async fn upsert(pool: &PgPool, input: &VerificationCode) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO verification_codes (key, email, code, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (key) DO UPDATE SET
                email = EXCLUDED.email,
                code = EXCLUDED.code,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at",
        )
        .bind(&input.key)
        .bind(&input.email)
        .bind(&input.code)
        .bind(input.created_at)
        .bind(input.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<VerificationCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM verification_codes WHERE key = $1");
        sqlx::query_as::<_, VerificationCode>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
