use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{KycUpsert, NewUser, User, DEFAULT_USER_TYPE};

/// Injectable identity directory.
///
/// `create` must converge on a single row when two first-time
/// verifications race on the same phone: the storage layer's uniqueness
/// constraint on `phone` is the real guard, find-then-create is only the
/// fast path.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    /// Create an identity, returning the existing row if the phone is taken.
    async fn create(&self, new_user: NewUser) -> Result<User>;
    /// Upsert KYC data for a phone, creating the identity if needed.
    /// A `None` pin_hash preserves any PIN already on file.
    async fn complete_kyc(&self, upsert: KycUpsert) -> Result<User>;
}

/// Postgres-backed directory. All SQL for the users table lives here.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        // ON CONFLICT DO NOTHING + re-fetch: the unique index on phone
        // makes concurrent first-time signups converge on one row.
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, phone, name, name_hindi, user_type, kyc_status, language_preference)
            VALUES ($1, $2, $3, $4, $5, 'pending', 'en')
            ON CONFLICT (phone) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.phone)
        .bind(&new_user.name)
        .bind(&new_user.name_hindi)
        .bind(new_user.user_type.as_deref().unwrap_or(DEFAULT_USER_TYPE))
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(user) => Ok(user),
            None => {
                let existing = self.find_by_phone(&new_user.phone).await?;
                existing.ok_or_else(|| {
                    anyhow::anyhow!("user insert conflicted but no row found for phone")
                })
            }
        }
    }

    async fn complete_kyc(&self, upsert: KycUpsert) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, phone, name, email, pin_hash, user_type, kyc_status, language_preference)
            VALUES ($1, $2, $3, $4, $5, $6, 'completed', 'hi')
            ON CONFLICT (phone) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                pin_hash = COALESCE(EXCLUDED.pin_hash, users.pin_hash),
                user_type = EXCLUDED.user_type,
                kyc_status = 'completed'
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&upsert.phone)
        .bind(&upsert.full_name)
        .bind(&upsert.email)
        .bind(&upsert.pin_hash)
        .bind(upsert.user_type.as_deref().unwrap_or(DEFAULT_USER_TYPE))
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
