use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::auth::error::AuthError;
use crate::auth::repo_types::{NewProfile, User, UserPatch};

const USER_COLUMNS: &str = "id, username, password, email, age, location, phone, language";

impl User {
    /// Insert a new user. The UNIQUE constraint on email is the source of
    /// truth for duplicates; there is no lookup-then-insert window.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password_hash: &str,
        email: &str,
        profile: &NewProfile,
    ) -> Result<i64, AuthError> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password, email, age, location, phone, language)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(profile.age)
        .bind(&profile.location)
        .bind(&profile.phone)
        .bind(&profile.language)
        .fetch_one(db)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e))
                if e.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exact match on email or username, first row wins.
    pub async fn find_by_identifier(
        db: &SqlitePool,
        identifier: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? OR username = ? LIMIT 1"
        ))
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Apply only the fields present in `patch`. An empty patch succeeds
    /// without touching the store.
    pub async fn update_fields(
        db: &SqlitePool,
        email: &str,
        patch: &UserPatch,
    ) -> Result<(), AuthError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        let mut set = qb.separated(", ");
        if let Some(username) = &patch.username {
            set.push("username = ").push_bind_unseparated(username);
        }
        if let Some(age) = patch.age {
            set.push("age = ").push_bind_unseparated(age);
        }
        if let Some(location) = &patch.location {
            set.push("location = ").push_bind_unseparated(location);
        }
        if let Some(phone) = &patch.phone {
            set.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(language) = &patch.language {
            set.push("language = ").push_bind_unseparated(language);
        }
        qb.push(" WHERE email = ").push_bind(email);

        qb.build().execute(db).await?;
        Ok(())
    }

    /// Swap in a new hash. A vanished row makes this a no-op, not an error.
    pub async fn replace_password(
        db: &SqlitePool,
        email: &str,
        new_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password = ? WHERE email = ?")
            .bind(new_hash)
            .bind(email)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    async fn seeded_state() -> AppState {
        let (state, _) = AppState::for_tests().await;
        User::create(
            &state.db,
            "alice",
            "$argon2-placeholder",
            "a@x.com",
            &NewProfile::default(),
        )
        .await
        .expect("seed user");
        state
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_record_untouched() {
        let state = seeded_state().await;
        let err = User::create(
            &state.db,
            "mallory",
            "$other-hash",
            "a@x.com",
            &NewProfile::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));

        let user = User::find_by_email(&state.db, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "$argon2-placeholder");
    }

    #[tokio::test]
    async fn identifier_lookup_matches_email_and_username() {
        let state = seeded_state().await;
        let by_email = User::find_by_identifier(&state.db, "a@x.com").await.unwrap();
        let by_name = User::find_by_identifier(&state.db, "alice").await.unwrap();
        assert_eq!(by_email.unwrap().id, by_name.unwrap().id);
        assert!(User::find_by_identifier(&state.db, "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn patch_touches_only_supplied_fields() {
        let state = seeded_state().await;
        let patch = UserPatch {
            age: Some(31),
            ..Default::default()
        };
        User::update_fields(&state.db, "a@x.com", &patch).await.unwrap();

        let user = User::find_by_email(&state.db, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.age, Some(31));
        assert_eq!(user.username, "alice");
        assert_eq!(user.location, None);
    }

    #[tokio::test]
    async fn empty_patch_is_a_successful_noop() {
        let state = seeded_state().await;
        User::update_fields(&state.db, "a@x.com", &UserPatch::default())
            .await
            .unwrap();
        let user = User::find_by_email(&state.db, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.age, None);
    }

    #[tokio::test]
    async fn replace_password_for_missing_row_is_a_noop() {
        let state = seeded_state().await;
        User::replace_password(&state.db, "ghost@x.com", "$new-hash")
            .await
            .unwrap();
        let user = User::find_by_email(&state.db, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.password_hash, "$argon2-placeholder");
    }
}
