// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The singleton cached credential record.
//!
//! The `auth_session` table holds at most one row (`id = 'session'`);
//! absence means unauthenticated.

use rusqlite::params;
use sahayak_core::types::AuthSession;
use sahayak_core::SahayakError;

use crate::database::Database;

/// Insert or fully replace the cached session.
pub async fn save_session(db: &Database, session: &AuthSession) -> Result<(), SahayakError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO auth_session
                     (id, access_token, refresh_token, teacher_id, expires_at)
                 VALUES ('session', ?1, ?2, ?3, ?4)",
                params![
                    session.access_token,
                    session.refresh_token,
                    session.teacher_id,
                    session.expires_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Read the cached session, if any.
pub async fn get_session(db: &Database) -> Result<Option<AuthSession>, SahayakError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT access_token, refresh_token, teacher_id, expires_at
                 FROM auth_session WHERE id = 'session'",
            )?;
            let result = stmt.query_row([], |row| {
                Ok(AuthSession {
                    access_token: row.get(0)?,
                    refresh_token: row.get(1)?,
                    teacher_id: row.get(2)?,
                    expires_at: row.get(3)?,
                })
            });
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the cached session. Pending actions are untouched; they may still
/// be replayable after re-authentication.
pub async fn clear_session(db: &Database) -> Result<(), SahayakError> {
    db.connection()
        .call(|conn| {
            conn.execute("DELETE FROM auth_session WHERE id = 'session'", [])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("session.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn sample_session() -> AuthSession {
        AuthSession {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
            teacher_id: Some("teacher-1".into()),
            expires_at: Some(1_700_000_000_000),
        }
    }

    #[tokio::test]
    async fn save_and_read_round_trip() {
        let (db, _dir) = setup_db().await;
        assert!(get_session(&db).await.unwrap().is_none());

        save_session(&db, &sample_session()).await.unwrap();
        let loaded = get_session(&db).await.unwrap().unwrap();
        assert_eq!(loaded, sample_session());
    }

    #[tokio::test]
    async fn save_replaces_the_singleton() {
        let (db, _dir) = setup_db().await;
        save_session(&db, &sample_session()).await.unwrap();

        let mut refreshed = sample_session();
        refreshed.access_token = "access-2".into();
        save_session(&db, &refreshed).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| {
                Ok::<_, rusqlite::Error>(conn.query_row(
                    "SELECT COUNT(*) FROM auth_session",
                    [],
                    |r| r.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(count, 1, "at most one session record exists");
        assert_eq!(
            get_session(&db).await.unwrap().unwrap().access_token,
            "access-2"
        );
    }

    #[tokio::test]
    async fn clear_removes_the_session() {
        let (db, _dir) = setup_db().await;
        save_session(&db, &sample_session()).await.unwrap();
        clear_session(&db).await.unwrap();
        assert!(get_session(&db).await.unwrap().is_none());

        // Clearing an absent session is not an error.
        clear_session(&db).await.unwrap();
    }
}
