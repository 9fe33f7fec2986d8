// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-device teacher profile (singleton in practice).

use rusqlite::params;
use sahayak_core::types::TeacherProfile;
use sahayak_core::SahayakError;

use crate::database::Database;

/// Insert or fully replace the profile for a teacher.
pub async fn upsert_profile(db: &Database, profile: &TeacherProfile) -> Result<(), SahayakError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO profile
                     (teacher_id, name, phone, email, onboarding_status, last_synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.teacher_id,
                    profile.name,
                    profile.phone,
                    profile.email,
                    profile.onboarding_status,
                    profile.last_synced_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Read the device's profile, if one has been stored.
pub async fn get_profile(db: &Database) -> Result<Option<TeacherProfile>, SahayakError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT teacher_id, name, phone, email, onboarding_status, last_synced_at
                 FROM profile LIMIT 1",
            )?;
            let result = stmt.query_row([], |row| {
                Ok(TeacherProfile {
                    teacher_id: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                    email: row.get(3)?,
                    onboarding_status: row.get(4)?,
                    last_synced_at: row.get(5)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_and_read_profile() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("profile.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        assert!(get_profile(&db).await.unwrap().is_none());

        let profile = TeacherProfile {
            teacher_id: "teacher-1".into(),
            name: Some("Asha".into()),
            phone: Some("+911234567890".into()),
            email: None,
            onboarding_status: Some(1),
            last_synced_at: None,
        };
        upsert_profile(&db, &profile).await.unwrap();
        assert_eq!(get_profile(&db).await.unwrap().unwrap(), profile);

        // Full replace, not a merge.
        let updated = TeacherProfile {
            name: None,
            ..profile.clone()
        };
        upsert_profile(&db, &updated).await.unwrap();
        assert_eq!(get_profile(&db).await.unwrap().unwrap().name, None);
    }
}
