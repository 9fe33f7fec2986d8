// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD. Messages are strictly ordered by timestamp within a
//! conversation and are never deleted individually, only via conversation
//! cascade.

use rusqlite::params;
use sahayak_core::types::{ChatMessage, DeliveryStatus, Role};
use sahayak_core::SahayakError;

use crate::database::Database;
use crate::queries::column_parse;

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ChatMessage, rusqlite::Error> {
    let role: String = row.get(3)?;
    let status: String = row.get(6)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        conversation_id: row.get(2)?,
        role: column_parse::<Role>(3, role)?,
        content: row.get(4)?,
        timestamp: row.get(5)?,
        status: column_parse::<DeliveryStatus>(6, status)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, teacher_id, conversation_id, role, content, timestamp, status";

/// Insert a message. Ids are client-generated and must be unique.
pub async fn insert_message(db: &Database, message: &ChatMessage) -> Result<(), SahayakError> {
    let m = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages
                     (id, teacher_id, conversation_id, role, content, timestamp, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    m.id,
                    m.teacher_id,
                    m.conversation_id,
                    m.role.to_string(),
                    m.content,
                    m.timestamp,
                    m.status.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a message by id.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<ChatMessage>, SahayakError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM messages WHERE id = ?1");
            let result = conn.query_row(&sql, params![id], row_to_message);
            match result {
                Ok(m) => Ok(Some(m)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a conversation's messages ordered by timestamp.
pub async fn list_messages(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<ChatMessage>, SahayakError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY timestamp ASC, rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![conversation_id], row_to_message)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a message's delivery status.
///
/// Fails with `NotFound` if the message does not exist; the Sync Engine
/// treats that as "conversation evicted while queued" and drops the action.
pub async fn update_message_status(
    db: &Database,
    id: &str,
    status: DeliveryStatus,
) -> Result<(), SahayakError> {
    let id_param = id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE messages SET status = ?2 WHERE id = ?1",
                params![id_param, status.to_string()],
            )?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if rows == 0 {
        return Err(SahayakError::NotFound {
            entity: "message",
            key: id.to_string(),
        });
    }
    Ok(())
}

/// Count all stored messages.
pub async fn count_messages(db: &Database) -> Result<i64, SahayakError> {
    db.connection()
        .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?))
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations;
    use sahayak_core::types::Conversation;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("messages.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        conversations::upsert_conversation(
            &db,
            &Conversation {
                id: "c1".into(),
                teacher_id: "t1".into(),
                title: "Test".into(),
                last_message_preview: None,
                updated_at: 1,
                deleted_at: None,
            },
        )
        .await
        .unwrap();
        (db, dir)
    }

    fn message(id: &str, role: Role, ts: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            teacher_id: "t1".into(),
            conversation_id: "c1".into(),
            role,
            content: format!("content {id}"),
            timestamp: ts,
            status: DeliveryStatus::Pending,
        }
    }

    #[tokio::test]
    async fn insert_and_list_ordered_by_timestamp() {
        let (db, _dir) = setup_db().await;
        // Insert out of order; listing must sort by timestamp.
        insert_message(&db, &message("m2", Role::Assistant, 200))
            .await
            .unwrap();
        insert_message(&db, &message("m1", Role::User, 100))
            .await
            .unwrap();
        insert_message(&db, &message("m3", Role::User, 300))
            .await
            .unwrap();

        let msgs = list_messages(&db, "c1").await.unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn equal_timestamps_list_in_insertion_order() {
        let (db, _dir) = setup_db().await;
        // A reply written within the same millisecond as a queued user
        // message must not leapfrog it.
        insert_message(&db, &message("m1", Role::User, 100))
            .await
            .unwrap();
        insert_message(&db, &message("m2", Role::Assistant, 100))
            .await
            .unwrap();
        insert_message(&db, &message("m3", Role::User, 100))
            .await
            .unwrap();

        let msgs = list_messages(&db, "c1").await.unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        insert_message(&db, &message("m1", Role::User, 100))
            .await
            .unwrap();
        let result = insert_message(&db, &message("m1", Role::User, 200)).await;
        assert!(result.is_err(), "primary key collision must fail");
    }

    #[tokio::test]
    async fn status_transition_persists() {
        let (db, _dir) = setup_db().await;
        insert_message(&db, &message("m1", Role::User, 100))
            .await
            .unwrap();

        update_message_status(&db, "m1", DeliveryStatus::Sent)
            .await
            .unwrap();
        let m = get_message(&db, "m1").await.unwrap().unwrap();
        assert_eq!(m.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn status_update_on_missing_message_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_message_status(&db, "ghost", DeliveryStatus::Sent)
            .await
            .unwrap_err();
        assert!(matches!(err, SahayakError::NotFound { .. }));
    }

    #[tokio::test]
    async fn roles_and_statuses_round_trip_through_storage() {
        let (db, _dir) = setup_db().await;
        let mut m = message("m1", Role::Assistant, 100);
        m.status = DeliveryStatus::Sent;
        insert_message(&db, &m).await.unwrap();

        let loaded = get_message(&db, "m1").await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::Assistant);
        assert_eq!(loaded.status, DeliveryStatus::Sent);
        assert_eq!(loaded, m);
    }
}
