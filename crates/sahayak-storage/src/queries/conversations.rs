// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD, tombstoning, and retention eviction.

use rusqlite::params;
use sahayak_core::types::Conversation;
use sahayak_core::SahayakError;

use crate::database::Database;

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        title: row.get(2)?,
        last_message_preview: row.get(3)?,
        updated_at: row.get(4)?,
        deleted_at: row.get(5)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, teacher_id, title, last_message_preview, updated_at, deleted_at";

/// Insert or fully replace a conversation.
pub async fn upsert_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), SahayakError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO conversations
                     (id, teacher_id, title, last_message_preview, updated_at, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    c.id,
                    c.teacher_id,
                    c.title,
                    c.last_message_preview,
                    c.updated_at,
                    c.deleted_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by id (including tombstoned ones).
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, SahayakError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1");
            let result = conn.query_row(&sql, params![id], row_to_conversation);
            match result {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List an owner's live (non-tombstoned) conversations, most recently
/// updated first.
pub async fn list_conversations(
    db: &Database,
    teacher_id: &str,
) -> Result<Vec<Conversation>, SahayakError> {
    let teacher_id = teacher_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM conversations
                 WHERE teacher_id = ?1 AND deleted_at IS NULL
                 ORDER BY updated_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![teacher_id], row_to_conversation)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Merge a new preview and updated_at into an existing conversation.
///
/// Fails with `NotFound` if the conversation does not exist.
pub async fn touch_conversation(
    db: &Database,
    id: &str,
    preview: &str,
    updated_at: i64,
) -> Result<(), SahayakError> {
    let id_param = id.to_string();
    let preview = preview.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE conversations
                 SET last_message_preview = ?2, updated_at = ?3
                 WHERE id = ?1",
                params![id_param, preview, updated_at],
            )?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if rows == 0 {
        return Err(SahayakError::NotFound {
            entity: "conversation",
            key: id.to_string(),
        });
    }
    Ok(())
}

/// Soft-delete: set the tombstone, keeping the row.
pub async fn tombstone_conversation(
    db: &Database,
    id: &str,
    deleted_at: i64,
) -> Result<(), SahayakError> {
    let id_param = id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE conversations SET deleted_at = ?2 WHERE id = ?1",
                params![id_param, deleted_at],
            )?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if rows == 0 {
        return Err(SahayakError::NotFound {
            entity: "conversation",
            key: id.to_string(),
        });
    }
    Ok(())
}

/// Hard-delete a conversation and cascade to its messages, in one
/// transaction.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<(), SahayakError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM messages WHERE conversation_id = ?1",
                params![id],
            )?;
            tx.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Evict an owner's conversations beyond the retention cap.
///
/// Keeps the `cap` most recently updated live conversations; everything
/// older (tombstoned rows included) is hard-deleted together with its
/// messages. The read-then-delete sequence runs as a single transaction so
/// a concurrent writer can never observe a half-evicted store. Returns the
/// evicted conversation ids.
pub async fn evict_beyond_cap(
    db: &Database,
    teacher_id: &str,
    cap: usize,
) -> Result<Vec<String>, SahayakError> {
    let teacher_id = teacher_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let victims: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT id FROM conversations
                     WHERE teacher_id = ?1 AND deleted_at IS NULL
                     ORDER BY updated_at DESC, rowid DESC
                     LIMIT -1 OFFSET ?2",
                )?;
                let rows = stmt.query_map(params![teacher_id, cap as i64], |row| row.get(0))?;
                let mut ids: Vec<String> = Vec::new();
                for row in rows {
                    ids.push(row?);
                }

                // Tombstoned rows count as already deleted; reap them too.
                let mut stmt = tx.prepare(
                    "SELECT id FROM conversations
                     WHERE teacher_id = ?1 AND deleted_at IS NOT NULL",
                )?;
                let rows = stmt.query_map(params![teacher_id], |row| row.get(0))?;
                for row in rows {
                    ids.push(row?);
                }
                ids
            };

            for id in &victims {
                tx.execute(
                    "DELETE FROM messages WHERE conversation_id = ?1",
                    params![id],
                )?;
                tx.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            }

            tx.commit()?;
            Ok(victims)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count an owner's live conversations.
pub async fn live_count(db: &Database, teacher_id: &str) -> Result<i64, SahayakError> {
    let teacher_id = teacher_id.to_string();
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM conversations
                 WHERE teacher_id = ?1 AND deleted_at IS NULL",
                params![teacher_id],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
