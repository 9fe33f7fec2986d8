// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The outbox: durable queue of operations that must eventually reach the
//! server, surviving process restarts.
//!
//! Dequeueing is non-destructive; removal is explicit on confirmed replay.

use rusqlite::params;
use sahayak_core::types::{ActionKind, ActionPayload, PendingAction};
use sahayak_core::SahayakError;

use crate::database::Database;

fn row_to_action(row: &rusqlite::Row<'_>) -> Result<PendingAction, rusqlite::Error> {
    let raw_payload: String = row.get(1)?;
    let payload: ActionPayload = serde_json::from_str(&raw_payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(PendingAction {
        id: row.get(0)?,
        payload,
        retries: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Append an action to the outbox.
pub async fn enqueue(db: &Database, action: &PendingAction) -> Result<(), SahayakError> {
    let id = action.id.clone();
    let kind = action.payload.kind().to_string();
    let payload = serde_json::to_string(&action.payload).map_err(|e| SahayakError::Storage {
        source: Box::new(e),
    })?;
    let retries = action.retries;
    let created_at = action.created_at;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_actions (id, kind, payload, retries, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, kind, payload, retries, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Snapshot all actions of a kind in FIFO (created_at) order.
///
/// Does not remove them; removal is explicit on success.
pub async fn dequeue_all(
    db: &Database,
    kind: ActionKind,
) -> Result<Vec<PendingAction>, SahayakError> {
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, payload, retries, created_at FROM pending_actions
                 WHERE kind = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![kind], row_to_action)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Increment an action's retry count; ordering is unchanged. Returns the
/// new count.
pub async fn mark_retry(db: &Database, id: &str) -> Result<i64, SahayakError> {
    let id_param = id.to_string();
    let retries = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let rows = tx.execute(
                "UPDATE pending_actions SET retries = retries + 1 WHERE id = ?1",
                params![id_param],
            )?;
            let retries = if rows == 0 {
                None
            } else {
                Some(tx.query_row(
                    "SELECT retries FROM pending_actions WHERE id = ?1",
                    params![id_param],
                    |row| row.get::<_, i64>(0),
                )?)
            };
            tx.commit()?;
            Ok(retries)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    retries.ok_or_else(|| SahayakError::NotFound {
        entity: "pending action",
        key: id.to_string(),
    })
}

/// Delete an action after confirmed successful replay (or abandonment).
pub async fn remove(db: &Database, id: &str) -> Result<(), SahayakError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM pending_actions WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count all queued actions.
pub async fn count(db: &Database) -> Result<i64, SahayakError> {
    db.connection()
        .call(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM pending_actions", [], |r| r.get(0))?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
