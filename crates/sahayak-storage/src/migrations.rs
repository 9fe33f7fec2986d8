// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery, plus the data-migration step
//! for the message -> conversation schema change.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use rusqlite::params;
use sahayak_core::SahayakError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending schema migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history`
/// table, so re-running is safe.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), SahayakError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| SahayakError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}

/// Re-home messages written under the pre-conversation (v1) schema.
///
/// For every distinct owner with messages lacking a `conversation_id`, this
/// synthesizes exactly one "Previous Conversation" and attaches all of that
/// owner's orphaned messages to it. Message timestamps are untouched, so
/// in-conversation ordering is preserved; the synthesized conversation
/// inherits the newest orphaned timestamp so recency ordering is preserved
/// too.
///
/// The whole step runs in one transaction (all-or-nothing) and is
/// re-entrant: with no orphaned messages it is a no-op. Returns the number
/// of conversations synthesized.
pub fn rehome_orphaned_messages(
    conn: &mut rusqlite::Connection,
) -> Result<usize, rusqlite::Error> {
    let tx = conn.transaction()?;

    let owners: Vec<String> = {
        let mut stmt = tx.prepare(
            "SELECT DISTINCT teacher_id FROM messages
             WHERE conversation_id IS NULL
             ORDER BY teacher_id",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut owners = Vec::new();
        for row in rows {
            owners.push(row?);
        }
        owners
    };

    for owner in &owners {
        let newest: i64 = tx.query_row(
            "SELECT MAX(timestamp) FROM messages
             WHERE teacher_id = ?1 AND conversation_id IS NULL",
            params![owner],
            |row| row.get(0),
        )?;

        let conversation_id = uuid::Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO conversations (id, teacher_id, title, updated_at)
             VALUES (?1, ?2, 'Previous Conversation', ?3)",
            params![conversation_id, owner, newest],
        )?;
        tx.execute(
            "UPDATE messages SET conversation_id = ?1
             WHERE teacher_id = ?2 AND conversation_id IS NULL",
            params![conversation_id, owner],
        )?;
    }

    tx.commit()?;
    Ok(owners.len())
}
