// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on the persisted entities.

pub mod conversations;
pub mod messages;
pub mod outbox;
pub mod profile;
pub mod session;
pub mod settings;

/// Current time as epoch milliseconds, the persisted timestamp unit.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Map a stored enum string back to its typed form inside a row closure.
pub(crate) fn column_parse<T: std::str::FromStr>(
    idx: usize,
    raw: String,
) -> Result<T, rusqlite::Error>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
