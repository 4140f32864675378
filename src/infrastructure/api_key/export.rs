//! Plain-text export
//!
//! Write-only, human-readable format; delimiters inside notes are not escaped.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tokio::fs;
use tracing::info;

use crate::domain::api_key::ApiKey;
use crate::domain::DomainError;

pub const EXPORT_FILE_PREFIX: &str = "lua_auth_keys_";

/// Calendar date as `M/D/YYYY` in `tz`
pub fn format_date<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%-m/%-d/%Y").to_string()
}

/// One line per key: `Key: <key> | Note: <note or N/A> | Expires: <date or Lifetime>`
pub fn export_text<'a, Tz>(keys: impl IntoIterator<Item = &'a ApiKey>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    keys.into_iter()
        .map(|key| {
            let note = if key.note().is_empty() {
                "N/A"
            } else {
                key.note()
            };
            let expires = key
                .expires_at()
                .map(|at| format_date(at, tz))
                .unwrap_or_else(|| "Lifetime".to_string());

            format!("Key: {} | Note: {} | Expires: {}", key.key(), note, expires)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `lua_auth_keys_<epoch-millis>.txt`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{}{}.txt", EXPORT_FILE_PREFIX, now.timestamp_millis())
}

/// Write an export file into `dir` and return its path
pub async fn write_export<'a, Tz>(
    dir: &Path,
    keys: impl IntoIterator<Item = &'a ApiKey>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<PathBuf, DomainError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let content = export_text(keys, tz);
    let path = dir.join(export_file_name(now));

    fs::create_dir_all(dir).await.map_err(|e| {
        DomainError::storage(format!("Failed to create {}: {}", dir.display(), e))
    })?;
    fs::write(&path, content).await.map_err(|e| {
        DomainError::storage(format!("Failed to write {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), "Keys exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::ApiKeyId;
    use tempfile::tempdir;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn sample() -> Vec<ApiKey> {
        vec![
            ApiKey::new(
                ApiKeyId::generate(),
                "AbC123dEf456GhI",
                "Premium User",
                at(1_700_000_000_000),
                // 2023-11-21T22:13:20Z
                Some(at(1_700_604_800_000)),
            ),
            ApiKey::new(ApiKeyId::generate(), "zzz999ZZZ999zzz", "", at(0), None),
        ]
    }

    #[test]
    fn test_export_text() {
        let text = export_text(&sample(), &Utc);

        assert_eq!(
            text,
            "Key: AbC123dEf456GhI | Note: Premium User | Expires: 11/21/2023\n\
             Key: zzz999ZZZ999zzz | Note: N/A | Expires: Lifetime"
        );
    }

    #[test]
    fn test_export_empty() {
        assert_eq!(export_text(&Vec::<ApiKey>::new(), &Utc), "");
    }

    #[test]
    fn test_pipe_in_note_is_not_escaped() {
        let key = ApiKey::new(ApiKeyId::generate(), "k", "a | b", at(0), None);
        assert_eq!(
            export_text([&key], &Utc),
            "Key: k | Note: a | b | Expires: Lifetime"
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(at(1_700_000_000_123)),
            "lua_auth_keys_1700000000123.txt"
        );
    }

    #[tokio::test]
    async fn test_write_export() {
        let dir = tempdir().unwrap();
        let keys = sample();

        let path = write_export(dir.path(), &keys, at(42), &Utc).await.unwrap();

        assert_eq!(path, dir.path().join("lua_auth_keys_42.txt"));
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
