//! Text rendering for key tables, previews and validation results

use chrono::{DateTime, Local, Utc};

use crate::domain::api_key::{ApiKey, KeyDuration};
use crate::infrastructure::api_key::{format_date, ValidationResult};

const ID_WIDTH: usize = 8;

fn local_date(at: DateTime<Utc>) -> String {
    format_date(at, &Local)
}

fn note_or<'a>(key: &'a ApiKey, fallback: &'a str) -> &'a str {
    if key.note().is_empty() {
        fallback
    } else {
        key.note()
    }
}

fn short_id(key: &ApiKey) -> &str {
    let id = key.id().as_str();
    id.get(..ID_WIDTH).unwrap_or(id)
}

/// Dashboard table with one row per key
pub fn key_table(keys: &[&ApiKey], now: DateTime<Utc>) -> String {
    if keys.is_empty() {
        return "No keys found. Generate some keys to get started.".to_string();
    }

    let rows: Vec<[String; 5]> = keys
        .iter()
        .map(|key| {
            [
                short_id(key).to_string(),
                key.key().to_string(),
                note_or(key, "-").to_string(),
                key.state(now).label().to_string(),
                key.expires_at()
                    .map(local_date)
                    .unwrap_or_else(|| "Never".to_string()),
            ]
        })
        .collect();

    let header = ["ID", "KEY", "NOTE", "STATUS", "EXPIRES"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 5]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(header)];
    lines.extend(rows.iter().map(|row| format_row(row.each_ref().map(String::as_str))));
    lines.push(format!("{} key(s)", keys.len()));
    lines.join("\n")
}

/// Numbered list of an unsaved batch
pub fn preview(batch: &[ApiKey], duration: KeyDuration) -> String {
    let mut lines: Vec<String> = batch
        .iter()
        .enumerate()
        .map(|(idx, key)| {
            format!("{:02}  {}  [{}]", idx + 1, key.key(), duration.badge())
        })
        .collect();

    lines.push(
        "Review keys before saving. Unsaved keys are lost when the session ends.".to_string(),
    );
    lines.join("\n")
}

/// Human-readable validation outcome
pub fn validation(result: &ValidationResult) -> String {
    match result {
        ValidationResult::Valid(key) => {
            let expires = key
                .expires_at()
                .map(local_date)
                .unwrap_or_else(|| "Never (Lifetime)".to_string());
            format!(
                "ACCESS GRANTED\nNote: {}\nExpires: {}",
                note_or(key, "N/A"),
                expires
            )
        }
        ValidationResult::Expired(key) => {
            let expired_on = key.expires_at().map(local_date).unwrap_or_default();
            format!("KEY EXPIRED\nExpired on: {}", expired_on)
        }
        ValidationResult::Invalid => {
            "INVALID KEY\nThis key does not exist in the database.".to_string()
        }
    }
}
