//! Output formatting helpers for records, profiles and import reports.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use passvault_core::storage::Category;
use passvault_core::{EncryptionProfile, ImportReport, Record};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::ui::{kv, simple_table, OutputMode};

/// How a record's secret is shown.
pub enum SecretView {
    /// No secret is stored
    None,
    /// Masked preview, e.g. `sec***`
    Masked(String),
    /// Clear text (only with --reveal), wiped on drop
    Revealed(Zeroizing<String>),
}

impl SecretView {
    fn as_str(&self) -> &str {
        match self {
            SecretView::None => "",
            SecretView::Masked(value) => value,
            SecretView::Revealed(value) => value.as_str(),
        }
    }
}

/// Build a map of category ID -> name for display.
pub fn category_names(categories: &[Category]) -> HashMap<Uuid, String> {
    categories
        .iter()
        .map(|category| (category.id, category.name.clone()))
        .collect()
}

fn category_name<'a>(names: &'a HashMap<Uuid, String>, id: &Uuid) -> &'a str {
    names.get(id).map(String::as_str).unwrap_or("unknown")
}

/// Convert a record to JSON. The token itself is never printed.
pub fn record_json(record: &Record, names: &HashMap<Uuid, String>) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "owner": record.owner_id,
        "category": category_name(names, &record.category_id),
        "service_name": record.service_name,
        "service_url": record.service_url,
        "username": record.username,
        "has_secret": record.encrypted_secret.is_some(),
        "comments": record.comments,
        "created_at": record.created_at,
        "updated_at": record.updated_at,
    })
}

/// Single-record JSON for `show`. Only a revealed secret is included.
pub fn record_detail_json(
    record: &Record,
    names: &HashMap<Uuid, String>,
    secret: &SecretView,
    issued_at: Option<DateTime<Utc>>,
) -> serde_json::Value {
    let mut value = record_json(record, names);
    if let SecretView::Revealed(secret) = secret {
        value["secret"] = serde_json::Value::String(secret.as_str().to_string());
    }
    if let Some(issued) = issued_at {
        value["secret_issued_at"] = serde_json::json!(issued);
    }
    value
}

pub fn records_json(records: &[Record], names: &HashMap<Uuid, String>) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|record| record_json(record, names))
        .collect()
}

pub fn print_record_list(mode: OutputMode, records: &[Record], names: &HashMap<Uuid, String>) {
    if mode.is_json() {
        let out = serde_json::Value::Array(records_json(records, names));
        println!("{}", out);
        return;
    }
    if records.is_empty() {
        if mode.is_pretty() {
            println!("No records.");
        }
        return;
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                category_name(names, &record.category_id).to_string(),
                record.service_name.clone(),
                record.username.clone(),
                record.service_url.clone(),
                short_id(&record.id),
            ]
        })
        .collect();
    println!(
        "{}",
        simple_table(
            mode,
            &["CATEGORY", "SERVICE", "USERNAME", "URL", "ID"],
            &rows
        )
    );
}

pub fn print_record(
    mode: OutputMode,
    record: &Record,
    names: &HashMap<Uuid, String>,
    secret: &SecretView,
    issued_at: Option<DateTime<Utc>>,
) {
    if mode.is_json() {
        println!("{}", record_detail_json(record, names, secret, issued_at));
        return;
    }

    println!("{}", kv(mode, "ID", &record.id.to_string()));
    println!("{}", kv(mode, "Service", &record.service_name));
    println!(
        "{}",
        kv(mode, "Category", category_name(names, &record.category_id))
    );
    if !record.service_url.is_empty() {
        println!("{}", kv(mode, "URL", &record.service_url));
    }
    println!("{}", kv(mode, "Username", &record.username));
    match secret {
        SecretView::None => println!("{}", kv(mode, "Secret", "(none)")),
        view => println!("{}", kv(mode, "Secret", view.as_str())),
    }
    if let Some(issued) = issued_at {
        println!("{}", kv(mode, "Issued at", &issued.to_rfc3339()));
    }
    println!("{}", kv(mode, "Updated", &record.updated_at.to_rfc3339()));
    if !record.comments.is_empty() {
        if mode.is_pretty() {
            println!();
            println!("{}", record.comments);
        } else {
            println!("{}", kv(mode, "Comments", &record.comments.replace('\n', "\\n")));
        }
    }
}

pub fn print_profile(mode: OutputMode, profile: &EncryptionProfile) {
    if mode.is_json() {
        let out = serde_json::json!({
            "user_id": profile.user_id,
            "kdf_iterations": profile.kdf_iterations,
            "created_at": profile.created_at,
        });
        println!("{}", out);
        return;
    }
    println!("{}", kv(mode, "User", profile.user_id.as_str()));
    println!(
        "{}",
        kv(mode, "KDF", &format!("PBKDF2-HMAC-SHA256, {} iterations", profile.kdf_iterations))
    );
    println!("{}", kv(mode, "Created", &profile.created_at.to_rfc3339()));
}

/// Print the import summary. Warnings go to stderr so stdout stays
/// parseable.
pub fn print_import_report(mode: OutputMode, report: &ImportReport, quiet: bool) {
    if mode.is_json() {
        let out = serde_json::json!({
            "category": report.category.name,
            "imported": report.records.iter().map(|r| &r.service_name).collect::<Vec<_>>(),
            "skipped": report.warnings,
        });
        println!("{}", out);
        return;
    }

    for warning in &report.warnings {
        eprintln!("{}", warning);
    }
    if !quiet {
        println!(
            "Imported {} record(s) into \"{}\", skipped {}",
            report.records.len(),
            report.category.name,
            report.warnings.len()
        );
    }
}

fn short_id(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
