//! Flat-text credential import.
//!
//! Legacy dumps look like this:
//!
//! ```text
//! Bank:
//! https://bank.example
//! alice
//! secret123
//! free-form notes...
//!
//! Mail:
//! bob
//! pw1
//! ```
//!
//! A line whose last character is `:` starts a service. The lines that
//! follow are its body: an optional URL, the username, the secret, then
//! any number of comment lines. Blank lines are ignored everywhere.
//!
//! Parsing is split in two: [`parse_blocks`] is the line state machine and
//! knows nothing about crypto; [`ImportParser`] turns blocks into records,
//! encrypting each secret under a key derived once for the whole run.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::{encrypt, DerivedKey};
use crate::storage::{NewRecord, UserId};

/// One service header and its body lines, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBlock {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug)]
enum ParserState {
    Idle,
    Collecting { name: String, lines: Vec<String> },
}

/// Split import text into service blocks.
///
/// Lines are trimmed before classification. A header with no body lines
/// produces no block.
pub fn parse_blocks<I, S>(lines: I) -> Vec<ServiceBlock>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blocks = Vec::new();
    let mut state = ParserState::Idle;

    for (index, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = header_name(line) {
            if let ParserState::Collecting { name, lines } = state {
                flush(&mut blocks, name, lines);
            }
            state = ParserState::Collecting {
                name: header.to_string(),
                lines: Vec::new(),
            };
            continue;
        }

        match &mut state {
            ParserState::Collecting { lines, .. } => lines.push(line.to_string()),
            // Body content is never logged, only its position
            ParserState::Idle => debug!(line = index + 1, "ignoring line outside any service"),
        }
    }

    if let ParserState::Collecting { name, lines } = state {
        flush(&mut blocks, name, lines);
    }

    blocks
}

fn header_name(line: &str) -> Option<&str> {
    line.strip_suffix(':').filter(|name| !name.is_empty())
}

fn flush(blocks: &mut Vec<ServiceBlock>, name: String, lines: Vec<String>) {
    if lines.is_empty() {
        debug!(service = %name, "dropping service with no body");
        return;
    }
    blocks.push(ServiceBlock { name, lines });
}

/// The fields of a block, before encryption.
#[derive(Debug, PartialEq, Eq)]
pub struct ServiceFields<'a> {
    pub service_url: &'a str,
    pub username: &'a str,
    pub secret: &'a str,
    pub comments: String,
}

impl ServiceBlock {
    /// Interpret the body as `[url] username secret [comments...]`.
    ///
    /// With three or more lines, a first line containing `.` or `http`
    /// (any case) is the URL.
    pub fn fields(&self) -> Result<ServiceFields<'_>, SkipReason> {
        if self.lines.len() < 2 {
            return Err(SkipReason::InsufficientData);
        }

        let first = &self.lines[0];
        let has_url = self.lines.len() >= 3
            && (first.contains('.') || first.to_lowercase().contains("http"));
        let (service_url, rest) = if has_url {
            (first.as_str(), &self.lines[1..])
        } else {
            ("", &self.lines[..])
        };

        Ok(ServiceFields {
            service_url,
            username: &rest[0],
            secret: &rest[1],
            comments: rest[2..].join("\n"),
        })
    }
}

/// Why a service produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientData,
    Encryption(String),
    Storage(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientData => {
                write!(f, "insufficient data, need at least username and password")
            }
            SkipReason::Encryption(detail) => write!(f, "encryption failed: {}", detail),
            SkipReason::Storage(detail) => write!(f, "could not be saved: {}", detail),
        }
    }
}

/// A non-fatal import warning: one service was skipped, the run went on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSkipped {
    pub service: String,
    pub reason: SkipReason,
}

impl ImportSkipped {
    pub fn new(service: impl Into<String>, reason: SkipReason) -> Self {
        let skipped = Self {
            service: service.into(),
            reason,
        };
        warn!(service = %skipped.service, reason = %skipped.reason, "skipping import block");
        skipped
    }
}

impl fmt::Display for ImportSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipping {} - {}", self.service, self.reason)
    }
}

/// Records ready for persistence plus the services that were skipped.
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub records: Vec<NewRecord>,
    pub warnings: Vec<ImportSkipped>,
}

/// Turns import text into encrypted records for one owner and category.
///
/// Holds a key derived once by the caller; it never derives keys itself.
pub struct ImportParser<'k> {
    owner_id: UserId,
    category_id: Uuid,
    key: &'k DerivedKey,
}

impl<'k> ImportParser<'k> {
    pub fn new(owner_id: UserId, category_id: Uuid, key: &'k DerivedKey) -> Self {
        Self {
            owner_id,
            category_id,
            key,
        }
    }

    /// Build each service in `lines` and hand it to `save` before moving on
    /// to the next one.
    ///
    /// A service that cannot be built or saved becomes a warning; the
    /// services around it are unaffected.
    pub fn run<I, S, F>(&self, lines: I, mut save: F) -> Vec<ImportSkipped>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(NewRecord) -> Result<(), SkipReason>,
    {
        let mut warnings = Vec::new();
        for block in parse_blocks(lines) {
            if let Err(reason) = self.build_record(&block).and_then(&mut save) {
                warnings.push(ImportSkipped::new(block.name, reason));
            }
        }
        warnings
    }

    /// Build every service in `lines` without saving anything.
    pub fn parse<I, S>(&self, lines: I) -> ParsedImport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let warnings = self.run(lines, |record| {
            records.push(record);
            Ok(())
        });
        ParsedImport { records, warnings }
    }

    /// Turn one block into a record with its secret sealed.
    pub fn build_record(&self, block: &ServiceBlock) -> Result<NewRecord, SkipReason> {
        let fields = block.fields()?;
        let token = encrypt(fields.secret.as_bytes(), self.key)
            .map_err(|e| SkipReason::Encryption(e.to_string()))?;

        Ok(
            NewRecord::new(
                self.owner_id.clone(),
                self.category_id,
                block.name.clone(),
                fields.username,
            )
            .with_service_url(fields.service_url)
            .with_comments(fields.comments)
            .with_secret(token),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str, lines: &[&str]) -> ServiceBlock {
        ServiceBlock {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_blocks_url_and_comments() {
        let text = "Bank:\nhttps://bank.example\nalice\nsecret123\nnote one\nnote two\n";
        let blocks = parse_blocks(text.lines());

        assert_eq!(
            blocks,
            vec![block(
                "Bank",
                &["https://bank.example", "alice", "secret123", "note one", "note two"]
            )]
        );
    }

    #[test]
    fn test_parse_blocks_multiple_services() {
        let text = "Mail:\nbob\npw1\n\nBank:\n  alice  \n\nsecret\n";
        let blocks = parse_blocks(text.lines());

        assert_eq!(
            blocks,
            vec![
                block("Mail", &["bob", "pw1"]),
                block("Bank", &["alice", "secret"]),
            ]
        );
    }

    #[test]
    fn test_parse_blocks_ignores_leading_orphans() {
        let blocks = parse_blocks(["stray line", "", "Mail:", "bob", "pw1"]);
        assert_eq!(blocks, vec![block("Mail", &["bob", "pw1"])]);
    }

    #[test]
    fn test_lone_colon_is_not_a_header() {
        let blocks = parse_blocks(["Mail:", "bob", ":", "pw1"]);
        assert_eq!(blocks, vec![block("Mail", &["bob", ":", "pw1"])]);
    }

    #[test]
    fn test_empty_header_body_is_dropped() {
        let blocks = parse_blocks(["First:", "Second:", "bob", "pw1", "Last:"]);
        assert_eq!(blocks, vec![block("Second", &["bob", "pw1"])]);
    }

    #[test]
    fn test_header_name_keeps_inner_colons() {
        let blocks = parse_blocks(["Work: VPN:", "bob", "pw1"]);
        assert_eq!(blocks[0].name, "Work: VPN");
    }

    #[test]
    fn test_fields_with_url() {
        let block = block(
            "Bank",
            &["https://bank.example", "alice", "secret123", "note one", "note two"],
        );
        let fields = block.fields().unwrap();

        assert_eq!(fields.service_url, "https://bank.example");
        assert_eq!(fields.username, "alice");
        assert_eq!(fields.secret, "secret123");
        assert_eq!(fields.comments, "note one\nnote two");
    }

    #[test]
    fn test_fields_without_url() {
        let block = block("Mail", &["bob", "pw1"]);
        let fields = block.fields().unwrap();

        assert_eq!(fields.service_url, "");
        assert_eq!(fields.username, "bob");
        assert_eq!(fields.secret, "pw1");
        assert_eq!(fields.comments, "");
    }

    #[test]
    fn test_two_lines_never_treated_as_url() {
        let block = block("Site", &["example.com", "pw1"]);
        let fields = block.fields().unwrap();

        assert_eq!(fields.service_url, "");
        assert_eq!(fields.username, "example.com");
    }

    #[test]
    fn test_http_detection_is_case_insensitive() {
        let block = block("Router", &["HTTP-admin", "root", "toor"]);
        assert_eq!(block.fields().unwrap().service_url, "HTTP-admin");

        let plain = block_without_url();
        assert_eq!(plain.fields().unwrap().service_url, "");
        assert_eq!(plain.fields().unwrap().comments, "a note");
    }

    fn block_without_url() -> ServiceBlock {
        block("Forum", &["carol", "hunter2", "a note"])
    }

    #[test]
    fn test_fields_insufficient_data() {
        let block = block("Empty", &["onlyoneline"]);
        assert_eq!(block.fields(), Err(SkipReason::InsufficientData));
    }

    fn parser(key: &DerivedKey) -> ImportParser<'_> {
        ImportParser::new(UserId::new("alice").unwrap(), Uuid::new_v4(), key)
    }

    #[test]
    fn test_parse_encrypts_and_warns() {
        let key = DerivedKey::from_bytes([1u8; 32]);
        let parsed = parser(&key).parse("Empty:\nonlyoneline\nMail:\nbob\npw1\n".lines());

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].service_name, "Mail");
        let token = parsed.records[0].encrypted_secret.as_ref().unwrap();
        assert_eq!(crate::crypto::decrypt(token, &key).unwrap().as_slice(), b"pw1");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].service, "Empty");
    }

    #[test]
    fn test_run_saves_each_service_in_order() {
        let key = DerivedKey::from_bytes([1u8; 32]);
        let mut saved = Vec::new();
        let warnings = parser(&key).run(
            "Bank:\nalice\nsecret\nMail:\nbob\npw1\nForum:\ncarol\nhunter2\n".lines(),
            |record| {
                if record.service_name == "Mail" {
                    return Err(SkipReason::Storage("disk full".to_string()));
                }
                saved.push(record.service_name);
                Ok(())
            },
        );

        assert_eq!(saved, vec!["Bank", "Forum"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].service, "Mail");
        assert_eq!(
            warnings[0].reason,
            SkipReason::Storage("disk full".to_string())
        );
    }

    #[test]
    fn test_skipped_display_names_service() {
        let skipped = ImportSkipped::new("Empty", SkipReason::InsufficientData);
        assert_eq!(
            skipped.to_string(),
            "Skipping Empty - insufficient data, need at least username and password"
        );
    }
}
