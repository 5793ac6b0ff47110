use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Separator placed between commits in the raw log text.
pub const DEFAULT_LOG_SEPARATOR: &str = "----- 😎 -----";

/// Marker line that precedes the full commit hash in each log block.
pub const HASH_MARKER: &str = "-hash-";

/// Default note keywords recognised in commit footers.
pub const DEFAULT_NOTE_KEYWORDS: [&str; 2] = ["BREAKING CHANGE", "BREAKING-CHANGE"];

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[\w$.\-*/@ ]*)\))?(?P<bang>!)?: (?P<subject>.*)$")
        .expect("Invalid regex")
});

static TRAILER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>[A-Za-z][\w-]*): ?(?P<text>.*)$").expect("Invalid regex")
});

static REVERT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^(?:Revert|revert:)\s"?(.+?)"?\s*This reverts commit (\w*)\."#)
        .expect("Invalid regex")
});

pub(crate) static REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("Invalid regex"));

pub(crate) static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w-]+)").expect("Invalid regex"));

/// A footer note such as `BREAKING CHANGE: the option is gone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub text: String,
}

impl Note {
    pub fn is_breaking_change(&self) -> bool {
        self.title.eq_ignore_ascii_case("BREAKING CHANGE")
            || self.title.eq_ignore_ascii_case("BREAKING-CHANGE")
    }
}

/// One commit as read from the repository, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub message: String,
    pub hash: String,
}

impl RawCommit {
    pub fn new(message: impl Into<String>, hash: impl Into<String>) -> Self {
        RawCommit {
            message: message.into(),
            hash: hash.into(),
        }
    }
}

/// A conventional commit that concerns the target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub r#type: String,
    pub scope: Option<String>,
    pub subject: String,
    pub hash: String,
    pub breaking: bool,
    pub references: Vec<u64>,
    pub mentions: Vec<String>,
    pub notes: Vec<Note>,
}

/// Result of parsing a message, before any scope filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub r#type: Option<String>,
    pub scope: Option<String>,
    pub subject: String,
    pub notes: Vec<Note>,
    pub revert: bool,
}

impl ParsedMessage {
    /// Parse a commit message according to conventional commits.
    /// Supports headers of the forms:
    /// - type(scope)!: subject
    /// - type(scope): subject
    /// - type!: subject
    /// - type: subject
    ///
    /// Anything else yields a message without a type.
    pub fn parse(message: &str, note_keywords: &[String]) -> Self {
        let message = message.trim();
        let mut lines = message.lines();
        let header = lines.next().unwrap_or_default().trim_end();

        let (r#type, scope, bang, subject) = match HEADER_REGEX.captures(header) {
            Some(caps) => (
                caps.name("type").map(|m| m.as_str().to_string()),
                caps.name("scope").map(|m| m.as_str().to_string()),
                caps.name("bang").is_some(),
                caps.name("subject")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            ),
            None => (None, None, false, header.to_string()),
        };

        let mut notes = parse_notes(lines, note_keywords);
        if bang && !notes.iter().any(Note::is_breaking_change) {
            notes.insert(
                0,
                Note {
                    title: "BREAKING CHANGE".to_string(),
                    text: subject.clone(),
                },
            );
        }

        ParsedMessage {
            r#type,
            scope,
            subject,
            notes,
            revert: REVERT_REGEX.is_match(message),
        }
    }
}

fn parse_notes<'a>(lines: impl Iterator<Item = &'a str>, note_keywords: &[String]) -> Vec<Note> {
    let mut notes: Vec<Note> = Vec::new();
    let mut in_note = false;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            in_note = false;
            continue;
        }

        if let Some(note) = keyword_note(trimmed, note_keywords) {
            notes.push(note);
            in_note = true;
        } else if let Some(caps) = TRAILER_REGEX.captures(trimmed) {
            notes.push(Note {
                title: caps["token"].to_string(),
                text: caps["text"].trim().to_string(),
            });
            in_note = true;
        } else if in_note {
            if let Some(last) = notes.last_mut() {
                if !last.text.is_empty() {
                    last.text.push('\n');
                }
                last.text.push_str(trimmed);
            }
        }
    }

    notes
}

/// Match `KEYWORD: text` (or `KEYWORD text`) case-insensitively.
fn keyword_note(line: &str, note_keywords: &[String]) -> Option<Note> {
    note_keywords.iter().find_map(|keyword| {
        let head = line.get(..keyword.len())?;
        if !head.eq_ignore_ascii_case(keyword) {
            return None;
        }
        let rest = &line[keyword.len()..];
        let text = rest.strip_prefix(':').or_else(|| rest.strip_prefix(' '))?;
        Some(Note {
            title: head.to_string(),
            text: text.trim().to_string(),
        })
    })
}

/// Why a raw commit did not produce a [`Commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    NoType,
    Revert,
    OutOfScope,
}

/// Turns raw commits into [`Commit`] records scoped to one package.
#[derive(Debug, Clone)]
pub struct CommitClassifier {
    short_name: String,
    long_name: String,
    note_keywords: Vec<String>,
}

impl CommitClassifier {
    /// Create a classifier for the package known as `short_name`
    /// (directory name) or `long_name` (published name).
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        CommitClassifier {
            short_name: short_name.into(),
            long_name: long_name.into(),
            note_keywords: DEFAULT_NOTE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn with_note_keywords(mut self, note_keywords: Vec<String>) -> Self {
        self.note_keywords = note_keywords;
        self
    }

    /// Classify one raw commit, or say why it was discarded.
    pub fn try_classify(&self, raw: &RawCommit) -> Result<Commit, Discard> {
        let parsed = ParsedMessage::parse(&raw.message, &self.note_keywords);

        let r#type = match parsed.r#type {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Discard::NoType),
        };
        if parsed.revert {
            return Err(Discard::Revert);
        }
        match parsed.scope.as_deref() {
            Some(scope) if scope == self.short_name || scope == self.long_name => {}
            _ => return Err(Discard::OutOfScope),
        }

        let references = REFERENCE_REGEX
            .captures_iter(&parsed.subject)
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .collect();
        let mentions = MENTION_REGEX
            .captures_iter(&parsed.subject)
            .map(|caps| caps[1].to_string())
            .collect();

        Ok(Commit {
            breaking: parsed.notes.iter().any(Note::is_breaking_change),
            r#type,
            scope: parsed.scope,
            subject: parsed.subject,
            hash: raw.hash.clone(),
            references,
            mentions,
            notes: parsed.notes,
        })
    }

    pub fn classify(&self, raw: &RawCommit) -> Option<Commit> {
        match self.try_classify(raw) {
            Ok(commit) => Some(commit),
            Err(reason) => {
                debug!(hash = %raw.hash, ?reason, "discarded commit");
                None
            }
        }
    }

    /// Classify every raw commit, keeping input order.
    pub fn classify_all(&self, raws: &[RawCommit]) -> Vec<Commit> {
        raws.iter().filter_map(|raw| self.classify(raw)).collect()
    }
}

/// Split raw `git log --format=%B%n-hash-%n%H%n<separator>` output into commits.
pub fn split_log(log: &str, separator: &str) -> Vec<RawCommit> {
    log.split(separator)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| match split_hash(block) {
            Some((message, hash)) => RawCommit::new(message.trim_end(), hash.trim()),
            None => RawCommit::new(block, ""),
        })
        .collect()
}

fn split_hash(block: &str) -> Option<(&str, &str)> {
    if let Some(hash) = block.strip_prefix(HASH_MARKER) {
        if hash.starts_with('\n') {
            return Some(("", hash));
        }
    }
    let marker = format!("\n{}\n", HASH_MARKER);
    block
        .rfind(&marker)
        .map(|pos| (&block[..pos], &block[pos + marker.len()..]))
}
