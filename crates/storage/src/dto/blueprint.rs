use std::collections::HashSet;

use super::competition::{BuildCompetitionRequest, CompetitionDetails};
use crate::error::{Result, StorageError};
use crate::models::NormalizedEmail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantLine {
    pub name: String,
    pub email: Option<NormalizedEmail>,
}

/// A fully parsed competition build, ready to be persisted in one transaction.
#[derive(Debug, Clone)]
pub struct CompetitionBlueprint {
    pub details: CompetitionDetails,
    pub judge_emails: Vec<NormalizedEmail>,
    pub participants: Vec<ParticipantLine>,
}

impl CompetitionBlueprint {
    /// Parses the free-text judge and participant fields. All problems are
    /// reported together.
    pub fn from_request(req: &BuildCompetitionRequest) -> Result<Self> {
        let mut errors = Vec::new();

        let title = req.details.title.trim();
        if title.is_empty() {
            errors.push("Competition title is required".to_string());
        }

        let judge_emails = match parse_judge_emails(&req.judge_emails) {
            Ok(emails) if emails.is_empty() => {
                errors.push("At least one judge email is required".to_string());
                emails
            }
            Ok(emails) => emails,
            Err(bad) => {
                errors.extend(bad);
                Vec::new()
            }
        };

        let participants = match parse_participant_lines(&req.participants) {
            Ok(lines) if lines.is_empty() => {
                errors.push("At least one participant is required".to_string());
                lines
            }
            Ok(lines) => lines,
            Err(bad) => {
                errors.extend(bad);
                Vec::new()
            }
        };

        if !errors.is_empty() {
            return Err(StorageError::Validation(errors.join("; ")));
        }

        Ok(Self {
            details: CompetitionDetails {
                title: title.to_string(),
                description: non_blank(req.details.description.as_deref()),
                rules: non_blank(req.details.rules.as_deref()),
            },
            judge_emails,
            participants,
        })
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Splits on commas, semicolons and newlines; blanks are skipped and
/// duplicates collapsed in first-seen order.
pub fn parse_judge_emails(raw: &str) -> std::result::Result<Vec<NormalizedEmail>, Vec<String>> {
    let mut seen = HashSet::new();
    let mut emails = Vec::new();
    let mut errors = Vec::new();

    for chunk in raw.split([',', ';', '\n']) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        match NormalizedEmail::parse(chunk) {
            Some(email) => {
                if seen.insert(email.clone()) {
                    emails.push(email);
                }
            }
            None => errors.push(format!("Invalid judge email: '{chunk}'")),
        }
    }

    if errors.is_empty() {
        Ok(emails)
    } else {
        Err(errors)
    }
}

/// One participant per line, either `Name` or `Name <email>`. Names are
/// unique case-insensitively; the first occurrence wins.
pub fn parse_participant_lines(
    raw: &str,
) -> std::result::Result<Vec<ParticipantLine>, Vec<String>> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for line in raw.lines() {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let (name, email) = match (text.find('<'), text.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                let address = text[open + 1..close].trim();
                let email = if address.is_empty() {
                    None
                } else {
                    match NormalizedEmail::parse(address) {
                        Some(email) => Some(email),
                        None => {
                            errors.push(format!("Invalid participant email: '{address}'"));
                            continue;
                        }
                    }
                };
                (text[..open].trim(), email)
            }
            _ => (text, None),
        };

        if name.is_empty() {
            continue;
        }

        if seen.insert(name.to_lowercase()) {
            lines.push(ParticipantLine {
                name: name.to_string(),
                email,
            });
        }
    }

    if errors.is_empty() {
        Ok(lines)
    } else {
        Err(errors)
    }
}
