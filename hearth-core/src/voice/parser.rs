use once_cell::sync::Lazy;
use regex::Regex;

use crate::lists::ListType;

static CREATE_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:please\s+)?(?:(?:create|make|add|start)\s+(?:a\s+)?(?:new\s+)?|new\s+)(?:(to\s*-?\s*do|todo|grocery|shopping|other)\s+)?list\s+(?:(?:called|named)\s+)?(.+)$",
    )
    .expect("create-list pattern is valid")
});

static PROMPT_ECHO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsay\b|\btype of list\b").expect("echo pattern is valid"));

const CONNECTORS: &[&str] = &["called", "named"];

/// Vocabulary for the list-type answer, checked in order.
const LIST_TYPE_ALIASES: &[(ListType, &[&str])] = &[
    (ListType::Todo, &["todo", "to do", "to-do", "1", "one"]),
    (ListType::Grocery, &["grocery", "groceries", "2", "two"]),
    (ListType::Shopping, &["shopping", "3", "three"]),
    (ListType::Other, &["other", "4", "four"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateListIntent {
    pub name: String,
    pub list_type: Option<ListType>,
}

/// Matches "create list <name>" style phrases.
///
/// A list type spoken inline ("create a grocery list called Weekly") is
/// returned alongside the name.
pub fn parse_create_list(transcript: &str) -> Option<CreateListIntent> {
    let trimmed = transcript.trim();
    let captures = CREATE_LIST.captures(trimmed)?;
    let name = captures
        .get(2)?
        .as_str()
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim();
    // "create a list called" leaves the connector as the only word
    if name.is_empty() || CONNECTORS.iter().any(|word| name.eq_ignore_ascii_case(word)) {
        return None;
    }
    let list_type = captures
        .get(1)
        .and_then(|m| match_list_type(m.as_str()));
    Some(CreateListIntent {
        name: name.to_string(),
        list_type,
    })
}

/// Resolves a spoken answer to a list type.
///
/// Exact matches win over whole-word matches inside a longer phrase. A
/// transcript that echoes the prompt ("say todo") never resolves.
pub fn match_list_type(transcript: &str) -> Option<ListType> {
    let normalized = normalize(transcript);
    if normalized.is_empty() || PROMPT_ECHO.is_match(&normalized) {
        return None;
    }

    for (list_type, aliases) in LIST_TYPE_ALIASES {
        if aliases.iter().any(|alias| normalized == *alias) {
            return Some(*list_type);
        }
    }

    let padded = format!(" {normalized} ");
    for (list_type, aliases) in LIST_TYPE_ALIASES {
        if aliases
            .iter()
            .any(|alias| padded.contains(&format!(" {alias} ")))
        {
            return Some(*list_type);
        }
    }
    None
}

fn normalize(transcript: &str) -> String {
    let cleaned: String = transcript
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
