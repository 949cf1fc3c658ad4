//! Memory records and local filtering
//!
//! Memories are owned by the backend; the client holds a fetched copy and
//! filters it locally. Tag filtering is exact membership; free-text search
//! is a case-insensitive substring match over text, summary, and tags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum characters a memory must have before it is sent for training
pub const MIN_MEMORY_CHARS: usize = 100;

/// A stored memory, as returned by `GET /memories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Backend-assigned identifier
    pub id: String,

    /// Full memory text
    #[serde(default)]
    pub text: String,

    /// Backend-generated summary
    #[serde(default)]
    pub summary: String,

    /// User-chosen tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// ISO 8601 timestamp string as sent by the backend (may be empty)
    #[serde(default)]
    pub timestamp: String,

    /// Audio recording behind the memory, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_path_url: Option<String>,
}

/// Local filter over a fetched memory list
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    /// Free-text search term
    pub search: Option<String>,

    /// Exact tag to require
    pub tag: Option<String>,
}

impl MemoryFilter {
    /// Whether one memory passes the filter
    #[must_use]
    pub fn matches(&self, memory: &Memory) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.trim().to_lowercase();
            term.is_empty()
                || memory.text.to_lowercase().contains(&term)
                || memory.summary.to_lowercase().contains(&term)
                || memory.tags.iter().any(|t| t.to_lowercase().contains(&term))
        });

        let matches_tag = self
            .tag
            .as_deref()
            .is_none_or(|tag| tag.is_empty() || memory.tags.iter().any(|t| t == tag));

        matches_search && matches_tag
    }

    /// Filter a memory list, newest first
    #[must_use]
    pub fn apply<'a>(&self, memories: &'a [Memory]) -> Vec<&'a Memory> {
        let mut filtered: Vec<&Memory> = memories.iter().filter(|m| self.matches(m)).collect();
        // ISO 8601 timestamps order lexicographically
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        filtered
    }
}

/// Aggregate numbers for a memory list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Total memories stored
    pub total: usize,

    /// Distinct tags across all memories
    pub unique_tags: usize,

    /// Characters shared across all memory texts
    pub characters: usize,
}

/// Compute stats over a fetched memory list
#[must_use]
pub fn stats(memories: &[Memory]) -> MemoryStats {
    let unique_tags: BTreeSet<&str> = memories
        .iter()
        .flat_map(|m| m.tags.iter().map(String::as_str))
        .collect();

    MemoryStats {
        total: memories.len(),
        unique_tags: unique_tags.len(),
        characters: memories.iter().map(|m| m.text.chars().count()).sum(),
    }
}

/// All distinct tags across a memory list, sorted
#[must_use]
pub fn unique_tags(memories: &[Memory]) -> Vec<String> {
    let tags: BTreeSet<&str> = memories
        .iter()
        .flat_map(|m| m.tags.iter().map(String::as_str))
        .collect();
    tags.into_iter().map(ToString::to_string).collect()
}

/// Check memory text before training
///
/// Fails fast so no request is issued for text that the backend would
/// reject anyway.
///
/// # Errors
///
/// Returns [`Error::Validation`] for empty or too-short text
pub fn validate_memory_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "enter some text or record audio first".to_string(),
        ));
    }

    let count = trimmed.chars().count();
    if count < MIN_MEMORY_CHARS {
        return Err(Error::Validation(format!(
            "memory text needs at least {MIN_MEMORY_CHARS} characters, got {count}"
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, text: &str, summary: &str, tags: &[&str], timestamp: &str) -> Memory {
        Memory {
            id: id.to_string(),
            text: text.to_string(),
            summary: summary.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            timestamp: timestamp.to_string(),
            voice_path_url: None,
        }
    }

    #[test]
    fn memory_appears_when_filtered_by_its_own_tag() {
        let memories = vec![
            memory("1", "summers in the countryside", "childhood summers", &["childhood", "family"], "2024-01-15T10:30:00Z"),
            memory("2", "honesty and compassion", "core values", &["values"], "2024-01-14T15:45:00Z"),
        ];

        for m in &memories {
            for tag in &m.tags {
                let filter = MemoryFilter {
                    search: None,
                    tag: Some(tag.clone()),
                };
                assert!(
                    filter.apply(&memories).iter().any(|found| found.id == m.id),
                    "memory {} missing when filtered by its own tag {tag}",
                    m.id
                );
            }
        }
    }

    #[test]
    fn tag_filter_is_exact_membership() {
        let memories = vec![memory("1", "t", "s", &["family"], "")];
        let filter = MemoryFilter {
            search: None,
            tag: Some("fam".to_string()),
        };
        assert!(filter.apply(&memories).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let m = memory(
            "1",
            "Spending summers at my grandmother's house",
            "Cherished childhood summers",
            &["childhood"],
            "",
        );

        for term in ["GRANDMOTHER", "cherished", "CHILDhood"] {
            let filter = MemoryFilter {
                search: Some(term.to_string()),
                tag: None,
            };
            assert!(filter.matches(&m), "term {term} should match");
        }

        let filter = MemoryFilter {
            search: Some("sailboat".to_string()),
            tag: None,
        };
        assert!(!filter.matches(&m));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let m = memory("1", "t", "s", &[], "");
        assert!(MemoryFilter::default().matches(&m));
    }

    #[test]
    fn apply_sorts_newest_first() {
        let memories = vec![
            memory("old", "t", "s", &[], "2024-01-13T09:20:00Z"),
            memory("new", "t", "s", &[], "2024-01-15T10:30:00Z"),
            memory("mid", "t", "s", &[], "2024-01-14T15:45:00Z"),
        ];

        let ids: Vec<&str> = MemoryFilter::default()
            .apply(&memories)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn stats_counts_totals_and_distinct_tags() {
        let memories = vec![
            memory("1", "abcde", "s", &["family", "values"], ""),
            memory("2", "xyz", "s", &["family"], ""),
        ];

        let s = stats(&memories);
        assert_eq!(s.total, 2);
        assert_eq!(s.unique_tags, 2);
        assert_eq!(s.characters, 8);
    }

    #[test]
    fn validation_rejects_under_minimum() {
        let short = "a".repeat(MIN_MEMORY_CHARS - 1);
        assert!(validate_memory_text(&short).is_err());
        assert!(validate_memory_text("   ").is_err());
    }

    #[test]
    fn validation_accepts_minimum_and_trims() {
        let exact = "a".repeat(MIN_MEMORY_CHARS);
        let padded = format!("  {exact}  ");
        assert_eq!(validate_memory_text(&padded).unwrap(), exact);
    }
}
