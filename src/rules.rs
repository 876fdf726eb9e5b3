//! Keyword rule set: label -> regex, evaluated in file order.
//!
//! The rule file is either properties-style text (`label=pattern` per line)
//! or a JSON array of `{ "label", "pattern" }` objects. Backslashes in the
//! properties form are literal so regex escapes survive unchanged.
//!
//! Patterns use `fancy_regex`, so the lookaround and backreferences found in
//! legacy Java rule files compile.
use crate::error::AssembleError;
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A compiled keyword rule.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub label: String,
    pub regex: Regex,
}

impl KeywordRule {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Immutable, ordered rule set for one batch run.
#[derive(Debug, Clone, Default)]
pub struct KeywordRuleSet {
    rules: Vec<KeywordRule>,
    source: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    label: String,
    pattern: String,
}

impl KeywordRuleSet {
    /// Compile `(label, pattern)` pairs in order. A repeated label replaces
    /// the earlier pattern but keeps the earlier position.
    pub fn from_pairs<I, L, P>(pairs: I) -> Result<Self, AssembleError>
    where
        I: IntoIterator<Item = (L, P)>,
        L: AsRef<str>,
        P: AsRef<str>,
    {
        let mut rules: Vec<KeywordRule> = Vec::new();
        for (label, pattern) in pairs {
            let (label, pattern) = (label.as_ref(), pattern.as_ref());
            if label.trim().is_empty() {
                tracing::warn!(pattern, "skipping keyword rule with an empty label");
                continue;
            }
            let rule = compile_rule(label, pattern)?;
            match rules.iter_mut().find(|existing| existing.label == rule.label) {
                Some(existing) => *existing = rule,
                None => rules.push(rule),
            }
        }
        Ok(KeywordRuleSet {
            rules,
            source: None,
        })
    }

    /// Parse properties-style rule text.
    pub fn from_properties(text: &str) -> Result<Self, AssembleError> {
        KeywordRuleSet::from_pairs(parse_properties(text))
    }

    /// Parse a JSON array of `{ "label", "pattern" }` entries.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AssembleError> {
        let entries: Vec<RuleEntry> = serde_json::from_slice(bytes)
            .map_err(|err| AssembleError::parse("keyword rules JSON", err))?;
        KeywordRuleSet::from_pairs(entries.into_iter().map(|e| (e.label, e.pattern)))
    }

    /// Load a rule file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, AssembleError> {
        let bytes = fs::read(path).map_err(|err| AssembleError::read(path, err))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut set = if is_json {
            KeywordRuleSet::from_json(&bytes)?
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|err| AssembleError::parse(path.display().to_string(), err))?;
            KeywordRuleSet::from_properties(&text)?
        };
        set.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), rules = set.len(), "keyword rules loaded");
        Ok(set)
    }

    /// First rule, in evaluation order, whose pattern matches anywhere in `text`.
    ///
    /// A rule that exceeds the backtracking limit on `text` counts as no match.
    pub fn first_match(&self, text: &str) -> Option<&KeywordRule> {
        self.rules.iter().find(|rule| match rule.regex.is_match(text) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(label = %rule.label, error = %err, "keyword rule match aborted");
                false
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordRule> {
        self.rules.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

// An empty pattern is kept: it matches every page.
fn compile_rule(label: &str, pattern: &str) -> Result<KeywordRule, AssembleError> {
    if pattern.is_empty() {
        tracing::warn!(label, "keyword rule has an empty pattern and matches any text");
    }
    let regex = Regex::new(pattern).map_err(|err| {
        AssembleError::parse("keyword rules", format!("rule {label:?}: {err}"))
    })?;
    Ok(KeywordRule {
        label: label.to_string(),
        regex,
    })
}

/// Split properties-style text into `(key, value)` pairs.
///
/// The key ends at the first `=`, `:` or whitespace; one separator and the
/// whitespace around it are skipped. Comment lines start with `#` or `!`.
fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let key_end = line
            .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
            .unwrap_or(line.len());
        let (key, rest) = line.split_at(key_end);
        let rest = rest.trim_start();
        let value = match rest.strip_prefix(['=', ':']) {
            Some(after) => after.trim_start(),
            None => rest,
        };
        let value = value.strip_suffix('\r').unwrap_or(value);
        pairs.push((key.to_string(), value.to_string()));
    }
    pairs
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
