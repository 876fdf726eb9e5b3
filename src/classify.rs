//! Keyword and MICR reclassification of documents.
//!
//! Pages are inspected in order. A short page marks the whole document as
//! `Other` and ends the scan for that document. Otherwise the first matching
//! keyword rule labels the document, and a MICR field on the same page then
//! relabels it `Check`. The scan continues on later pages, so a later match
//! overwrites an earlier one.
use crate::error::AssembleError;
use crate::micr;
use crate::model::{
    BatchContext, Document, CHECK, CONFIDENCE_CERTAIN, CONFIDENCE_SHORT_TEXT, MICR_FIELD_TYPE,
    OTHER,
};
use crate::resolve::PageTextSource;
use crate::rules::KeywordRuleSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// Default upper bound (inclusive) on characters for a page to count as short.
pub const SHORT_TEXT_MAX_CHARS: usize = 200;

/// Counts of classification decisions made over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifySummary {
    pub documents: usize,
    pub pages_scanned: usize,
    pub pages_without_text: usize,
    pub short_text_documents: usize,
    pub keyword_matches: usize,
    pub check_matches: usize,
    pub keyword_labels: BTreeMap<String, usize>,
}

pub struct Classifier<'a> {
    rules: &'a KeywordRuleSet,
    source: &'a dyn PageTextSource,
    short_text_max_chars: usize,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a KeywordRuleSet, source: &'a dyn PageTextSource) -> Self {
        Classifier {
            rules,
            source,
            short_text_max_chars: SHORT_TEXT_MAX_CHARS,
        }
    }

    pub fn with_short_text_max_chars(mut self, max_chars: usize) -> Self {
        self.short_text_max_chars = max_chars;
        self
    }

    /// Classify every document in list order.
    pub fn classify_all(
        &self,
        ctx: &BatchContext,
        documents: &mut [Document],
    ) -> Result<ClassifySummary, AssembleError> {
        let mut summary = ClassifySummary::default();
        for document in documents.iter_mut() {
            self.classify_document(ctx, document, &mut summary)?;
            summary.documents += 1;
        }
        tracing::info!(
            documents = summary.documents,
            short_text = summary.short_text_documents,
            keyword_matches = summary.keyword_matches,
            check_matches = summary.check_matches,
            "keyword classification complete"
        );
        Ok(summary)
    }

    fn classify_document(
        &self,
        ctx: &BatchContext,
        document: &mut Document,
        summary: &mut ClassifySummary,
    ) -> Result<(), AssembleError> {
        for page_index in 0..document.pages.len() {
            summary.pages_scanned += 1;
            let page = &document.pages[page_index];
            let Some(text) = self.source.page_text(ctx, page)? else {
                summary.pages_without_text += 1;
                continue;
            };

            if text.chars().count() <= self.short_text_max_chars {
                tracing::debug!(
                    document = %document.identifier,
                    page = %page.content_ref,
                    "short page text, document marked unclassified"
                );
                document.classify_as(OTHER, CONFIDENCE_SHORT_TEXT);
                summary.short_text_documents += 1;
                break;
            }

            let keyword = self.rules.first_match(&text).map(|rule| rule.label.clone());
            let check = page
                .fields
                .iter()
                .filter(|field| field.is_type(MICR_FIELD_TYPE) && !field.value.is_empty())
                .find(|field| micr::is_micr(&field.value))
                .map(|field| field.value.clone());

            if let Some(label) = keyword {
                tracing::debug!(document = %document.identifier, label = %label, "keyword match");
                document.classify_as(&label, CONFIDENCE_CERTAIN);
                summary.keyword_matches += 1;
                *summary.keyword_labels.entry(label).or_default() += 1;
            }
            if let Some(value) = check {
                tracing::debug!(document = %document.identifier, micr = %value, "MICR match");
                document.classify_as(CHECK, CONFIDENCE_CERTAIN);
                summary.check_matches += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
