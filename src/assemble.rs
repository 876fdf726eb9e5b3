//! Batch assembly pipeline: classify, merge, then mark for auto-review.
//!
//! Each phase finishes before the next starts. An invalid config stops the run
//! before any phase, and a classification failure stops it before any merge or
//! review marking happens.
use crate::classify::{Classifier, ClassifySummary};
use crate::config::{validate_config, AssemblerConfig};
use crate::error::AssembleError;
use crate::merge::merge_adjacent;
use crate::model::Batch;
use crate::resolve::PageTextSource;
use crate::review::mark_auto_review;
use crate::rules::KeywordRuleSet;
use serde::Serialize;

/// Outcome counts for one assembled batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub batch_instance_identifier: String,
    pub rule_count: usize,
    pub documents_in: usize,
    pub documents_out: usize,
    pub classification: ClassifySummary,
    pub merged: usize,
    pub auto_reviewed: usize,
}

pub fn assemble(
    batch: &mut Batch,
    rules: &KeywordRuleSet,
    source: &dyn PageTextSource,
    config: &AssemblerConfig,
) -> Result<AssemblyReport, AssembleError> {
    validate_config(config)
        .map_err(|err| AssembleError::parse("assembler config", format!("{err:#}")))?;
    let documents_in = batch.documents.len();
    tracing::info!(
        batch = %batch.context.instance_identifier,
        documents = documents_in,
        rules = rules.len(),
        "assembling batch"
    );

    let classification = Classifier::new(rules, source)
        .with_short_text_max_chars(config.short_text_max_chars)
        .classify_all(&batch.context, &mut batch.documents)?;
    let merged = merge_adjacent(&mut batch.documents, &config.merge_policy());
    let auto_reviewed = mark_auto_review(&mut batch.documents);

    Ok(AssemblyReport {
        batch_instance_identifier: batch.context.instance_identifier.clone(),
        rule_count: rules.len(),
        documents_in,
        documents_out: batch.documents.len(),
        classification,
        merged,
        auto_reviewed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use crate::error::ErrorKind;
    use crate::model::{BatchContext, Document, Extra, Page, PageField, CHECK, HUD_27011, OTHER};
    use crate::resolve::MemoryTextSource;

    fn long_text(body: &str) -> String {
        format!("{body} {}", "filler words for a full page ".repeat(10))
    }

    fn batch(documents: Vec<Document>) -> Batch {
        Batch {
            context: BatchContext {
                local_path: "/batches".to_string(),
                class_identifier: "BC1".to_string(),
                instance_identifier: "BI9".to_string(),
            },
            documents,
            extra: Extra::new(),
        }
    }

    fn doc(id: &str, doc_type: &str, page: &str) -> Document {
        Document::new(id, doc_type, vec![Page::new(page)])
    }

    #[test]
    fn full_pipeline_classifies_merges_and_marks() {
        let rules = KeywordRuleSet::from_properties("HUD_27011=HUD-27011\n").expect("rules");
        let source = MemoryTextSource::new()
            .with("p1", "cover sheet")
            .with("p2", "fax confirmation")
            .with("p3", &long_text("HUD-27011 page one"))
            .with("p4", &long_text("HUD-27011 page two"))
            .with("p5", &long_text("PAY TO THE ORDER OF"))
            .with("p6", "blank");
        let mut checked = doc("d5", "Unknown", "p5");
        checked.pages[0]
            .fields
            .push(PageField::new("MICR", "c123c a021000021a 44c"));
        let mut batch = batch(vec![
            doc("d1", "Unknown", "p1"),
            doc("d2", "Unknown", "p2"),
            doc("d3", "Unknown", "p3"),
            doc("d4", "Unknown", "p4"),
            checked,
            doc("d6", "Unknown", "p6"),
        ]);

        let report = assemble(&mut batch, &rules, &source, &default_config()).expect("assemble");

        let summary: Vec<_> = batch
            .documents
            .iter()
            .map(|d| (d.identifier.as_str(), d.doc_type.as_str(), d.pages.len()))
            .collect();
        assert_eq!(
            summary,
            [
                ("DOC1", OTHER, 2),
                ("DOC2", HUD_27011, 2),
                ("DOC3", CHECK, 1),
                ("DOC4", OTHER, 1),
            ]
        );
        for other in batch.documents.iter().filter(|d| d.doc_type == OTHER) {
            assert_eq!(other.confidence, "100.0");
            assert!(other.reviewed);
        }
        assert!(!batch.documents[1].reviewed);
        assert_eq!(batch.documents[1].confidence, "100.0");

        assert_eq!(report.documents_in, 6);
        assert_eq!(report.documents_out, 4);
        assert_eq!(report.merged, 2);
        assert_eq!(report.auto_reviewed, 2);
        assert_eq!(report.classification.short_text_documents, 3);
        assert_eq!(report.classification.check_matches, 1);
    }

    #[test]
    fn failure_in_classification_skips_later_phases() {
        let rules = KeywordRuleSet::default();
        let mut batch = batch(vec![doc("d1", OTHER, "p1"), doc("d2", OTHER, "p2")]);

        struct Broken;
        impl PageTextSource for Broken {
            fn page_text(
                &self,
                _ctx: &BatchContext,
                page: &Page,
            ) -> Result<Option<String>, AssembleError> {
                Err(AssembleError::ResourceNotFound {
                    what: page.content_ref.clone(),
                    detail: "no such file".to_string(),
                })
            }
        }

        let err = assemble(&mut batch, &rules, &Broken, &default_config()).expect_err("fails");
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.documents[0].identifier, "d1");
        assert!(!batch.documents[0].reviewed);
    }

    #[test]
    fn config_controls_merge_types() {
        let rules = KeywordRuleSet::default();
        let source = MemoryTextSource::new();
        let mut config = default_config();
        config.merge_types = vec![CHECK.to_string()];
        let mut batch = batch(vec![
            doc("a", OTHER, "p1"),
            doc("b", OTHER, "p2"),
            doc("c", CHECK, "p3"),
            doc("d", CHECK, "p4"),
        ]);

        let report = assemble(&mut batch, &rules, &source, &config).expect("assemble");

        assert_eq!(report.merged, 1);
        let types: Vec<_> = batch.documents.iter().map(|d| d.doc_type.as_str()).collect();
        assert_eq!(types, [OTHER, OTHER, CHECK]);
        assert_eq!(report.auto_reviewed, 2);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_phase() {
        let rules = KeywordRuleSet::default();
        let source = MemoryTextSource::new();
        let mut config = default_config();
        config.short_text_max_chars = 0;
        let mut batch = batch(vec![doc("d1", OTHER, "p1"), doc("d2", OTHER, "p2")]);

        let err = assemble(&mut batch, &rules, &source, &config).expect_err("bad config");
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        assert!(err.to_string().contains("short_text_max_chars"));
        assert_eq!(batch.documents.len(), 2);
        assert!(!batch.documents[0].reviewed);

        let mut config = default_config();
        config.merge_types.clear();
        let err = assemble(&mut batch, &rules, &source, &config).expect_err("no merge types");
        assert!(err.to_string().contains("merge_types"));
    }
}
