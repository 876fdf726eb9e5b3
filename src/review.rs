//! Auto-review marking for unclassified documents.
//!
//! `Other` documents skip manual review: they get full confidence and the
//! reviewed flag. The confidence threshold is left for downstream consumers.
use crate::model::{Document, CONFIDENCE_CERTAIN, OTHER};

/// Flag every `Other` document as reviewed; returns how many were flagged.
pub fn mark_auto_review(documents: &mut [Document]) -> usize {
    let mut marked = 0;
    for document in documents.iter_mut().filter(|d| d.is_type(OTHER)) {
        document.confidence = CONFIDENCE_CERTAIN.to_string();
        document.reviewed = true;
        marked += 1;
    }
    tracing::info!(marked, "auto-review marking complete");
    marked
}
