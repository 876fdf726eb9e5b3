//! Adjacent-document merging and identifier renumbering.
use crate::model::{Document, HUD_27011, OTHER};

/// Prefix for renumbered document identifiers (`DOC1`, `DOC2`, ...).
pub const DOC_IDENTIFIER_PREFIX: &str = "DOC";

/// Which document types collapse when they sit next to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    types: Vec<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        MergePolicy::new([OTHER, HUD_27011])
    }
}

impl MergePolicy {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MergePolicy {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Both documents share a type and that type is mergeable.
    pub fn eligible(&self, first: &Document, second: &Document) -> bool {
        first.doc_type == second.doc_type && self.types.iter().any(|t| *t == first.doc_type)
    }
}

/// Merge eligible neighbours in one left-to-right pass, then renumber.
///
/// After a merge the cursor stays put so the extended document is compared
/// against its new neighbour; runs of any length collapse into one document.
/// Returns the number of documents absorbed.
pub fn merge_adjacent(documents: &mut Vec<Document>, policy: &MergePolicy) -> usize {
    let mut absorbed = 0;
    let mut index = 0;
    while index + 1 < documents.len() {
        if !policy.eligible(&documents[index], &documents[index + 1]) {
            index += 1;
            continue;
        }
        let next = documents.remove(index + 1);
        tracing::debug!(
            into = %documents[index].identifier,
            from = %next.identifier,
            doc_type = %next.doc_type,
            pages = next.pages.len(),
            "merging adjacent documents"
        );
        documents[index].absorb(next);
        absorbed += 1;
    }
    renumber(documents);
    tracing::info!(absorbed, documents = documents.len(), "document merge complete");
    absorbed
}

/// Reassign identifiers as `DOC<n>`, 1-based in list order.
pub fn renumber(documents: &mut [Document]) {
    for (index, document) in documents.iter_mut().enumerate() {
        document.identifier = format!("{DOC_IDENTIFIER_PREFIX}{}", index + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, CHECK};

    fn doc(id: &str, doc_type: &str, pages: &[&str]) -> Document {
        Document::new(id, doc_type, pages.iter().copied().map(Page::new).collect())
    }

    fn page_refs(document: &Document) -> Vec<&str> {
        document
            .pages
            .iter()
            .map(|page| page.content_ref.as_str())
            .collect()
    }

    fn types(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.doc_type.as_str()).collect()
    }

    #[test]
    fn runs_of_other_and_form_packets_collapse() {
        let mut docs = vec![
            doc("DOC1", OTHER, &["a"]),
            doc("DOC2", OTHER, &["b", "c"]),
            doc("DOC3", OTHER, &["d"]),
            doc("DOC4", HUD_27011, &["e"]),
            doc("DOC5", HUD_27011, &["f"]),
        ];

        let absorbed = merge_adjacent(&mut docs, &MergePolicy::default());

        assert_eq!(absorbed, 3);
        assert_eq!(types(&docs), [OTHER, HUD_27011]);
        assert_eq!(page_refs(&docs[0]), ["a", "b", "c", "d"]);
        assert_eq!(page_refs(&docs[1]), ["e", "f"]);
        assert_eq!(docs[0].identifier, "DOC1");
        assert_eq!(docs[1].identifier, "DOC2");
    }

    #[test]
    fn non_adjacent_documents_stay_apart() {
        let mut docs = vec![
            doc("DOC1", OTHER, &["a"]),
            doc("DOC2", CHECK, &["b"]),
            doc("DOC3", OTHER, &["c"]),
        ];

        let absorbed = merge_adjacent(&mut docs, &MergePolicy::default());

        assert_eq!(absorbed, 0);
        assert_eq!(types(&docs), [OTHER, CHECK, OTHER]);
    }

    #[test]
    fn differing_mergeable_types_do_not_merge() {
        let mut docs = vec![
            doc("DOC1", OTHER, &["a"]),
            doc("DOC2", HUD_27011, &["b"]),
            doc("DOC3", OTHER, &["c"]),
        ];
        merge_adjacent(&mut docs, &MergePolicy::default());
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn other_types_never_merge() {
        let mut docs = vec![
            doc("DOC1", CHECK, &["a"]),
            doc("DOC2", CHECK, &["b"]),
            doc("DOC3", "Deed", &["c"]),
            doc("DOC4", "Deed", &["d"]),
        ];
        merge_adjacent(&mut docs, &MergePolicy::default());
        assert_eq!(docs.len(), 4);
    }

    #[test]
    fn merged_document_keeps_predecessor_metadata() {
        let mut first = doc("DOC1", OTHER, &["a"]);
        first.confidence = "100".to_string();
        let mut second = doc("DOC2", OTHER, &["b"]);
        second.confidence = "12".to_string();
        second.reviewed = true;
        let mut docs = vec![first, second];

        merge_adjacent(&mut docs, &MergePolicy::default());

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].confidence, "100");
        assert!(!docs[0].reviewed);
    }

    #[test]
    fn renumbering_closes_gaps() {
        let mut docs = vec![
            doc("DOC7", "Deed", &["a"]),
            doc("X", OTHER, &["b"]),
            doc("DOC2", OTHER, &["c"]),
            doc("", CHECK, &["d"]),
        ];
        merge_adjacent(&mut docs, &MergePolicy::default());
        let ids: Vec<_> = docs.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, ["DOC1", "DOC2", "DOC3"]);
    }

    #[test]
    fn custom_policy_and_trivial_lists() {
        let policy = MergePolicy::new(["Deed"]);
        let mut docs = vec![doc("a", "Deed", &["1"]), doc("b", "Deed", &["2"])];
        assert_eq!(merge_adjacent(&mut docs, &policy), 1);
        assert_eq!(docs[0].identifier, "DOC1");

        let mut empty: Vec<Document> = Vec::new();
        assert_eq!(merge_adjacent(&mut empty, &policy), 0);

        let mut single = vec![doc("only", OTHER, &["1"])];
        assert_eq!(merge_adjacent(&mut single, &MergePolicy::default()), 0);
        assert_eq!(single[0].identifier, "DOC1");
    }
}
