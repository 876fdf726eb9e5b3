//! Batch JSON exchange with the host.
//!
//! Loading checks that every element the engine relies on is present and
//! reports the first one missing by its path (`documents[2].type`). Keys the
//! engine does not know are kept and written back unchanged.
use crate::error::AssembleError;
use crate::model::{Batch, BatchContext, Document, Extra, Page, PageField};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct BatchWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batch_local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batch_class_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batch_instance_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    documents: Option<Vec<DocumentWire>>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Deserialize, Serialize)]
struct DocumentWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence_threshold: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reviewed: Option<ReviewedWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<PageWire>>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Deserialize, Serialize)]
struct PageWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hocr_file_name: Option<String>,
    #[serde(default)]
    page_level_fields: Vec<FieldWire>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Deserialize, Serialize)]
struct FieldWire {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    field_type: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

/// Hosts encode the reviewed flag either as a boolean or as its string form.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum ReviewedWire {
    Flag(bool),
    Text(String),
}

/// Read and validate a batch file.
pub fn load_batch(path: &Path) -> Result<Batch, AssembleError> {
    let bytes = fs::read(path).map_err(|err| AssembleError::read(path, err))?;
    parse_batch(&bytes)
}

/// Parse and validate batch JSON.
pub fn parse_batch(bytes: &[u8]) -> Result<Batch, AssembleError> {
    let wire: BatchWire =
        serde_json::from_slice(bytes).map_err(|err| AssembleError::parse("batch JSON", err))?;
    batch_from_wire(wire)
}

/// Serialize a batch back to the host format.
pub fn batch_to_json(batch: &Batch) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(batch_to_wire(batch))
}

fn required<T>(value: Option<T>, path: impl FnOnce() -> String) -> Result<T, AssembleError> {
    value.ok_or_else(|| AssembleError::structural(format!("{} is missing", path())))
}

fn batch_from_wire(wire: BatchWire) -> Result<Batch, AssembleError> {
    let context = BatchContext {
        local_path: required(wire.batch_local_path, || "batch_local_path".to_string())?,
        class_identifier: required(wire.batch_class_identifier, || {
            "batch_class_identifier".to_string()
        })?,
        instance_identifier: required(wire.batch_instance_identifier, || {
            "batch_instance_identifier".to_string()
        })?,
    };
    let documents = required(wire.documents, || "documents".to_string())?
        .into_iter()
        .enumerate()
        .map(|(idx, doc)| document_from_wire(doc, idx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Batch {
        context,
        documents,
        extra: wire.extra,
    })
}

fn document_from_wire(wire: DocumentWire, idx: usize) -> Result<Document, AssembleError> {
    let at = |field: &str| format!("documents[{idx}].{field}");
    let reviewed = match wire.reviewed {
        None => false,
        Some(ReviewedWire::Flag(flag)) => flag,
        Some(ReviewedWire::Text(text)) => parse_reviewed(&text).ok_or_else(|| {
            AssembleError::parse(at("reviewed"), format!("{text:?} is not a boolean"))
        })?,
    };
    let pages = required(wire.pages, || at("pages"))?
        .into_iter()
        .enumerate()
        .map(|(page_idx, page)| page_from_wire(page, idx, page_idx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document {
        identifier: required(wire.identifier, || at("identifier"))?,
        doc_type: required(wire.doc_type, || at("type"))?,
        description: wire.description.unwrap_or_default(),
        confidence: wire.confidence.unwrap_or_default(),
        confidence_threshold: wire.confidence_threshold.unwrap_or_default(),
        reviewed,
        pages,
        extra: wire.extra,
    })
}

fn parse_reviewed(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else {
        None
    }
}

fn page_from_wire(wire: PageWire, doc_idx: usize, idx: usize) -> Result<Page, AssembleError> {
    let content_ref = required(wire.hocr_file_name, || {
        format!("documents[{doc_idx}].pages[{idx}].hocr_file_name")
    })?;
    let fields = wire
        .page_level_fields
        .into_iter()
        .map(|field| PageField {
            field_type: field.field_type,
            value: field.value.unwrap_or_default(),
            extra: field.extra,
        })
        .collect();
    Ok(Page {
        identifier: wire.identifier,
        content_ref,
        fields,
        extra: wire.extra,
    })
}

fn batch_to_wire(batch: &Batch) -> BatchWire {
    BatchWire {
        batch_local_path: Some(batch.context.local_path.clone()),
        batch_class_identifier: Some(batch.context.class_identifier.clone()),
        batch_instance_identifier: Some(batch.context.instance_identifier.clone()),
        documents: Some(batch.documents.iter().map(document_to_wire).collect()),
        extra: batch.extra.clone(),
    }
}

fn document_to_wire(document: &Document) -> DocumentWire {
    DocumentWire {
        identifier: Some(document.identifier.clone()),
        doc_type: Some(document.doc_type.clone()),
        description: Some(document.description.clone()),
        confidence: Some(document.confidence.clone()),
        confidence_threshold: Some(document.confidence_threshold.clone()),
        reviewed: Some(ReviewedWire::Flag(document.reviewed)),
        pages: Some(document.pages.iter().map(page_to_wire).collect()),
        extra: document.extra.clone(),
    }
}

fn page_to_wire(page: &Page) -> PageWire {
    PageWire {
        identifier: page.identifier.clone(),
        hocr_file_name: Some(page.content_ref.clone()),
        page_level_fields: page
            .fields
            .iter()
            .map(|field| FieldWire {
                field_type: field.field_type.clone(),
                value: Some(field.value.clone()),
                extra: field.extra.clone(),
            })
            .collect(),
        extra: page.extra.clone(),
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
