//! In-memory batch model the engine refines.
//!
//! Only the fields the engine reads or writes are typed; anything else the
//! host attached rides along in `extra` and is written back untouched.
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Type label meaning "no confident classification was found".
pub const OTHER: &str = "Other";
/// Form packet that legitimately spans several adjacent fragments.
pub const HUD_27011: &str = "HUD_27011";
/// Label assigned when a page carries a bank-check MICR line.
pub const CHECK: &str = "Check";
/// Page-level field type holding the MICR line.
pub const MICR_FIELD_TYPE: &str = "MICR";

/// Confidence written when a page is too short to classify.
pub const CONFIDENCE_SHORT_TEXT: &str = "100";
/// Confidence written for keyword, MICR and auto-review decisions.
pub const CONFIDENCE_CERTAIN: &str = "100.0";

/// Token stripped from the local storage root to reach the shared folder.
pub const SYSTEM_FOLDER_TOKEN: &str = "ephesoft-system-folder";
const SCRIPT_CONFIG_DIR: &str = "script-config";

pub type Extra = BTreeMap<String, Value>;

/// Opaque identifiers used only to locate external resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContext {
    pub local_path: String,
    pub class_identifier: String,
    pub instance_identifier: String,
}

impl BatchContext {
    /// Location of the keyword rule file for this batch class.
    ///
    /// The shared root is the local storage root with the first
    /// `ephesoft-system-folder` segment removed.
    pub fn keyword_config_path(&self, file_name: &str) -> PathBuf {
        let shared_root = self.local_path.replacen(SYSTEM_FOLDER_TOKEN, "", 1);
        PathBuf::from(shared_root)
            .join(&self.class_identifier)
            .join(SCRIPT_CONFIG_DIR)
            .join(file_name)
    }

    /// Location of a page's hOCR file inside this batch instance.
    pub fn page_content_path(&self, content_ref: &str) -> PathBuf {
        PathBuf::from(&self.local_path)
            .join(&self.instance_identifier)
            .join(content_ref)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageField {
    /// `None` when the host supplied a field without a type element.
    pub field_type: Option<String>,
    pub value: String,
    pub extra: Extra,
}

impl PageField {
    pub fn new(field_type: &str, value: &str) -> Self {
        PageField {
            field_type: Some(field_type.to_string()),
            value: value.to_string(),
            extra: Extra::new(),
        }
    }

    pub fn is_type(&self, field_type: &str) -> bool {
        self.field_type.as_deref() == Some(field_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub identifier: Option<String>,
    /// Reference to the externally stored OCR content (an hOCR file name).
    pub content_ref: String,
    pub fields: Vec<PageField>,
    pub extra: Extra,
}

impl Page {
    pub fn new(content_ref: &str) -> Self {
        Page {
            identifier: None,
            content_ref: content_ref.to_string(),
            fields: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn with_field(mut self, field: PageField) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub identifier: String,
    pub doc_type: String,
    pub description: String,
    pub confidence: String,
    /// Owned by a downstream consumer; read through, never written.
    pub confidence_threshold: String,
    pub reviewed: bool,
    pub pages: Vec<Page>,
    pub extra: Extra,
}

impl Document {
    pub fn new(identifier: &str, doc_type: &str, pages: Vec<Page>) -> Self {
        Document {
            identifier: identifier.to_string(),
            doc_type: doc_type.to_string(),
            description: doc_type.to_string(),
            confidence: String::new(),
            confidence_threshold: String::new(),
            reviewed: false,
            pages,
            extra: Extra::new(),
        }
    }

    /// Set type, description and confidence together.
    pub fn classify_as(&mut self, label: &str, confidence: &str) {
        self.doc_type = label.to_string();
        self.description = label.to_string();
        self.confidence = confidence.to_string();
    }

    pub fn is_type(&self, doc_type: &str) -> bool {
        self.doc_type == doc_type
    }

    /// Append every page of `other`, in order. `other` is consumed.
    pub fn absorb(&mut self, other: Document) {
        self.pages.extend(other.pages);
    }
}

/// One batch as handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub context: BatchContext,
    pub documents: Vec<Document>,
    pub extra: Extra,
}
