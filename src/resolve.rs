//! Page text resolution.
//!
//! The engine never owns OCR output; it asks a `PageTextSource` for each
//! page's text. `None` means the page has no text content at all.
use crate::error::AssembleError;
use crate::model::{BatchContext, Page};
use std::collections::HashMap;
use std::fs;

const HOCR_PAGE: &str = "HocrPage";
const HOCR_CONTENT: &str = "HocrContent";

pub trait PageTextSource {
    fn page_text(&self, ctx: &BatchContext, page: &Page) -> Result<Option<String>, AssembleError>;
}

/// Reads the hOCR XML file stored for each page in the batch instance folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct HocrFileSource;

impl PageTextSource for HocrFileSource {
    fn page_text(&self, ctx: &BatchContext, page: &Page) -> Result<Option<String>, AssembleError> {
        let path = ctx.page_content_path(&page.content_ref);
        let bytes = fs::read(&path).map_err(|err| AssembleError::read(&path, err))?;
        let xml =
            String::from_utf8(bytes).map_err(|err| AssembleError::parse(&page.content_ref, err))?;
        hocr_content(&xml, &page.content_ref)
    }
}

/// Extract `HocrPage/HocrContent` text from an hOCR document.
pub fn hocr_content(xml: &str, label: &str) -> Result<Option<String>, AssembleError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|err| AssembleError::parse(label, err))?;
    let hocr_page = child_element(doc.root_element(), HOCR_PAGE).ok_or_else(|| {
        AssembleError::structural(format!("{label}: {HOCR_PAGE} element is missing"))
    })?;
    Ok(child_element(hocr_page, HOCR_CONTENT).map(direct_text))
}

fn child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    tag: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == tag)
}

// Text and CDATA children only; nested elements are not part of the content.
fn direct_text(node: roxmltree::Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Page text held in memory, keyed by the page content reference.
///
/// Pages whose reference is not present resolve to no text.
#[derive(Debug, Clone, Default)]
pub struct MemoryTextSource {
    texts: HashMap<String, String>,
}

impl MemoryTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content_ref: &str, text: &str) {
        self.texts.insert(content_ref.to_string(), text.to_string());
    }

    pub fn with(mut self, content_ref: &str, text: &str) -> Self {
        self.insert(content_ref, text);
        self
    }
}

impl PageTextSource for MemoryTextSource {
    fn page_text(&self, _ctx: &BatchContext, page: &Page) -> Result<Option<String>, AssembleError> {
        Ok(self.texts.get(&page.content_ref).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PAGE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HocrPages>
  <HocrPage>
    <PageID>PG0</PageID>
    <HocrContent>U.S. Department of Housing &amp; Urban Development</HocrContent>
  </HocrPage>
</HocrPages>"#;

    #[test]
    fn reads_hocr_content_text() {
        let text = hocr_content(PAGE_XML, "PG0.xml").expect("parse hocr");
        assert_eq!(
            text.as_deref(),
            Some("U.S. Department of Housing & Urban Development")
        );
    }

    #[test]
    fn cdata_content_is_included() {
        let xml = "<HocrPages><HocrPage><HocrContent><![CDATA[<b>raw</b> text]]></HocrContent></HocrPage></HocrPages>";
        let text = hocr_content(xml, "cdata.xml").expect("parse hocr");
        assert_eq!(text.as_deref(), Some("<b>raw</b> text"));
    }

    #[test]
    fn missing_content_is_absent_and_empty_content_is_empty() {
        let absent = "<HocrPages><HocrPage><PageID>PG1</PageID></HocrPage></HocrPages>";
        assert_eq!(hocr_content(absent, "absent.xml").expect("parse"), None);

        let empty = "<HocrPages><HocrPage><HocrContent/></HocrPage></HocrPages>";
        assert_eq!(
            hocr_content(empty, "empty.xml").expect("parse").as_deref(),
            Some("")
        );
    }

    #[test]
    fn missing_hocr_page_is_structural() {
        let err = hocr_content("<HocrPages/>", "bare.xml").expect_err("no HocrPage");
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn malformed_xml_is_parse_failure() {
        let err = hocr_content("<HocrPages><HocrPage>", "broken.xml").expect_err("bad xml");
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        assert!(err.to_string().contains("broken.xml"));
    }

    #[test]
    fn file_source_resolves_under_instance_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let instance = dir.path().join("BI7");
        std::fs::create_dir_all(&instance).expect("create instance dir");
        std::fs::write(instance.join("BI7_0_HOCR.xml"), PAGE_XML).expect("write page");
        let ctx = BatchContext {
            local_path: dir.path().display().to_string(),
            class_identifier: "BC1".to_string(),
            instance_identifier: "BI7".to_string(),
        };

        let text = HocrFileSource
            .page_text(&ctx, &Page::new("BI7_0_HOCR.xml"))
            .expect("resolve page");
        assert!(text.is_some_and(|t| t.contains("Urban Development")));

        let err = HocrFileSource
            .page_text(&ctx, &Page::new("missing.xml"))
            .expect_err("missing page");
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    }

    #[test]
    fn non_utf8_page_is_parse_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let instance = dir.path().join("BI1");
        std::fs::create_dir_all(&instance).expect("create instance dir");
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><HocrPages><HocrPage><HocrContent>Caf".to_vec();
        xml.push(0xE9);
        xml.extend_from_slice(b"</HocrContent></HocrPage></HocrPages>");
        std::fs::write(instance.join("p.xml"), xml).expect("write page");
        let ctx = BatchContext {
            local_path: dir.path().display().to_string(),
            class_identifier: "BC1".to_string(),
            instance_identifier: "BI1".to_string(),
        };

        let err = HocrFileSource
            .page_text(&ctx, &Page::new("p.xml"))
            .expect_err("latin-1 page");
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        assert!(err.to_string().contains("p.xml"));
    }
}
