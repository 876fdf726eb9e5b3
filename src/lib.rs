//! Post-OCR document assembly.
//!
//! Takes a batch of scanned pages already grouped into provisional documents
//! and refines it in three phases: keyword/MICR reclassification, merging of
//! adjacent unclassified or form-packet fragments, and auto-review marking of
//! the remaining `Other` documents.
pub mod assemble;
pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod merge;
pub mod micr;
pub mod model;
pub mod output;
pub mod resolve;
pub mod review;
pub mod rules;

pub use assemble::{assemble, AssemblyReport};
pub use error::{AssembleError, ErrorKind};
pub use model::{Batch, BatchContext, Document, Page, PageField};
pub use resolve::{HocrFileSource, MemoryTextSource, PageTextSource};
pub use rules::KeywordRuleSet;
