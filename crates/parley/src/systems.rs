mod system;

pub use system::System;

/// URI of the catalog resource listing every document id a system serves
pub const DOCUMENTS_URI: &str = "docs://documents";

/// URI of the resource holding one document's text. The id is percent-encoded.
pub fn document_uri(doc_id: &str) -> String {
    format!("{}/{}", DOCUMENTS_URI, urlencoding::encode(doc_id))
}

#[cfg(test)]
pub mod mock;
