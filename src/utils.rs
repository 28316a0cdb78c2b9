//! Helpers to generate small PDF documents and to inspect merged ones, used by the tests
//! and by the `generate-test-pdf` tool.

use anyhow::{Result, anyhow};
use lopdf::{
    Document, Object, ObjectId, Stream,
    content::{Content, Operation},
    dictionary,
};
use std::path::Path;

/// Get a PDF file with minimal features. Each page shows the document name and
/// `Page <n> of <total>`, followed by a line of random text.
///
/// The `MediaBox` and `Resources` of the pages are inherited from the pages root, so a
/// merge that loses the page tree of the document produces pages without a font.
pub fn get_basic_pdf_doc(doc_name: &str, num_pages: u8) -> Result<Document> {
    if doc_name.contains('/') {
        return Err(anyhow!(
            "The document name provided contains a '/', not allowed!"
        ));
    }

    let mut doc = Document::with_version("1.7");

    let pages_root_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let pages_ids: Vec<_> = (1..=num_pages)
        .map(|page_number| {
            append_random_page_to_doc(page_number, num_pages, doc_name, &pages_root_id, &mut doc)
        })
        .collect::<Result<_>>()?;

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => pages_ids.iter().map(|&page_id| page_id.into()).collect::<Vec<Object>>(),
        "Count" => Object::Integer(num_pages.into()),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };

    doc.objects.insert(pages_root_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_root_id,
    });

    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Write a basic document of `num_pages` pages at `pdf_path`, named after its file name.
pub fn write_basic_pdf(pdf_path: impl AsRef<Path>, num_pages: u8) -> Result<()> {
    let pdf_path = pdf_path.as_ref();

    let doc_name = pdf_path
        .file_name()
        .ok_or(anyhow!(
            "The path '{}' does not present a filename",
            pdf_path.display()
        ))?
        .to_string_lossy()
        .to_string();

    let mut doc = get_basic_pdf_doc(&doc_name, num_pages)?;
    doc.save(pdf_path)?;

    Ok(())
}

fn append_random_page_to_doc(
    page_number: u8,
    total_num_pages: u8,
    doc_name: &str,
    pages_id: &ObjectId,
    doc: &mut Document,
) -> Result<ObjectId> {
    let page_title = format!("Page {page_number} of {total_num_pages}");
    let random_text = craft_random_text_of_len(20);

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![50.into(), 600.into()]),
            Operation::new("TL", vec![50.into()]),
            Operation::new("Tf", vec!["F1".into(), 46.into()]),
            Operation::new("Tj", vec![Object::string_literal(doc_name)]),
            Operation::new("Tf", vec!["F1".into(), 36.into()]),
            Operation::new("'", vec![Object::string_literal(page_title)]),
            Operation::new("Tf", vec!["F1".into(), 20.into()]),
            Operation::new("'", vec![Object::string_literal(random_text)]),
            Operation::new("ET", vec![]),
        ],
    };

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => *pages_id,
        "Contents" => content_id,
    });

    Ok(page_id)
}

pub fn craft_random_text_of_len(char_length: usize) -> String {
    use rand::distr::{Alphanumeric, SampleString};
    Alphanumeric.sample_string(&mut rand::rng(), char_length)
}

/// Read back the `(document name, page title)` stamped on every page of `doc` by
/// [`get_basic_pdf_doc`], in page order.
pub fn get_page_stamps(doc: &Document) -> Result<Vec<(String, String)>> {
    doc.get_pages()
        .values()
        .map(|&page_id| -> Result<(String, String)> {
            let content = Content::decode(&doc.get_page_content(page_id)?)?;

            let mut texts = content
                .operations
                .iter()
                .filter(|operation| operation.operator == "Tj" || operation.operator == "'")
                .filter_map(|operation| operation.operands.first())
                .map(|operand| -> Result<String> {
                    Ok(String::from_utf8(operand.as_str()?.to_vec())?)
                });

            let doc_name: Result<String> = texts
                .next()
                .ok_or(anyhow!("The page {page_id:?} has no document name"))?;
            let page_title: Result<String> = texts
                .next()
                .ok_or(anyhow!("The page {page_id:?} has no page title"))?;

            Ok((doc_name?, page_title?))
        })
        .collect()
}

/// Titles of the top-level entries of the document outline (bookmarks), in order.
/// A document without outline has no titles.
pub fn get_outline_titles(doc: &Document) -> Result<Vec<String>> {
    let outlines_id = match doc.catalog()?.get(b"Outlines") {
        Ok(outlines) => outlines.as_reference()?,
        Err(_no_outline) => return Ok(Vec::new()),
    };

    let mut titles = Vec::new();
    let mut next_item = doc
        .get_dictionary(outlines_id)?
        .get(b"First")
        .and_then(Object::as_reference)
        .ok();

    while let Some(item_id) = next_item {
        if titles.len() > doc.objects.len() {
            return Err(anyhow!("The outline of the document loops on itself"));
        }

        let item = doc.get_dictionary(item_id)?;
        titles.push(decode_text_string(item.get(b"Title")?.as_str()?)?);
        next_item = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    Ok(titles)
}

/// PDF text strings are either UTF-16BE with a byte order mark or single-byte text.
fn decode_text_string(bytes: &[u8]) -> Result<String> {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16_bytes) => {
            let units: Vec<u16> = utf16_bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Ok(String::from_utf16(&units)?)
        }
        None => Ok(String::from_utf8_lossy(bytes).to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn get_doc_10_pages() -> Result<()> {
        let document = get_basic_pdf_doc("doc_name", 10)?;
        let len = document.get_pages().len();

        assert_eq!(len, 10);

        Ok(())
    }

    #[test]
    fn stamps_follow_page_order() -> Result<()> {
        let document = get_basic_pdf_doc("chapter1.pdf", 3)?;

        let stamps = get_page_stamps(&document)?;

        assert_eq!(
            stamps,
            vec![
                ("chapter1.pdf".to_string(), "Page 1 of 3".to_string()),
                ("chapter1.pdf".to_string(), "Page 2 of 3".to_string()),
                ("chapter1.pdf".to_string(), "Page 3 of 3".to_string()),
            ]
        );

        Ok(())
    }

    #[test]
    fn text_strings_decode_from_both_encodings() -> Result<()> {
        assert_eq!(decode_text_string(b"a10.pdf")?, "a10.pdf");
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, 0x61, 0x00, 0x31])?,
            "a1"
        );
        Ok(())
    }

    #[test]
    fn doc_without_outline_has_no_titles() -> Result<()> {
        let document = get_basic_pdf_doc("plain.pdf", 2)?;

        assert!(get_outline_titles(&document)?.is_empty());

        Ok(())
    }

    #[test]
    fn doc_name_with_slash_is_rejected() {
        assert!(get_basic_pdf_doc("nested/doc", 1).is_err());
    }
}
