use crate::container::PageDocument;

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.xhtml");
const NOTICE_TEMPLATE: &str = include_str!("../../templates/notice.xhtml");
const NAVIGATION_TEMPLATE: &str = include_str!("../../templates/navigation.xhtml");

/// Message of the single document inserted when only a cover was extracted.
pub const COVER_ONLY_NOTICE: &str =
    "This e-book only contains the cover extracted from the original archive.";

/// Title of the cover-only notice document.
pub const COVER_ONLY_TITLE: &str = "Contents";

/// Location of the document with the given 1-based index inside the container.
pub fn document_href(index: usize) -> String {
    format!("text/{:04}.xhtml", index)
}

/// Location of the page image with the given 1-based index inside the container.
pub fn image_href(index: usize, extension: &str) -> String {
    format!("images/{:04}.{}", index, extension)
}

/// Escapes the characters that are not allowed verbatim in XHTML text or attributes.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds the per-page XHTML documents.
///
/// Output is a pure function of the inputs: the same index and image path
/// always produce byte-identical markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDocumentBuilder;

impl PageDocumentBuilder {
    /// Builds the document for page `index` (1-based) showing the image stored
    /// at `image_relative_path` (relative to the container root).
    ///
    /// Documents live one directory below the root, so the image is referenced
    /// with a `../` prefix.
    pub fn build(&self, index: usize, image_relative_path: &str) -> PageDocument {
        let title = format!("Page {}", index);
        let markup = PAGE_TEMPLATE
            .replace("%title%", &title)
            .replace("%src%", &escape_xml(&format!("../{}", image_relative_path)))
            .replace("%alt%", &title);
        PageDocument::new(index, document_href(index), title, markup)
    }

    /// Builds the informational document used when the container holds only a cover.
    pub fn cover_only_notice(&self) -> PageDocument {
        let markup = NOTICE_TEMPLATE
            .replace("%title%", COVER_ONLY_TITLE)
            .replace("%message%", &escape_xml(COVER_ONLY_NOTICE));
        PageDocument::new(
            1,
            document_href(1),
            COVER_ONLY_TITLE.to_string(),
            markup,
        )
    }
}

/// Renders the navigation document listing `toc` as `(title, href)` pairs.
///
/// Hrefs are relative to the container root, where the navigation document lives.
pub fn navigation_markup(title: &str, toc: &[(&str, &str)]) -> String {
    let items = toc
        .iter()
        .map(|(entry, href)| {
            format!(
                "      <li><a href=\"{}\">{}</a></li>",
                escape_xml(href),
                escape_xml(entry)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    NAVIGATION_TEMPLATE
        .replace("%title%", &escape_xml(title))
        .replace("%items%", &items)
}
