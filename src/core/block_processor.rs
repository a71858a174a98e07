use crate::core::constant::{MACRO_BLOCK_CLOSE_PREFIX, REGEX_PARAGRAPH_OPEN, XML_PARAGRAPH_CLOSE};
use crate::core::utils::{ensure_macro, macro_name, strip_tags};
use regex::Regex;
use std::sync::LazyLock;

static PARAGRAPH_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REGEX_PARAGRAPH_OPEN).unwrap());

/// Offsets of a block delimited by marker paragraphs / 由标记段落界定的块的偏移量
///
/// `start..body_start` is the open marker paragraph, `body_start..body_end` the body and
/// `body_end..end` the close marker paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockSpan {
    pub(crate) start: usize,
    pub(crate) body_start: usize,
    pub(crate) body_end: usize,
    pub(crate) end: usize,
}

impl BlockSpan {
    pub(crate) fn body<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.body_start..self.body_end]
    }
}

/// Find the paragraph at or after `from` whose whole text is `marker`
/// 查找 `from` 之后全部文本恰好为 `marker` 的段落
///
/// Returns the paragraph's `(start, end)`, `end` being just past `</w:p>`.
pub(crate) fn find_marker_paragraph(
    xml: &str,
    marker: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let mut search_from = from;
    loop {
        let pos = search_from + xml[search_from..].find(marker)?;
        search_from = pos + marker.len();

        let Some(start) = PARAGRAPH_OPEN_REGEX
            .find_iter(&xml[..pos])
            .last()
            .map(|m| m.start())
        else {
            continue;
        };
        let Some(close) = xml[search_from..].find(XML_PARAGRAPH_CLOSE) else {
            return None;
        };
        let end = search_from + close + XML_PARAGRAPH_CLOSE.len();

        // Paragraph must start inside the search window and still be open at the marker
        if start < from || xml[start..pos].contains(XML_PARAGRAPH_CLOSE) {
            continue;
        }
        if strip_tags(&xml[start..end]).trim() == marker {
            return Some((start, end));
        }
    }
}

/// Locate block `name` in the part / 在部件中定位块 `name`
///
/// The first open marker paragraph `${name}` is paired with the first close marker paragraph
/// `${/name}` after it.
pub(crate) fn find_block(xml: &str, name: &str) -> Option<BlockSpan> {
    let open_marker = ensure_macro(name);
    let close_name = format!("{}{}", MACRO_BLOCK_CLOSE_PREFIX, macro_name(name));
    let close_marker = ensure_macro(&close_name);

    let (start, body_start) = find_marker_paragraph(xml, &open_marker, 0)?;
    let (body_end, end) = find_marker_paragraph(xml, &close_marker, body_start)?;

    Some(BlockSpan {
        start,
        body_start,
        body_end,
        end,
    })
}

/// Replace the whole block span, markers included / 替换整个块（包括标记）
pub(crate) fn replace_span(xml: &str, span: BlockSpan, replacement: &str) -> String {
    let mut result = String::with_capacity(xml.len() - (span.end - span.start) + replacement.len());
    result.push_str(&xml[..span.start]);
    result.push_str(replacement);
    result.push_str(&xml[span.end..]);
    result
}
