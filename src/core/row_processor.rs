use crate::core::constant::{
    REGEX_MERGE_CONTINUE, REGEX_MERGE_RESTART, REGEX_ROW_OPEN, XML_ROW_CLOSE, XML_TABLE_CLOSE,
};
use crate::core::utils::suffix_macros;
use crate::public::error::NotFound;
use regex::Regex;
use std::sync::LazyLock;

static ROW_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(REGEX_ROW_OPEN).unwrap());
static MERGE_RESTART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REGEX_MERGE_RESTART).unwrap());
static MERGE_CONTINUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REGEX_MERGE_CONTINUE).unwrap());

/// Byte range of a table row inside a part / 部件中表格行的字节范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowSpan {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Offset of the nearest row-open tag before `offset` / `offset` 之前最近的行开始标签位置
pub(crate) fn find_row_start(xml: &str, offset: usize) -> Option<usize> {
    ROW_OPEN_REGEX
        .find_iter(&xml[..offset])
        .last()
        .map(|m| m.start())
}

/// Offset just past the first `</w:tr>` at or after `offset` / `offset` 之后第一个 `</w:tr>` 的结束位置
pub(crate) fn find_row_end(xml: &str, offset: usize) -> Option<usize> {
    xml[offset..]
        .find(XML_ROW_CLOSE)
        .map(|pos| offset + pos + XML_ROW_CLOSE.len())
}

/// Start of the row following `row_end` within the same table / 同一表格中下一行的开始位置
pub(crate) fn find_next_row_start(xml: &str, row_end: usize) -> Option<usize> {
    let rest = &xml[row_end..];
    let next = ROW_OPEN_REGEX.find(rest)?.start();
    match rest.find(XML_TABLE_CLOSE) {
        Some(table_end) if table_end < next => None,
        _ => Some(row_end + next),
    }
}

/// Extend a row over its vertically merged continuation rows / 将行扩展到其垂直合并的延续行
///
/// Only rows holding a `restart` marker are extended. Each following row is absorbed while it
/// carries a `continue` marker (bare or valued); the first row without one, or the end of the
/// table, stops the probe.
pub(crate) fn extend_row_span(xml: &str, row: RowSpan) -> RowSpan {
    if !MERGE_RESTART_REGEX.is_match(&xml[row.start..row.end]) {
        return row;
    }

    let mut end = row.end;
    while let Some(next_start) = find_next_row_start(xml, end) {
        let Some(next_end) = find_row_end(xml, next_start) else {
            break;
        };
        if !MERGE_CONTINUE_REGEX.is_match(&xml[next_start..next_end]) {
            break;
        }
        end = next_end;
    }

    RowSpan {
        start: row.start,
        end,
    }
}

/// Locate the row (plus merged continuation rows) holding the first occurrence of `search`
/// 定位包含 `search` 首次出现位置的行（含合并延续行）
pub(crate) fn locate_row(xml: &str, search: &str) -> Result<RowSpan, NotFound> {
    let offset = xml
        .find(search)
        .ok_or_else(|| NotFound::Placeholder(search.to_string()))?;
    let start =
        find_row_start(xml, offset).ok_or_else(|| NotFound::RowStart(search.to_string()))?;
    let end = find_row_end(xml, offset).ok_or_else(|| NotFound::RowEnd(search.to_string()))?;

    Ok(extend_row_span(xml, RowSpan { start, end }))
}

/// Replace the row holding `search` with `clones` suffixed copies of itself
/// 将包含 `search` 的行替换为 `clones` 个带后缀的副本
///
/// Copy `i` (1-based) has every `${name}` rewritten to `${name#i}`.
pub(crate) fn clone_row(xml: &str, search: &str, clones: usize) -> Result<String, NotFound> {
    let span = locate_row(xml, search)?;
    let row = &xml[span.start..span.end];
    log::debug!(
        "cloning row {}..{} for {} into {} copies",
        span.start,
        span.end,
        search,
        clones
    );

    let mut result = String::with_capacity(xml.len() + row.len() * clones);
    result.push_str(&xml[..span.start]);
    for index in 1..=clones {
        result.push_str(&suffix_macros(row, index));
    }
    result.push_str(&xml[span.end..]);
    Ok(result)
}
