use crate::core::constant::{
    CLONE_SUFFIX_SEPARATOR, ERR_INVALID_JPG_MARKER, ERR_INVALID_PNG_IHDR, ERR_NO_SOF_MARKER,
    ERR_SLICE_TOO_SHORT, ERR_UNKNOWN_FORMAT, GIF_SIGNATURE, JPEG_FILL_BYTE, JPEG_INITIAL_OFFSET,
    JPEG_MARKER_DAC, JPEG_MARKER_DHT, JPEG_MARKER_JPG, JPEG_MARKER_RST_START, JPEG_MARKER_SOI,
    JPEG_MARKER_TEM, JPEG_MIN_SEGMENT_SIZE, JPEG_SIGNATURE, JPEG_SOF_MARKER_END,
    JPEG_SOF_MARKER_START, MACRO_CLOSE, MACRO_OPEN, MIN_IMAGE_DATA_LEN, PNG_IHDR_MARKER,
    PNG_SIGNATURE, REGEX_BROKEN_MACRO, REGEX_MACRO, REGEX_XML_TAG,
};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

// Regexes compiled once / 正则表达式 - 仅编译一次
pub(crate) static BROKEN_MACRO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REGEX_BROKEN_MACRO).unwrap());
pub(crate) static XML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REGEX_XML_TAG).unwrap());
pub(crate) static MACRO_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(REGEX_MACRO).unwrap());

/// Repair macros fragmented by run markup / 修复被 run 标记拆分的宏
///
/// Word may insert `</w:t></w:r><w:r><w:t>` (spell check, revision marks, formatting) between
/// `${` and `}`. Every tag inside a single occurrence is stripped so that `${na<x/>me}` reads
/// back as `${name}`. Text between `$` and `{` is never touched, only markup.
/// Word 可能在 `${` 与 `}` 之间插入标记，这里会去掉单个宏内部的所有标签。
pub(crate) fn normalize_macros(xml: &str) -> String {
    BROKEN_MACRO_REGEX
        .replace_all(xml, |caps: &Captures| strip_tags(&caps[0]).into_owned())
        .into_owned()
}

/// Remove every markup tag from the text / 移除文本中的所有标记标签
#[inline]
pub(crate) fn strip_tags(xml: &str) -> Cow<'_, str> {
    XML_TAG_REGEX.replace_all(xml, "")
}

/// Wrap a bare name as `${name}` / 将裸名称包装为 `${name}`
///
/// Already wrapped macros are returned unchanged / 已包装的宏原样返回
#[inline]
pub(crate) fn ensure_macro(search: &str) -> Cow<'_, str> {
    if search.starts_with(MACRO_OPEN) && search.ends_with(MACRO_CLOSE) {
        Cow::Borrowed(search)
    } else {
        let mut wrapped = String::with_capacity(search.len() + 3);
        wrapped.push_str(MACRO_OPEN);
        wrapped.push_str(search);
        wrapped.push_str(MACRO_CLOSE);
        Cow::Owned(wrapped)
    }
}

/// Bare macro name, `${name}` and `name` both give `name` / 裸宏名称
#[inline]
pub(crate) fn macro_name(search: &str) -> &str {
    search
        .strip_prefix(MACRO_OPEN)
        .and_then(|name| name.strip_suffix(MACRO_CLOSE))
        .unwrap_or(search)
}

/// Append `#index` to every macro name in the XML / 为 XML 中的每个宏名称追加 `#index`
pub(crate) fn suffix_macros(xml: &str, index: usize) -> String {
    MACRO_REGEX
        .replace_all(xml, |caps: &Captures| {
            format!(
                "{}{}{}{}{}",
                MACRO_OPEN, &caps[1], CLONE_SUFFIX_SEPARATOR, index, MACRO_CLOSE
            )
        })
        .into_owned()
}

/// Collect macro names in order of appearance, skipping names already in `names`
/// 按出现顺序收集宏名称，跳过已存在的名称
pub(crate) fn collect_macro_names(xml: &str, names: &mut Vec<String>) {
    for cap in MACRO_REGEX.captures_iter(xml) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
}

/// Numeric clone suffix of a macro: `${photo#3}` gives 3, no suffix gives 0
/// 宏的数字克隆后缀
///
/// Only the leading digits after the first `#` count, anything else parses as 0.
pub(crate) fn clone_suffix_number(search: &str) -> u32 {
    search
        .split_once(CLONE_SUFFIX_SEPARATOR)
        .map(|(_, tail)| {
            let digits = tail
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map_or(tail, |(end, _)| &tail[..end]);
            digits.parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0)
}

/// Decode replacement bytes as text / 将替换字节解码为文本
///
/// Valid UTF-8 is borrowed as is, anything else is read as Latin-1 so that every part stays
/// valid UTF-8. / 合法 UTF-8 直接借用，否则按 Latin-1 解码。
pub(crate) fn ensure_utf8(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Extract image dimensions from PNG, JPEG or GIF bytes / 从 PNG、JPEG 或 GIF 字节中提取图片尺寸
///
/// # Returns / 返回
/// * `Ok((width, height))` - Image dimensions in pixels / 图片尺寸（像素）
/// * `Err(msg)` - Error message if format is unsupported / 如果格式不支持则返回错误消息
pub(crate) fn get_image_dimensions(bytes: &[u8]) -> Result<(u32, u32), &'static str> {
    // Minimum size check / 最小尺寸检查
    if bytes.len() < MIN_IMAGE_DATA_LEN {
        return Err(ERR_SLICE_TOO_SHORT);
    }

    if bytes[..4] == PNG_SIGNATURE {
        // PNG: IHDR is always the first chunk / PNG：IHDR 总是第一个块
        if bytes[12..16] == PNG_IHDR_MARKER {
            let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
            let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
            return Ok((width, height));
        }
        return Err(ERR_INVALID_PNG_IHDR);
    }

    if bytes[..4] == GIF_SIGNATURE {
        // GIF: logical screen size, little-endian / GIF：逻辑屏幕尺寸，小端序
        let width = u16::from_le_bytes([bytes[6], bytes[7]]) as u32;
        let height = u16::from_le_bytes([bytes[8], bytes[9]]) as u32;
        return Ok((width, height));
    }

    if bytes[..2] == JPEG_SIGNATURE {
        // JPEG: Scan for SOF marker with bounds checking / JPEG：带边界检查地扫描 SOF 标记
        let mut offset = JPEG_INITIAL_OFFSET;
        let len = bytes.len();

        while offset + JPEG_MIN_SEGMENT_SIZE < len {
            if bytes[offset] != JPEG_FILL_BYTE {
                return Err(ERR_INVALID_JPG_MARKER);
            }

            let marker = bytes[offset + 1];
            // Padding before a marker / 标记前的填充
            if marker == JPEG_FILL_BYTE {
                offset += 1;
                continue;
            }
            // RSTn, SOI and TEM carry no length / RSTn、SOI 和 TEM 没有长度字段
            if marker == JPEG_MARKER_TEM
                || (JPEG_MARKER_RST_START..=JPEG_MARKER_SOI).contains(&marker)
            {
                offset += 2;
                continue;
            }
            let segment_len = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;

            if (JPEG_SOF_MARKER_START..=JPEG_SOF_MARKER_END).contains(&marker)
                && marker != JPEG_MARKER_DHT
                && marker != JPEG_MARKER_JPG
                && marker != JPEG_MARKER_DAC
            {
                let height = u16::from_be_bytes([bytes[offset + 5], bytes[offset + 6]]) as u32;
                let width = u16::from_be_bytes([bytes[offset + 7], bytes[offset + 8]]) as u32;
                return Ok((width, height));
            }

            offset += segment_len + 2;
        }
        return Err(ERR_NO_SOF_MARKER);
    }

    Err(ERR_UNKNOWN_FORMAT)
}
