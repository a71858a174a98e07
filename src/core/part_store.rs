use crate::core::constant::{
    DOCUMENT_XML_PATH, FOOTER_PART, HEADER_PART, WORD_PATH_PREFIX, XML_EXTENSION,
};
use crate::core::package::Package;
use crate::core::utils::{collect_macro_names, normalize_macros};
use crate::public::error::DocxError;

/// Archive entry name of a header or footer part, e.g. `word/header3.xml`
/// 页眉或页脚部件的条目名称
#[inline]
pub(crate) fn part_entry_name(kind: &str, index: usize) -> String {
    format!("{}{}{}{}", WORD_PATH_PREFIX, kind, index, XML_EXTENSION)
}

/// In-memory XML text of every editable part / 所有可编辑部件的内存 XML 文本
///
/// Headers and footers are 1-based in their entry names and 0-based in the vectors.
#[derive(Debug, Default)]
pub(crate) struct PartStore {
    main: String,
    headers: Vec<String>,
    footers: Vec<String>,
}

impl PartStore {
    /// Load and normalize headers, footers, then the main part / 加载并规范化页眉、页脚和主文档
    ///
    /// Header and footer indices are contiguous: loading stops at the first missing entry.
    pub(crate) fn load(package: &Package) -> Result<Self, DocxError> {
        let headers = Self::load_indexed(package, HEADER_PART)?;
        let footers = Self::load_indexed(package, FOOTER_PART)?;
        let main = package
            .read_entry_string(DOCUMENT_XML_PATH)?
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_XML_PATH.to_string()))?;

        log::debug!(
            "loaded {} with {} header(s) and {} footer(s)",
            DOCUMENT_XML_PATH,
            headers.len(),
            footers.len()
        );

        Ok(Self {
            main: normalize_macros(&main),
            headers,
            footers,
        })
    }

    fn load_indexed(package: &Package, kind: &str) -> Result<Vec<String>, DocxError> {
        let mut parts = Vec::new();
        let mut index = 1;
        while let Some(xml) = package.read_entry_string(&part_entry_name(kind, index))? {
            parts.push(normalize_macros(&xml));
            index += 1;
        }
        Ok(parts)
    }

    /// Build a store directly from text, parts are normalized like a loaded package
    #[cfg(test)]
    pub(crate) fn from_parts(main: &str, headers: &[&str], footers: &[&str]) -> Self {
        Self {
            main: normalize_macros(main),
            headers: headers.iter().map(|h| normalize_macros(h)).collect(),
            footers: footers.iter().map(|f| normalize_macros(f)).collect(),
        }
    }

    pub(crate) fn main(&self) -> &str {
        &self.main
    }

    pub(crate) fn set_main(&mut self, xml: String) {
        self.main = xml;
    }

    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn footers(&self) -> &[String] {
        &self.footers
    }

    /// Every part in substitution order: headers, main, footers
    /// 按替换顺序遍历所有部件：页眉、主文档、页脚
    pub(crate) fn parts_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.headers
            .iter_mut()
            .chain(std::iter::once(&mut self.main))
            .chain(self.footers.iter_mut())
    }

    /// Distinct macro names of main, headers and footers, in first-seen order
    /// 主文档、页眉、页脚中不重复的宏名称（按首次出现顺序）
    pub(crate) fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_macro_names(&self.main, &mut names);
        for part in self.headers.iter().chain(self.footers.iter()) {
            collect_macro_names(part, &mut names);
        }
        names
    }

    /// Write headers and main back into the package under their canonical names
    pub(crate) fn write_headers_and_main(&self, package: &mut Package) {
        for (i, xml) in self.headers.iter().enumerate() {
            package.write_entry(&part_entry_name(HEADER_PART, i + 1), xml.clone().into());
        }
        package.write_entry(DOCUMENT_XML_PATH, self.main.clone().into());
    }

    pub(crate) fn write_footers(&self, package: &mut Package) {
        for (i, xml) in self.footers.iter().enumerate() {
            package.write_entry(&part_entry_name(FOOTER_PART, i + 1), xml.clone().into());
        }
    }
}
