use crate::core::constant::{
    IMAGE_REL_ID_BASE, MEDIA_TARGET_PREFIX, REL_ID_PREFIX, REL_TYPE_IMAGE, REL_TYPE_PREFIX,
    REL_XML_BASE_CAPACITY, WORD_PATH_PREFIX, XML_DECLARATION, XML_EXTENSION, XMLNS_RELATIONSHIPS,
};
use crate::core::package::Package;
use crate::core::utils::clone_suffix_number;
use crate::public::error::DocxError;
use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use std::borrow::Cow;

/// Archive entry name of the relationships of a word part, e.g. `word/_rels/document.xml.rels`
/// word 部件关系文件的条目名称
#[inline]
pub(crate) fn rels_entry_name(part: &str) -> String {
    format!("{}_rels/{}{}.rels", WORD_PATH_PREFIX, part, XML_EXTENSION)
}

/// Single relationship / 单个关系
///
/// Values are kept in their escaped wire form. / 值保持转义后的原始形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationshipEntry {
    // Type suffix (`image`, `styles`, ...) or full URI outside the officeDocument namespace
    pub(crate) rel_type: String,
    pub(crate) target: String,
    // Target without a trailing `.xml` / 去掉 `.xml` 后缀的目标
    pub(crate) doc_part: String,
    pub(crate) target_mode: Option<String>,
}

impl RelationshipEntry {
    /// Image entry for a media file / 媒体文件的图片关系
    pub(crate) fn image(file_name: &str) -> Self {
        let target = format!("{}{}", MEDIA_TARGET_PREFIX, escape(file_name));
        Self {
            rel_type: REL_TYPE_IMAGE.to_string(),
            doc_part: target.clone(),
            target,
            target_mode: None,
        }
    }

    fn from_wire(rel_type: &str, target: String, target_mode: Option<String>) -> Self {
        let rel_type = rel_type
            .strip_prefix(REL_TYPE_PREFIX)
            .unwrap_or(rel_type)
            .to_string();
        let doc_part = target
            .strip_suffix(XML_EXTENSION)
            .unwrap_or(&target)
            .to_string();
        Self {
            rel_type,
            target,
            doc_part,
            target_mode,
        }
    }

    fn is_image(&self) -> bool {
        self.rel_type == REL_TYPE_IMAGE
    }

    fn type_uri(&self) -> Cow<'_, str> {
        if self.rel_type.contains("://") {
            Cow::Borrowed(&self.rel_type)
        } else {
            Cow::Owned(format!("{}{}", REL_TYPE_PREFIX, self.rel_type))
        }
    }

    // Images point at the raw media path, XML parts at `doc_part` + `.xml`
    fn emitted_target(&self) -> Cow<'_, str> {
        if !self.is_image() && self.target.ends_with(XML_EXTENSION) {
            Cow::Owned(format!("{}{}", self.doc_part, XML_EXTENSION))
        } else {
            Cow::Borrowed(&self.target)
        }
    }
}

/// Ordered relationship set of one part / 单个部件的有序关系集合
#[derive(Debug, Clone, Default)]
pub(crate) struct Relationships {
    entries: Vec<(String, RelationshipEntry)>,
}

impl Relationships {
    /// Read `word/_rels/<part>.xml.rels`, a missing entry gives an empty set
    /// 读取部件的关系文件，不存在时返回空集合
    pub(crate) fn read(package: &Package, part: &str) -> Result<Self, DocxError> {
        match package.read_entry(&rels_entry_name(part)) {
            Some(content) => Self::parse(&content),
            None => Ok(Self::default()),
        }
    }

    /// Parse relationship XML / 解析关系 XML
    pub(crate) fn parse(xml: &[u8]) -> Result<Self, DocxError> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut rels = Self::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let mut id = None;
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut target_mode = None;

                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value),
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"TargetMode" => target_mode = Some(value),
                            _ => {}
                        }
                    }

                    if let Some(id) = id {
                        rels.insert(
                            id,
                            RelationshipEntry::from_wire(&rel_type, target, target_mode),
                        );
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Insert or replace by id; a replaced entry keeps its position
    /// 按 ID 插入或替换，被替换的条目保持原位置
    pub(crate) fn insert(&mut self, id: String, entry: RelationshipEntry) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((id, entry)),
        }
    }

    pub(crate) fn get(&self, id: &str) -> Option<&RelationshipEntry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, entry)| entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize as a package relationships document / 序列化为包关系文档
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(REL_XML_BASE_CAPACITY * (self.entries.len() + 1));
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(XMLNS_RELATIONSHIPS);
        xml.push_str(r#"">"#);

        for (id, entry) in &self.entries {
            xml.push_str(r#"<Relationship Id=""#);
            xml.push_str(id);
            xml.push_str(r#"" Type=""#);
            xml.push_str(&entry.type_uri());
            xml.push_str(r#"" Target=""#);
            xml.push_str(&entry.emitted_target());
            if let Some(mode) = &entry.target_mode {
                xml.push_str(r#"" TargetMode=""#);
                xml.push_str(mode);
            }
            xml.push_str(r#""/>"#);
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Image relationships added during the session / 会话期间添加的图片关系
///
/// Flushed into the document relationships on save, then discarded.
#[derive(Debug, Default)]
pub(crate) struct RelationshipManager {
    new_rels: Vec<(String, RelationshipEntry)>,
}

impl RelationshipManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Relationship id of an image macro: `rId` + (1000 + `#n` suffix, or 0)
    /// 图片宏的关系 ID
    ///
    /// Two unrelated macros with the same numeric suffix share an id. A suffix too large for
    /// the id counts as no suffix.
    pub(crate) fn image_relationship_id(search: &str) -> (String, u32) {
        let number = IMAGE_REL_ID_BASE
            .checked_add(clone_suffix_number(search))
            .unwrap_or(IMAGE_REL_ID_BASE);
        (format!("{}{}", REL_ID_PREFIX, number), number)
    }

    /// Register an image relationship, an earlier entry with the same id is replaced
    /// 注册图片关系，相同 ID 的旧条目会被替换
    pub(crate) fn add_image_relationship(&mut self, rel_id: &str, file_name: &str) {
        let entry = RelationshipEntry::image(file_name);
        match self.new_rels.iter_mut().find(|(id, _)| id == rel_id) {
            Some((_, slot)) => *slot = entry,
            None => self.new_rels.push((rel_id.to_string(), entry)),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.new_rels.is_empty()
    }

    /// Merge new image relationships into the existing set / 将新图片关系合并到现有集合
    ///
    /// # Returns / 返回
    /// * `Some(bytes)` - Serialized relationships / 序列化后的关系
    /// * `None` - No image was added, the existing part stays untouched / 未添加图片，保持原样
    pub(crate) fn generate_final_rels_content(&self, mut existing: Relationships) -> Option<Bytes> {
        if self.is_empty() {
            return None;
        }
        for (id, entry) in &self.new_rels {
            if let Some(previous) = existing.get(id)
                && !previous.is_image()
            {
                log::warn!("relationship {} ({}) replaced by an image", id, previous.rel_type);
            }
            existing.insert(id.clone(), entry.clone());
        }
        log::debug!("writing {} document relationship(s)", existing.len());
        Some(Bytes::from(existing.to_xml()))
    }
}
