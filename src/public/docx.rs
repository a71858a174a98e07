use crate::core::block_processor::{find_block, replace_span};
use crate::core::constant::{
    CLONE_SUFFIX_SEPARATOR, DOCUMENT_PART, TEMP_FILE_EXTENSION, TEMP_FILE_PREFIX,
};
use crate::core::image_manager::ImageManager;
use crate::core::package::Package;
use crate::core::part_store::PartStore;
use crate::core::relationship_manager::{RelationshipManager, Relationships, rels_entry_name};
use crate::core::row_processor;
use crate::core::utils::{ensure_macro, ensure_utf8, macro_name};
use crate::public::config::TemplateConfig;
use crate::public::error::DocxError;
use crate::public::stylesheet::StylesheetTransform;
use crate::public::value_extern::ValueExt;
use base64::Engine;
use base64::engine::general_purpose;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{File as AsyncFile, copy, create_dir_all, remove_file, try_exists};
use uuid::Uuid;

/// DOCX template processor / DOCX 模板处理器
///
/// Opens a working copy of a template, edits its parts in memory and writes them back on
/// [`save`](DocxTemplate::save) or [`save_as`](DocxTemplate::save_as).
/// 打开模板的工作副本，在内存中编辑各部件，并在保存时写回。
///
/// Macros are written `${name}` in the document text. Copies made by
/// [`clone_row`](DocxTemplate::clone_row) are addressed as `${name#1}`, `${name#2}`, ...
///
/// One instance must not be edited from several threads at once; there is no locking inside.
/// The working copy is only removed by `save_as`: a template dropped without saving leaves it
/// behind in the temporary directory.
pub struct DocxTemplate {
    package: Package,
    parts: PartStore,
    rel_manager: RelationshipManager,
    img_manager: ImageManager,
    value_handler: Box<dyn ValueExt + Send>,
}

impl DocxTemplate {
    /// Open a template with the default configuration / 使用默认配置打开模板
    pub async fn open(template: impl AsRef<Path>) -> Result<Self, DocxError> {
        Self::open_with_config(template, TemplateConfig::default()).await
    }

    /// Copy the template to a working file, open it and load every part
    /// 将模板复制到工作文件，打开并加载所有部件
    ///
    /// # Errors / 错误
    /// * [`DocxError::TemporaryFileCreationFailed`] - the temp dir is not writable / 临时目录不可写
    /// * [`DocxError::TemplateCopyFailed`] - the template can not be copied / 模板无法复制
    pub async fn open_with_config(
        template: impl AsRef<Path>,
        config: TemplateConfig,
    ) -> Result<Self, DocxError> {
        let template = template.as_ref();
        let working_path = create_working_file(&config.temp_dir).await?;

        if let Err(source) = copy(template, &working_path).await {
            let _ = remove_file(&working_path).await;
            return Err(DocxError::TemplateCopyFailed {
                path: template.to_path_buf(),
                source,
            });
        }

        let (package, parts) = match load(&working_path).await {
            Ok(loaded) => loaded,
            Err(e) => {
                let _ = remove_file(&working_path).await;
                return Err(e);
            }
        };
        log::debug!(
            "opened template {} as {}",
            template.display(),
            working_path.display()
        );

        Ok(Self {
            package,
            parts,
            rel_manager: RelationshipManager::new(),
            img_manager: ImageManager::new(config.dpi),
            value_handler: config.value_handler,
        })
    }

    /// Path of the working copy / 工作副本路径
    pub fn working_path(&self) -> &Path {
        self.package.path()
    }

    /// Current XML of the main document part / 主文档部件的当前 XML
    pub fn main_part(&self) -> &str {
        self.parts.main()
    }

    /// Current XML of header `index` (1-based) / 第 `index` 个页眉的当前 XML（从 1 开始）
    pub fn header(&self, index: usize) -> Option<&str> {
        let i = index.checked_sub(1)?;
        self.parts.headers().get(i).map(String::as_str)
    }

    /// Current XML of footer `index` (1-based) / 第 `index` 个页脚的当前 XML（从 1 开始）
    pub fn footer(&self, index: usize) -> Option<&str> {
        let i = index.checked_sub(1)?;
        self.parts.footers().get(i).map(String::as_str)
    }

    /// Current XML of every header, in entry order / 所有页眉的当前 XML（按条目顺序）
    pub fn headers(&self) -> &[String] {
        self.parts.headers()
    }

    /// Current XML of every footer, in entry order / 所有页脚的当前 XML（按条目顺序）
    pub fn footers(&self) -> &[String] {
        self.parts.footers()
    }

    /// EMU width and height used for the last inserted image / 最近插入图片使用的宽高（EMU）
    pub fn image_dimensions(&self) -> (u64, u64) {
        self.img_manager.dimensions()
    }

    /// Replace every occurrence of a macro in headers, main part and footers
    /// 替换页眉、主文档和页脚中的所有宏
    ///
    /// `search` may be given bare (`name`) or wrapped (`${name}`). The replacement is inserted
    /// verbatim, it is not XML-escaped. Absent macros are ignored.
    pub fn set_value(&mut self, search: &str, replace: &str) {
        self.replace_in_parts(search, replace, None);
    }

    /// Like [`set_value`](Self::set_value), replacing at most `limit` occurrences per part
    /// 每个部件最多替换 `limit` 次
    pub fn set_value_with_limit(&mut self, search: &str, replace: &str, limit: usize) {
        self.replace_in_parts(search, replace, Some(limit));
    }

    /// Replacement given as raw bytes; bytes that are not UTF-8 are read as Latin-1
    /// 以原始字节给出替换内容，非 UTF-8 字节按 Latin-1 读取
    pub fn set_value_bytes(&mut self, search: &str, replace: &[u8]) {
        let replace = ensure_utf8(replace);
        self.replace_in_parts(search, &replace, None);
    }

    /// Set several macros at once, each value rendered by the configured [`ValueExt`]
    /// 一次设置多个宏，值由配置的 [`ValueExt`] 渲染
    pub fn set_values(&mut self, values: &HashMap<String, Value>) {
        for (key, value) in values {
            let text = self.value_handler.replace(macro_name(key), value);
            self.replace_in_parts(key, &text, None);
        }
    }

    fn replace_in_parts(&mut self, search: &str, replace: &str, limit: Option<usize>) {
        let search = ensure_macro(search);
        for part in self.parts.parts_mut() {
            if !part.contains(search.as_ref()) {
                continue;
            }
            *part = match limit {
                Some(limit) => part.replacen(search.as_ref(), replace, limit),
                None => part.replace(search.as_ref(), replace),
            };
        }
    }

    /// Distinct macro names of all parts / 所有部件中不重复的宏名称
    ///
    /// Names come in order of first appearance: main part, headers, footers.
    pub fn get_variables(&self) -> Vec<String> {
        self.parts.variables()
    }

    /// Clone the table row holding `search` / 克隆包含 `search` 的表格行
    ///
    /// The row with the first occurrence of the macro, together with the rows vertically
    /// merged into it, is replaced by `clones` copies. Copy `i` has every macro renamed from
    /// `${name}` to `${name#i}`.
    ///
    /// # Errors / 错误
    /// [`DocxError::StructuralNotFound`] when the macro or its row tags are missing.
    pub fn clone_row(&mut self, search: &str, clones: usize) -> Result<(), DocxError> {
        let search = ensure_macro(search);
        let result = row_processor::clone_row(self.parts.main(), &search, clones)?;
        self.parts.set_main(result);
        Ok(())
    }

    /// Clone the row holding `search` once per entry of `rows`, then fill copy `i` with the
    /// values of `rows[i - 1]` / 按 `rows` 数量克隆行，并填充每个副本的值
    pub fn clone_row_and_set_values(
        &mut self,
        search: &str,
        rows: &[HashMap<String, Value>],
    ) -> Result<(), DocxError> {
        self.clone_row(search, rows.len())?;

        for (i, row) in rows.iter().enumerate() {
            let index = i + 1;
            for (key, value) in row {
                let name = macro_name(key);
                let text = self.value_handler.replace_in_table(index, name, value);
                let suffixed = format!("{}{}{}", name, CLONE_SUFFIX_SEPARATOR, index);
                self.replace_in_parts(&suffixed, &text, None);
            }
        }
        Ok(())
    }

    /// Clone the block between `${name}` and `${/name}` / 克隆 `${name}` 与 `${/name}` 之间的块
    ///
    /// When `replace` is true the markers and body are replaced by `clones` copies of the body.
    /// The body is returned either way, `None` meaning no such block exists.
    /// 无论是否替换都返回块内容，块不存在时返回 `None`。
    pub fn clone_block(&mut self, name: &str, clones: usize, replace: bool) -> Option<String> {
        let xml = self.parts.main();
        let Some(span) = find_block(xml, name) else {
            log::debug!("block {} not found, nothing cloned", name);
            return None;
        };

        let body = span.body(xml).to_string();
        if replace {
            let result = replace_span(xml, span, &body.repeat(clones));
            self.parts.set_main(result);
        }
        Some(body)
    }

    /// Replace the block `name`, markers included / 替换块 `name`（包括标记）
    pub fn replace_block(&mut self, name: &str, replacement: &str) {
        let xml = self.parts.main();
        match find_block(xml, name) {
            Some(span) => {
                let result = replace_span(xml, span, replacement);
                self.parts.set_main(result);
            }
            None => log::debug!("block {} not found, nothing replaced", name),
        }
    }

    /// Remove the block `name`, markers included / 删除块 `name`（包括标记）
    pub fn delete_block(&mut self, name: &str) {
        self.replace_block(name, "");
    }

    /// Replace `search` with an inline image read from `source`
    /// 用从 `source` 读取的内联图片替换 `search`
    ///
    /// The image is stored as `word/media/<file_name>`, replacing any existing entry, and
    /// referenced through relationship `rId<1000 + n>` where `n` is the `#n` suffix of `search`
    /// (0 without one). A missing source file is ignored.
    pub async fn set_image_value(
        &mut self,
        search: &str,
        file_name: &str,
        source: impl AsRef<Path>,
    ) -> Result<(), DocxError> {
        let source = source.as_ref();
        if !try_exists(source).await.unwrap_or(false) {
            log::debug!("image {} does not exist, {} left as is", source.display(), search);
            return Ok(());
        }

        let bytes = tokio::fs::read(source).await?;
        self.insert_image(search, file_name, bytes)
    }

    /// Like [`set_image_value`](Self::set_image_value) with base64 encoded image data
    /// 使用 base64 编码的图片数据
    pub fn set_image_value_base64(
        &mut self,
        search: &str,
        file_name: &str,
        data: &str,
    ) -> Result<(), DocxError> {
        let bytes = general_purpose::STANDARD.decode(data.trim())?;
        self.insert_image(search, file_name, bytes)
    }

    fn insert_image(
        &mut self,
        search: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), DocxError> {
        let (width, height) = self.img_manager.update_dimensions(&bytes);
        ImageManager::store_media(&mut self.package, file_name, bytes);
        ImageManager::register_content_type(&mut self.package, file_name)?;

        let (rel_id, doc_pr_id) = RelationshipManager::image_relationship_id(search);
        self.rel_manager.add_image_relationship(&rel_id, file_name);

        let drawing =
            ImageManager::generate_xml_drawing(&rel_id, doc_pr_id, width, height, file_name);
        self.set_value(search, &drawing);
        Ok(())
    }

    /// Run the main part through an XSL stylesheet / 使用 XSL 样式表转换主文档部件
    ///
    /// # Errors / 错误
    /// [`DocxError::StylesheetTransformFailed`] when binding a parameter or the transform fails.
    pub fn apply_stylesheet(
        &mut self,
        stylesheet: &mut dyn StylesheetTransform,
        parameters: &HashMap<String, String>,
    ) -> Result<(), DocxError> {
        for (name, value) in parameters {
            stylesheet.set_parameter(name, value).map_err(|e| {
                DocxError::StylesheetTransformFailed(format!("can not set parameter {name}: {e}"))
            })?;
        }

        let transformed = stylesheet
            .transform(self.parts.main())
            .map_err(|e| DocxError::StylesheetTransformFailed(e.to_string()))?;
        self.parts.set_main(transformed);
        Ok(())
    }

    /// Write all parts back and close the working copy / 写回所有部件并关闭工作副本
    ///
    /// Image relationships added by `set_image_value*` are merged into
    /// `word/_rels/document.xml.rels`. Returns the path of the finished working file.
    ///
    /// # Errors / 错误
    /// [`DocxError::ArchiveCloseFailed`] when the package can not be written.
    pub async fn save(mut self) -> Result<PathBuf, DocxError> {
        self.parts.write_headers_and_main(&mut self.package);

        let existing = Relationships::read(&self.package, DOCUMENT_PART)?;
        if let Some(rels) = self.rel_manager.generate_final_rels_content(existing) {
            self.package.write_entry(&rels_entry_name(DOCUMENT_PART), rels);
        }

        self.parts.write_footers(&mut self.package);

        let path = self.package.close().await?;
        log::info!("saved template to {}", path.display());
        Ok(path)
    }

    /// Save, then copy the working file to `destination` and remove it
    /// 保存后将工作文件复制到 `destination` 并删除工作文件
    ///
    /// An existing destination is overwritten. The file is copied rather than renamed so that
    /// it gets the caller's ownership and permissions.
    /// 已存在的目标文件会被覆盖；使用复制而非重命名，以便文件归属于调用方。
    pub async fn save_as(self, destination: impl AsRef<Path>) -> Result<(), DocxError> {
        let destination = destination.as_ref();
        let working_path = self.save().await?;

        // Ensure output directory exists / 确保输出目录存在
        if let Some(parent_dir) = destination.parent()
            && !parent_dir.as_os_str().is_empty()
        {
            create_dir_all(parent_dir).await?;
        }
        if try_exists(destination).await? {
            remove_file(destination).await?;
        }

        copy(&working_path, destination).await?;
        remove_file(&working_path).await?;
        log::info!("saved template as {}", destination.display());
        Ok(())
    }
}

// Reserve a unique working file in `dir` / 在 `dir` 中创建唯一的工作文件
async fn create_working_file(dir: &Path) -> Result<PathBuf, DocxError> {
    let uuid = Uuid::now_v7().to_string();
    let path = dir.join(format!("{}{}{}", TEMP_FILE_PREFIX, uuid, TEMP_FILE_EXTENSION));
    AsyncFile::create(&path)
        .await
        .map_err(|source| DocxError::TemporaryFileCreationFailed {
            dir: dir.to_path_buf(),
            source,
        })?;
    Ok(path)
}

async fn load(working_path: &Path) -> Result<(Package, PartStore), DocxError> {
    let package = Package::open(working_path).await?;
    let parts = PartStore::load(&package)?;
    Ok((package, parts))
}
