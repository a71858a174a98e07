use crate::core::constant::{
    CONTENT_TYPES_PATH, DEFAULT_HEIGHT_EMU, DEFAULT_WIDTH_EMU, DRAWING_XML_CAPACITY, EMU_PER_INCH,
    MEDIA_PATH_PREFIX, XMLNS_DRAWINGML, XMLNS_OFFICE_RELATIONSHIPS, XMLNS_PICTURE,
    XMLNS_WORDPROCESSING_DRAWING,
};
use crate::core::package::Package;
use crate::core::utils::get_image_dimensions;
use crate::public::error::DocxError;
use quick_xml::escape::escape;

/// Archive entry name of a media file, e.g. `word/media/logo.png` / 媒体文件的条目名称
#[inline]
pub(crate) fn media_entry_name(file_name: &str) -> String {
    format!("{}{}", MEDIA_PATH_PREFIX, file_name)
}

/// Manager for image sizing and drawing markup / 图片尺寸与绘图标记的管理器
///
/// Keeps the dimensions of the most recently inserted image.
/// 保存最近一次插入图片的尺寸。
pub(crate) struct ImageManager {
    dpi: f32,
    width_emu: u64,
    height_emu: u64,
}

impl ImageManager {
    /// Create new image manager / 创建新的图片管理器
    ///
    /// # Arguments / 参数
    /// * `dpi` - DPI for image size calculation / 用于图片尺寸计算的 DPI
    pub(crate) fn new(dpi: f32) -> Self {
        Self {
            dpi,
            width_emu: DEFAULT_WIDTH_EMU,
            height_emu: DEFAULT_HEIGHT_EMU,
        }
    }

    /// Width and height in EMU of the last image / 最近一张图片的宽高（EMU）
    pub(crate) fn dimensions(&self) -> (u64, u64) {
        (self.width_emu, self.height_emu)
    }

    /// Recompute the stored dimensions from the image's pixel size
    /// 根据图片像素尺寸重新计算保存的尺寸
    ///
    /// Each pixel is `914400 / dpi` EMU (9525 at 96 DPI). Images whose header can not be read
    /// fall back to 2cm x 2.5cm.
    pub(crate) fn update_dimensions(&mut self, bytes: &[u8]) -> (u64, u64) {
        (self.width_emu, self.height_emu) = match get_image_dimensions(bytes) {
            Ok((width_px, height_px)) => {
                let emu_per_px = EMU_PER_INCH / self.dpi as f64;
                (
                    (width_px as f64 * emu_per_px).round() as u64,
                    (height_px as f64 * emu_per_px).round() as u64,
                )
            }
            Err(msg) => {
                log::warn!("{}, using default image size", msg);
                (DEFAULT_WIDTH_EMU, DEFAULT_HEIGHT_EMU)
            }
        };
        (self.width_emu, self.height_emu)
    }

    /// Replace the media entry with new image bytes / 用新的图片字节替换媒体条目
    pub(crate) fn store_media(package: &mut Package, file_name: &str, bytes: Vec<u8>) {
        let entry_name = media_entry_name(file_name);
        if package.delete_entry(&entry_name) {
            log::debug!("replacing existing media {}", entry_name);
        }
        package.write_entry(&entry_name, bytes.into());
    }

    /// Make sure `[Content_Types].xml` declares the image extension
    /// 确保 `[Content_Types].xml` 声明了图片扩展名
    pub(crate) fn register_content_type(
        package: &mut Package,
        file_name: &str,
    ) -> Result<(), DocxError> {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return Ok(());
        };
        let extension = extension.to_ascii_lowercase();
        let Some(content_types) = package.read_entry_string(CONTENT_TYPES_PATH)? else {
            return Ok(());
        };

        // Compared case-insensitively / 不区分大小写比较
        let declared = format!(r#"extension="{}""#, extension);
        if content_types.to_ascii_lowercase().contains(&declared) {
            return Ok(());
        }
        let Some(insert_pos) = content_types.rfind("</Types>") else {
            return Ok(());
        };

        let default = format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            escape(extension.as_str()),
            image_content_type(&extension)
        );
        let mut updated = String::with_capacity(content_types.len() + default.len());
        updated.push_str(&content_types[..insert_pos]);
        updated.push_str(&default);
        updated.push_str(&content_types[insert_pos..]);
        package.write_entry(CONTENT_TYPES_PATH, updated.into());
        Ok(())
    }

    /// Generate OOXML markup for inline image / 生成内联图片的 OOXML 标记
    ///
    /// The markup closes the text run around the macro and reopens it afterwards, so it is
    /// well-formed when substituted inside `<w:r><w:t>`.
    /// 标记会先关闭宏所在的文本 run，之后重新打开。
    ///
    /// # Arguments / 参数
    /// * `relationship_id` - Relationship ID (e.g., "rId1000") / 关系 ID
    /// * `doc_pr_id` - Drawing object id / 绘图对象 ID
    /// * `width` - Width in EMU / 宽度（EMU）
    /// * `height` - Height in EMU / 高度（EMU）
    /// * `name` - Image file name / 图片文件名
    pub(crate) fn generate_xml_drawing(
        relationship_id: &str,
        doc_pr_id: u32,
        width: u64,
        height: u64,
        name: &str,
    ) -> String {
        let name = escape(name);
        let mut xml = String::with_capacity(DRAWING_XML_CAPACITY + name.len() * 2);

        xml.push_str(r#"</w:t></w:r><w:r><w:drawing><wp:inline xmlns:wp=""#);
        xml.push_str(XMLNS_WORDPROCESSING_DRAWING);
        xml.push_str(r#"" distT="0" distB="0" distL="0" distR="0"><wp:extent cx=""#);
        xml.push_str(&width.to_string());
        xml.push_str(r#"" cy=""#);
        xml.push_str(&height.to_string());
        xml.push_str(r#""/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id=""#);
        xml.push_str(&doc_pr_id.to_string());
        xml.push_str(r#"" name=""#);
        xml.push_str(&name);
        xml.push_str(r#""/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a=""#);
        xml.push_str(XMLNS_DRAWINGML);
        xml.push_str(r#"" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a=""#);
        xml.push_str(XMLNS_DRAWINGML);
        xml.push_str(r#""><a:graphicData uri=""#);
        xml.push_str(XMLNS_PICTURE);
        xml.push_str(r#""><pic:pic xmlns:pic=""#);
        xml.push_str(XMLNS_PICTURE);
        xml.push_str(r#""><pic:nvPicPr><pic:cNvPr id="0" name=""#);
        xml.push_str(&name);
        xml.push_str(r#""/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip xmlns:r=""#);
        xml.push_str(XMLNS_OFFICE_RELATIONSHIPS);
        xml.push_str(r#"" r:embed=""#);
        xml.push_str(relationship_id);
        xml.push_str(
            r#""/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx=""#,
        );
        xml.push_str(&width.to_string());
        xml.push_str(r#"" cy=""#);
        xml.push_str(&height.to_string());
        xml.push_str(r#""/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r><w:r><w:t>"#);

        xml
    }
}

// MIME type of an image extension / 图片扩展名对应的 MIME 类型
fn image_content_type(extension: &str) -> String {
    match extension {
        "jpg" | "jpeg" | "jpe" => "image/jpeg".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "emf" => "image/x-emf".to_string(),
        "wmf" => "image/x-wmf".to_string(),
        other => format!("image/{}", other),
    }
}
