// ---------- Buffer size constants / 缓冲区大小常量 ----------

// Default buffer size for reading/writing operations (8KB) / 读写操作的默认缓冲区大小（8KB）
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 8192;

// ---------- Image dimension constants / 图片尺寸常量 ----------

// Minimum image data length / 最小的图片数据长度
pub(crate) const MIN_IMAGE_DATA_LEN: usize = 24;

// Default image width: 2cm / 默认图片宽度：2厘米
pub(crate) const DEFAULT_WIDTH_EMU: u64 = 720000;

// Default image height: 2.5cm / 默认图片高度：2.5厘米
pub(crate) const DEFAULT_HEIGHT_EMU: u64 = 900000;

// EMU (English Metric Units) per inch conversion factor / 每英寸的 EMU（英制公制单位）转换因子
pub(crate) const EMU_PER_INCH: f64 = 914400.0;

// Default DPI (dots per inch), 914400 / 96 = 9525 EMU per pixel / 默认 DPI，每像素 9525 EMU
pub(crate) const DEFAULT_DPI: f32 = 96.0;

// ---------- DOCX file path constants / DOCX 文件路径常量 ----------

// Path to main document XML file / 主文档 XML 文件路径
pub(crate) const DOCUMENT_XML_PATH: &str = "word/document.xml";

// Path to content types file / 内容类型文件路径
pub(crate) const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

// Prefix shared by every word part / 所有 word 部件共享的前缀
pub(crate) const WORD_PATH_PREFIX: &str = "word/";

// Path prefix for media files / 媒体文件路径前缀
pub(crate) const MEDIA_PATH_PREFIX: &str = "word/media/";

// Relationship target prefix for media files / 媒体文件的关系目标前缀
pub(crate) const MEDIA_TARGET_PREFIX: &str = "media/";

// Relationship part name of the main document / 主文档的关系部件名称
pub(crate) const DOCUMENT_PART: &str = "document";

// Header and footer part kinds / 页眉和页脚部件类型
pub(crate) const HEADER_PART: &str = "header";
pub(crate) const FOOTER_PART: &str = "footer";

// XML part extension / XML 部件扩展名
pub(crate) const XML_EXTENSION: &str = ".xml";

// Temporary file name prefix / 临时文件名前缀
pub(crate) const TEMP_FILE_PREFIX: &str = "docx_";

// Temporary file extension / 临时文件扩展名
pub(crate) const TEMP_FILE_EXTENSION: &str = ".docx";

// ---------- Macro constants / 宏常量 ----------

pub(crate) const MACRO_OPEN: &str = "${";
pub(crate) const MACRO_CLOSE: &str = "}";
pub(crate) const MACRO_BLOCK_CLOSE_PREFIX: &str = "/";
pub(crate) const CLONE_SUFFIX_SEPARATOR: char = '#';

// ---------- XML tag constants / XML 标签常量 ----------

// Table row close tag / 表格行结束标签
pub(crate) const XML_ROW_CLOSE: &str = "</w:tr>";

// Table close tag, rows are never searched past it / 表格结束标签
pub(crate) const XML_TABLE_CLOSE: &str = "</w:tbl>";

// Paragraph close tag / 段落结束标签
pub(crate) const XML_PARAGRAPH_CLOSE: &str = "</w:p>";

// ---------- Regex pattern constants / 正则表达式模式常量 ----------

// Macro possibly broken by run markup, "$" and "{" may only be separated by tags
// 可能被 run 标记拆分的宏，"$" 与 "{" 之间只能是标签
pub(crate) const REGEX_BROKEN_MACRO: &str = r"\$(?:<[^>]*>)*\{[^$}]*\}";

// Any markup tag / 任意标记标签
pub(crate) const REGEX_XML_TAG: &str = r"<[^>]*>";

// Well-formed macro, captures the name / 规范的宏，捕获名称
pub(crate) const REGEX_MACRO: &str = r"\$\{([^}]*)\}";

// Table row open tag, bare or with attributes (never w:trPr) / 表格行开始标签（不匹配 w:trPr）
pub(crate) const REGEX_ROW_OPEN: &str = r"<w:tr[\s>]";

// Paragraph open tag, bare or with attributes (never w:pPr) / 段落开始标签（不匹配 w:pPr）
pub(crate) const REGEX_PARAGRAPH_OPEN: &str = r"<w:p[\s>]";

// Vertical merge restart marker / 垂直合并重新开始标记
pub(crate) const REGEX_MERGE_RESTART: &str = r#"<w:vMerge\s+w:val="restart"\s*/>"#;

// Vertical merge continue marker, bare or valued / 垂直合并继续标记（无值或带值）
pub(crate) const REGEX_MERGE_CONTINUE: &str = r#"<w:vMerge\s*/>|<w:vMerge\s+w:val="continue"\s*/>"#;

// ---------- Relationship constants / 关系常量 ----------

// Package relationships namespace / 包关系命名空间
pub(crate) const XMLNS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

// Relationship type prefix / 关系类型前缀
pub(crate) const REL_TYPE_PREFIX: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";

// Image relationship type suffix / 图片关系类型后缀
pub(crate) const REL_TYPE_IMAGE: &str = "image";

// Relationship ID prefix / 关系 ID 前缀
pub(crate) const REL_ID_PREFIX: &str = "rId";

// Base of generated image relationship ids / 生成的图片关系 ID 的基数
pub(crate) const IMAGE_REL_ID_BASE: u32 = 1000;

pub(crate) const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// ---------- Drawing XML constants / 绘图 XML 常量 ----------

// DrawingML namespace / DrawingML 命名空间
pub(crate) const XMLNS_DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

// Picture namespace / 图片命名空间
pub(crate) const XMLNS_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

// WordprocessingML drawing namespace / WordprocessingML 绘图命名空间
pub(crate) const XMLNS_WORDPROCESSING_DRAWING: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

// Office document relationships namespace (r:embed) / Office 文档关系命名空间
pub(crate) const XMLNS_OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// Capacity for drawing XML / 绘图 XML 容量
pub(crate) const DRAWING_XML_CAPACITY: usize = 1100;

// Capacity for relationship XML / 关系 XML 容量
pub(crate) const REL_XML_BASE_CAPACITY: usize = 150;

// ---------- Image format detection constants / 图片格式检测常量 ----------

// PNG file signature bytes / PNG 文件签名字节
pub(crate) const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

// PNG IHDR chunk marker / PNG IHDR 块标记
pub(crate) const PNG_IHDR_MARKER: [u8; 4] = [b'I', b'H', b'D', b'R'];

// JPEG start of image / JPEG 图像起始标记
pub(crate) const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];

// GIF signature prefix, both GIF87a and GIF89a / GIF 签名前缀
pub(crate) const GIF_SIGNATURE: [u8; 4] = [b'G', b'I', b'F', b'8'];

// JPEG SOF marker range / JPEG SOF 标记范围
pub(crate) const JPEG_SOF_MARKER_START: u8 = 0xC0;
pub(crate) const JPEG_SOF_MARKER_END: u8 = 0xCF;

// JPEG excluded SOF markers / JPEG 排除的 SOF 标记
pub(crate) const JPEG_MARKER_DHT: u8 = 0xC4; // Define Huffman Table
pub(crate) const JPEG_MARKER_JPG: u8 = 0xC8; // JPG extension
pub(crate) const JPEG_MARKER_DAC: u8 = 0xCC; // Define Arithmetic Coding

// JPEG fill byte and standalone markers without a length field / JPEG 填充字节和无长度字段的独立标记
pub(crate) const JPEG_FILL_BYTE: u8 = 0xFF;
pub(crate) const JPEG_MARKER_TEM: u8 = 0x01;
pub(crate) const JPEG_MARKER_RST_START: u8 = 0xD0;
pub(crate) const JPEG_MARKER_SOI: u8 = 0xD8;

// JPEG segment offset / JPEG 段偏移量
pub(crate) const JPEG_INITIAL_OFFSET: usize = 2;
pub(crate) const JPEG_MIN_SEGMENT_SIZE: usize = 9;

// ---------- Error message constants / 错误消息常量 ----------

pub(crate) const ERR_SLICE_TOO_SHORT: &str = "Byte slice too short";
pub(crate) const ERR_INVALID_PNG_IHDR: &str = "Invalid PNG IHDR chunk";
pub(crate) const ERR_INVALID_JPG_MARKER: &str = "Invalid JPG marker";
pub(crate) const ERR_NO_SOF_MARKER: &str = "No SOF marker found in JPG";
pub(crate) const ERR_UNKNOWN_FORMAT: &str = "Unknown image format";
