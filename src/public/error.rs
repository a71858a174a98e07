use async_zip::error::ZipError;
use std::path::PathBuf;
use thiserror::Error;

/// Structural element that could not be located / 无法定位的结构元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// The macro itself is absent from the main part / 主文档中不存在该宏
    Placeholder(String),

    /// A macro was found but no `<w:tr>` precedes it / 找到宏但其前面没有行开始标签
    RowStart(String),

    /// A macro was found but no `</w:tr>` follows it / 找到宏但其后面没有行结束标签
    RowEnd(String),
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFound::Placeholder(name) => write!(
                f,
                "can not find macro {name}, template variable not found or variable contains markup"
            ),
            NotFound::RowStart(name) => {
                write!(f, "can not find the start position of the row to clone for {name}")
            }
            NotFound::RowEnd(name) => {
                write!(f, "can not find the end position of the row to clone for {name}")
            }
        }
    }
}

/// Error type for DOCX template operations / DOCX 模板操作的错误类型
#[derive(Debug, Error)]
pub enum DocxError {
    /// No writable working file in the temporary directory / 临时目录中无法创建工作文件
    #[error("failed to create a temporary working file in {dir}: {source}")]
    TemporaryFileCreationFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template unreadable or working file unwritable / 模板不可读或工作文件不可写
    #[error("failed to copy template {path}: {source}")]
    TemplateCopyFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Placeholder or row boundary missing / 缺少占位符或行边界
    #[error("{0}")]
    StructuralNotFound(NotFound),

    /// Optional XSL step failed / 可选的 XSL 步骤失败
    #[error("stylesheet transform failed: {0}")]
    StylesheetTransformFailed(String),

    /// Final package write failed / 最终文档包写入失败
    #[error("failed to close package {path}: {source}")]
    ArchiveCloseFailed {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// Required part missing from the package / 文档包中缺少必需部件
    #[error("required part not found: {0}")]
    MissingPart(String),

    /// Part is not valid UTF-8 text / 部件不是合法的 UTF-8 文本
    #[error("part is not valid UTF-8: {0}")]
    InvalidPart(String),

    /// ZIP file operation error / ZIP 文件操作错误
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error / XML 解析错误
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<NotFound> for DocxError {
    fn from(value: NotFound) -> Self {
        DocxError::StructuralNotFound(value)
    }
}
