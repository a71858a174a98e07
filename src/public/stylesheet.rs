use std::error::Error;

/// Error returned by a stylesheet implementation / 样式表实现返回的错误
pub type TransformError = Box<dyn Error + Send + Sync>;

/// Optional XSL step applied to the main document part / 应用于主文档部件的可选 XSL 步骤
///
/// The crate ships no XSLT processor: callers wrap the one they use (loading the stylesheet is
/// part of constructing the implementation). Any error surfaces as
/// [`DocxError::StylesheetTransformFailed`](crate::DocxError::StylesheetTransformFailed).
/// 本 crate 不包含 XSLT 处理器，调用方需自行包装。
pub trait StylesheetTransform {
    /// Bind a stylesheet parameter / 绑定样式表参数
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), TransformError>;

    /// Transform the document XML / 转换文档 XML
    fn transform(&self, document: &str) -> Result<String, TransformError>;
}
