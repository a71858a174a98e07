use crate::core::constant::DEFAULT_DPI;
use crate::core::default_handler::DefaultValueHandler;
use crate::public::value_extern::ValueExt;
use std::env::temp_dir;
use std::path::PathBuf;

/// Template configuration / 模板配置
pub struct TemplateConfig {
    // DPI (dots per inch) for image sizing / 图片尺寸计算的 DPI（每英寸点数）
    pub(crate) dpi: f32,

    // Directory of the working copy / 工作副本所在目录
    pub(crate) temp_dir: PathBuf,

    // Value handler for JSON replacements / JSON 替换的值处理器
    pub(crate) value_handler: Box<dyn ValueExt + Send>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            // 96 DPI gives 9525 EMU per pixel / 96 DPI 对应每像素 9525 EMU
            dpi: DEFAULT_DPI,

            temp_dir: temp_dir(),

            // Use default value handler / 使用默认值处理器
            value_handler: Box::new(DefaultValueHandler),
        }
    }
}

impl TemplateConfig {
    /// Set custom DPI for image sizing / 设置图片尺寸计算的自定义 DPI
    pub fn set_dpi(&mut self, dpi: f32) -> &mut Self {
        self.dpi = dpi;
        self
    }

    /// Set the directory holding the working copy / 设置工作副本所在目录
    pub fn set_temp_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.temp_dir = dir.into();
        self
    }

    /// Set custom value handler / 设置自定义值处理器
    ///
    /// see [`ValueExt`]
    pub fn set_value_handler(&mut self, handler: Box<dyn ValueExt + Send>) -> &mut Self {
        self.value_handler = handler;
        self
    }
}
