mod core;
mod public;
#[cfg(test)]
mod tests;

pub use public::config::TemplateConfig;
pub use public::docx::DocxTemplate;
pub use public::error::{DocxError, NotFound};
pub use public::stylesheet::{StylesheetTransform, TransformError};
pub use public::value_extern::ValueExt;
