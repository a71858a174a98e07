pub(crate) mod config;
pub(crate) mod docx;
pub(crate) mod error;
pub(crate) mod stylesheet;
pub(crate) mod value_extern;
