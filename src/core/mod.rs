pub(crate) mod block_processor;
pub(crate) mod constant;
pub(crate) mod default_handler;
pub(crate) mod image_manager;
pub(crate) mod package;
pub(crate) mod part_store;
pub(crate) mod relationship_manager;
pub(crate) mod row_processor;
pub(crate) mod utils;
