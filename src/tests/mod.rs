mod base;
mod utils;
