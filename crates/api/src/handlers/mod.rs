pub mod category;
pub mod exercise;
