pub mod ai;
pub mod ocr;
pub mod timestamp;
pub mod video;
