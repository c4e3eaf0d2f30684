pub mod bench;
pub mod logs;
pub mod write;
