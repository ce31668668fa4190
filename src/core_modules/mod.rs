pub mod bilateral;
pub mod clahe;
pub mod image_io;
pub mod landmarks;
pub mod stillness;
pub mod stylizer;
