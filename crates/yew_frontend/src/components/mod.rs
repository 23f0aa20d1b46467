pub mod result;
pub mod upload;
