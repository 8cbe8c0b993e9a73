pub mod common;
pub mod form;
pub mod image;

pub use common::*;
pub use form::*;
pub use image::*;
