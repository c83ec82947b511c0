//! Auxiliary export formats for inspecting decoded models.

pub mod obj;

pub use obj::export_obj;
