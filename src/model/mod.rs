pub mod entry;
pub mod note;
