//! Pages, the text entries on them and the paths between them

pub mod entry;
pub mod page;
pub mod path;

pub use path::PagePath;
