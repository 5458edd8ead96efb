pub mod error;
pub mod event;
pub mod file;
pub mod item;

pub use error::ItemboxError;
pub use event::{EventType, ItemEvent};
pub use file::{FileEntry, UploadFile, UploadReceipt};
pub use item::{CreateItem, DeleteItemResponse, Item, ItemCursor, ItemPage, ListItems};
