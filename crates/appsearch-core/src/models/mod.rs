//! Data model shared by the index, usage store and scheduler.

mod item;
mod scope;

pub use item::{Item, ItemId, RawItem, ITEM_URI_PREFIX};
pub use scope::{ChangeEvent, Scope};
