pub mod command;
pub mod item;

pub use command::{ChangeValue, Command, ItemInfo, ItemValue, Response};
pub use item::{ItemKind, Scope, SettingItem};
