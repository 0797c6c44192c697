use serde::{Deserialize, Serialize};

use crate::item::{Scope, SettingItem};

/// Raw value carried by a change event.
///
/// Checkbox items send a boolean, list items send their selected entry as a
/// string-encoded integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for ChangeValue {
    fn from(value: bool) -> Self {
        ChangeValue::Bool(value)
    }
}

impl From<&str> for ChangeValue {
    fn from(value: &str) -> Self {
        ChangeValue::Text(value.to_string())
    }
}

impl From<String> for ChangeValue {
    fn from(value: String) -> Self {
        ChangeValue::Text(value)
    }
}

impl std::fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeValue::Bool(b) => write!(f, "{}", b),
            ChangeValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Re-read every item from the store.
    Load,
    GetItems,
    // Item ids stay strings so foreign ids can be rejected instead of failing to parse
    GetItem { item: String },
    Change { item: String, value: ChangeValue },
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error {
        message: String,
    },
    Items {
        items: Vec<ItemInfo>,
    },
    Item {
        item: ItemInfo,
    },
    Changed {
        accepted: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<ItemInfo>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemValue {
    Toggle { checked: bool },
    Duration { millis: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: SettingItem,
    pub key: String,
    pub scope: Scope,
    pub value: ItemValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl std::fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            ItemValue::Toggle { checked } => {
                write!(f, "{}: {}", self.id, if checked { "on" } else { "off" })?
            }
            ItemValue::Duration { millis } => write!(f, "{}: {}ms", self.id, millis)?,
        }
        if let Some(summary) = &self.summary {
            write!(f, " ({})", summary)?;
        }
        Ok(())
    }
}
