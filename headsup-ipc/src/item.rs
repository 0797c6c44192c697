use serde::{Deserialize, Serialize};

/// Where a setting lives in the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    CurrentUser,
    Global,
}

/// How an item is presented and what raw value a change event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Checkbox; changes carry a boolean.
    Toggle,
    /// List of millisecond durations; changes carry a string-encoded integer.
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingItem {
    Expanded,
    ShowUpdate,
    GravityBottom,
    ExcludeFromLockScreen,
    FloatingWindow,
    SnoozeTime,
    NotificationDecayTimeout,
}

impl SettingItem {
    pub const ALL: [SettingItem; 7] = [
        SettingItem::Expanded,
        SettingItem::ShowUpdate,
        SettingItem::GravityBottom,
        SettingItem::ExcludeFromLockScreen,
        SettingItem::FloatingWindow,
        SettingItem::SnoozeTime,
        SettingItem::NotificationDecayTimeout,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SettingItem::Expanded => "expanded",
            SettingItem::ShowUpdate => "show-update",
            SettingItem::GravityBottom => "gravity-bottom",
            SettingItem::ExcludeFromLockScreen => "exclude-from-lock-screen",
            SettingItem::FloatingWindow => "floating-window",
            SettingItem::SnoozeTime => "snooze-time",
            SettingItem::NotificationDecayTimeout => "notification-decay-timeout",
        }
    }

    /// Settings store key backing this item.
    pub fn key(self) -> &'static str {
        match self {
            SettingItem::Expanded => "heads_up_expanded",
            SettingItem::ShowUpdate => "heads_up_show_update",
            SettingItem::GravityBottom => "heads_up_gravity_bottom",
            SettingItem::ExcludeFromLockScreen => "heads_up_exclude_from_lock_screen",
            SettingItem::FloatingWindow => "heads_up_floating_window",
            SettingItem::SnoozeTime => "heads_up_snooze_time",
            SettingItem::NotificationDecayTimeout => "heads_up_notification_decay",
        }
    }

    // Snooze time is read without a user qualifier, unlike the toggles.
    pub fn scope(self) -> Scope {
        match self {
            SettingItem::SnoozeTime | SettingItem::NotificationDecayTimeout => Scope::Global,
            _ => Scope::CurrentUser,
        }
    }

    pub fn kind(self) -> ItemKind {
        match self {
            SettingItem::SnoozeTime | SettingItem::NotificationDecayTimeout => ItemKind::Duration,
            _ => ItemKind::Toggle,
        }
    }

    /// Parse an item id. Store keys are accepted as aliases.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|item| item.id() == s || item.key() == s)
    }
}

impl std::str::FromStr for SettingItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown item: {}", s))
    }
}

impl std::fmt::Display for SettingItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
