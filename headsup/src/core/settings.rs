use anyhow::{bail, Context, Result};

use headsup_ipc::{ChangeValue, ItemInfo, ItemKind, ItemValue, SettingItem};

use super::summary::{decay_summary, snooze_summary};
use crate::resources::DefaultProvider;
use crate::store::SettingsStore;

/// Default snooze for heads up notifications. 5 minutes.
pub const DEFAULT_SNOOZE_MS: u64 = 300_000;

fn toggle_default(item: SettingItem) -> bool {
    matches!(item, SettingItem::FloatingWindow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSetting {
    pub millis: u64,
    pub summary: String,
}

impl DurationSetting {
    fn new(item: SettingItem, millis: u64) -> Self {
        let summary = match item {
            SettingItem::NotificationDecayTimeout => decay_summary(millis),
            _ => snooze_summary(millis),
        };
        Self { millis, summary }
    }
}

/// In-memory view of every item, as last loaded or changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub expanded: bool,
    pub show_update: bool,
    pub gravity_bottom: bool,
    pub exclude_from_lock_screen: bool,
    pub floating_window: bool,
    pub snooze_time: DurationSetting,
    /// Absent when the decay default could not be resolved.
    pub notification_decay: Option<DurationSetting>,
}

impl Snapshot {
    pub fn toggle(&self, item: SettingItem) -> Option<bool> {
        match item {
            SettingItem::Expanded => Some(self.expanded),
            SettingItem::ShowUpdate => Some(self.show_update),
            SettingItem::GravityBottom => Some(self.gravity_bottom),
            SettingItem::ExcludeFromLockScreen => Some(self.exclude_from_lock_screen),
            SettingItem::FloatingWindow => Some(self.floating_window),
            SettingItem::SnoozeTime | SettingItem::NotificationDecayTimeout => None,
        }
    }

    fn toggle_mut(&mut self, item: SettingItem) -> Option<&mut bool> {
        match item {
            SettingItem::Expanded => Some(&mut self.expanded),
            SettingItem::ShowUpdate => Some(&mut self.show_update),
            SettingItem::GravityBottom => Some(&mut self.gravity_bottom),
            SettingItem::ExcludeFromLockScreen => Some(&mut self.exclude_from_lock_screen),
            SettingItem::FloatingWindow => Some(&mut self.floating_window),
            SettingItem::SnoozeTime | SettingItem::NotificationDecayTimeout => None,
        }
    }

    pub fn duration(&self, item: SettingItem) -> Option<&DurationSetting> {
        match item {
            SettingItem::SnoozeTime => Some(&self.snooze_time),
            SettingItem::NotificationDecayTimeout => self.notification_decay.as_ref(),
            _ => None,
        }
    }

    pub fn contains(&self, item: SettingItem) -> bool {
        self.toggle(item).is_some() || self.duration(item).is_some()
    }

    pub fn info(&self, item: SettingItem) -> Option<ItemInfo> {
        let (value, summary) = match item.kind() {
            ItemKind::Toggle => (ItemValue::Toggle { checked: self.toggle(item)? }, None),
            ItemKind::Duration => {
                let duration = self.duration(item)?;
                (
                    ItemValue::Duration {
                        millis: duration.millis,
                    },
                    Some(duration.summary.clone()),
                )
            }
        };
        Some(ItemInfo {
            id: item,
            key: item.key().to_string(),
            scope: item.scope(),
            value,
            summary,
        })
    }

    pub fn items(&self) -> Vec<ItemInfo> {
        SettingItem::ALL
            .into_iter()
            .filter_map(|item| self.info(item))
            .collect()
    }
}

/// Mirrors the heads up settings between the store and a [`Snapshot`].
pub struct HeadsUpSettings<S: SettingsStore> {
    store: S,
    defaults: Box<dyn DefaultProvider>,
    snapshot: Snapshot,
}

impl<S: SettingsStore> HeadsUpSettings<S> {
    pub fn activate(store: S, defaults: Box<dyn DefaultProvider>) -> Self {
        let snapshot = read_snapshot(&store, defaults.as_ref());
        tracing::info!(
            "Loaded {} heads up settings{}",
            snapshot.items().len(),
            if snapshot.notification_decay.is_none() {
                " (decay timeout unavailable)"
            } else {
                ""
            }
        );
        Self {
            store,
            defaults,
            snapshot,
        }
    }

    /// Re-read every item from the store, including writes made by other
    /// clients since activation.
    pub fn load(&mut self) -> Result<()> {
        self.store.reload()?;
        self.snapshot = read_snapshot(&self.store, self.defaults.as_ref());
        Ok(())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Apply a change event. Returns `Ok(false)` without writing when the
    /// item is unknown or not part of the loaded model.
    pub fn on_change(&mut self, item_id: &str, value: &ChangeValue) -> Result<bool> {
        let Some(item) = SettingItem::parse(item_id) else {
            tracing::debug!("Ignoring change for unknown item {}", item_id);
            return Ok(false);
        };
        self.change(item, value)
    }

    pub fn change(&mut self, item: SettingItem, value: &ChangeValue) -> Result<bool> {
        if !self.snapshot.contains(item) {
            tracing::debug!("Ignoring change for unloaded item {}", item);
            return Ok(false);
        }

        match item.kind() {
            ItemKind::Toggle => {
                let checked = match value {
                    ChangeValue::Bool(checked) => *checked,
                    ChangeValue::Text(text) => bail!("{} expects a boolean, got {:?}", item, text),
                };
                self.store.put_bool(item.key(), checked, item.scope())?;
                if let Some(slot) = self.snapshot.toggle_mut(item) {
                    *slot = checked;
                }
            }
            ItemKind::Duration => {
                let millis = parse_millis(item, value)?;
                let raw = i64::try_from(millis)
                    .with_context(|| format!("{} out of range: {}", item, millis))?;
                self.store.put_int(item.key(), raw, item.scope())?;
                let setting = DurationSetting::new(item, millis);
                if item == SettingItem::SnoozeTime {
                    self.snapshot.snooze_time = setting;
                } else {
                    self.snapshot.notification_decay = Some(setting);
                }
            }
        }

        tracing::debug!("{} changed to {}", item, value);
        Ok(true)
    }
}

fn parse_millis(item: SettingItem, value: &ChangeValue) -> Result<u64> {
    match value {
        ChangeValue::Text(text) => text
            .trim()
            .parse()
            .with_context(|| format!("{} expects milliseconds, got {:?}", item, text)),
        ChangeValue::Bool(b) => bail!("{} expects milliseconds, got {}", item, b),
    }
}

fn read_snapshot<S: SettingsStore>(store: &S, defaults: &dyn DefaultProvider) -> Snapshot {
    let toggle = |item: SettingItem| store.get_bool(item.key(), toggle_default(item), item.scope());

    let notification_decay = match defaults.decay_default() {
        Ok(default) => Some(DurationSetting::new(
            SettingItem::NotificationDecayTimeout,
            read_millis(store, SettingItem::NotificationDecayTimeout, default),
        )),
        Err(e) => {
            tracing::warn!("Decay timeout unavailable: {:#}", e);
            None
        }
    };

    Snapshot {
        expanded: toggle(SettingItem::Expanded),
        show_update: toggle(SettingItem::ShowUpdate),
        gravity_bottom: toggle(SettingItem::GravityBottom),
        exclude_from_lock_screen: toggle(SettingItem::ExcludeFromLockScreen),
        floating_window: toggle(SettingItem::FloatingWindow),
        snooze_time: DurationSetting::new(
            SettingItem::SnoozeTime,
            read_millis(store, SettingItem::SnoozeTime, DEFAULT_SNOOZE_MS),
        ),
        notification_decay,
    }
}

fn read_millis<S: SettingsStore>(store: &S, item: SettingItem, default: u64) -> u64 {
    let raw = store.get_int(
        item.key(),
        i64::try_from(default).unwrap_or(i64::MAX),
        item.scope(),
    );
    u64::try_from(raw).unwrap_or_else(|_| {
        tracing::warn!("Negative {} in store ({}), using {}", item, raw, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{FixedDefault, Unavailable};
    use crate::store::mock::MemoryStore;
    use crate::store::FileStore;
    use headsup_ipc::Scope;

    const TOGGLES: [SettingItem; 5] = [
        SettingItem::Expanded,
        SettingItem::ShowUpdate,
        SettingItem::GravityBottom,
        SettingItem::ExcludeFromLockScreen,
        SettingItem::FloatingWindow,
    ];

    fn activate(store: MemoryStore) -> HeadsUpSettings<MemoryStore> {
        HeadsUpSettings::activate(store, Box::new(FixedDefault(5000)))
    }

    #[test]
    fn test_load_defaults_without_systemui() {
        let settings = HeadsUpSettings::activate(MemoryStore::new(), Box::new(Unavailable));
        let snapshot = settings.snapshot();

        assert!(!snapshot.expanded);
        assert!(!snapshot.show_update);
        assert!(!snapshot.gravity_bottom);
        assert!(!snapshot.exclude_from_lock_screen);
        assert!(snapshot.floating_window);
        assert_eq!(snapshot.snooze_time.millis, 300000);
        assert_eq!(snapshot.snooze_time.summary, "snoozed for 5 minutes");
        assert!(snapshot.notification_decay.is_none());

        assert_eq!(snapshot.items().len(), 6);
        assert!(settings
            .snapshot()
            .info(SettingItem::NotificationDecayTimeout)
            .is_none());
        assert!(settings.store().writes.is_empty());
    }

    #[test]
    fn test_load_uses_provider_default() {
        let settings = activate(MemoryStore::new());
        let decay = settings.snapshot().notification_decay.as_ref().unwrap();

        assert_eq!(decay.millis, 5000);
        assert_eq!(decay.summary, "decays after 5 seconds");
        assert_eq!(settings.snapshot().items().len(), 7);
    }

    #[test]
    fn test_load_reads_stored_values() {
        let store = MemoryStore::new()
            .with_user("heads_up_expanded", 1)
            .with_user("heads_up_floating_window", 0)
            .with_global("heads_up_snooze_time", 0)
            .with_global("heads_up_notification_decay", 0);
        let settings = activate(store);
        let snapshot = settings.snapshot();

        assert!(snapshot.expanded);
        assert!(!snapshot.floating_window);
        assert_eq!(snapshot.snooze_time.summary, "snooze disabled");
        assert_eq!(
            snapshot.notification_decay.as_ref().unwrap().summary,
            "never decays"
        );
    }

    #[test]
    fn test_toggles_are_read_from_user_scope() {
        let store = MemoryStore::new().with_global("heads_up_expanded", 1);
        let settings = activate(store);

        assert!(!settings.snapshot().expanded);
    }

    #[test]
    fn test_snooze_is_read_from_global_scope() {
        let store = MemoryStore::new().with_user("heads_up_snooze_time", 0);
        let settings = activate(store);

        assert_eq!(settings.snapshot().snooze_time.millis, 300000);
    }

    #[test]
    fn test_negative_stored_duration_falls_back_to_default() {
        let store = MemoryStore::new().with_global("heads_up_snooze_time", -1);
        let settings = activate(store);

        assert_eq!(settings.snapshot().snooze_time.millis, 300000);
    }

    #[test]
    fn test_toggle_change_writes_user_scope() {
        for item in TOGGLES {
            let mut settings = activate(MemoryStore::new());

            assert!(settings.on_change(item.id(), &ChangeValue::Bool(true)).unwrap());
            assert_eq!(settings.store().read(item.key(), Scope::CurrentUser), Some(1));
            assert_eq!(settings.snapshot().toggle(item), Some(true));

            assert!(settings.on_change(item.id(), &ChangeValue::Bool(false)).unwrap());
            assert_eq!(settings.store().read(item.key(), Scope::CurrentUser), Some(0));
            assert_eq!(settings.snapshot().toggle(item), Some(false));

            assert_eq!(settings.store().writes.len(), 2);
            assert!(settings.store().global.is_empty());
        }
    }

    #[test]
    fn test_snooze_change_updates_summary() {
        let mut settings = activate(MemoryStore::new());

        assert!(settings
            .on_change("snooze-time", &ChangeValue::from("65000"))
            .unwrap());
        assert_eq!(
            settings.store().read("heads_up_snooze_time", Scope::Global),
            Some(65000)
        );
        assert_eq!(settings.snapshot().snooze_time.summary, "snoozed for 1 minutes");

        assert!(settings.on_change("snooze-time", &ChangeValue::from("0")).unwrap());
        assert_eq!(settings.snapshot().snooze_time.summary, "snooze disabled");
        assert_eq!(settings.store().writes.len(), 2);
    }

    #[test]
    fn test_decay_change_updates_summary() {
        let mut settings = activate(MemoryStore::new());

        assert!(settings
            .on_change("notification-decay-timeout", &ChangeValue::from("4500"))
            .unwrap());
        assert_eq!(
            settings
                .store()
                .read("heads_up_notification_decay", Scope::Global),
            Some(4500)
        );
        let info = settings
            .snapshot()
            .info(SettingItem::NotificationDecayTimeout)
            .unwrap();
        assert_eq!(info.value, ItemValue::Duration { millis: 4500 });
        assert_eq!(info.summary.as_deref(), Some("decays after 4 seconds"));
    }

    #[test]
    fn test_unknown_item_is_rejected_without_write() {
        let mut settings = activate(MemoryStore::new());

        assert!(!settings
            .on_change("not_a_real_item", &ChangeValue::Bool(true))
            .unwrap());
        assert!(settings.store().writes.is_empty());
    }

    #[test]
    fn test_decay_change_rejected_when_unavailable() {
        let mut settings = HeadsUpSettings::activate(MemoryStore::new(), Box::new(Unavailable));

        assert!(!settings
            .on_change("notification-decay-timeout", &ChangeValue::from("4500"))
            .unwrap());
        assert!(settings.store().writes.is_empty());
        assert!(settings.snapshot().notification_decay.is_none());
    }

    #[test]
    fn test_store_key_accepted_as_item_id() {
        let mut settings = activate(MemoryStore::new());

        assert!(settings
            .on_change("heads_up_gravity_bottom", &ChangeValue::Bool(true))
            .unwrap());
        assert!(settings.snapshot().gravity_bottom);
    }

    #[test]
    fn test_mismatched_value_is_an_error() {
        let mut settings = activate(MemoryStore::new());

        assert!(settings
            .on_change("expanded", &ChangeValue::from("1"))
            .is_err());
        assert!(settings
            .on_change("snooze-time", &ChangeValue::Bool(true))
            .is_err());
        assert!(settings
            .on_change("snooze-time", &ChangeValue::from("five"))
            .is_err());
        assert!(settings.store().writes.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_snapshot_unchanged() {
        let mut settings = activate(MemoryStore::new().failing());
        let before = settings.snapshot().clone();

        assert!(settings
            .on_change("expanded", &ChangeValue::Bool(true))
            .is_err());
        assert!(settings
            .on_change("snooze-time", &ChangeValue::from("0"))
            .is_err());
        assert!(settings
            .on_change("notification-decay-timeout", &ChangeValue::from("0"))
            .is_err());

        assert_eq!(settings.snapshot(), &before);
        assert!(settings.store().writes.is_empty());
    }

    #[test]
    fn test_load_sees_writes_from_another_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        let mut settings = HeadsUpSettings::activate(
            FileStore::open(&path, 1000).unwrap(),
            Box::new(FixedDefault(5000)),
        );

        let mut other = FileStore::open(&path, 1000).unwrap();
        other
            .put_int("heads_up_snooze_time", 0, Scope::Global)
            .unwrap();

        settings.load().unwrap();
        assert_eq!(settings.snapshot().snooze_time.summary, "snooze disabled");

        // A later change keeps the other store's value on disk
        assert!(settings
            .on_change("expanded", &ChangeValue::Bool(true))
            .unwrap());
        let reopened = FileStore::open(&path, 1000).unwrap();
        assert_eq!(
            reopened.get_int("heads_up_snooze_time", 300000, Scope::Global),
            0
        );
        assert!(reopened.get_bool("heads_up_expanded", false, Scope::CurrentUser));
    }

    #[test]
    fn test_round_trip_through_reload() {
        let mut settings = activate(MemoryStore::new());

        for item in TOGGLES {
            // Flip each toggle away from its default
            let value = !toggle_default(item);
            assert!(settings.change(item, &ChangeValue::Bool(value)).unwrap());
        }
        assert!(settings.on_change("snooze-time", &ChangeValue::from("600000")).unwrap());
        assert!(settings
            .on_change("notification-decay-timeout", &ChangeValue::from("0"))
            .unwrap());
        let changed = settings.snapshot().clone();

        settings.load().unwrap();
        assert_eq!(settings.snapshot(), &changed);

        let reactivated = activate(settings.into_store());
        assert_eq!(reactivated.snapshot(), &changed);
        for item in TOGGLES {
            assert_eq!(reactivated.snapshot().toggle(item), Some(!toggle_default(item)));
        }
        assert_eq!(reactivated.snapshot().snooze_time.millis, 600000);
        assert_eq!(
            reactivated.snapshot().notification_decay.as_ref().unwrap().millis,
            0
        );
    }
}
