//! Persisted user preferences.

use crate::{
    domain::{Theme, UserSettings},
    error::Result,
    storage::{LocalStorage, StorageKey},
};

/// Reads the stored settings, falling back to defaults per field.
#[must_use]
pub fn load(storage: &LocalStorage) -> UserSettings {
    let defaults = UserSettings::default();
    UserSettings {
        theme: storage
            .get_item::<Theme>(StorageKey::Theme)
            .unwrap_or(defaults.theme),
        notifications: storage
            .get_item::<bool>(StorageKey::Notifications)
            .unwrap_or(defaults.notifications),
        language: storage
            .get_item::<String>(StorageKey::Language)
            .unwrap_or(defaults.language),
    }
}

/// # Errors
/// Returns an error if the store cannot be written.
pub fn save(storage: &LocalStorage, settings: &UserSettings) -> Result<()> {
    storage.set_item(StorageKey::Theme, &settings.theme)?;
    storage.set_item(StorageKey::Notifications, &settings.notifications)?;
    storage.set_item(StorageKey::Language, &settings.language)
}
