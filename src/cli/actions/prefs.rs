use crate::{
    app::App,
    domain::{Theme, UserSettings},
    preferences,
};
use anyhow::{bail, Result};

#[derive(Debug)]
pub enum Args {
    Show,
    Set(Changes),
}

/// Fields given on `prefs set`; `None` leaves the stored value alone.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Changes {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub language: Option<String>,
}

/// Execute the prefs action.
/// # Errors
/// Returns an error when nothing is set or the store cannot be written.
pub fn execute(app: &App, args: Args) -> Result<()> {
    let settings = match args {
        Args::Show => preferences::load(app.storage()),
        Args::Set(changes) => {
            let settings = apply(preferences::load(app.storage()), changes)?;
            preferences::save(app.storage(), &settings)?;
            settings
        }
    };

    println!("theme:         {}", settings.theme);
    println!(
        "notifications: {}",
        if settings.notifications { "on" } else { "off" }
    );
    println!("language:      {}", settings.language);
    Ok(())
}

fn apply(mut settings: UserSettings, changes: Changes) -> Result<UserSettings> {
    let language = changes
        .language
        .map(|language| language.trim().to_string())
        .filter(|language| !language.is_empty());

    if changes.theme.is_none() && changes.notifications.is_none() && language.is_none() {
        bail!("Nothing to set: provide --theme, --notifications or --language.");
    }

    if let Some(theme) = changes.theme {
        settings.theme = theme;
    }
    if let Some(notifications) = changes.notifications {
        settings.notifications = notifications;
    }
    if let Some(language) = language {
        settings.language = language;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_unset_fields() -> Result<()> {
        let changes = Changes {
            theme: Some(Theme::Dark),
            ..Changes::default()
        };
        let settings = apply(UserSettings::default(), changes)?;
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.notifications);
        assert_eq!(settings.language, "en_US");
        Ok(())
    }

    #[test]
    fn apply_turns_notifications_off() -> Result<()> {
        let changes = Changes {
            notifications: Some(false),
            ..Changes::default()
        };
        let settings = apply(UserSettings::default(), changes)?;
        assert!(!settings.notifications);
        assert_eq!(settings.theme, Theme::System);
        Ok(())
    }

    #[test]
    fn apply_requires_a_change() {
        let changes = Changes {
            language: Some("  ".to_string()),
            ..Changes::default()
        };
        assert!(apply(UserSettings::default(), changes).is_err());
    }
}
