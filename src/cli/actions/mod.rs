pub mod login;
pub mod logout;
pub mod prefs;
pub mod profile;
pub mod refresh;
pub mod status;
pub mod users;

// Internal "interpreter" for `Action`.
mod run;

use crate::{cli::globals::GlobalArgs, guards::Route};

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout,
    Status,
    Refresh,
    Profile(profile::Args),
    Users(users::Args),
    Prefs(prefs::Args),
}

impl Action {
    /// View the command stands in for; the route guard decides whether it runs.
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Self::Login(_) => Route::Login,
            Self::Logout | Self::Status | Self::Refresh | Self::Prefs(_) => Route::Home,
            Self::Profile(_) => Route::Profile,
            Self::Users(users::Args::List) => Route::Users,
            Self::Users(users::Args::Show { id }) => Route::UserDetail(id.clone()),
        }
    }

    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        assert_eq!(Action::Status.route(), Route::Home);
        assert_eq!(Action::Profile(profile::Args::Show).route(), Route::Profile);
        assert_eq!(Action::Users(users::Args::List).route(), Route::Users);
        assert_eq!(
            Action::Users(users::Args::Show { id: "7".to_string() }).route(),
            Route::UserDetail("7".to_string())
        );
        assert_eq!(
            Action::Login(login::Args {
                username: "a".to_string(),
                password: None
            })
            .route(),
            Route::Login
        );
    }
}
