use crate::{app::App, domain::{User, UserProfile}, profile};
use anyhow::Result;
use std::fmt::Write;

#[derive(Debug)]
pub enum Args {
    Show,
    Update(UserProfile),
}

/// Execute the profile action.
/// # Errors
/// Returns an error if the profile cannot be fetched or updated.
pub async fn execute(app: &App, args: Args) -> Result<()> {
    let user = match args {
        Args::Show => profile::current_user(app).await?,
        Args::Update(changes) => {
            let user = profile::update_profile(app, &changes).await?;
            println!("Profile updated");
            user
        }
    };

    print!("{}", render(&user)?);
    Ok(())
}

/// Key/value listing of a user record.
pub(crate) fn render(user: &User) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "id:      {}", user.id)?;
    writeln!(out, "name:    {}", user.name)?;
    writeln!(out, "email:   {}", user.email)?;
    writeln!(out, "role:    {}", user.role)?;
    if let Some(avatar) = &user.avatar {
        writeln!(out, "avatar:  {avatar}")?;
    }
    if let Some(created_at) = &user.created_at {
        writeln!(out, "created: {created_at}")?;
    }
    if let Some(updated_at) = &user.updated_at {
        writeln!(out, "updated: {updated_at}")?;
    }
    Ok(out)
}
