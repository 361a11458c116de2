use crate::{app::App, cli::actions::profile::render, directory};
use anyhow::Result;

#[derive(Debug)]
pub enum Args {
    List,
    Show { id: String },
}

/// Execute the users action.
/// # Errors
/// Returns an error if the directory query fails.
pub async fn execute(app: &App, args: Args) -> Result<()> {
    match args {
        Args::List => {
            let users = directory::list_users(app).await?;
            if users.is_empty() {
                println!("No users found");
            }
            for user in users {
                println!("{}\t{}\t{}\t{}", user.id, user.name, user.email, user.role);
            }
        }
        Args::Show { id } => {
            let user = directory::get_user(app, &id).await?;
            print!("{}", render(&user)?);
        }
    }
    Ok(())
}
