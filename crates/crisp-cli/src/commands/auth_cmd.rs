//! `crisp auth` subcommands.

use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_login(
    context: &AppContext,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let session = context.client.login(username, password).await?;
    println!(
        "Signed in as {} (profile '{}')",
        session.email.as_deref().unwrap_or(username),
        context.profile_name
    );
    Ok(())
}

pub fn run_status(context: &AppContext) -> Result<(), CliError> {
    match context.session.current()? {
        Some(session) => {
            println!("Signed in (profile '{}')", context.profile_name);
            if let Some(email) = &session.email {
                println!("email: {email}");
            }
            if let Some(user_id) = &session.user_id {
                println!("user: {user_id}");
            }
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

pub async fn run_logout(context: &AppContext) -> Result<(), CliError> {
    context.client.logout().await?;
    println!("Signed out.");
    Ok(())
}
