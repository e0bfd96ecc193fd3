use colored::Colorize;
use log::debug;

use crate::api::ApiError;
use crate::commands::{prompt_line, Ctx};
use crate::render;

fn resolve_password(provided: Option<&str>) -> Result<String, String> {
    match provided {
        Some(password) => Ok(password.to_string()),
        None => prompt_line("password"),
    }
}

pub async fn login(ctx: &Ctx, username: &str, password: Option<&str>) -> Result<(), String> {
    let password = resolve_password(password)?;
    if password.is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let session = match ctx.api.login(username, &password).await {
        Ok(session) => session,
        Err(ApiError::Status { .. }) => {
            return Err("login failed, check your credentials".to_string())
        }
        Err(e) => return Err(e.to_string()),
    };

    ctx.store.set_session(&session)?;
    println!(
        "{} signed in as {}",
        "::".bold().green(),
        render::accent(ctx.theme, username)
    );
    println!("list your particles with `pimctl search`");
    Ok(())
}

pub async fn register(ctx: &Ctx, username: &str, password: Option<&str>) -> Result<(), String> {
    let password = resolve_password(password)?;
    // No request leaves the machine with blank credentials.
    if username.trim().is_empty() || password.is_empty() {
        return Err("username and password cannot be empty".to_string());
    }

    match ctx.api.register(username, &password).await {
        Ok(()) => {
            println!(
                "{} registration successful, sign in with `pimctl login {username}`",
                "::".bold().green()
            );
            Ok(())
        }
        Err(ApiError::Status {
            detail: Some(detail),
            ..
        }) => Err(format!("registration failed: {detail}")),
        Err(ApiError::Status { .. }) => Err("registration failed".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Invalidation is best-effort: the stored token is cleared even when the
/// backend call fails, so the client always ends up signed out.
pub async fn logout(ctx: &Ctx) -> Result<(), String> {
    match ctx.store.session() {
        Some(token) => {
            if let Err(e) = ctx.api.logout(&token).await {
                debug!("logout request failed: {e}");
            }
            ctx.store.clear_session()?;
            println!("{} logged out", "::".bold().green());
        }
        None => println!("no session stored"),
    }
    Ok(())
}

pub async fn whoami(ctx: &Ctx) -> Result<(), String> {
    let token = ctx.store.guard()?;
    let username = match ctx.api.whoami(&token).await {
        Ok(username) => username,
        Err(ApiError::Status { .. }) => return Err("session is not valid, log in again".to_string()),
        Err(e) => return Err(e.to_string()),
    };
    println!("{}", render::accent(ctx.theme, &username));
    Ok(())
}
