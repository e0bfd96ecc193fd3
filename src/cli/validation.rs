use crate::cli::args::{CliArgs, Command};
use crate::render::Theme;

/// Local precondition checks. Everything rejected here fails before any
/// network call is made.
pub fn validate(args: &CliArgs) -> Result<(), String> {
    match &args.command {
        Command::Login { username, password } | Command::Register { username, password } => {
            if username.trim().is_empty() {
                return Err("username cannot be empty".to_string());
            }
            if let Some(password) = password.as_deref() {
                if password.is_empty() {
                    return Err("password cannot be empty".to_string());
                }
            }
        }
        Command::New { title, body, body_file, .. } => {
            if title.trim().is_empty() {
                return Err("type a title before creating".to_string());
            }
            if body.is_some() && body_file.is_some() {
                return Err("use either --body or --body-file, not both".to_string());
            }
        }
        Command::Edit { body, body_file, .. } => {
            if body.is_some() && body_file.is_some() {
                return Err("use either --body or --body-file, not both".to_string());
            }
        }
        Command::Theme { value: Some(raw) } => {
            if Theme::parse(raw).is_none() {
                return Err(format!("unknown theme '{raw}', expected dark or light"));
            }
        }
        _ => {}
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("invalid workers, expected positive integer".to_string());
        }
    }
    Ok(())
}
