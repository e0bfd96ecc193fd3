use std::fs;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::error;

use crate::commands::Ctx;
use crate::render::{self, Theme};

pub const DEFAULT_EXPORT_FILE: &str = "pim_export.json";

/// With a value: persist it and confirm. Without: print the active theme.
/// The persisted value is applied at startup, before any command output.
pub fn theme(ctx: &Ctx, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(raw) => {
            let theme = Theme::parse(raw)
                .ok_or_else(|| format!("unknown theme '{raw}', expected dark or light"))?;
            ctx.store.set_theme(theme)?;
            println!(
                "{} theme set to {}",
                "::".bold().green(),
                render::accent(theme, theme.name())
            );
        }
        None => println!("{}", ctx.theme.name()),
    }
    Ok(())
}

/// Downloads the full-data export into a fixed file name. The spinner is a
/// transient label only; it is cleared on every exit path so the terminal
/// ends up the way it started.
pub async fn export(ctx: &Ctx, out: Option<&str>) -> Result<(), String> {
    let token = ctx.store.guard()?;

    let out = out
        .map(str::to_string)
        .or_else(|| ctx.export_file.clone())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("exporting...");

    let payload = match ctx.api.export(&token).await {
        Ok(payload) => payload,
        Err(e) => {
            pb.finish_and_clear();
            error!("export failed: {e}");
            return Err("could not export data, please try again".to_string());
        }
    };

    let path = crate::config::expand_tilde(&out);
    if let Err(e) = fs::write(&path, &payload) {
        pb.finish_and_clear();
        return Err(format!("failed to write export file '{}': {e}", path.display()));
    }

    pb.finish_and_clear();
    println!(
        "{} exported {} bytes to {}",
        "::".bold().green(),
        payload.len(),
        render::accent(ctx.theme, &path.display().to_string())
    );
    Ok(())
}
