use std::env;
use std::fs;
use std::io::Read;
use std::process::Command as Process;

use colored::Colorize;

use crate::api::{ApiError, Particle};
use crate::commands::{confirm, Ctx};
use crate::render;

const DRAFT_FILE: &str = "draft.html";

/// A particle is never saved with a blank title or a body that renders to
/// nothing. Runs before any network call.
pub fn check_draft(title: &str, body: &str) -> Result<(), String> {
    if title.trim().is_empty() || render::is_effectively_empty(body) {
        return Err("title and body cannot be empty".to_string());
    }
    Ok(())
}

fn read_body_file(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read body from stdin: {e}"))?;
        return Ok(buf);
    }
    fs::read_to_string(crate::config::expand_tilde(path))
        .map_err(|e| format!("failed to read body file '{path}': {e}"))
}

/// The editing surface: a draft file seeded with the current body, opened in
/// the configured editor ($EDITOR wins, `vi` as the fallback).
fn edit_interactively(ctx: &Ctx, seed: &str) -> Result<String, String> {
    let editor = env::var("EDITOR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| ctx.editor.clone())
        .unwrap_or_else(|| "vi".to_string());

    ctx.store.set(DRAFT_FILE, seed)?;
    let draft_path = ctx.store.path(DRAFT_FILE);

    let status = Process::new(&editor)
        .arg(&draft_path)
        .status()
        .map_err(|e| format!("failed to launch editor '{editor}': {e}"))?;
    if !status.success() {
        return Err(format!("editor '{editor}' exited with {status}"));
    }

    let body = fs::read_to_string(&draft_path)
        .map_err(|e| format!("failed to read draft '{}': {e}", draft_path.display()))?;
    let _ = ctx.store.clear(DRAFT_FILE);
    Ok(body)
}

fn resolve_body(
    ctx: &Ctx,
    inline: Option<&str>,
    file: Option<&str>,
    seed: &str,
) -> Result<String, String> {
    if let Some(inline) = inline {
        return Ok(inline.to_string());
    }
    if let Some(file) = file {
        return read_body_file(file);
    }
    edit_interactively(ctx, seed)
}

fn saved(theme: render::Theme, particle: &Particle) {
    println!(
        "{} saved particle {} ({})",
        "::".bold().green(),
        render::accent(theme, &format!("#{}", particle.user_facing_id)),
        particle.id
    );
    println!("read it with `pimctl view {}`", particle.id);
}

pub async fn create(
    ctx: &Ctx,
    title: &str,
    body: Option<&str>,
    body_file: Option<&str>,
    tags: &[String],
) -> Result<(), String> {
    let token = ctx.store.guard()?;

    let body = resolve_body(ctx, body, body_file, "<p></p>\n")?;
    check_draft(title, &body)?;

    let particle = ctx
        .api
        .create_particle(&token, title, &body, tags)
        .await
        .map_err(save_error)?;
    saved(ctx.theme, &particle);
    Ok(())
}

pub async fn update(
    ctx: &Ctx,
    id: &str,
    title: Option<&str>,
    body: Option<&str>,
    body_file: Option<&str>,
) -> Result<(), String> {
    let token = ctx.store.guard()?;

    let existing = ctx.api.particle(&token, id).await.map_err(fetch_error)?;
    println!(
        "{} editing {} {}",
        "::".bold().green(),
        render::accent(ctx.theme, &format!("#{}", existing.user_facing_id)),
        existing.title
    );

    let new_title = title.unwrap_or(&existing.title).to_string();
    // A title-only edit keeps the stored body rather than opening the editor.
    let new_body = if body.is_none() && body_file.is_none() && title.is_some() {
        existing.body.clone()
    } else {
        resolve_body(ctx, body, body_file, &existing.body)?
    };
    check_draft(&new_title, &new_body)?;

    let particle = ctx
        .api
        .update_particle(&token, id, &new_title, &new_body)
        .await
        .map_err(save_error)?;
    saved(ctx.theme, &particle);
    Ok(())
}

pub async fn delete(ctx: &Ctx, id: &str, yes: bool) -> Result<(), String> {
    let token = ctx.store.guard()?;

    if !yes && !confirm(&format!("delete particle {id}?"))? {
        println!("kept particle {id}");
        return Ok(());
    }

    match ctx.api.delete_particle(&token, id).await {
        Ok(()) => {
            println!("{} particle deleted", "::".bold().green());
            println!("back to the list with `pimctl search`");
            Ok(())
        }
        Err(ApiError::Status { status: 404, .. }) => Err(format!("no particle with id {id}")),
        Err(ApiError::Status { .. }) => Err("failed to delete particle".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub async fn tag_add(ctx: &Ctx, id: &str, tags: &[String]) -> Result<(), String> {
    let token = ctx.store.guard()?;
    let particle = ctx
        .api
        .add_tags(&token, id, tags)
        .await
        .map_err(tag_error)?;
    print_tags(ctx.theme, &particle);
    Ok(())
}

pub async fn tag_remove(ctx: &Ctx, id: &str, tags: &[String]) -> Result<(), String> {
    let token = ctx.store.guard()?;
    let particle = ctx
        .api
        .remove_tags(&token, id, tags)
        .await
        .map_err(tag_error)?;
    print_tags(ctx.theme, &particle);
    Ok(())
}

fn print_tags(theme: render::Theme, particle: &Particle) {
    let tags = if particle.tags.is_empty() {
        "(none)".to_string()
    } else {
        particle.tags.join(", ")
    };
    println!(
        "{} tags on {}: {}",
        "::".bold().green(),
        render::accent(theme, &format!("#{}", particle.user_facing_id)),
        tags
    );
}

fn fetch_error(e: ApiError) -> String {
    match e {
        ApiError::Status { status: 404, .. } => "could not fetch particle data: not found".to_string(),
        ApiError::Status { .. } => "could not fetch particle data".to_string(),
        other => other.to_string(),
    }
}

fn save_error(e: ApiError) -> String {
    match e {
        ApiError::Status { .. } => "failed to save particle".to_string(),
        other => other.to_string(),
    }
}

fn tag_error(e: ApiError) -> String {
    match e {
        ApiError::Status { status: 404, .. } => "no such particle".to_string(),
        ApiError::Status { .. } => "failed to update tags".to_string(),
        other => other.to_string(),
    }
}
