use colored::Colorize;

use crate::api::ApiError;
use crate::commands::Ctx;
use crate::render;

/// Load-and-render, parameterised by an optional query; an empty query lists
/// everything. Any non-2xx here means the session has expired: the stored
/// token is cleared and the user is sent back to `pimctl login`.
pub async fn search(ctx: &Ctx, query: Option<&str>) -> Result<(), String> {
    let token = ctx.store.guard()?;
    let query = query.unwrap_or("");

    let hits = match ctx.api.search(&token, query).await {
        Ok(hits) => hits,
        Err(ApiError::Status { .. }) => {
            ctx.store.clear_session()?;
            return Err("session expired, log in again with `pimctl login`".to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    if hits.is_empty() {
        if query.is_empty() {
            println!("no particles yet, create one with `pimctl new <title>`");
        } else {
            println!("no particles match '{query}'");
        }
        return Ok(());
    }

    print!("{}", render::search_table(&hits, ctx.theme));
    println!(
        "{} {} particle(s), `pimctl view <id>` to read, `pimctl edit <id>` to change",
        "::".bold().green(),
        hits.len()
    );
    Ok(())
}
