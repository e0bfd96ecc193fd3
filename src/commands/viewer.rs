use crate::api::ApiError;
use crate::commands::Ctx;
use crate::render;

pub async fn view(ctx: &Ctx, id: &str) -> Result<(), String> {
    let token = ctx.store.guard()?;

    let particle = match ctx.api.particle(&token, id).await {
        Ok(particle) => particle,
        Err(ApiError::Status { status: 404, .. }) => {
            return Err(format!("no particle with id {id}"))
        }
        Err(ApiError::Status { .. }) => return Err("could not fetch particle data".to_string()),
        Err(e) => return Err(e.to_string()),
    };

    print!("{}", render::particle_detail(&particle, ctx.theme));
    println!();
    println!("change it with `pimctl edit {}`", particle.id);
    Ok(())
}
