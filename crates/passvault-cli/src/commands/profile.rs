use crate::app::AppContext;
use crate::cli::ProfileArgs;
use crate::errors::from_vault;
use crate::output::print_profile;
use crate::ui::OutputMode;

pub fn handle_profile(ctx: &AppContext, args: &ProfileArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let user_id = ctx.user_id()?;
    let profile = vault.get_or_create_profile(&user_id).map_err(from_vault)?;

    print_profile(OutputMode::from_env(args.json), &profile);
    Ok(())
}
