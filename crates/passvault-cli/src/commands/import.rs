use std::io::IsTerminal;
use std::path::PathBuf;

use crate::app::AppContext;
use crate::cli::ImportArgs;
use crate::constants::DEFAULT_IMPORT_FILE;
use crate::errors::from_vault;
use crate::helpers::{prompt_passphrase, read_import_file};
use crate::output::print_import_report;
use crate::ui::OutputMode;

pub fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    let path = match args.file.clone() {
        Some(file) => PathBuf::from(file),
        None => PathBuf::from(
            ctx.import_file()?
                .unwrap_or_else(|| DEFAULT_IMPORT_FILE.to_string()),
        ),
    };
    let contents = read_import_file(&path)?;

    let mut vault = ctx.open_vault()?;
    if let Some(category) = args.category.clone() {
        vault = vault.with_import_category(category);
    }
    let user_id = ctx.user_id()?;
    let passphrase = prompt_passphrase(std::io::stdin().is_terminal())?;

    let report = vault
        .import_from_text(&user_id, &passphrase, contents.lines())
        .map_err(from_vault)?;

    print_import_report(OutputMode::from_env(args.json), &report, ctx.quiet());
    Ok(())
}
