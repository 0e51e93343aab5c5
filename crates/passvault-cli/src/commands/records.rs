//! Record commands: add, edit, list, show, delete.

use passvault_core::crypto::issued_at;
use passvault_core::{mask_secret, RecordDraft, RecordUpdate};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::app::{resolve_record, AppContext};
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::errors::{from_vault, CliError};
use crate::helpers::read_secret;
use crate::output::{category_names, print_record, print_record_list, SecretView};
use crate::ui::OutputMode;

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let key = ctx.unlock(&vault)?;
    let secret = read_secret(args.secret_stdin)?;

    let draft = RecordDraft {
        category: args.category.clone(),
        service_name: args.service.clone(),
        service_url: args.url.clone().unwrap_or_default(),
        username: args.username.clone(),
        secret,
        comments: args.comments.clone().unwrap_or_default(),
    };
    let record = vault.add_record(&key, draft).map_err(from_vault)?;

    if !ctx.quiet() {
        println!("Added record {}", record.id);
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let key = ctx.unlock(&vault)?;
    let record = resolve_record(&vault, key.user_id(), &args.record)?;

    let secret = if args.secret_stdin {
        Some(read_secret(true)?)
    } else {
        None
    };
    let update = RecordUpdate {
        category: args.category.clone(),
        service_name: args.service.clone(),
        service_url: args.url.clone(),
        username: args.username.clone(),
        secret,
        comments: args.comments.clone(),
    };
    let updated = vault
        .update_record(&key, &record.id, update)
        .map_err(from_vault)?;

    if !ctx.quiet() {
        println!("Updated record {}", updated.id);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let user_id = ctx.user_id()?;

    let categories = vault.list_categories(&user_id).map_err(from_vault)?;
    let mut records = vault.list_records(&user_id).map_err(from_vault)?;
    if let Some(name) = args.category.as_deref() {
        let category = categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                CliError::not_found(
                    format!("Category not found: {}", name),
                    "Hint: Categories are created by `passvault add` and `passvault import`.",
                )
            })?;
        records.retain(|record| record.category_id == category.id);
    }

    print_record_list(
        OutputMode::from_env(args.json),
        &records,
        &category_names(&categories),
    );
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let user_id = ctx.user_id()?;
    let record = resolve_record(&vault, &user_id, &args.record)?;
    let categories = vault.list_categories(&user_id).map_err(from_vault)?;

    let (secret, issued) = match record.encrypted_secret.as_ref() {
        None => (SecretView::None, None),
        Some(token) => {
            let key = ctx.unlock(&vault)?;
            let issued = issued_at(token, key.key()).map_err(from_vault)?;
            let plaintext: Option<SecretString> =
                vault.reveal_secret(&key, &record).map_err(from_vault)?;
            let view = match plaintext {
                Some(secret) if args.reveal => {
                    SecretView::Revealed(Zeroizing::new(secret.expose_secret().to_string()))
                }
                Some(secret) => SecretView::Masked(mask_secret(secret.expose_secret())),
                None => SecretView::None,
            };
            (view, Some(issued))
        }
    };

    print_record(
        OutputMode::from_env(args.json),
        &record,
        &category_names(&categories),
        &secret,
        issued,
    );
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let user_id = ctx.user_id()?;
    let record = resolve_record(&vault, &user_id, &args.record)?;
    vault
        .delete_record(&user_id, &record.id)
        .map_err(from_vault)?;

    if !ctx.quiet() {
        println!("Deleted record {} ({})", record.id, record.service_name);
    }
    Ok(())
}
