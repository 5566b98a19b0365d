//! Plain-text dump of a destination's configuration, served on
//! `GET /webhook?id=`.

use std::fmt::Write;

use crate::Result;
use crate::database::models::{EventModifierDbModel, RepoBindingDbModel};
use crate::relay::RelayStores;

/// Render the comment, event modifiers and repository bindings of a
/// destination. Fails only when the destination itself cannot be loaded;
/// errors on the listings are written into the dump.
pub async fn describe_destination(stores: &RelayStores, destination_id: &str) -> Result<String> {
    let destination = stores.destinations.get_destination(destination_id).await?;

    let mut out = String::new();
    let _ = write!(out, "Comment: {}\n\n", destination.comment);

    match stores.modifiers.list_modifiers(destination_id).await {
        Ok(modifiers) => {
            out.push_str("EventModifiers:\n\n");
            for modifier in &modifiers {
                write_modifier(&mut out, modifier);
            }
            out.push_str("\n\n");
        }
        Err(e) => {
            let _ = writeln!(out, "ERROR: {e} in fetching event modifiers for webhook");
        }
    }

    match stores.bindings.list_bindings(destination_id).await {
        Ok(bindings) if bindings.is_empty() => {
            out.push_str("This webhook doesn't seem to have any added repositories yet!\n");
        }
        Ok(bindings) => {
            out.push_str("Repositories:\n\n");
            for binding in &bindings {
                write_binding(&mut out, binding);
            }
        }
        Err(e) => {
            let _ = writeln!(out, "ERROR: {e} in fetching repositories for webhook");
        }
    }

    Ok(out)
}

fn write_modifier(out: &mut String, modifier: &EventModifierDbModel) {
    let _ = writeln!(out, "ID: {}", modifier.id);
    let _ = writeln!(out, "Events: {}", modifier.get_events().join(","));
    let _ = writeln!(out, "RepoID: {}", modifier.repo_id.as_deref().unwrap_or_default());
    let _ = writeln!(out, "Blacklisted: {}", modifier.blacklisted);
    let _ = writeln!(out, "Whitelisted: {}", modifier.whitelisted);
    let _ = writeln!(
        out,
        "RedirectChannel: {}",
        modifier.redirect_channel.as_deref().unwrap_or_default()
    );
    let _ = writeln!(out, "Priority: {}", modifier.priority);
    out.push('\n');
}

fn write_binding(out: &mut String, binding: &RepoBindingDbModel) {
    let _ = writeln!(out, "Repo: {}", binding.repo_name);
    let _ = writeln!(out, "Repo ID: {}", binding.id);
    let _ = writeln!(out, "Channel ID: {}", binding.get_channel_ids().join(","));
    let _ = write!(
        out,
        "Created At: {}\n\n",
        binding.get_created_at().to_rfc3339()
    );
}
