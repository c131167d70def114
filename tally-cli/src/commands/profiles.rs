//! Profiles command - CRUD on profile records

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, read_payload};
use crate::output;
use tally_core::{Profile, ProfileDraft, ProfilePatch, RecordId};

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List all profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one profile
    Get {
        id: RecordId,
        #[arg(long)]
        json: bool,
    },
    /// Create a profile from JSON (--data or stdin)
    Create {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change the fields given in JSON (--data or stdin)
    Update {
        id: RecordId,
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Delete a profile
    Delete { id: RecordId },
}

pub async fn run(command: ProfileCommands) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.profile_service;

    match command {
        ProfileCommands::List { json } => {
            let profiles = service.get_all().await?;
            if json {
                return output::json(&profiles);
            }
            if profiles.is_empty() {
                output::warning("No profiles found");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["Id", "Name", "Website", "Tags", "Modified"]);
            for profile in &profiles {
                table.add_row(vec![
                    profile.id.to_string(),
                    output::cell(profile.display_name()),
                    output::cell(profile.website_c.as_deref()),
                    output::cell(profile.tags.as_deref()),
                    output::cell(profile.modified_on.as_deref()),
                ]);
            }
            println!("{}", table);
            println!("{} profile(s)", profiles.len());
        }
        ProfileCommands::Get { id, json } => match service.get_by_id(id).await? {
            Some(profile) if json => output::json(&profile)?,
            Some(profile) => print_profile(&profile),
            None => anyhow::bail!("Profile {} not found", id),
        },
        ProfileCommands::Create { data, json } => {
            let draft: ProfileDraft = read_payload(data.as_deref())?;
            let created = service.create(&draft).await?;
            ctx.persist()?;
            report_write(created, json, "Created")?;
        }
        ProfileCommands::Update { id, data, json } => {
            let patch: ProfilePatch = read_payload(data.as_deref())?;
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: the JSON sets no profile fields");
            }
            let updated = service.update(id, &patch).await?;
            ctx.persist()?;
            report_write(updated, json, "Updated")?;
        }
        ProfileCommands::Delete { id } => {
            service.delete(id).await?;
            ctx.persist()?;
            output::success(&format!("Deleted profile {}", id));
        }
    }

    Ok(())
}

fn report_write(profile: Option<Profile>, json: bool, verb: &str) -> Result<()> {
    match profile {
        Some(profile) if json => output::json(&profile),
        Some(profile) => {
            output::success(&format!("{} profile {}", verb, profile.id));
            print_profile(&profile);
            Ok(())
        }
        None => {
            output::warning(&format!("{} profile; the backend returned no record", verb));
            Ok(())
        }
    }
}

fn print_profile(profile: &Profile) {
    println!("{} {}", "Profile".bold(), profile.id);
    println!("  Name:     {}", output::cell(profile.display_name()));
    println!("  Website:  {}", output::cell(profile.website_c.as_deref()));
    println!("  Avatar:   {}", output::cell(profile.avatar_c.as_deref()));
    println!("  Bio:      {}", output::cell(profile.bio_c.as_deref()));
    println!("  Tags:     {}", output::cell(profile.tags.as_deref()));
    if let Some(owner) = &profile.owner {
        println!("  Owner:    {}", owner.label());
    }
    println!("  Created:  {}", output::cell(profile.created_on.as_deref()));
    println!("  Modified: {}", output::cell(profile.modified_on.as_deref()));
}
