//! Profile command - view the account and rotate its password.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};

use boxoffice_session::Route;

use super::{Context, print_ok};

const MIN_PASSWORD_LEN: usize = 6;

/// Arguments for the profile command.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the account profile
    Show,

    /// Change the account password
    ChangePassword {
        /// Current password (prompted when omitted)
        #[arg(long)]
        current: Option<String>,

        /// New password (prompted when omitted)
        #[arg(long)]
        new: Option<String>,

        /// Repeat of the new password (prompted when omitted)
        #[arg(long)]
        confirm: Option<String>,
    },
}

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    ctx.require(Route::Profile)?;
    let users = ctx.gateway.services().users();

    match args.command {
        ProfileCommand::Show => {
            let profile = users.profile().await?;
            ctx.output(&profile, || {
                let dim = Style::new().dim();
                let name = [profile.first_name.as_deref(), profile.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "{}",
                    style(if name.is_empty() { &profile.email } else { &name }).bold()
                );
                println!("  {} {}", dim.apply_to("Email:"), profile.email);
                if let Some(phone) = &profile.phone_number {
                    println!("  {} {}", dim.apply_to("Phone:"), phone);
                }
                if let Some(role) = &profile.role {
                    println!("  {} {}", dim.apply_to("Role:"), role);
                }
            })
        }
        ProfileCommand::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let current = prompt_unless(current, "Current password: ")?;
            let new = prompt_unless(new, "New password: ")?;
            let confirm = prompt_unless(confirm, "Confirm new password: ")?;
            validate_new_password(&new, &confirm)?;

            let reply = users.change_password(current, new).await?;
            ctx.output(&reply, || print_ok("Password changed"))
        }
    }
}

fn prompt_unless(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(rpassword::prompt_password(prompt)?),
    }
}

fn validate_new_password(new: &str, confirm: &str) -> Result<()> {
    if new != confirm {
        bail!("New passwords do not match");
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        );
    }
    Ok(())
}
