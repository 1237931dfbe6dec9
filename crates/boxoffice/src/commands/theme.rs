//! Theme command - light/dark display preference.

use anyhow::Result;
use clap::{Args, Subcommand};

use boxoffice_session::{Route, ThemeMode};

use super::{Context, print_ok};

/// Arguments for the theme command.
#[derive(Args, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: ThemeCommand,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Show the current theme
    Show,

    /// Switch between light and dark
    Toggle,
}

/// Run the theme command.
pub async fn run(args: ThemeArgs, ctx: &Context) -> Result<()> {
    ctx.require(Route::Settings)?;

    let mode = match args.command {
        ThemeCommand::Show => ThemeMode::load(ctx.storage.as_ref()).await?,
        ThemeCommand::Toggle => {
            let mode = ThemeMode::toggle(ctx.storage.as_ref()).await?;
            tracing::debug!(theme = %mode, "Theme toggled");
            mode
        }
    };

    ctx.output(&serde_json::json!({"theme": mode.as_str()}), || {
        print_ok(format!("Theme: {}", mode));
    })
}
