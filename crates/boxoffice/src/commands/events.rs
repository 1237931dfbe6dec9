//! Events command - browse the catalog.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};

use boxoffice_client::Event;
use boxoffice_session::Route;

use super::Context;

/// Arguments for the events command.
#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List all events
    List {
        /// Maximum events to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a specific event
    Show {
        /// Event ID
        id: String,
    },

    /// Search events
    Search {
        /// Search query
        query: String,
    },
}

/// Run the events command.
pub async fn run(args: EventsArgs, ctx: &Context) -> Result<()> {
    let events = ctx.gateway.services().events();

    match args.command {
        EventsCommand::List { limit } => {
            ctx.require(Route::Events)?;
            let list = events.list().await?;
            ctx.output(&list, || print_list("Events", &list, limit))
        }
        EventsCommand::Show { id } => {
            ctx.require(Route::EventDetails(id.clone()))?;
            let event = events.get(&id).await?;
            ctx.output(&event, || print_event(&event))
        }
        EventsCommand::Search { query } => {
            ctx.require(Route::Events)?;
            let hits = events.search(query.as_str()).await?;
            ctx.output(&hits, || {
                print_list(&format!("Events matching \"{}\"", query), &hits, usize::MAX)
            })
        }
    }
}

fn print_list(title: &str, events: &[Event], limit: usize) {
    let dim = Style::new().dim();
    println!("{}", style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if events.is_empty() {
        println!("{}", dim.apply_to("No events found"));
        return;
    }

    for event in events.iter().take(limit) {
        println!(
            "{} {} {}",
            dim.apply_to(format!("[{}]", event.id)),
            event.title,
            dim.apply_to(format!("· {} · {} kr", event.location, event.price))
        );
    }
    if events.len() > limit {
        println!(
            "{}",
            dim.apply_to(format!("... and {} more", events.len() - limit))
        );
    }
}

fn print_event(event: &Event) {
    let dim = Style::new().dim();
    println!("{}", style(&event.title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    if !event.category.is_empty() {
        println!("  {} {}", dim.apply_to("Category:"), event.category);
    }
    if !event.location.is_empty() {
        println!("  {} {}", dim.apply_to("Location:"), event.location);
    }
    if let (Some(start), Some(end)) = (&event.start_date, &event.end_date) {
        println!("  {} {} - {}", dim.apply_to("When:"), start, end);
    }
    println!("  {} {} kr", dim.apply_to("Price:"), event.price);
    if let Some(max) = event.max_tickets {
        println!("  {} {}", dim.apply_to("Capacity:"), max);
    }
    if !event.description.is_empty() {
        println!();
        println!("{}", event.description);
    }
}
