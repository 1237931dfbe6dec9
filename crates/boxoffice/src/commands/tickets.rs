//! Tickets command - purchase and manage tickets.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};

use boxoffice_client::{ResourceId, Ticket, TicketStatus};
use boxoffice_session::Route;

use super::{Context, print_ok};

/// Arguments for the tickets command.
#[derive(Args, Debug)]
pub struct TicketsArgs {
    #[command(subcommand)]
    pub command: TicketsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TicketsCommand {
    /// Buy a ticket for an event at its listed price
    Buy {
        /// Event ID
        event_id: String,
    },

    /// List your tickets
    List,

    /// Show a specific ticket
    Show {
        /// Ticket ID
        id: String,
    },

    /// Delete a ticket
    Delete {
        /// Ticket ID
        id: String,
    },
}

/// Run the tickets command.
pub async fn run(args: TicketsArgs, ctx: &Context) -> Result<()> {
    ctx.require(Route::MyTickets)?;
    let services = ctx.gateway.services();

    match args.command {
        TicketsCommand::Buy { event_id } => {
            let event = services.events().get(&event_id).await?;
            let ticket = services.tickets().purchase(event.id.clone(), event.price).await?;
            ctx.output(&ticket, || {
                print_ok(format!("Ticket {} bought for {}", short_id(&ticket.id), event.title));
            })
        }
        TicketsCommand::List => {
            let tickets = services.tickets().mine().await?;
            ctx.output(&tickets, || print_list(&tickets))
        }
        TicketsCommand::Show { id } => {
            let ticket = services.tickets().get(&id).await?;
            ctx.output(&ticket, || print_list(std::slice::from_ref(&ticket)))
        }
        TicketsCommand::Delete { id } => {
            services.tickets().delete(&id).await?;
            ctx.output(&serde_json::json!({"deleted": id}), || {
                print_ok(format!("Ticket {} deleted", id));
            })
        }
    }
}

fn short_id(id: &ResourceId) -> String {
    id.to_string().chars().take(8).collect()
}

fn print_list(tickets: &[Ticket]) {
    let dim = Style::new().dim();
    println!("{}", style("My tickets").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if tickets.is_empty() {
        println!("{}", dim.apply_to("No tickets yet"));
        return;
    }

    for ticket in tickets {
        let status = match ticket.status {
            TicketStatus::Active => Style::new().green().apply_to("Active"),
            TicketStatus::Used => dim.apply_to("Used"),
            TicketStatus::Cancelled => Style::new().red().apply_to("Cancelled"),
            TicketStatus::Unknown => dim.apply_to("Unknown"),
        };
        println!(
            "{} {} {} kr {}",
            dim.apply_to(format!("[{}...]", short_id(&ticket.id))),
            status,
            ticket.price,
            dim.apply_to(ticket.purchase_date.as_deref().unwrap_or_default())
        );
    }
}
