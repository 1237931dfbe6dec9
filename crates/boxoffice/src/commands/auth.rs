//! Login, registration, logout and whoami.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};

use boxoffice_client::RegisterRequest;

use super::{Context, print_ok};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "BOXOFFICE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the register command.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email
    pub email: String,

    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "BOXOFFICE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let password = password_or_prompt(args.password)?;

    if let Err(e) = ctx.gateway.login(&args.email, &password).await {
        bail!("{}", e.message());
    }

    let identity = ctx.gateway.current_identity();
    ctx.output(&identity, || {
        let name = identity
            .as_ref()
            .map(|i| i.display_name())
            .unwrap_or_else(|| args.email.clone());
        print_ok(format!("Logged in as {}", name));
    })
}

/// Run the register command.
pub async fn register(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let password = password_or_prompt(args.password)?;

    let request = RegisterRequest {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password,
        phone_number: args.phone,
    };

    if let Err(e) = ctx.gateway.register(&request).await {
        bail!("{}", e.message());
    }

    let identity = ctx.gateway.current_identity();
    ctx.output(&identity, || {
        let name = identity
            .as_ref()
            .map(|i| i.display_name())
            .unwrap_or_else(|| request.email.clone());
        print_ok(format!("Account created, logged in as {}", name));
    })
}

/// Run the logout command.
pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.gateway.logout().await;
    ctx.output(&serde_json::json!({"loggedOut": true}), || {
        print_ok("Logged out");
    })
}

/// Run the whoami command.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let identity = ctx.gateway.current_identity();

    ctx.output(&identity, || {
        let dim = Style::new().dim();
        match &identity {
            Some(identity) => {
                println!("{}", style(identity.display_name()).bold());
                if let Some(email) = &identity.email {
                    println!("  {} {}", dim.apply_to("Email:"), email);
                }
                if let Some(id) = &identity.id {
                    println!("  {} {}", dim.apply_to("Id:"), id);
                }
                if let Some(role) = &identity.role {
                    println!("  {} {}", dim.apply_to("Role:"), role);
                }
                if let Some(expires_at) = identity.expires_at() {
                    let note = if identity.looks_expired(chrono::Utc::now()) {
                        " (expired)"
                    } else {
                        ""
                    };
                    println!(
                        "  {} {}{}",
                        dim.apply_to("Expires:"),
                        expires_at.to_rfc3339(),
                        note
                    );
                }
                if ctx.verbose {
                    for (claim, value) in &identity.claims {
                        println!("  {} {}", dim.apply_to(format!("{}:", claim)), value);
                    }
                }
            }
            None => println!("{}", dim.apply_to("Not logged in")),
        }
    })
}
