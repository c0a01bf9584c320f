//! Subcommand handlers.
//!
//! Each handler runs against an already-initialized `SessionStore`.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::warn;

use crmdesk_core::config::Config;
use crmdesk_core::gate::{GateDecision, Route};
use crmdesk_core::models::{RegisterRequest, Role, User};
use crmdesk_core::SessionStore;

pub async fn login(
    session: &SessionStore,
    config: &mut Config,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if let Some(user) = session.current_user() {
        println!("Already signed in as {}; signing in again.", user.name);
    }

    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    if email.is_empty() {
        bail!("Email is required");
    }
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let user = session
        .login(&email, &password)
        .await
        .context("Login failed")?;

    remember_email(config, email);
    print_signed_in(&user);
    Ok(())
}

pub async fn register(
    session: &SessionStore,
    config: &mut Config,
    name: String,
    email: String,
    department: String,
    role: Role,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let request = RegisterRequest {
        name,
        email: email.clone(),
        password,
        department,
        role,
    };
    let user = session
        .register(&request)
        .await
        .context("Registration failed")?;

    remember_email(config, email);
    print_signed_in(&user);
    Ok(())
}

pub fn logout(session: &SessionStore) {
    session.logout();
    println!("Signed out.");
}

pub fn whoami(session: &SessionStore) {
    match session.current_user() {
        Some(user) => {
            println!("{}", user.display_line());
            if let Some(ref email) = user.email {
                println!("{}", email);
            }
        }
        None => println!("Not signed in."),
    }
}

pub fn open(session: &SessionStore, path: &str) {
    let route = Route::from_path(path);
    match session.gate(route) {
        GateDecision::Loading => println!("Loading..."),
        GateDecision::Redirect(target) => println!("{} -> redirect to {}", route, target),
        GateDecision::Render(route, Some(user)) => {
            println!("{} (signed in as {})", route, user.name)
        }
        GateDecision::Render(route, None) => println!("{}", route),
    }
}

pub async fn get(session: &SessionStore, path: &str) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not signed in. Run `crmdesk login` first.");
    }

    let body: Value = session
        .http()
        .get(path)
        .await
        .with_context(|| format!("GET {} failed", path))?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn remember_email(config: &mut Config, email: String) {
    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn print_signed_in(user: &User) {
    println!("Signed in as {}", user.display_line());
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_email {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}
