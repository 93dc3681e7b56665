use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jasmine_auth::routes::{self, RouteAccess};
use jasmine_auth::{GateOutcome, Menu, PermissionState};
use jasmine_client::{Portal, PortalConfig, SqliteStorage};
use jasmine_core::RoleId;

#[derive(Parser)]
#[command(name = "jasmine")]
#[command(about = "Jasmine B2B portal client")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session
    Login {
        username: String,
        #[arg(long, env = "JASMINE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the current session and its permissions
    Whoami,
    /// Show the navigation menu for the current session
    Menu,
    /// Check what navigating to a portal path would show
    Open { path: String },
    /// Custom role management
    Roles {
        #[command(subcommand)]
        command: RolesCommand,
    },
}

#[derive(Subcommand)]
enum RolesCommand {
    List,
    Show { id: RoleId },
    Delete { id: RoleId },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Whoami => "whoami",
            Command::Menu => "menu",
            Command::Open { .. } => "open",
            Command::Roles { command: RolesCommand::List } => "roles list",
            Command::Roles { command: RolesCommand::Show { .. } } => "roles show",
            Command::Roles { command: RolesCommand::Delete { .. } } => "roles delete",
        }
    }
}

type CliPortal = Portal<SqliteStorage>;

#[tokio::main]
async fn main() -> Result<()> {
    jasmine_observability::init();
    let cli = Cli::parse();

    let config = PortalConfig::from_env().context("invalid portal configuration")?;
    tracing::debug!(
        api_url = %config.api_url,
        session_db = %config.session_db.display(),
        policy = ?config.gate_policy,
        "configuration loaded"
    );
    let storage = SqliteStorage::open(&config.session_db)
        .await
        .with_context(|| format!("failed to open session database at {}", config.session_db.display()))?;

    let mut portal = Portal::from_config(&config, storage)?;
    portal.bootstrap().await?;

    tracing::debug!(command = cli.command.name(), logged_in = portal.session().is_logged_in(), "running");
    match cli.command {
        Command::Login { username, password } => {
            let landing = portal.login(&username, &password).await?;
            println!("Signed in as {username}; landing page {landing}");
        }
        Command::Logout => {
            let next = portal.logout().await?;
            println!("Signed out; next page {next}");
        }
        Command::Whoami => whoami(&portal, cli.json).await?,
        Command::Menu => {
            let menu = portal.menu().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&menu)?);
            } else {
                print_menu(&menu);
            }
        }
        Command::Open { path } => {
            let outcome = portal.open(&path).await?;
            let route = match routes::lookup(&path) {
                Some(RouteAccess::Protected(route)) => Some(route),
                _ => None,
            };
            if let Some(route) = route {
                tracing::debug!(path = route.path, title = route.title, "route matched");
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if let Some(route) = route {
                println!("{} ({}): {}", route.title, route.path, describe(&outcome));
            } else {
                println!("{}", describe(&outcome));
            }
        }
        Command::Roles { command } => roles(&portal, command, cli.json).await?,
    }

    Ok(())
}

async fn whoami(portal: &CliPortal, json: bool) -> Result<()> {
    let session = portal.session();
    if !session.is_logged_in() {
        println!("Not signed in");
        return Ok(());
    }

    let state = portal.permission_state().await?;
    if json {
        let visible = state
            .map()
            .map(|m| m.visible_modules().iter().map(|k| k.as_str()).collect::<Vec<_>>());
        let body = serde_json::json!({
            "username": session.username(),
            "user_type": session.user_type.as_str(),
            "role_id": session.user.as_ref().and_then(|u| u.role_id),
            "visible_modules": visible,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("User:      {}", session.username().unwrap_or("(unknown)"));
    println!("Type:      {}", session.user_type);
    if let Some(role_id) = session.user.as_ref().and_then(|u| u.role_id) {
        println!("Role:      #{role_id}");
    }
    let summary = match &state {
        PermissionState::Pending => "loading".to_string(),
        PermissionState::Resolved { map, origin } => format!(
            "{} (from {origin})",
            map.visible_modules().iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        ),
        PermissionState::BaseMenu(reason) => format!("default portal view ({reason:?})"),
        PermissionState::Unresolvable => "none".to_string(),
    };
    println!("Modules:   {summary}");
    Ok(())
}

async fn roles(portal: &CliPortal, command: RolesCommand, json: bool) -> Result<()> {
    let api = portal.api();
    match command {
        RolesCommand::List => {
            let roles = api.list_roles().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&roles)?);
                return Ok(());
            }
            for role in roles {
                let modules = match role.permission_map() {
                    Ok(map) => map.visible_modules().iter().map(|k| k.as_str()).collect::<Vec<_>>().join(","),
                    Err(err) => format!("<{err}>"),
                };
                let status = if role.is_active() { "active" } else { "inactive" };
                println!("{:>5}  {:<24} {:<8} {}", format!("#{}", role.id), role.role_name, status, modules);
            }
        }
        RolesCommand::Show { id } => {
            let role = api.get_role(id).await?;
            println!("{}", serde_json::to_string_pretty(&role)?);
        }
        RolesCommand::Delete { id } => {
            api.delete_role(id).await?;
            println!("Deleted role #{id}");
        }
    }
    Ok(())
}

fn print_menu(menu: &Menu) {
    if menu.is_empty() {
        println!("(no menu entries)");
        return;
    }
    for section in &menu.sections {
        println!("{}", section.title);
        for entry in &section.entries {
            println!("  {:<24} {}", entry.label, entry.path);
        }
    }
}

fn describe(outcome: &GateOutcome) -> String {
    match outcome {
        GateOutcome::RedirectToLogin => "redirect: /login".to_string(),
        GateOutcome::RedirectHome => "redirect: /".to_string(),
        GateOutcome::Redirect { to } => format!("redirect: {to}"),
        GateOutcome::RoleAssignmentRequired(diag) => format!(
            "role assignment required (user {}, role {})",
            diag.username.as_deref().unwrap_or("?"),
            diag.coarse_role.as_deref().unwrap_or("?")
        ),
        GateOutcome::Loading => "loading permissions".to_string(),
        GateOutcome::Render { banner: None } => "render".to_string(),
        GateOutcome::Render { banner: Some(banner) } => format!("render with notice: {}", banner.text()),
        GateOutcome::AccessDenied(report) => {
            format!("access denied: {}\n{}", report.reason, report.permissions_dump)
        }
        GateOutcome::NotFound => "not found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_and_name_themselves() {
        let cli = Cli::try_parse_from(["jasmine", "roles", "show", "7", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.command.name(), "roles show");
        assert!(matches!(cli.command, Command::Roles { command: RolesCommand::Show { id } } if id == RoleId::new(7)));

        let cli = Cli::try_parse_from(["jasmine", "login", "acme", "--password", "secret"]).unwrap();
        assert_eq!(cli.command.name(), "login");

        assert!(Cli::try_parse_from(["jasmine", "roles", "delete", "seven"]).is_err());
    }
}
