//! Command-line entry point.
//!
//! # Responsibility
//! - Load process settings and start logging when configured.
//! - Open the database once and route one request through the API boundary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use staffing_api::{ApiRequest, AppContext, AppSettings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "staffing", version, about = "Staffing capacity management")]
struct Cli {
    /// Database file, overriding `STAFFING_DB_PATH`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log directory, overriding `STAFFING_LOG_DIR`.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Log level, overriding `STAFFING_LOG_LEVEL`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Health check.
    Ping,
    /// Print the core version.
    Version,
    /// Open the database and apply pending migrations.
    Migrate,
    /// Send one request through the router and print the response.
    Request {
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        path: String,
        /// Raw JSON body.
        #[arg(long)]
        body: Option<String>,
        /// Team scope sent as the `x-team` header.
        #[arg(long)]
        team: Option<String>,
        /// Query parameters as `name=value`.
        #[arg(long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ping => {
            println!("staffing_core ping={}", staffing_core::ping());
            return Ok(());
        }
        Command::Version => {
            println!("staffing_core version={}", staffing_core::core_version());
            return Ok(());
        }
        _ => {}
    }

    let mut settings = AppSettings::load().context("failed to load settings")?;
    if let Some(db) = cli.db {
        settings.staffing_db_path = db;
    }
    if let Some(log_dir) = cli.log_dir {
        settings.staffing_log_dir = Some(log_dir);
    }
    if let Some(level) = cli.log_level {
        settings.staffing_log_level = level;
    }
    settings
        .init_logging()
        .context("failed to initialize logging")?;

    let (ctx, report) = AppContext::open_with_report(&settings).with_context(|| {
        format!(
            "failed to open database `{}`",
            settings.staffing_db_path.display()
        )
    })?;

    match cli.command {
        Command::Migrate => {
            info!(
                "event=cli_migrate module=cli status=ok db={} from={} to={}",
                settings.staffing_db_path.display(),
                report.previous,
                report.current
            );
            println!(
                "schema version {} (applied {} step(s)): {}",
                report.current,
                report.applied(),
                settings.staffing_db_path.display()
            );
        }
        Command::Request {
            method,
            path,
            body,
            team,
            query,
        } => {
            let mut request = ApiRequest::new(method, path);
            if let Some(body) = body {
                request = request.with_body(body);
            }
            if let Some(team) = team {
                request = request.with_header(staffing_api::TEAM_HEADER, team);
            }
            for (name, value) in query {
                request = request.with_query(name, value);
            }

            let response = ctx.handle(&request);
            println!("{}", response.status_code);
            if let Some(body) = response.body.as_ref() {
                println!("{}", serde_json::to_string_pretty(body)?);
            }
        }
        Command::Ping | Command::Version => {}
    }
    Ok(())
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::{parse_pair, Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_request_with_overrides() {
        let cli = Cli::try_parse_from([
            "staffing",
            "--db",
            "/tmp/staffing.sqlite3",
            "request",
            "--method",
            "POST",
            "--path",
            "/projects",
            "--team",
            "SAP",
            "--query",
            "status=active",
        ])
        .unwrap();

        assert_eq!(
            cli.db.as_deref(),
            Some(std::path::Path::new("/tmp/staffing.sqlite3"))
        );
        match cli.command {
            Command::Request {
                method,
                path,
                team,
                query,
                ..
            } => {
                assert_eq!(method, "POST");
                assert_eq!(path, "/projects");
                assert_eq!(team.as_deref(), Some("SAP"));
                assert_eq!(query, vec![("status".to_string(), "active".to_string())]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn query_pair_requires_separator() {
        assert!(parse_pair("month").is_err());
        assert_eq!(
            parse_pair("month=3").unwrap(),
            ("month".to_string(), "3".to_string())
        );
    }
}
