//! Waitline CLI - Command-line client for the Waitline queue engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9460";

#[derive(Parser)]
#[command(name = "waitline")]
#[command(about = "Waitline queue engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WAITLINE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Admin token for privileged commands
    #[arg(long, env = "WAITLINE_ADMIN_TOKEN")]
    admin_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new queue (admin)
    Create {
        /// Queue name
        name: String,

        /// Bound on simultaneously waiting entries (unbounded if omitted)
        #[arg(short, long)]
        capacity: Option<i64>,
    },

    /// Join a queue
    Join {
        /// Queue ID
        queue_id: String,

        /// User ID
        #[arg(short, long)]
        user: String,
    },

    /// Leave a queue (self-service removal)
    Leave {
        /// Queue ID
        queue_id: String,

        /// User ID
        #[arg(short, long)]
        user: String,
    },

    /// Complete or remove an entry (admin)
    Advance {
        /// Queue ID
        queue_id: String,

        /// User ID
        #[arg(short, long)]
        user: String,

        /// Action: "complete" or "remove"
        #[arg(short, long, default_value = "complete")]
        action: String,
    },

    /// List the waiting entries of a queue
    List {
        /// Queue ID
        queue_id: String,
    },

    /// List all queues
    Queues,

    /// Delete a queue and all its entries (admin)
    Delete {
        /// Queue ID
        queue_id: String,
    },

    /// Show system status (admin)
    Status,

    /// Run maintenance operations (admin)
    Maintenance {
        /// Force VACUUM even if not needed
        #[arg(long)]
        force_vacuum: bool,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct EntryRow {
    #[tabled(rename = "Rank")]
    rank: u64,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Position")]
    position: i64,
    #[tabled(rename = "Joined At (ms)")]
    joined_at: i64,
}

#[derive(Deserialize, Tabled)]
struct QueueRow {
    #[tabled(rename = "Queue ID")]
    queue_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Capacity", display_with = "display_capacity")]
    max_capacity: Option<i64>,
}

fn display_capacity(capacity: &Option<i64>) -> String {
    match capacity {
        Some(c) => c.to_string(),
        None => "unbounded".to_string(),
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn require_admin_token(token: &Option<String>) -> Result<String> {
    token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Admin command requires --admin-token (or WAITLINE_ADMIN_TOKEN)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create { name, capacity } => {
            let admin_token = require_admin_token(&cli.admin_token)?;
            let params = json!({
                "name": name,
                "max_capacity": capacity,
                "admin_token": admin_token,
            });

            let result = call_rpc(&cli.rpc_url, "queue.create.v1", params).await?;
            let queue = &result["queue"];

            println!("{}", "✓ Queue created".green().bold());
            println!();
            println!("  {} {}", "Queue ID:".bold(), queue["queue_id"]);
            println!("  {} {}", "Name:".bold(), queue["name"]);
        }

        Commands::Join { queue_id, user } => {
            let params = json!({
                "queue_id": queue_id,
                "user_id": user,
            });

            let result = call_rpc(&cli.rpc_url, "queue.join.v1", params).await?;
            let entry = &result["entry"];

            println!("{}", "✓ Joined queue".green().bold());
            println!();
            println!("  {} {}", "Position:".bold(), entry["position"]);
            if let Some(rank) = entry.get("rank").and_then(|v| v.as_u64()) {
                println!("  {} {}", "Rank:".bold(), rank);
            }
        }

        Commands::Leave { queue_id, user } => {
            let params = json!({
                "queue_id": queue_id,
                "user_id": user,
            });

            call_rpc(&cli.rpc_url, "queue.leave.v1", params).await?;

            println!("{}", format!("✓ {} left queue {}", user, queue_id).green().bold());
        }

        Commands::Advance {
            queue_id,
            user,
            action,
        } => {
            let admin_token = require_admin_token(&cli.admin_token)?;
            let params = json!({
                "queue_id": queue_id,
                "user_id": user,
                "action": action,
                "admin_token": admin_token,
            });

            let result = call_rpc(&cli.rpc_url, "queue.advance.v1", params).await?;

            println!("{}", format!("✓ Entry for {} advanced ({})", user, action).green().bold());
            if let Some(next) = result.get("next_user_id").and_then(|v| v.as_str()) {
                println!("  {} {}", "Next up:".bold(), next);
            }
        }

        Commands::List { queue_id } => {
            let params = json!({ "queue_id": queue_id });

            let result = call_rpc(&cli.rpc_url, "queue.list.v1", params).await?;
            let entries: Vec<EntryRow> = serde_json::from_value(result["entries"].clone())?;

            if entries.is_empty() {
                println!("{}", "Queue is empty".yellow());
            } else {
                println!("{}", format!("Waiting entries in {}", queue_id).cyan().bold());
                println!();
                let table = Table::new(entries).to_string();
                println!("{}", table);
            }
        }

        Commands::Queues => {
            let result = call_rpc(&cli.rpc_url, "queues.list.v1", json!({})).await?;
            let queues: Vec<QueueRow> = serde_json::from_value(result["queues"].clone())?;

            if queues.is_empty() {
                println!("{}", "No queues".yellow());
            } else {
                let table = Table::new(queues).to_string();
                println!("{}", table);
            }
        }

        Commands::Delete { queue_id } => {
            let admin_token = require_admin_token(&cli.admin_token)?;
            let params = json!({
                "queue_id": queue_id,
                "admin_token": admin_token,
            });

            let result = call_rpc(&cli.rpc_url, "queue.delete.v1", params).await?;

            println!(
                "{}",
                format!(
                    "✓ Queue {} deleted ({} entries removed)",
                    queue_id, result["deleted_entries"]
                )
                .green()
                .bold()
            );
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            let admin_token = require_admin_token(&cli.admin_token)?;
            match call_rpc(
                &cli.rpc_url,
                "admin.stats.v1",
                json!({ "admin_token": admin_token }),
            )
            .await
            {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Queues:".bold(), stats["queues"]);
                    println!("  {} {}", "Waiting:".bold(), stats["waiting_entries"]);
                    println!("  {} {}", "Completed:".bold(), stats["completed_entries"]);
                    println!();
                    let db_mb =
                        stats["db_size_bytes"].as_i64().unwrap_or(0) as f64 / (1024.0 * 1024.0);
                    println!("  {} {:.2} MB", "DB Size:".bold(), db_mb);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Maintenance { force_vacuum } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            let admin_token = require_admin_token(&cli.admin_token)?;
            let params = json!({
                "force_vacuum": force_vacuum,
                "admin_token": admin_token,
            });

            let result = call_rpc(&cli.rpc_url, "admin.maintenance.v1", params).await?;

            println!("  ✓ Maintenance completed");
            println!();
            if result["vacuum_run"].as_bool().unwrap_or(false) {
                println!("  {} VACUUM executed", "✓".green());
            } else {
                println!("  ○ VACUUM skipped (not needed)");
            }
            println!(
                "  {} {} entries deleted",
                "✓".green(),
                result["entries_deleted"]
            );
            println!();
            println!(
                "  {} {:.2} MB → {:.2} MB",
                "DB Size:".bold(),
                result["db_size_before_mb"].as_f64().unwrap_or(0.0),
                result["db_size_after_mb"].as_f64().unwrap_or(0.0)
            );
        }
    }

    Ok(())
}
