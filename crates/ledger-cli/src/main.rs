use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5000)
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction to the mempool
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Receiver
        #[arg(long)]
        receiver: String,
        /// Amount, any JSON number
        #[arg(long, allow_negative_numbers = true)]
        amount: serde_json::Number,
    },
    /// Mine the next block
    Mine,
    /// Print the full chain
    Chain,
    /// Ask the node to validate its chain
    Valid,
    /// Register peers with the node
    Connect {
        /// Peer addresses (host:port or URL)
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// Run a consensus round against the node's peers
    Consensus,
    /// Show pending transactions
    Mempool,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    receiver: String,
    amount: serde_json::Number,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<String>,
}

fn request(client: &Client, node: &str, cmd: Command) -> RequestBuilder {
    let node = node.trim_end_matches('/');
    match cmd {
        Command::Submit {
            sender,
            receiver,
            amount,
        } => client.post(format!("{node}/add_transaction")).json(&Tx {
            sender,
            receiver,
            amount,
        }),
        Command::Mine => client.get(format!("{node}/mine_block")),
        Command::Chain => client.get(format!("{node}/get_chain")),
        Command::Valid => client.get(format!("{node}/is_valid")),
        Command::Connect { nodes } => client
            .post(format!("{node}/connect_node"))
            .json(&Nodes { nodes }),
        Command::Consensus => client.get(format!("{node}/consensus")),
        Command::Mempool => client.get(format!("{node}/mempool")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = Client::new();
    let req = request(&client, &cli.node, cli.cmd);
    debug!(?req, "sending request");

    let res = req
        .send()
        .await
        .with_context(|| format!("could not reach node at {}", cli.node))?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
