use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use sitesearch::api::create_router;
use sitesearch::api::models::SearchRequest;
use sitesearch::client::session::run_session;
use sitesearch::client::{OrderingPolicy, SearchClient, SearchForm, render};
use sitesearch::config::CONFIG;
use sitesearch::query_engine::QueryEngine;

#[derive(Parser)]
#[command(name = "sitesearch", about = "Search a web page for passages matching a query")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the search API server
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000
        #[arg(long)]
        addr: Option<String>,
        /// Results returned per search
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Submit the form once and print the outcome
    Search {
        #[arg(long)]
        url: String,
        #[arg(long)]
        query: String,
        /// Base URL of the search API
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        policy: OrderingPolicy,
    },
    /// Interactive form reading commands from stdin
    Form {
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        policy: OrderingPolicy,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { addr, top_k } => serve(addr, top_k).await,
        Command::Search {
            url,
            query,
            api_base,
            policy,
        } => search_once(api_base, policy, url, query).await,
        Command::Form { api_base, policy } => {
            let client = Arc::new(client_for(api_base)?);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_session(client, policy, stdin, tokio::io::stdout()).await?;
            Ok(())
        }
    }
}

fn client_for(api_base: Option<String>) -> anyhow::Result<SearchClient> {
    let base = api_base.unwrap_or_else(|| CONFIG.api_base.clone());
    Ok(SearchClient::new(&base)?)
}

async fn serve(addr: Option<String>, top_k: Option<usize>) -> anyhow::Result<()> {
    let addr = addr.unwrap_or_else(|| CONFIG.server_addr.clone());
    let top_k = top_k.unwrap_or(CONFIG.top_k);
    let engine = Arc::new(QueryEngine::from_config(&CONFIG)?);
    let app = create_router(engine, top_k);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("search API listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn search_once(
    api_base: Option<String>,
    policy: OrderingPolicy,
    url: String,
    query: String,
) -> anyhow::Result<()> {
    let client = client_for(api_base)?;
    let mut form = SearchForm::new(policy);
    form.set_url(url);
    form.set_query(query);

    let Some(submission) = form.start_submit() else {
        bail!("both --url and --query must be non-empty");
    };
    let SearchRequest { url, query } = &submission.request;
    tracing::info!("searching {url} for {query:?} via {}", client.endpoint());

    let outcome = client.search(&submission.request).await;
    let alert = form.apply(submission.seq, outcome);
    print!("{}", render(&form));
    if let Some(alert) = alert {
        eprintln!("{alert}");
        bail!("search failed ({})", alert.kind);
    }
    Ok(())
}
