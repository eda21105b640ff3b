//! Command-line consumer of the gateway's catalog surface.
//!
//! Talks only to the gateway; the upstream API key never leaves the server.

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Browse the donghua catalog through the gateway", long_about = None)]
struct Cli {
    /// Gateway base URL including the route prefix.
    #[arg(short, long, default_value = "http://localhost:8080/api/donghua")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest releases
    Home {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Ongoing series
    Ongoing {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Completed series
    Completed {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search by title
    Search { query: String },
    /// List genres, or series in one genre
    Genres {
        slug: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// List seasons, or series in one season
    Seasons {
        slug: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Any path below the gateway prefix, e.g. `detail/some-slug`
    Get { path: String },
}

impl Commands {
    /// Path below the prefix and query pairs for this command.
    fn request(&self) -> (String, Vec<(&'static str, String)>) {
        match self {
            Commands::Home { page } => ("home".into(), vec![("page", page.to_string())]),
            Commands::Ongoing { page } => ("ongoing".into(), vec![("page", page.to_string())]),
            Commands::Completed { page } => {
                ("completed".into(), vec![("page", page.to_string())])
            }
            Commands::Search { query } => ("search".into(), vec![("q", query.clone())]),
            Commands::Genres { slug: None, .. } => ("genres".into(), Vec::new()),
            Commands::Genres {
                slug: Some(slug),
                page,
            } => (format!("genres/{slug}"), vec![("page", page.to_string())]),
            Commands::Seasons { slug: None, .. } => ("seasons".into(), Vec::new()),
            Commands::Seasons {
                slug: Some(slug),
                page,
            } => (format!("seasons/{slug}"), vec![("page", page.to_string())]),
            Commands::Get { path } => (path.trim_matches('/').to_string(), Vec::new()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let (path, query) = cli.command.request();
    let url = format!("{}/{}", cli.url.trim_end_matches('/'), path);

    let res = client.get(url).headers(headers).query(&query).send().await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
