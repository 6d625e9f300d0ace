use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "asaas-cli")]
#[command(about = "Operator CLI for the Asaas forwarding proxy", long_about = None)]
struct Cli {
    /// Base URL of a running proxy.
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Key sent in the x-asaas-key header, for proxies without a server-side key.
    #[arg(short, long, env = "ASAAS_CLI_KEY")]
    key: Option<String>,

    /// Routing prefix the proxy listens under.
    #[arg(long, default_value = "/api/asaas")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy health
    Health,
    /// GET an upstream resource, e.g. `get finance/balance -q limit=10`
    Get {
        path: String,
        /// Query parameters as key=value
        #[arg(short, long = "query")]
        query: Vec<String>,
    },
    /// POST a JSON body to an upstream resource
    Post {
        path: String,
        #[arg(short, long)]
        body: String,
    },
    /// PUT a JSON body to an upstream resource
    Put {
        path: String,
        #[arg(short, long)]
        body: String,
    },
    /// DELETE an upstream resource
    Delete { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    // Tagged so the call can be found in the proxy logs.
    let request_id = Uuid::new_v4().to_string();
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_str(&request_id)?);
    if let Some(key) = &cli.key {
        headers.insert("x-asaas-key", HeaderValue::from_str(key)?);
    }

    let base = cli.url.trim_end_matches('/');
    let prefix = cli.prefix.trim_matches('/');
    let resource = |path: &str| format!("{}/{}/{}", base, prefix, path.trim_start_matches('/'));

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Get { path, query } => {
            let pairs = query
                .iter()
                .map(|pair| {
                    pair.split_once('=')
                        .ok_or_else(|| format!("query parameter '{}' is not key=value", pair))
                })
                .collect::<Result<Vec<_>, _>>()?;
            client.get(resource(&path)).query(&pairs)
        }
        Commands::Post { path, body } => json_request(&client, Method::POST, &resource(&path), &body)?,
        Commands::Put { path, body } => json_request(&client, Method::PUT, &resource(&path), &body)?,
        Commands::Delete { path } => client.delete(resource(&path)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res, &request_id).await?;
    Ok(())
}

fn json_request(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: &str,
) -> Result<reqwest::RequestBuilder, Box<dyn std::error::Error>> {
    // Validate locally so typos never reach the proxy.
    let value: Value = serde_json::from_str(body)?;
    Ok(client
        .request(method, url)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_string(&value)?))
}

async fn print_response(
    res: reqwest::Response,
    request_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: proxy returned status {} (request id {})", status, request_id);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
