use clap::Parser;
use radius_core::dictionary::Dictionary;
use radius_server::{Config, Server, SimpleHandler};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Generic RADIUS server (RFC 2865/2866/3576)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius-server")]
struct Cli {
    /// Path to the configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate the configuration and exit
    #[arg(short, long)]
    validate: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(config) => config,
        Err(error) => {
            init_tracing("info");

            if cli.validate {
                error!("configuration invalid: {error}");
                process::exit(1);
            }

            warn!("could not load configuration from {}: {error}", cli.config_path);
            info!("writing an example configuration to {}", cli.config_path);
            if let Err(error) = Config::example().to_file(&cli.config_path) {
                error!("could not write example configuration: {error}");
                process::exit(1);
            }
            info!("edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate {
        println!("configuration valid");
        println!("  listeners: {}:{{{}, {}, {}}}", config.bind_address, config.auth_port, config.acct_port, config.coa_port);
        println!("  dictionary: {}", config.dictionary_path);
        println!("  clients: {}", config.clients.len());
        println!("  users: {}", config.users.len());
        process::exit(0);
    }

    init_tracing(config.log_level.as_deref().unwrap_or("info"));

    info!("radius-server v{}", env!("CARGO_PKG_VERSION"));
    info!("configuration loaded from {}", cli.config_path);

    let dictionary = match Dictionary::from_file(&config.dictionary_path) {
        Ok(dictionary) => dictionary,
        Err(error) => {
            error!("could not load dictionary {}: {error}", config.dictionary_path);
            process::exit(1);
        }
    };
    info!(
        "dictionary {} loaded: {} attributes, {} values, {} vendors",
        config.dictionary_path,
        dictionary.attributes().len(),
        dictionary.values().len(),
        dictionary.vendors().len()
    );

    if config.clients.is_empty() && config.secret.is_empty() {
        warn!("no clients and no fallback secret configured, every request will be dropped");
    }

    let handler = Arc::new(SimpleHandler::new(config.users.clone()));
    let server = match Server::new(config, dictionary, handler) {
        Ok(server) => server,
        Err(error) => {
            error!("invalid server configuration: {error}");
            process::exit(1);
        }
    };

    if let Err(error) = server.run().await {
        error!("server error: {error}");
        process::exit(1);
    }
}
