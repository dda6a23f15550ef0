use std::env;
use std::fs;
use std::process;

use anyhow::{Context, Result};

mod config;

const APP_NAME: &str = "scout";

fn main() {
    init_logging();
    // Startup errors keep the inherited graceful behavior: message, exit 0.
    let code = match real_main() {
        Ok(code) => code,
        Err(err) => {
            println!("{err:#}");
            0
        }
    };
    process::exit(code);
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scout=warn,scoutlib=warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}

fn real_main() -> Result<i32> {
    let argv: Vec<String> = env::args().skip(1).collect();
    if argv.is_empty() {
        println!("Error");
        return Ok(0);
    }

    let paths = config::ConfigPaths::locate()?;

    // First-run bootstrap; the run then continues into the normal flow, which
    // tells the user to point baseURL at a real server.
    if argv[0] == "init" {
        config::bootstrap(&paths)?;
    }

    let env_map = config::load_env(&paths)?;
    let base_url = env_map
        .get(config::BASE_URL_KEY)
        .cloned()
        .unwrap_or_default();
    if base_url == config::BASE_URL_PLACEHOLDER {
        println!(
            "Please set the scout server address in {}",
            paths.env_file.display()
        );
        return Ok(0);
    }

    let mapping_text = fs::read_to_string(&paths.structure_file).with_context(|| {
        format!(
            "failed to read {} (run `scout init` first)",
            paths.structure_file.display()
        )
    })?;
    let root = scoutlib::mapping::parse_endpoint_map(&mapping_text)?;

    let user_agent = format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION"));
    let transport = scoutlib::HttpTransport::new(&user_agent)?;
    Ok(scoutlib::cli::drive(&root, &base_url, &argv, &transport))
}
