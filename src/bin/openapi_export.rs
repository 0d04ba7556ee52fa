use std::{fs, path::PathBuf};

use clap::Parser;
use marketplace_api::openapi::ApiDocV1;
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "openapi-export", about = "Write the OpenAPI document")]
struct Cli {
    /// Output file; `-` prints to stdout
    #[arg(short, long, default_value = "openapi/marketplace-api.v1.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = serde_json::to_string_pretty(&ApiDocV1::openapi())?;

    if cli.output.as_os_str() == "-" {
        println!("{}", json);
        return Ok(());
    }

    if let Some(dir) = cli.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(&cli.output, json)?;

    println!("OpenAPI document written to {}", cli.output.display());
    Ok(())
}
