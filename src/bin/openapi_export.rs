//! Writes the OpenAPI document for the `/api/v1` routes.
//!
//! Usage: `openapi-export [OUTPUT]`. `-` prints to stdout; without an
//! argument the document goes to `openapi/medimart-api.v1.json`.

use std::{env, fs, path::Path};

use anyhow::Context;
use medimart_api::openapi::ApiDocV1;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi/medimart-api.v1.json";

fn main() -> anyhow::Result<()> {
    let document = ApiDocV1::openapi();
    let json = document
        .to_pretty_json()
        .context("serializing OpenAPI document")?;

    let target = env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if target == "-" {
        println!("{}", json);
        return Ok(());
    }

    let output_path = Path::new(&target);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(output_path, json)
        .with_context(|| format!("writing {}", output_path.display()))?;

    eprintln!(
        "{} API paths written to {}",
        document.paths.paths.len(),
        output_path.display()
    );
    Ok(())
}
