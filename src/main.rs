use std::fs;
use std::io::Read;

use anyhow::{bail, Context, Result};

use pdf_lote::{logger, BatchOrchestrator, Config, RenderRequest};

/// Reads a batch request JSON (file path or `-` for stdin), renders
/// every item and writes the resulting archive next to the caller.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logger::init(config.verbose_logging);

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => path,
        None => bail!("usage: pdf_lote <request.json | -> [output.zip]"),
    };
    let output = args.next().unwrap_or_else(|| config.archive_name.clone());

    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        fs::read_to_string(&input).with_context(|| format!("failed to read {}", input))?
    };

    let request: RenderRequest =
        serde_json::from_str(&raw).context("request body is not valid JSON")?;

    let orchestrator = BatchOrchestrator::new(config);
    let result = orchestrator.run_request(request).await?;

    fs::write(&output, &result.archive).with_context(|| format!("failed to write {}", output))?;
    println!(
        "{}: {} de {} documento(s) no arquivo",
        output, result.stats.rendered, result.stats.total
    );

    Ok(())
}
