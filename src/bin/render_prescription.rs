use anyhow::Context;
use clap::Parser;
use rx_doc_bot::utils::logger;
use rx_doc_bot::{decode_prescription, DocumentPipeline, PrescriptionRenderer, WkhtmltopdfConverter};
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "render-prescription")]
#[command(about = "Render a prescription payload to HTML or PDF without the bot")]
struct Args {
    /// JSON payload file, or '-' for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Where to write the result
    #[arg(short, long, default_value = "prescription.pdf")]
    output: PathBuf,

    /// Write the intermediate HTML instead of converting it
    #[arg(long)]
    html: bool,

    #[arg(long, env = "WKHTMLTOPDF_PATH", default_value = rx_doc_bot::adapters::wkhtmltopdf::DEFAULT_BINARY)]
    wkhtmltopdf: String,

    #[arg(long, default_value = "60")]
    conversion_timeout: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let payload = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading payload from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(&args.input)
            .await
            .with_context(|| format!("reading payload from {}", args.input))?
    };

    let started = Instant::now();
    let rx = decode_prescription(payload.trim())?;

    let converter = WkhtmltopdfConverter::new(args.wkhtmltopdf, Duration::from_secs(args.conversion_timeout));
    let pipeline = DocumentPipeline::new(PrescriptionRenderer::new()?, converter);

    let bytes = if args.html {
        let rx = pipeline.prepare(rx)?;
        pipeline.render_markup(&rx)?.into_bytes()
    } else {
        pipeline.produce(rx).await?.bytes
    };

    tokio::fs::write(&args.output, &bytes)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(
        "📁 Wrote {} ({} bytes) in {:?}",
        args.output.display(),
        bytes.len(),
        started.elapsed()
    );
    println!("{}", args.output.display());
    Ok(())
}
