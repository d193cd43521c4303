//! fxconv
//!
//! Command-line host for the conversion form: loads live rates, fills the
//! form from arguments and prints the conversion.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxconv_core::{
    ConversionFormController, ConverterConfig, FieldId, FxError, HttpRateTableClient,
};

/// fxconv CLI
#[derive(Parser, Debug)]
#[command(name = "fxconv")]
#[command(about = "Convert an amount between currencies using live rates")]
struct Args {
    /// Amount to convert (clamped to the configured range)
    #[arg(short, long)]
    amount: Option<String>,

    /// Source unit code (defaults to the first listed unit)
    #[arg(short, long)]
    from: Option<String>,

    /// Target unit code (defaults to the second listed unit)
    #[arg(short, long)]
    to: Option<String>,

    /// Rate endpoint override
    #[arg(long)]
    url: Option<String>,

    /// Print the available unit codes and exit
    #[arg(long)]
    list: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Form edits to apply, in field order.
    fn form_inputs(&self) -> Vec<(FieldId, &str)> {
        [
            (FieldId::Amount, self.amount.as_deref()),
            (FieldId::FromCurrency, self.from.as_deref()),
            (FieldId::ToCurrency, self.to.as_deref()),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| (id, v)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            args.json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    // Load configuration
    let mut config = ConverterConfig::from_env();
    if let Some(url) = &args.url {
        config.rates_url = url.clone();
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let client = Arc::new(HttpRateTableClient::new(&config)?);
    let mut controller = ConversionFormController::new(client, &config);

    info!(url = %config.rates_url, "Loading rates");
    if let Err(e) = controller.initialize().await {
        return Err(anyhow::anyhow!("Rates unavailable: {}", e));
    }

    if args.list {
        for unit in controller.available_units() {
            println!("{}", unit);
        }
        return Ok(());
    }

    for (id, value) in args.form_inputs() {
        controller.set(id, value)?;
    }

    match controller.submit() {
        Ok(result) => {
            match result.summary() {
                Some(line) => println!("{}", line),
                None => println!("Nothing to convert"),
            }
            Ok(())
        }
        Err(e @ FxError::Validation { .. }) => {
            for field in controller.fields().fields().filter(|f| f.error) {
                eprintln!("{}: {}", field.id.label(), field.help_text);
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
