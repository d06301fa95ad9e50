//! Runs a florist against a simulated registry.
//!
//! ```text
//! cargo run --example florister -- demo BTC_JPY bitflyer 0.01 --interval-ms 500
//! ```
//!
//! The registry publishes a new random-walk quote every `--update-ms`; ticks that
//! land between two updates show up as duplicate skips in the log. Stop with Ctrl-C.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use clap::Parser;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::info;

use florister::{
    Config, Florist, FloristError, Florister, HandoffReceiver, Identity, InitialStatus,
    SourceError, State, StateSource, logging,
};

#[derive(Parser)]
#[command(name = "florister")]
#[command(about = "Forward new quotes of one instrument to a florist", long_about = None)]
struct Args {
    /// Name of the florist
    name: String,

    /// Instrument to watch
    seed: String,

    /// Venue the instrument trades on
    soil: String,

    /// Position size handed to the florist
    size: f64,

    /// Poll period in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Period of simulated registry updates in milliseconds
    #[arg(long, default_value = "2500")]
    update_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = logging::DEFAULT_FILTER)]
    log: String,
}

/// In-memory registry whose quote moves on a fixed cadence.
struct SimulatedRegistry {
    quote: Mutex<State>,
    update: Duration,
}

impl SimulatedRegistry {
    fn new(update: Duration) -> Self {
        Self {
            quote: Mutex::new(State::new(SystemTime::now(), 100.5, 99.5)),
            update,
        }
    }

    fn walk(&self) -> Result<State, SourceError> {
        let mut quote = self.quote.lock().map_err(|e| SourceError::Unavailable {
            error: e.to_string(),
        })?;
        let now = SystemTime::now();
        let due = quote
            .observed_at
            .checked_add(self.update)
            .is_some_and(|next| next <= now);
        if due {
            let mut rng = rand::rng();
            if rng.random_bool(0.1) {
                return Err(SourceError::Unavailable {
                    error: "simulated outage".into(),
                });
            }
            let step = rng.random_range(-1.0..=1.0);
            *quote = State::new(now, quote.ask + step, quote.bid + step);
        }
        Ok(quote.clone())
    }
}

#[async_trait]
impl StateSource for SimulatedRegistry {
    async fn last_state(&self, _id: &Identity) -> Result<State, SourceError> {
        self.walk()
    }

    async fn status(
        &self,
        _id: &Identity,
        _from: SystemTime,
        _to: SystemTime,
    ) -> Result<InitialStatus, SourceError> {
        Ok(InitialStatus::new(vec![self.walk()?]))
    }
}

/// Prints every quote and the value of the position at mid price.
struct PrintingFlorist {
    name: String,
    size: f64,
}

#[async_trait]
impl Florist for PrintingFlorist {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &mut self,
        _ctx: CancellationToken,
        initial: InitialStatus,
        mut states: HandoffReceiver,
    ) -> Result<(), FloristError> {
        if let Some(last) = initial.latest() {
            info!("{} seeded with {} state(s), mid={:.2}", self.name, initial.len(), last.mid());
        }
        while let Some(state) = states.recv().await {
            info!(
                "{} ask={:.2} bid={:.2} value={:.4}",
                self.name,
                state.ask,
                state.bid,
                state.mid() * self.size
            );
        }
        Ok(())
    }

    fn release(&mut self) {
        info!("{} released", self.name);
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(&args.log)?;

    let cfg = Config::default().with_interval(Duration::from_millis(args.interval_ms));
    let identity = Identity::new(args.soil, args.seed)?;
    let registry = Arc::new(SimulatedRegistry::new(Duration::from_millis(args.update_ms)));
    let florist = PrintingFlorist {
        name: args.name,
        size: args.size,
    };

    let report = Florister::new(cfg, identity, registry).run(florist).await?;
    info!(
        "stopped after {} tick(s): forwarded={} duplicates={} skipped={} errored={}",
        report.ticks, report.forwarded, report.duplicates, report.skipped, report.errored
    );
    Ok(())
}
