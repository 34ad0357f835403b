use boundary_sweep::{Sweep, SweepConfig, MODE_FULL};
use tracing_subscriber::EnvFilter;

fn main() -> boundary_sweep::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut sweep = Sweep::new(SweepConfig::default());
    sweep.execute_named(MODE_FULL)
}
