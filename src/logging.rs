use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber for the admin CLI.
///
/// `RUST_LOG` wins over `default_directive`. `verbose` bumps the crate's own
/// target to `debug` so record creation during a sync becomes visible.
pub fn init_tracing(default_directive: &str, verbose: bool) -> anyhow::Result<()> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    if verbose {
        filter = filter.add_directive("rolegate=debug".parse()?);
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
