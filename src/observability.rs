use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the process-wide fmt subscriber.
///
/// Host applications that bring their own subscriber should skip this;
/// calling it twice returns an error from the second call.
pub fn init_logging(max_level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(max_level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))
}
