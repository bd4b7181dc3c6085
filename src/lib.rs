pub mod config;
pub mod dataset;
pub mod ingest;
pub mod normalize;
pub mod server;
pub mod store;

pub use config::Config;
pub use dataset::{Cell, Dataset};
pub use normalize::normalize;
pub use store::TableStore;

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    /// Route tracing output to the test harness; safe to call from every test.
    pub fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,coleta=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
