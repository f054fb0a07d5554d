pub mod handle;
pub mod records;

uniffi::setup_scaffolding!();

/// Initialize the library with proper panic handling
/// Call this once at startup from Kotlin/Swift
#[uniffi::export]
pub fn init_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("=== RUST PANIC ===");
        tracing::error!("{panic_info}");
        tracing::error!("Backtrace:\n{backtrace}");
        eprintln!("{panic_info}");
    }));
}

/// Route `tracing` output to logcat on Android and stderr elsewhere.
/// Safe to call more than once; later calls are ignored.
#[uniffi::export]
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        use tracing_logcat::{LogcatMakeWriter, LogcatTag};

        let Ok(writer) = LogcatMakeWriter::new(LogcatTag::Fixed(env!("CARGO_PKG_NAME").to_owned()))
        else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .try_init();
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = tracing_subscriber::fmt().with_target(false).try_init();
    }
}
