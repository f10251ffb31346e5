// Logs an error message with `error!`, then exits with code 1.
// Accepts format arguments like `eprintln!`.
#[macro_export]
macro_rules! abort {
    ($($arg:tt)+) => {{
        log::error!($($arg)+);
        std::process::exit(1)
    }};
}
