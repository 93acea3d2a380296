//! Fatal error reporting
//!
//! Startup failures (bad configuration, port already bound) are the only
//! errors that end the process. They are reported through a single path so
//! the operator sees one clear line, with full detail kept at debug level.

/// Errors that know whether the operator can fix them directly
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)` describing what to change. System failures return `None`
/// and are reported with the caller's operation context instead.
pub trait ContextualError: std::error::Error {
    /// True when the message names something the operator can fix
    /// (a config key, a file path, a port)
    fn is_user_actionable(&self) -> bool;

    /// The operator-facing message for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error, followed by a hint when the operator can act on it
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    let rendered = error.to_string();
    log::error!("FATAL: {}: {}", operation_context, rendered);
    if error.is_user_actionable() {
        if let Some(hint) = error.user_message().filter(|hint| !rendered.contains(hint)) {
            log::error!("HINT: {}", hint);
        }
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Report a fatal startup error and terminate the process with status 1
///
/// Logging must already be initialised; startup does that first.
pub fn exit_with_error<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) -> ! {
    log_error_with_context(error, operation_context);
    std::process::exit(1);
}
