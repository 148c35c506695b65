use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

/// Seriousness of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Status,
    Warning,
    Fatal,
}

pub type MessageHook = Box<dyn Fn(Severity, &str) + Send + Sync>;

static HOOK: OnceLock<RwLock<Option<MessageHook>>> = OnceLock::new();

fn hook_slot() -> &'static RwLock<Option<MessageHook>> {
    HOOK.get_or_init(|| RwLock::new(None))
}

/// Redirects every diagnostic message to `hook` in addition to the tracing
/// event. Replaces any previously installed hook.
pub fn set_message_hook(hook: MessageHook) {
    if let Ok(mut slot) = hook_slot().write() {
        *slot = Some(hook);
    }
}

pub fn clear_message_hook() {
    if let Ok(mut slot) = hook_slot().write() {
        *slot = None;
    }
}

/// Common message output for all components.
pub fn message(severity: Severity, msg: &str) {
    match severity {
        Severity::Status => tracing::info!(target: "multislice", "{msg}"),
        Severity::Warning => tracing::warn!(target: "multislice", "{msg}"),
        Severity::Fatal => tracing::error!(target: "multislice", "{msg}"),
    }
    if let Ok(slot) = hook_slot().read() {
        if let Some(hook) = slot.as_ref() {
            hook(severity, msg);
        }
    }
}

/// Reports `msg` at fatal severity and unwinds.
#[track_caller]
pub fn fatal(msg: &str) -> ! {
    message(Severity::Fatal, msg);
    panic!("{msg}")
}

/// Turns an unhandled error into a fatal report.
pub trait OrAbort<T> {
    fn or_abort(self) -> T;
}

impl<T, E: Display> OrAbort<T> for Result<T, E> {
    #[track_caller]
    fn or_abort(self) -> T {
        match self {
            Ok(v) => v,
            Err(err) => fatal(&err.to_string()),
        }
    }
}
