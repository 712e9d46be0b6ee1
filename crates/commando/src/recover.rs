//! Panic recovery around handler calls.
//!
//! A handler that panics must not take the whole program down without a
//! trace. [`guard`] runs the handler under `catch_unwind` and turns a panic
//! into a [`PanicError`] naming the command and, when known, the source
//! location the panic was raised at.
//!
//! The location comes from a process-wide panic hook installed on first use.
//! While a thread is inside [`guard`], the hook records the location of the
//! first panic raised on that thread and stays silent; everywhere else it
//! defers to the hook that was installed before it.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

static INSTALL_HOOK: Once = Once::new();

#[derive(Debug, Default)]
struct Capture {
    location: Option<String>,
}

thread_local! {
    static CAPTURE: RefCell<Option<Capture>> = const { RefCell::new(None) };
}

/// A panic raised by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicError {
    pub command: String,
    /// `file:line` of the first panic, when it could be determined
    pub location: Option<String>,
    pub message: String,
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "panic running command {} at {}: {}",
                self.command, location, self.message
            ),
            None => write!(f, "panic running command {}: {}", self.command, self.message),
        }
    }
}

impl std::error::Error for PanicError {}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let captured = CAPTURE
                .try_with(|capture| match capture.try_borrow_mut() {
                    Ok(mut capture) => match capture.as_mut() {
                        Some(capture) => {
                            if capture.location.is_none() {
                                capture.location = info
                                    .location()
                                    .map(|l| format!("{}:{}", l.file(), l.line()));
                            }
                            true
                        }
                        None => false,
                    },
                    Err(_) => false,
                })
                .unwrap_or(false);
            if !captured {
                previous(info);
            }
        }));
    });
}

/// Runs `f` for `command`, converting a panic into a [`PanicError`].
pub fn guard<F, T>(command: &str, f: F) -> Result<T, PanicError>
where
    F: FnOnce() -> T,
{
    install_hook();
    let outer = CAPTURE
        .try_with(|capture| capture.replace(Some(Capture::default())))
        .ok()
        .flatten();
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    let capture = CAPTURE
        .try_with(|capture| capture.replace(outer))
        .ok()
        .flatten();

    outcome.map_err(|payload| {
        let err = PanicError {
            command: command.to_string(),
            location: capture.and_then(|c| c.location),
            message: payload_message(payload.as_ref()),
        };
        tracing::debug!(command, location = ?err.location, "recovered from handler panic");
        err
    })
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_value_without_panic() {
        assert_eq!(guard("ok", || 42), Ok(42));
    }

    #[test]
    fn test_converts_str_panic() {
        let err = guard::<_, ()>("boom", || panic!("kaboom")).unwrap_err();
        assert_eq!(err.command, "boom");
        assert_eq!(err.message, "kaboom");
        let location = err.location.clone().unwrap();
        assert!(location.starts_with(file!()), "{location}");
        assert!(err
            .to_string()
            .starts_with("panic running command boom at "));
        assert!(err.to_string().ends_with(": kaboom"));
    }

    #[test]
    fn test_converts_formatted_panic() {
        let value = 7;
        let err = guard::<_, ()>("fmt", || panic!("bad value {value}")).unwrap_err();
        assert_eq!(err.message, "bad value 7");
    }

    #[test]
    fn test_non_string_payload() {
        let err = guard::<_, ()>("any", || std::panic::panic_any(13u32)).unwrap_err();
        assert_eq!(err.message, "Box<dyn Any>");
    }

    #[test]
    fn test_first_panic_location_wins() {
        let first_line = line!() + 3;
        let err = guard::<_, ()>("nested", || {
            let inner = std::panic::catch_unwind(|| {
                panic!("first");
            });
            assert!(inner.is_err());
            panic!("second");
        })
        .unwrap_err();
        assert_eq!(err.message, "second");
        assert_eq!(
            err.location,
            Some(format!("{}:{}", file!(), first_line))
        );
    }

    #[test]
    fn test_nested_guards_restore_outer_capture() {
        let inner = guard("outer", || guard::<_, ()>("inner", || panic!("inner")));
        let inner = inner.unwrap().unwrap_err();
        assert_eq!(inner.command, "inner");

        let err = guard::<_, ()>("outer", || panic!("outer")).unwrap_err();
        assert_eq!(err.message, "outer");
        assert!(err.location.is_some());
    }

    #[test]
    fn test_display_without_location() {
        let err = PanicError {
            command: "sync".into(),
            location: None,
            message: "lost".into(),
        };
        assert_eq!(err.to_string(), "panic running command sync: lost");
    }
}
