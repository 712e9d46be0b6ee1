//! Global options and hooks.
//!
//! [`Globals`] carries what applies to every command of a program: an
//! optional global option block, parsed off the front of the command line,
//! and three optional callbacks that run at fixed points of a dispatch:
//!
//! ```text
//! global flags parsed
//!   → BEFORE hook      (setup such as logging, may abort)
//!   → command provider (contributes extra commands)
//!   → command resolved
//!   → AFTER hook       (sees the resolved command, may abort)
//!   → command flags, arguments, handler
//! ```
//!
//! Hooks receive the global option block when they ask for it, and return
//! `()` or a `Result` like handlers do. A failing hook stops the dispatch
//! with a [`HookError`] carrying the phase it failed in.

use std::any::{type_name, Any};
use std::fmt;

use thiserror::Error;

use crate::command::Command;
use crate::handler::HandlerReturn;
use crate::options::Options;
use crate::signature::{self, Contract, Signature, SignatureError, TypeSpec};

/// The dispatch phase a hook error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before the command is resolved
    Before,
    /// After the command is resolved, before its flags are parsed
    After,
    /// While collecting additional commands
    Provider,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Before => write!(f, "before"),
            HookPhase::After => write!(f, "after"),
            HookPhase::Provider => write!(f, "provider"),
        }
    }
}

/// Error returned by a hook or the command provider.
#[derive(Debug, Error)]
#[error("{phase} hook failed: {message}")]
pub struct HookError {
    /// Human-readable error message
    pub message: String,
    /// The phase where the error occurred
    pub phase: HookPhase,
    /// The underlying error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    pub fn before(message: impl Into<String>) -> Self {
        Self::new(HookPhase::Before, message)
    }

    pub fn after(message: impl Into<String>) -> Self {
        Self::new(HookPhase::After, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(HookPhase::Provider, message)
    }

    fn new(phase: HookPhase, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }

    fn from_anyhow(phase: HookPhase, err: anyhow::Error) -> Self {
        Self::new(phase, format!("{err:#}")).with_source(err)
    }
}

type HookFn<'a> = Box<dyn FnMut(Option<&Command<'_>>, Option<&dyn Any>) -> anyhow::Result<()> + 'a>;

type ProviderFn<'a> = Box<dyn FnOnce() -> anyhow::Result<Vec<Command<'a>>> + 'a>;

/// A registered hook and its signature.
pub struct Hook<'a> {
    name: &'static str,
    signature: Signature,
    call: HookFn<'a>,
}

impl<'a> Hook<'a> {
    fn new<F>(name: &'static str, signature: Signature, f: F) -> Self
    where
        F: FnMut(Option<&Command<'_>>, Option<&dyn Any>) -> anyhow::Result<()> + 'a,
    {
        Self {
            name,
            signature,
            call: Box::new(f),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl fmt::Debug for Hook<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Program-wide options and hooks.
#[derive(Default)]
pub struct Globals<'a> {
    pub(crate) options: Option<&'a mut dyn Options>,
    before: Option<Hook<'a>>,
    after: Option<Hook<'a>>,
    provider: Option<ProviderFn<'a>>,
}

impl<'a> Globals<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global option block.
    pub fn options<T: Options>(mut self, options: &'a mut T) -> Self {
        self.options = Some(options);
        self
    }

    /// Runs `f` after global flags are parsed, before the command is resolved.
    pub fn before<F, R>(mut self, mut f: F) -> Self
    where
        F: FnMut() -> R + 'a,
        R: HandlerReturn,
    {
        let signature = hook_signature::<R>(None);
        self.before = Some(Hook::new(type_name::<F>(), signature, move |_, _| {
            f().into_result()
        }));
        self
    }

    /// Like [`before`](Self::before), receiving the global option block.
    pub fn before_with<T, F, R>(mut self, mut f: F) -> Self
    where
        T: Options,
        F: FnMut(&T) -> R + 'a,
        R: HandlerReturn,
    {
        let name = type_name::<F>();
        let signature = hook_signature::<R>(Some(TypeSpec::of::<T>()));
        self.before = Some(Hook::new(name, signature, move |_, options| {
            f(global_options::<T>(name, options)?).into_result()
        }));
        self
    }

    /// Runs `f` with the resolved command, before its flags are parsed.
    pub fn after<F, R>(mut self, mut f: F) -> Self
    where
        F: FnMut(&Command<'_>) -> R + 'a,
        R: HandlerReturn,
    {
        let name = type_name::<F>();
        let signature = hook_signature::<R>(None);
        self.after = Some(Hook::new(name, signature, move |command, _| {
            f(resolved(name, command)?).into_result()
        }));
        self
    }

    /// Like [`after`](Self::after), receiving the global option block.
    pub fn after_with<T, F, R>(mut self, mut f: F) -> Self
    where
        T: Options,
        F: FnMut(&Command<'_>, &T) -> R + 'a,
        R: HandlerReturn,
    {
        let name = type_name::<F>();
        let signature = hook_signature::<R>(Some(TypeSpec::of::<T>()));
        self.after = Some(Hook::new(name, signature, move |command, options| {
            f(resolved(name, command)?, global_options::<T>(name, options)?).into_result()
        }));
        self
    }

    /// Registers a provider of additional commands, called once after the
    /// before hook.
    pub fn provider<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Vec<Command<'a>>> + 'a,
    {
        self.provider = Some(Box::new(f));
        self
    }

    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }

    /// Checks both hooks against the global option block.
    pub fn validate_hooks(&self) -> Result<(), SignatureError> {
        let contract = Contract::hook(self.options.as_deref().map(|o| o.type_spec()));
        for hook in self.before.iter().chain(self.after.iter()) {
            signature::validate(hook.name, &contract, &hook.signature)?;
        }
        Ok(())
    }

    pub(crate) fn run_before(&mut self) -> Result<(), HookError> {
        let Self {
            options, before, ..
        } = self;
        match before {
            Some(hook) => {
                let options = options.as_deref().map(|o| o.as_any());
                (hook.call)(None, options).map_err(|e| HookError::from_anyhow(HookPhase::Before, e))
            }
            None => Ok(()),
        }
    }

    pub(crate) fn run_after(&mut self, command: &Command<'_>) -> Result<(), HookError> {
        let Self { options, after, .. } = self;
        match after {
            Some(hook) => {
                let options = options.as_deref().map(|o| o.as_any());
                (hook.call)(Some(command), options)
                    .map_err(|e| HookError::from_anyhow(HookPhase::After, e))
            }
            None => Ok(()),
        }
    }

    pub(crate) fn provide(&mut self) -> Result<Vec<Command<'a>>, HookError> {
        match self.provider.take() {
            Some(provider) => {
                provider().map_err(|e| HookError::from_anyhow(HookPhase::Provider, e))
            }
            None => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for Globals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Globals")
            .field(
                "options",
                &self.options.as_deref().map(|o| o.type_spec().name()),
            )
            .field("before", &self.before)
            .field("after", &self.after)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

fn hook_signature<R: HandlerReturn>(options: Option<TypeSpec>) -> Signature {
    Signature {
        takes_args: false,
        options,
        returns: R::SHAPE,
    }
}

fn global_options<'o, T: Any>(hook: &str, options: Option<&'o dyn Any>) -> anyhow::Result<&'o T> {
    options
        .and_then(|o| o.downcast_ref::<T>())
        .ok_or_else(|| anyhow::anyhow!("hook {hook} expects global options of type {}", type_name::<T>()))
}

fn resolved<'r, 'c>(hook: &str, command: Option<&'r Command<'c>>) -> anyhow::Result<&'r Command<'c>> {
    command.ok_or_else(|| anyhow::anyhow!("hook {hook} runs without a resolved command"))
}
