//! Shared tokio runtime for Claude calls made from the worker thread.
//!
//! The session itself is synchronous, so the worker borrows this runtime
//! for each generation request instead of owning one per provider.

use dungeon_core::{AsyncContentProvider, ContentProvider, GenerationError, Prompt};
use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global shared tokio runtime. `None` if it could not be built.
pub static RUNTIME: Lazy<Option<Runtime>> = Lazy::new(|| match Runtime::new() {
    Ok(runtime) => Some(runtime),
    Err(err) => {
        bevy::log::error!("failed to create tokio runtime: {err}");
        None
    }
});

/// Drives an async provider on [`RUNTIME`].
///
/// Only call from a thread that is not itself inside the runtime.
pub struct OnRuntime<P>(pub P);

impl<P: AsyncContentProvider> ContentProvider for OnRuntime<P> {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError> {
        match RUNTIME.as_ref() {
            Some(runtime) => runtime.block_on(self.0.generate(prompt)),
            None => Err(GenerationError::Unavailable),
        }
    }
}
