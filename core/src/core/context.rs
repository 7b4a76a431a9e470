// draftline/src/core/context.rs

//! Defines the `StageHandler<TData, Err>` type for stage handlers operating on
//! `ContextData<TData>`, and the adapter that boxes user closures into it.

use crate::core::context_data::ContextData;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a stage handler.
///
/// A handler is an asynchronous function that takes a `ContextData<TData>`
/// (a clone of the run's shared handle) and returns a `Future` resolving to
/// `Result<(), Err>`.
///
/// Handlers are responsible for:
/// 1. Copying what they need out of the context under a short `.read()`.
/// 2. **Dropping every lock guard BEFORE any `.await` suspension point.**
/// 3. Committing their results with a single `.write()` before returning, so
///    the next stage only ever observes a fully committed state.
pub type StageHandler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>;

/// Boxes a closure returning any `Future<Output = Result<(), UserErr>>` into a
/// `StageHandler`, converting the closure's error into the pipeline's `Err`.
pub(crate) fn boxed_handler<TData, Err, F, UserErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> StageHandler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: Send + 'static,
  F: Future<Output = Result<(), UserErr>> + Send + 'static,
  UserErr: Into<Err> + Send + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}
