//! The neutral route-registration trait.
//!
//! A [`Router`] wraps one scope of an engine's route table. The root router
//! covers the whole table; [`Router::group`] derives a sub-scope whose
//! registrations are implicitly prefixed. Many router values may exist at
//! once (one per `group` call); all of them write into the single
//! server-owned table, and none has an independent lifecycle: the borrow
//! chain ties every scope to the registration pass it was created in.
//!
//! Route registration is single-threaded and completes strictly before the
//! server starts; the engine's route table is never mutated concurrently
//! with request dispatch.

use crate::handler::HandlerFn;

/// Neutral HTTP-verb registration over a scope of the engine's route table.
///
/// Path syntax, parameter markers, and conflict resolution follow the
/// underlying engine; bindings document their engine's rules.
pub trait Router {
    /// Registers `handler` for `GET` requests on `path`.
    fn get(&mut self, path: &str, handler: HandlerFn);

    /// Registers `handler` for `POST` requests on `path`.
    fn post(&mut self, path: &str, handler: HandlerFn);

    /// Registers `handler` for `PUT` requests on `path`.
    fn put(&mut self, path: &str, handler: HandlerFn);

    /// Registers `handler` for `DELETE` requests on `path`.
    fn delete(&mut self, path: &str, handler: HandlerFn);

    /// Registers `handler` for `PATCH` requests on `path`.
    fn patch(&mut self, path: &str, handler: HandlerFn);

    /// Returns a sub-router whose registrations are prefixed with `prefix`.
    fn group<'a>(&'a mut self, prefix: &str) -> Box<dyn Router + 'a>;
}
