//! HTTP handlers for the SSO endpoints.

mod handoff;
mod hooks;
mod ingest;
mod login;
mod logout;

pub use handoff::handoff;
pub use hooks::{login_hook, logout_hook};
pub use ingest::ingest;
pub use login::login_leg;
pub use logout::logout_leg;

use axum::extract::{rejection::QueryRejection, Query};
use serde::de::DeserializeOwned;

/// Browser legs always redirect, so an unparseable query string (for example
/// a repeated parameter) is treated as an empty one.
fn query_or_default<T>(query: Result<Query<T>, QueryRejection>) -> T
where
    T: DeserializeOwned + Default,
{
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unparseable query string, ignoring");
            T::default()
        }
    }
}
