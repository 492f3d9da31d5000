//! Client-side session store and access gate for the peer review platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! The platform serves two kinds of users. Students collaborate, upload work
//! and submit reviews; admins get their own dashboard. Login exchanges
//! credentials for a bearer token and a role. This crate keeps that pair
//! persisted across restarts, decides which views a session may enter, and
//! wraps the REST endpoints the views call.
//!
//! DESIGN
//! ======
//! - [`session::SessionStore`] is the single source of truth for the
//!   authenticated identity. Memory and persisted storage change together.
//! - [`gate`] and [`routes`] are pure functions of a [`session::Session`]
//!   snapshot, so access decisions never touch the network or storage.
//! - [`net::api::ApiClient`] reads the token from the store on every request.
//! - [`scope::ViewScope`] cancels a view's in-flight requests when the view
//!   goes away.

pub mod actions;
pub mod auth;
pub mod config;
pub mod gate;
pub mod net;
pub mod notice;
pub mod role;
pub mod routes;
pub mod scope;
pub mod session;
pub mod storage;

pub use role::Role;
pub use routes::Route;
pub use session::{Session, SessionStore};
