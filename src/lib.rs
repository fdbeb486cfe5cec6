//! Palaver - Main Library
//!
//! Palaver is a small authenticated discussion forum: users register or log
//! in, browse categories, open threads, and post messages, with live views
//! kept current by store change listeners.
//!
//! # Module Structure
//!
//! - **`store`** - The document-store port and its adapters (in-memory and
//!   sqlite), the typed collection wrapper, and change events
//! - **`models`** - The forum entities and their patch types
//! - **`categories` / `threads` / `messages` / `profiles`** - One service +
//!   handler pair per entity
//! - **`auth`** - The identity port, the local bcrypt/JWT adapter, the
//!   verification mailer, the auth/session bridge, and the auth handlers
//! - **`middleware`** - The session route guard and request extractors
//! - **`realtime`** - Live-query subscriptions and their SSE adaptation
//! - **`stats`** - The derived dashboard aggregator
//! - **`server`** - Configuration, shared state, and app assembly
//! - **`routes`** - Router wiring
//! - **`error`** - The error taxonomy and its HTTP conversion

pub mod auth;
pub mod categories;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod models;
pub mod profiles;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod stats;
pub mod store;
pub mod threads;
