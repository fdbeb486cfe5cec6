/**
 * Request Middleware
 *
 * The session route guard and the extractors handlers use to demand an
 * authenticated (or verified) caller.
 */

pub mod guard;

pub use guard::{decide, session_guard, CurrentUser, Decision, VerifiedUser};
