//! Notifiers for jobscout.
//!
//! - `Digest`: subject and plain-text body for a batch of postings
//! - `LogNotifier`: writes digests to the log (dry runs)
//! - `WebhookNotifier`: POSTs digests and error reports as JSON

mod digest;
mod logging;
mod webhook;

pub use digest::Digest;
pub use logging::LogNotifier;
pub use webhook::WebhookNotifier;
