//! # aapi-cli: AsyncAPI Validation Command-Line Interface
//!
//! Thin front end over `aapi-validate`: resolve a document from a file or
//! URL, then list its messages or validate a payload against one of them.
//!
//! ## Subcommands
//!
//! - `validate`: validate a JSON payload against a message schema
//! - `messages`: list the messages a document declares
//!
//! ## Exit codes
//!
//! - `0`: success
//! - `1`: the document was rejected, the key matched nothing, or the
//!   payload is invalid
//! - `2`: operational error (unreadable file, HTTP failure, bad payload JSON)
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers build a serializable report; printing is the last step, so
//!   `--json` and text output always carry the same information.

pub mod messages;
pub mod source;
pub mod validate;
