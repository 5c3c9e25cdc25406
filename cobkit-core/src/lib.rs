#![deny(clippy::all)]
//! Core engine for the customer-onboarding (COB) mobile SDK.
//!
//! Hosts embed this crate through foreign-language bindings. It owns the
//! onboarding session, the REST client against the onboarding backend, the
//! checkpoint state machine that decides which screen comes next, and the
//! adapter boundary to the vendored identity-capture (KYC) capability.
//! Rendering and navigation stay on the host side.

use strum::EnumString;

/// The backend environment an onboarding flow runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Staging,
    Production,
}

pub mod api;

mod checkpoint;
pub use checkpoint::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod events;
pub use events::*;

mod flow;
pub use flow::*;

pub mod logger;

mod session;
pub use session::*;

mod verification;
pub use verification::*;

// private modules
mod http_request;

uniffi::setup_scaffolding!("cobkit_core");
