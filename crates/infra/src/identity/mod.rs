//! Microsoft identity platform integration

mod client;

pub use client::IdentityClient;
