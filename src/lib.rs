//! Tsuru-style service broker for RabbitMQ: provision vhosts, hand out per-host credentials, and
//! roll back half-applied changes through the management API.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod management;
pub mod obs;
pub mod workflow;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(feature = "server")] use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, parking_lot as _, tower as _};
#[cfg(all(test, not(feature = "server")))] use color_eyre as _;
