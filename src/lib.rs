pub mod adapters;
pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, StdoutStorage};

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use codec::{PickleError, Protocol};
pub use config::FixtureConfig;
pub use crate::core::fixture::{decode_fixture, encode_fixture, to_pretty_json};
pub use crate::core::{engine::FixtureEngine, pipeline::FixturePipeline};
pub use domain::model::{EncodedFixture, FixtureMap};
pub use utils::error::{FixtureError, Result};
