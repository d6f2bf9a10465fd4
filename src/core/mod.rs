pub mod engine;
pub mod fixture;
pub mod pipeline;

pub use crate::domain::model::{EncodedFixture, FixtureMap};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
