use crate::codec::Protocol;
use crate::domain::model::{EncodedFixture, FixtureMap};
use crate::utils::error::Result;

pub trait Storage {
    /// Writes `text` followed by a newline.
    fn write_line(&self, text: &str) -> Result<()>;

    /// Human readable destination, used in logs.
    fn location(&self) -> String;
}

pub trait ConfigProvider {
    fn entries(&self) -> &FixtureMap;
    fn protocol(&self) -> Protocol;
    fn output_path(&self) -> Option<&str>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<FixtureMap>;
    fn transform(&self, fixture: FixtureMap) -> Result<EncodedFixture>;
    fn load(&self, encoded: EncodedFixture) -> Result<String>;
}
