use crate::core::fixture::encode_fixture;
use crate::core::{ConfigProvider, EncodedFixture, FixtureMap, Pipeline, Storage};
use crate::utils::error::Result;

pub struct FixturePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> FixturePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for FixturePipeline<S, C> {
    fn extract(&self) -> Result<FixtureMap> {
        let fixture = self.config.entries().clone();
        for (key, value) in fixture.iter() {
            tracing::debug!("Fixture entry: {:?} = {:?}", key, value);
        }
        Ok(fixture)
    }

    fn transform(&self, fixture: FixtureMap) -> Result<EncodedFixture> {
        encode_fixture(&fixture, self.config.protocol())
    }

    fn load(&self, encoded: EncodedFixture) -> Result<String> {
        self.storage.write_line(&encoded.base64)?;
        Ok(self.storage.location())
    }
}
