use crate::core::{EncodedFixture, Pipeline};
use crate::utils::error::Result;

/// Runs a pipeline's extract, transform and load stages in order.
pub struct FixtureEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> FixtureEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Returns the destination the fixture was written to.
    pub fn run(&self) -> Result<String> {
        tracing::info!("Starting fixture generation...");

        let fixture = self.pipeline.extract()?;
        tracing::info!("Built mapping with {} entries", fixture.len());

        let encoded = self.pipeline.transform(fixture)?;
        log_encoded(&encoded);

        let location = self.pipeline.load(encoded)?;
        tracing::info!("Fixture written to: {}", location);

        Ok(location)
    }
}

fn log_encoded(encoded: &EncodedFixture) {
    tracing::info!(
        "Pickled {} entries with protocol {}: {} bytes, {} base64 characters",
        encoded.entry_count,
        encoded.protocol,
        encoded.pickled.len(),
        encoded.base64.len()
    );
}
