use crate::codec::{self, Protocol};
use crate::core::{EncodedFixture, FixtureMap};
use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Pickles `map` and base64-encodes the result.
pub fn encode_fixture(map: &FixtureMap, protocol: Protocol) -> Result<EncodedFixture> {
    let pickled = codec::dumps(map, protocol)?;
    let base64 = STANDARD.encode(&pickled);

    Ok(EncodedFixture {
        pickled,
        base64,
        entry_count: map.len(),
        protocol: protocol.version(),
    })
}

/// Reverses [`encode_fixture`]. Surrounding whitespace is ignored.
pub fn decode_fixture(text: &str) -> Result<FixtureMap> {
    let pickled = STANDARD.decode(text.trim())?;
    tracing::debug!("Decoded {} pickle bytes", pickled.len());
    Ok(codec::loads(&pickled)?)
}

/// Renders a mapping the way the fixture's consumer does: indented JSON.
pub fn to_pretty_json(map: &FixtureMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}
