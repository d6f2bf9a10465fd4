use super::opcodes::*;
use super::{PickleError, Protocol};
use crate::domain::model::FixtureMap;
use std::collections::HashMap;

/// Serializes a mapping with the given protocol.
pub fn dumps(map: &FixtureMap, protocol: Protocol) -> Result<Vec<u8>, PickleError> {
    let mut pickler = Pickler::new(protocol);
    pickler.dump(map)?;
    Ok(pickler.into_bytes())
}

/// Buffers opcodes into protocol 4 frames.
///
/// `frame` is `Some` while framing is active. Writes go to the frame when
/// there is one and straight to `out` otherwise.
#[derive(Debug, Default)]
struct Framer {
    out: Vec<u8>,
    frame: Option<Vec<u8>>,
}

impl Framer {
    fn start_framing(&mut self) {
        self.frame = Some(Vec::new());
    }

    fn end_framing(&mut self) {
        if self.frame.as_ref().is_some_and(|frame| !frame.is_empty()) {
            self.commit_frame(true);
        }
        self.frame = None;
    }

    fn commit_frame(&mut self, force: bool) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        if frame.len() < FRAME_SIZE_TARGET && !force {
            return;
        }

        let data = std::mem::take(frame);
        if data.len() >= FRAME_SIZE_MIN {
            self.out.push(FRAME);
            self.out.extend_from_slice(&(data.len() as u64).to_le_bytes());
        }
        self.out.extend_from_slice(&data);
    }

    fn write(&mut self, data: &[u8]) {
        match self.frame.as_mut() {
            Some(frame) => frame.extend_from_slice(data),
            None => self.out.extend_from_slice(data),
        }
    }

    /// Large payloads bypass framing: the pending frame is flushed and the
    /// header and payload go straight to the output.
    fn write_large_bytes(&mut self, header: &[u8], payload: &[u8]) {
        if self.frame.is_some() {
            self.commit_frame(true);
        }
        self.out.extend_from_slice(header);
        self.out.extend_from_slice(payload);
    }
}

/// Pickle writer for string-to-string mappings.
#[derive(Debug)]
pub struct Pickler {
    protocol: Protocol,
    framer: Framer,
    // Strings already written, by memo index. Equal strings share an entry.
    memo: HashMap<String, u32>,
    memo_len: u32,
}

impl Pickler {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            framer: Framer::default(),
            memo: HashMap::new(),
            memo_len: 0,
        }
    }

    pub fn dump(&mut self, map: &FixtureMap) -> Result<(), PickleError> {
        self.framer.write(&[PROTO, self.protocol.version()]);
        if self.protocol.is_framed() {
            self.framer.start_framing();
        }

        self.save_dict(map)?;
        self.framer.write(&[STOP]);
        self.framer.end_framing();

        tracing::debug!(
            "Pickled {} entries with protocol {} ({} bytes)",
            map.len(),
            self.protocol,
            self.framer.out.len()
        );
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.framer.out
    }

    fn save_dict(&mut self, map: &FixtureMap) -> Result<(), PickleError> {
        self.framer.commit_frame(false);
        self.framer.write(&[EMPTY_DICT]);
        self.memoize_next();

        let entries: Vec<(&str, &str)> = map.iter().collect();
        if let [(key, value)] = entries.as_slice() {
            self.save_str(key)?;
            self.save_str(value)?;
            self.framer.write(&[SETITEM]);
            return Ok(());
        }
        if entries.is_empty() {
            return Ok(());
        }

        // 每批最多 BATCH_SIZE 項；剛好填滿時仍會再寫一個空的 MARK SETITEMS
        let mut batches = entries.chunks(BATCH_SIZE);
        loop {
            let batch = batches.next().unwrap_or(&[]);
            self.framer.write(&[MARK]);
            for (key, value) in batch {
                self.save_str(key)?;
                self.save_str(value)?;
            }
            self.framer.write(&[SETITEMS]);
            if batch.len() < BATCH_SIZE {
                return Ok(());
            }
        }
    }

    fn save_str(&mut self, value: &str) -> Result<(), PickleError> {
        self.framer.commit_frame(false);

        if let Some(&index) = self.memo.get(value) {
            self.write_get(index);
            return Ok(());
        }

        let encoded = value.as_bytes();
        let n = encoded.len();
        let framed = self.protocol.is_framed();

        if n <= 0xff && framed {
            self.framer.write(&[SHORT_BINUNICODE, n as u8]);
            self.framer.write(encoded);
        } else if n > u32::MAX as usize {
            if !framed {
                return Err(PickleError::StringTooLarge(n, self.protocol.version()));
            }
            let mut header = vec![BINUNICODE8];
            header.extend_from_slice(&(n as u64).to_le_bytes());
            self.framer.write_large_bytes(&header, encoded);
        } else {
            let mut header = vec![BINUNICODE];
            header.extend_from_slice(&(n as u32).to_le_bytes());
            if n >= FRAME_SIZE_TARGET {
                self.framer.write_large_bytes(&header, encoded);
            } else {
                self.framer.write(&header);
                self.framer.write(encoded);
            }
        }

        let index = self.memoize_next();
        self.memo.insert(value.to_owned(), index);
        Ok(())
    }

    fn memoize_next(&mut self) -> u32 {
        let index = self.memo_len;
        self.memo_len += 1;

        if self.protocol.is_framed() {
            self.framer.write(&[MEMOIZE]);
        } else if index < 256 {
            self.framer.write(&[BINPUT, index as u8]);
        } else {
            self.framer.write(&[LONG_BINPUT]);
            self.framer.write(&index.to_le_bytes());
        }
        index
    }

    fn write_get(&mut self, index: u32) {
        if index < 256 {
            self.framer.write(&[BINGET, index as u8]);
        } else {
            self.framer.write(&[LONG_BINGET]);
            self.framer.write(&index.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> FixtureMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn protocol(version: u8) -> Protocol {
        Protocol::new(version).unwrap()
    }

    #[test]
    fn test_default_fixture_protocol_4() {
        let bytes = dumps(&FixtureMap::sample(), Protocol::DEFAULT).unwrap();
        assert_eq!(
            bytes,
            b"\x80\x04\x95\x12\x00\x00\x00\x00\x00\x00\x00}\x94\x8c\x03key\x94\x8c\x05value\x94s."
        );
    }

    #[test]
    fn test_default_fixture_protocol_3() {
        let bytes = dumps(&FixtureMap::sample(), protocol(3)).unwrap();
        assert_eq!(
            bytes,
            b"\x80\x03}q\x00X\x03\x00\x00\x00keyq\x01X\x05\x00\x00\x00valueq\x02s."
        );
    }

    #[test]
    fn test_protocol_5_differs_only_in_header() {
        let v4 = dumps(&FixtureMap::sample(), protocol(4)).unwrap();
        let v5 = dumps(&FixtureMap::sample(), protocol(5)).unwrap();
        assert_eq!(v5[1], 5);
        assert_eq!(v4[2..], v5[2..]);
    }

    #[test]
    fn test_empty_map_has_no_frame_header() {
        // 三個位元組的 frame 太短，不加 FRAME 標頭
        let bytes = dumps(&FixtureMap::new(), protocol(4)).unwrap();
        assert_eq!(bytes, b"\x80\x04}\x94.");
    }

    #[test]
    fn test_multiple_items_use_setitems_and_memo_reference() {
        let bytes = dumps(&map(&[("a", "x"), ("b", "x"), ("c", "y")]), protocol(4)).unwrap();
        assert_eq!(
            bytes,
            b"\x80\x04\x95\x1b\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x01a\x94\x8c\x01x\x94\x8c\x01b\x94h\x02\x8c\x01c\x94\x8c\x01y\x94u."
        );
    }

    #[test]
    fn test_multiple_items_protocol_3() {
        let bytes = dumps(&map(&[("a", "x"), ("b", "x"), ("c", "y")]), protocol(3)).unwrap();
        assert_eq!(
            bytes,
            b"\x80\x03}q\x00(X\x01\x00\x00\x00aq\x01X\x01\x00\x00\x00xq\x02X\x01\x00\x00\x00bq\x03h\x02X\x01\x00\x00\x00cq\x04X\x01\x00\x00\x00yq\x05u."
        );
    }

    #[test]
    fn test_non_ascii_value_is_utf8() {
        let bytes = dumps(&map(&[("key", "värde")]), protocol(4)).unwrap();
        assert_eq!(
            bytes,
            b"\x80\x04\x95\x13\x00\x00\x00\x00\x00\x00\x00}\x94\x8c\x03key\x94\x8c\x06v\xc3\xa4rde\x94s."
        );
    }

    #[test]
    fn test_medium_string_uses_binunicode() {
        let value = "a".repeat(300);
        let bytes = dumps(&map(&[("k", &value)]), protocol(4)).unwrap();
        assert_eq!(&bytes[..18], b"\x80\x04\x95\x3a\x01\x00\x00\x00\x00\x00\x00}\x94\x8c\x01k\x94X");
        assert_eq!(&bytes[18..22], &300u32.to_le_bytes());
    }

    #[test]
    fn test_large_string_is_written_outside_frames() {
        let value = "a".repeat(70_000);
        let bytes = dumps(&map(&[("k", &value)]), protocol(4)).unwrap();

        assert_eq!(bytes.len(), 70_025);
        assert_eq!(
            &bytes[..22],
            b"\x80\x04\x95\x06\x00\x00\x00\x00\x00\x00\x00}\x94\x8c\x01k\x94Xp\x11\x01\x00"
        );
        assert!(bytes.ends_with(b"aa\x94s."));
    }

    fn golden(encoded: &str) -> Vec<u8> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        STANDARD.decode(encoded.trim()).unwrap()
    }

    fn numbered_keys(count: usize) -> FixtureMap {
        (0..count)
            .map(|i| (format!("k{:04}", i), "v".to_string()))
            .collect()
    }

    #[test]
    fn test_full_batch_is_followed_by_empty_setitems() {
        // Python 3.11 pickle.dumps 的輸出
        let expected = golden(include_str!("testdata/k1000_v_protocol4.b64"));
        let bytes = dumps(&numbered_keys(1000), protocol(4)).unwrap();

        assert!(bytes.ends_with(&[BINGET, 2, SETITEMS, MARK, SETITEMS, STOP]));
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_trailing_single_item_batch_uses_setitems() {
        let expected = golden(include_str!("testdata/k1001_v_protocol4.b64"));
        let bytes = dumps(&numbered_keys(1001), protocol(4)).unwrap();

        let last_key = b"\x8c\x05k1000";
        let pos = bytes
            .windows(last_key.len())
            .position(|w| w == last_key)
            .unwrap();
        assert_eq!(&bytes[pos - 2..pos], &[SETITEMS, MARK]);
        assert!(bytes.ends_with(&[BINGET, 2, SETITEMS, STOP]));
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_trailing_single_item_batch_protocol_3() {
        let expected = golden(include_str!("testdata/k1001_v_protocol3.b64"));
        assert_eq!(dumps(&numbered_keys(1001), protocol(3)).unwrap(), expected);
    }

    #[test]
    fn test_map_spanning_several_frames() {
        let entries: FixtureMap = (0..3000)
            .map(|i| (format!("k{:05}", i), format!("value-{:05}", i)))
            .collect();
        let expected = golden(include_str!("testdata/k3000_values_protocol4.b64"));
        let bytes = dumps(&entries, protocol(4)).unwrap();

        assert!(bytes.len() > FRAME_SIZE_TARGET);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_long_memo_indices_protocol_3() {
        let entries: FixtureMap = (0..200)
            .map(|i| (format!("k{:03}", i), format!("v{:03}", i)))
            .collect();
        let bytes = dumps(&entries, protocol(3)).unwrap();

        // 400 個字串加上 dict 本身，索引超過 255 時改用 LONG_BINPUT
        let mut long_put = vec![LONG_BINPUT];
        long_put.extend_from_slice(&256u32.to_le_bytes());
        assert!(bytes.windows(5).any(|w| w == long_put.as_slice()));
    }
}
