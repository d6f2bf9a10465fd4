use super::opcodes::*;
use super::{PickleError, Protocol};
use crate::domain::model::FixtureMap;
use std::collections::HashMap;

/// Deserializes a pickled string-to-string mapping.
pub fn loads(data: &[u8]) -> Result<FixtureMap, PickleError> {
    Unpickler::new(data).load()
}

#[derive(Debug, Clone)]
enum StackItem {
    Mark,
    Str(String),
    Dict(FixtureMap),
}

/// Stack machine for the opcodes [`super::Pickler`] emits, plus `DICT`.
#[derive(Debug)]
pub struct Unpickler<'a> {
    data: &'a [u8],
    pos: usize,
    stack: Vec<StackItem>,
    memo: HashMap<u32, StackItem>,
    protocol: Option<u8>,
}

impl<'a> Unpickler<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            stack: Vec::new(),
            memo: HashMap::new(),
            protocol: None,
        }
    }

    /// Protocol announced by the `PROTO` opcode, once it has been read.
    pub fn protocol(&self) -> Option<u8> {
        self.protocol
    }

    pub fn load(&mut self) -> Result<FixtureMap, PickleError> {
        loop {
            let offset = self.pos;
            let Some(&opcode) = self.data.get(offset) else {
                return Err(PickleError::MissingStop);
            };
            self.pos += 1;

            match opcode {
                PROTO => {
                    let version = self.read_u8()?;
                    if version > Protocol::MAX {
                        return Err(PickleError::UnsupportedProtocol(version));
                    }
                    self.protocol = Some(version);
                }
                FRAME => {
                    // 框架內容與一般 opcode 相同，只需確認長度
                    let len = self.read_u64()?;
                    if len > (self.data.len() - self.pos) as u64 {
                        return Err(PickleError::UnexpectedEof(offset));
                    }
                }
                EMPTY_DICT => self.stack.push(StackItem::Dict(FixtureMap::new())),
                MARK => self.stack.push(StackItem::Mark),
                DICT => {
                    let items = self.pop_mark(offset)?;
                    let mut map = FixtureMap::new();
                    Self::insert_pairs(&mut map, items, offset)?;
                    self.stack.push(StackItem::Dict(map));
                }
                SHORT_BINUNICODE => {
                    let len = self.read_u8()? as usize;
                    self.push_str(len, offset)?;
                }
                BINUNICODE => {
                    let len = self.read_u32()? as usize;
                    self.push_str(len, offset)?;
                }
                BINUNICODE8 => {
                    let len = usize::try_from(self.read_u64()?)
                        .map_err(|_| PickleError::UnexpectedEof(offset))?;
                    self.push_str(len, offset)?;
                }
                MEMOIZE => {
                    let index = self.memo.len() as u32;
                    self.memo_put(index, offset)?;
                }
                BINPUT => {
                    let index = self.read_u8()? as u32;
                    self.memo_put(index, offset)?;
                }
                LONG_BINPUT => {
                    let index = self.read_u32()?;
                    self.memo_put(index, offset)?;
                }
                BINGET => {
                    let index = self.read_u8()? as u32;
                    self.memo_get(index)?;
                }
                LONG_BINGET => {
                    let index = self.read_u32()?;
                    self.memo_get(index)?;
                }
                SETITEM => {
                    let value = self.pop(offset)?;
                    let key = self.pop(offset)?;
                    let map = self.top_dict(offset)?;
                    map.insert(Self::into_string(key, offset)?, Self::into_string(value, offset)?);
                }
                SETITEMS => {
                    let items = self.pop_mark(offset)?;
                    let map = self.top_dict(offset)?;
                    Self::insert_pairs(map, items, offset)?;
                }
                STOP => {
                    return match self.pop(offset)? {
                        StackItem::Dict(map) => {
                            tracing::debug!(
                                "Unpickled {} entries (protocol {:?})",
                                map.len(),
                                self.protocol
                            );
                            Ok(map)
                        }
                        _ => Err(PickleError::NotAMapping),
                    };
                }
                other => {
                    return Err(PickleError::UnsupportedOpcode {
                        opcode: other,
                        offset,
                    })
                }
            }
        }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PickleError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(PickleError::UnexpectedEof(self.pos))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, PickleError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, PickleError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, PickleError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn push_str(&mut self, len: usize, offset: usize) -> Result<(), PickleError> {
        let bytes = self.read_bytes(len)?;
        let value = std::str::from_utf8(bytes).map_err(|_| PickleError::InvalidUtf8(offset))?;
        self.stack.push(StackItem::Str(value.to_owned()));
        Ok(())
    }

    fn pop(&mut self, offset: usize) -> Result<StackItem, PickleError> {
        match self.stack.pop() {
            Some(StackItem::Mark) | None => Err(PickleError::StackUnderflow(offset)),
            Some(item) => Ok(item),
        }
    }

    fn pop_mark(&mut self, offset: usize) -> Result<Vec<StackItem>, PickleError> {
        let mark = self
            .stack
            .iter()
            .rposition(|item| matches!(item, StackItem::Mark))
            .ok_or(PickleError::MissingMark(offset))?;
        let items = self.stack.split_off(mark + 1);
        self.stack.pop();
        Ok(items)
    }

    fn top_dict(&mut self, offset: usize) -> Result<&mut FixtureMap, PickleError> {
        match self.stack.last_mut() {
            Some(StackItem::Dict(map)) => Ok(map),
            Some(_) => Err(PickleError::NotAMapping),
            None => Err(PickleError::StackUnderflow(offset)),
        }
    }

    fn memo_put(&mut self, index: u32, offset: usize) -> Result<(), PickleError> {
        let top = self
            .stack
            .last()
            .cloned()
            .ok_or(PickleError::StackUnderflow(offset))?;
        self.memo.insert(index, top);
        Ok(())
    }

    fn memo_get(&mut self, index: u32) -> Result<(), PickleError> {
        let item = self
            .memo
            .get(&index)
            .cloned()
            .ok_or(PickleError::MissingMemo(index))?;
        self.stack.push(item);
        Ok(())
    }

    fn into_string(item: StackItem, offset: usize) -> Result<String, PickleError> {
        match item {
            StackItem::Str(value) => Ok(value),
            _ => Err(PickleError::NonStringEntry(offset)),
        }
    }

    fn insert_pairs(
        map: &mut FixtureMap,
        items: Vec<StackItem>,
        offset: usize,
    ) -> Result<(), PickleError> {
        if items.len() % 2 != 0 {
            return Err(PickleError::StackUnderflow(offset));
        }
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            map.insert(Self::into_string(key, offset)?, Self::into_string(value, offset)?);
        }
        Ok(())
    }
}
