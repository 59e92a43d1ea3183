//! In-memory GGUF writer for tests

#![allow(dead_code)]

#[derive(Debug, Clone)]
enum Item {
    U32(u32),
    U64(u64),
    Bytes(Vec<u8>),
}

fn string_items(s: &[u8]) -> [Item; 2] {
    [Item::U64(s.len() as u64), Item::Bytes(s.to_vec())]
}

const TYPE_UINT8: u32 = 0;
const TYPE_UINT32: u32 = 4;
const TYPE_STRING: u32 = 8;
const TYPE_ARRAY: u32 = 9;

/// Builds GGUF buffers in either byte order
#[derive(Debug, Clone)]
pub struct GgufBuilder {
    version: u32,
    swapped: bool,
    alignment: usize,
    kv: Vec<Vec<Item>>,
    tensors: Vec<Vec<Item>>,
}

impl Default for GgufBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GgufBuilder {
    pub fn new() -> Self {
        Self {
            version: 3,
            swapped: false,
            alignment: 32,
            kv: Vec::new(),
            tensors: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Encode every multi-byte value in the non-native byte order
    pub fn swapped(mut self) -> Self {
        self.swapped = true;
        self
    }

    /// Skip the trailing alignment padding
    pub fn unpadded(mut self) -> Self {
        self.alignment = 0;
        self
    }

    fn field(mut self, key: &str, value_type: u32, value: Vec<Item>) -> Self {
        let mut items = string_items(key.as_bytes()).to_vec();
        items.push(Item::U32(value_type));
        items.extend(value);
        self.kv.push(items);
        self
    }

    pub fn u32(self, key: &str, value: u32) -> Self {
        self.field(key, TYPE_UINT32, vec![Item::U32(value)])
    }

    pub fn string(self, key: &str, value: &str) -> Self {
        self.field(key, TYPE_STRING, string_items(value.as_bytes()).to_vec())
    }

    pub fn string_array(self, key: &str, values: &[&str]) -> Self {
        let raw: Vec<&[u8]> = values.iter().map(|s| s.as_bytes()).collect();
        self.raw_string_array(key, &raw)
    }

    /// String array whose items are written verbatim, valid UTF-8 or not
    pub fn raw_string_array(self, key: &str, values: &[&[u8]]) -> Self {
        let mut items = vec![Item::U32(TYPE_STRING), Item::U64(values.len() as u64)];
        for value in values {
            items.extend(string_items(value));
        }
        self.field(key, TYPE_ARRAY, items)
    }

    pub fn nested_u8_arrays(self, key: &str, values: &[&[u8]]) -> Self {
        let mut items = vec![Item::U32(TYPE_ARRAY), Item::U64(values.len() as u64)];
        for value in values {
            items.push(Item::U32(TYPE_UINT8));
            items.push(Item::U64(value.len() as u64));
            items.push(Item::Bytes(value.to_vec()));
        }
        self.field(key, TYPE_ARRAY, items)
    }

    /// Field with an arbitrary type tag and a pre-encoded payload
    pub fn raw_field(self, key: &str, value_type: u32, payload: &[u8]) -> Self {
        self.field(key, value_type, vec![Item::Bytes(payload.to_vec())])
    }

    /// Set `general.alignment` and pad the output to it
    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment as usize;
        self.u32("general.alignment", alignment)
    }

    pub fn tensor(mut self, name: &str, shape: &[u64], ggml_type: u32, offset: u64) -> Self {
        let mut items = string_items(name.as_bytes()).to_vec();
        items.push(Item::U32(shape.len() as u32));
        items.extend(shape.iter().map(|&d| Item::U64(d)));
        items.push(Item::U32(ggml_type));
        items.push(Item::U64(offset));
        self.tensors.push(items);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"GGUF".to_vec();
        self.write(&mut out, &Item::U32(self.version));
        self.write(&mut out, &Item::U64(self.tensors.len() as u64));
        self.write(&mut out, &Item::U64(self.kv.len() as u64));
        for item in self.kv.iter().chain(&self.tensors).flatten() {
            self.write(&mut out, item);
        }
        if self.alignment > 0 {
            while out.len() % self.alignment != 0 {
                out.push(0);
            }
        }
        out
    }

    fn write(&self, out: &mut Vec<u8>, item: &Item) {
        match *item {
            Item::U32(v) => {
                let v = if self.swapped { v.swap_bytes() } else { v };
                out.extend_from_slice(&v.to_ne_bytes());
            }
            Item::U64(v) => {
                let v = if self.swapped { v.swap_bytes() } else { v };
                out.extend_from_slice(&v.to_ne_bytes());
            }
            Item::Bytes(ref bytes) => out.extend_from_slice(bytes),
        }
    }
}
