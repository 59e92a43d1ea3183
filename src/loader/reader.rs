//! GGUF container parsing
//!
//! Parses the header, the metadata key/value section and the tensor info
//! section of a GGUF v2/v3 buffer. Metadata values are not decoded: each
//! field keeps the raw byte slices it was encoded from (`parts`) plus the
//! indices of the slices that carry values (`data`).

use std::collections::HashMap;

use super::endian::ByteOrder;
use super::error::GgufError;

/// File magic, "GGUF"
pub const GGUF_MAGIC: &[u8; 4] = b"GGUF";

/// Alignment of the tensor data section when `general.alignment` is absent
pub const GGUF_DEFAULT_ALIGNMENT: u32 = 32;

const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];

// Arrays of arrays are legal but never deeper than this in practice.
const MAX_ARRAY_DEPTH: usize = 16;

/// GGUF metadata value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum GgufValueType {
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    Int32 = 5,
    Float32 = 6,
    Bool = 7,
    String = 8,
    Array = 9,
    Uint64 = 10,
    Int64 = 11,
    Float64 = 12,
}

impl GgufValueType {
    pub fn from_u32(value: u32) -> Option<Self> {
        let ty = match value {
            0 => Self::Uint8,
            1 => Self::Int8,
            2 => Self::Uint16,
            3 => Self::Int16,
            4 => Self::Uint32,
            5 => Self::Int32,
            6 => Self::Float32,
            7 => Self::Bool,
            8 => Self::String,
            9 => Self::Array,
            10 => Self::Uint64,
            11 => Self::Int64,
            12 => Self::Float64,
            _ => return None,
        };
        Some(ty)
    }

    /// Encoded size of a scalar value, `None` for strings and arrays
    pub fn scalar_size(self) -> Option<usize> {
        match self {
            Self::Uint8 | Self::Int8 | Self::Bool => Some(1),
            Self::Uint16 | Self::Int16 => Some(2),
            Self::Uint32 | Self::Int32 | Self::Float32 => Some(4),
            Self::Uint64 | Self::Int64 | Self::Float64 => Some(8),
            Self::String | Self::Array => None,
        }
    }
}

/// One metadata key/value entry.
///
/// `parts` holds every raw slice of the entry in encoding order: key length,
/// key bytes, value type, then the value itself (for arrays: element type,
/// element count, then each element). `data` indexes the parts that carry
/// values; for a string array, `parts[data[i]]` is the UTF-8 bytes of item
/// `i` without its length prefix.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    /// Byte offset of the entry in the file
    pub offset: usize,
    pub name: String,
    pub parts: Vec<&'a [u8]>,
    pub data: Vec<usize>,
    /// Declared value type, followed by element types for arrays
    pub types: Vec<GgufValueType>,
}

impl<'a> Field<'a> {
    /// Declared value type of the entry
    pub fn value_type(&self) -> Option<GgufValueType> {
        self.types.first().copied()
    }

    /// Whether the entry is declared as an array of strings
    pub fn is_string_array(&self) -> bool {
        matches!(
            self.types.as_slice(),
            [GgufValueType::Array, GgufValueType::String, ..]
        )
    }

    /// Raw bytes of part `id`
    pub fn part(&self, id: usize) -> Option<&'a [u8]> {
        self.parts.get(id).copied()
    }
}

/// Tensor info entry (tensor data itself is never read)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorInfo {
    pub name: String,
    pub shape: Vec<u64>,
    /// GGML type ID
    pub ggml_type: u32,
    /// Offset relative to the start of the tensor data section
    pub offset: u64,
}

/// Parsed view of a GGUF buffer.
///
/// Fields borrow their parts from the buffer passed to [`GgufReader::new`].
#[derive(Debug)]
pub struct GgufReader<'a> {
    version: u32,
    byte_order: ByteOrder,
    fields: Vec<Field<'a>>,
    index: HashMap<String, usize>,
    tensors: Vec<TensorInfo>,
    alignment: u32,
    data_offset: usize,
}

impl<'a> GgufReader<'a> {
    /// Parse a complete GGUF buffer
    pub fn new(bytes: &'a [u8]) -> Result<Self, GgufError> {
        let mut cursor = Cursor::new(bytes);

        let magic = cursor.take(4)?;
        if magic != GGUF_MAGIC {
            return Err(GgufError::InvalidMagic(
                String::from_utf8_lossy(magic).into_owned(),
            ));
        }

        // The version is read in host order first. A file written with the
        // other byte order shows up with the low half zeroed.
        let mut version = cursor.read_u32()?;
        if version & 0xFFFF == 0 {
            cursor.order = ByteOrder::Swapped;
            version = version.swap_bytes();
        }
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(GgufError::UnsupportedVersion(version));
        }

        let tensor_count = cursor.read_u64()?;
        let kv_count = cursor.read_u64()?;

        let mut fields = Vec::with_capacity(cursor.capacity_hint(kv_count));
        let mut index = HashMap::with_capacity(fields.capacity());
        for _ in 0..kv_count {
            let field = parse_field(&mut cursor)?;
            // A repeated key keeps the first entry under its own name and the
            // later one under `<name>_<offset>`.
            let key = if index.contains_key(&field.name) {
                tracing::warn!("Duplicate key {} at offset {}", field.name, field.offset);
                format!("{}_{}", field.name, field.offset)
            } else {
                field.name.clone()
            };
            index.insert(key, fields.len());
            fields.push(field);
        }

        let mut tensors = Vec::with_capacity(cursor.capacity_hint(tensor_count));
        for _ in 0..tensor_count {
            tensors.push(parse_tensor_info(&mut cursor)?);
        }

        let alignment = match index.get("general.alignment") {
            Some(&i) => read_alignment(&fields[i], cursor.order)?,
            None => GGUF_DEFAULT_ALIGNMENT,
        };

        let mut data_offset = cursor.pos;
        let padding = data_offset % alignment as usize;
        if padding != 0 {
            data_offset += alignment as usize - padding;
        }
        if !tensors.is_empty() && data_offset > bytes.len() {
            return Err(GgufError::Truncated {
                offset: bytes.len(),
                needed: data_offset - bytes.len(),
            });
        }

        Ok(Self {
            version,
            byte_order: cursor.order,
            fields,
            index,
            tensors,
            alignment,
            data_offset,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// All metadata fields in file order
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Look up a metadata field by key
    pub fn get_field(&self, name: &str) -> Option<&Field<'a>> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn tensors(&self) -> &[TensorInfo] {
        &self.tensors
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Offset of the tensor data section
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }
}

/// Bounds-checked reader over the raw buffer
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            order: ByteOrder::Native,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Never preallocate more entries than there are bytes left.
    fn capacity_hint(&self, count: u64) -> usize {
        usize::try_from(count)
            .unwrap_or(usize::MAX)
            .min(self.remaining())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GgufError> {
        if len > self.remaining() {
            return Err(GgufError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<(u32, &'a [u8]), GgufError> {
        let raw = self.take(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        let value = u32::from_ne_bytes(buf);
        let value = match self.order {
            ByteOrder::Native => value,
            ByteOrder::Swapped => value.swap_bytes(),
        };
        Ok((value, raw))
    }

    fn take_u64(&mut self) -> Result<(u64, &'a [u8]), GgufError> {
        let raw = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        let value = u64::from_ne_bytes(buf);
        let value = match self.order {
            ByteOrder::Native => value,
            ByteOrder::Swapped => value.swap_bytes(),
        };
        Ok((value, raw))
    }

    fn read_u32(&mut self) -> Result<u32, GgufError> {
        self.take_u32().map(|(v, _)| v)
    }

    fn read_u64(&mut self) -> Result<u64, GgufError> {
        self.take_u64().map(|(v, _)| v)
    }

    /// Read a u64 length and convert it to `usize`
    fn take_len(&mut self) -> Result<(usize, &'a [u8]), GgufError> {
        let offset = self.pos;
        let (len, raw) = self.take_u64()?;
        let len =
            usize::try_from(len).map_err(|_| GgufError::SizeOverflow { offset, value: len })?;
        Ok((len, raw))
    }

    fn take_value_type(&mut self) -> Result<(GgufValueType, &'a [u8]), GgufError> {
        let offset = self.pos;
        let (raw_type, raw) = self.take_u32()?;
        let value_type = GgufValueType::from_u32(raw_type).ok_or(GgufError::UnknownValueType {
            value_type: raw_type,
            offset,
        })?;
        Ok((value_type, raw))
    }

    /// Read a length-prefixed UTF-8 string
    fn read_string(&mut self) -> Result<String, GgufError> {
        let offset = self.pos;
        let (len, _) = self.take_len()?;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| GgufError::InvalidUtf8 { offset })
    }
}

/// Raw parts of a single value
struct ValueParts<'a> {
    parts: Vec<&'a [u8]>,
    data: Vec<usize>,
    types: Vec<GgufValueType>,
}

fn parse_field<'a>(cursor: &mut Cursor<'a>) -> Result<Field<'a>, GgufError> {
    let offset = cursor.pos;

    let (key_len, raw_key_len) = cursor.take_len()?;
    let raw_key = cursor.take(key_len)?;
    let name = std::str::from_utf8(raw_key)
        .map_err(|_| GgufError::InvalidUtf8 { offset })?
        .to_owned();
    let (value_type, raw_type) = cursor.take_value_type()?;

    let value = parse_value(cursor, value_type, 0)?;

    let mut parts = Vec::with_capacity(value.parts.len() + 3);
    parts.extend([raw_key_len, raw_key, raw_type]);
    let header_parts = parts.len();
    parts.extend(value.parts);

    Ok(Field {
        offset,
        name,
        parts,
        data: value.data.into_iter().map(|i| i + header_parts).collect(),
        types: value.types,
    })
}

fn parse_value<'a>(
    cursor: &mut Cursor<'a>,
    value_type: GgufValueType,
    depth: usize,
) -> Result<ValueParts<'a>, GgufError> {
    if let Some(size) = value_type.scalar_size() {
        return Ok(ValueParts {
            parts: vec![cursor.take(size)?],
            data: vec![0],
            types: vec![value_type],
        });
    }

    if value_type == GgufValueType::String {
        let (len, raw_len) = cursor.take_len()?;
        let raw = cursor.take(len)?;
        return Ok(ValueParts {
            parts: vec![raw_len, raw],
            data: vec![1],
            types: vec![value_type],
        });
    }

    if depth >= MAX_ARRAY_DEPTH {
        return Err(GgufError::NestingTooDeep {
            offset: cursor.pos,
            depth,
        });
    }

    let (item_type, raw_item_type) = cursor.take_value_type()?;
    let count_offset = cursor.pos;
    let (count, raw_count) = cursor.take_u64()?;
    let count = usize::try_from(count).map_err(|_| GgufError::SizeOverflow {
        offset: count_offset,
        value: count,
    })?;

    let mut value = ValueParts {
        parts: vec![raw_item_type, raw_count],
        data: Vec::with_capacity(cursor.capacity_hint(count as u64)),
        types: vec![GgufValueType::Array, item_type],
    };

    for i in 0..count {
        let item = parse_value(cursor, item_type, depth + 1)?;
        if i == 0 && item_type == GgufValueType::Array {
            // Record the nested element types once.
            value.types.extend(item.types.iter().skip(1));
        }
        let base = value.parts.len();
        value.data.extend(item.data.iter().map(|d| d + base));
        value.parts.extend(item.parts);
    }

    Ok(value)
}

fn parse_tensor_info(cursor: &mut Cursor<'_>) -> Result<TensorInfo, GgufError> {
    let name = cursor.read_string()?;

    let n_dims = cursor.read_u32()?;
    let mut shape = Vec::with_capacity(cursor.capacity_hint(n_dims as u64));
    for _ in 0..n_dims {
        shape.push(cursor.read_u64()?);
    }

    let ggml_type = cursor.read_u32()?;
    let offset = cursor.read_u64()?;

    Ok(TensorInfo {
        name,
        shape,
        ggml_type,
        offset,
    })
}

fn read_alignment(field: &Field<'_>, order: ByteOrder) -> Result<u32, GgufError> {
    if field.types != [GgufValueType::Uint32] {
        return Err(GgufError::InvalidAlignment(format!(
            "expected a u32 value, found {:?}",
            field.types
        )));
    }

    let raw = field
        .data
        .first()
        .and_then(|&i| field.part(i))
        .ok_or_else(|| GgufError::InvalidAlignment("missing value".to_string()))?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(raw);
    let value = u32::from_ne_bytes(buf);
    let value = match order {
        ByteOrder::Native => value,
        ByteOrder::Swapped => value.swap_bytes(),
    };

    if value == 0 {
        return Err(GgufError::InvalidAlignment("alignment must be non-zero".to_string()));
    }
    Ok(value)
}
