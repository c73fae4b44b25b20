use crate::utils::compression::error::CompressionError;
use log::error;

/// Each block of output has its own Huffman table
const BLOCK_SIZE: usize = 65536;
/// 512 symbols, 4 bit code length each
const TABLE_SIZE: usize = 256;
const SYMBOL_COUNT: usize = 512;
const MAX_CODE_LENGTH: u32 = 15;
const LOOKUP_SIZE: usize = 1 << MAX_CODE_LENGTH;
const NO_SYMBOL: u16 = u16::MAX;
/// The bit reader may load one word past the final symbol
const READ_SLACK: usize = 4;
/// Do not trust the declared size when reserving memory
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Decompress Xpress Huffman (MS-XCA) data. Decompression stops once `size` bytes have been produced
pub(crate) fn decompress_xpress_huffman(
    data: &[u8],
    size: usize,
) -> Result<Vec<u8>, CompressionError> {
    let mut output: Vec<u8> = Vec::with_capacity(size.min(MAX_PREALLOC));
    let mut reader = BitReader {
        data,
        position: 0,
        next_bits: 0,
        extra_bits: 0,
    };

    while output.len() < size {
        let table = reader.table()?;
        let huffman = HuffmanTable::new(table)?;
        reader.start_block()?;

        let block_end = (output.len() + BLOCK_SIZE).min(size);
        while output.len() < block_end {
            let symbol = huffman.decode(&mut reader)?;
            if symbol < 256 {
                output.push(symbol as u8);
                continue;
            }
            copy_match(symbol - 256, &mut reader, &mut output, size)?;
        }
    }

    Ok(output)
}

/// Decode a match symbol and copy the referenced bytes
fn copy_match(
    symbol: u16,
    reader: &mut BitReader<'_>,
    output: &mut Vec<u8>,
    size: usize,
) -> Result<(), CompressionError> {
    let mut length = (symbol & 0xf) as usize;
    let offset_bits = (symbol >> 4) as u32;

    if length == 15 {
        length = reader.byte()? as usize;
        if length == 255 {
            length = reader.word()? as usize;
            if length == 0 {
                length = reader.dword()? as usize;
            }
            if length < 15 {
                error!("[compression] Xpress huffman match length too small: {length}");
                return Err(CompressionError::XpressBadLength);
            }
            length -= 15;
        }
        length += 15;
    }
    length += 3;

    let offset = (reader.peek(offset_bits) | (1 << offset_bits)) as usize;
    reader.consume(offset_bits)?;

    if offset > output.len() {
        error!(
            "[compression] Xpress huffman offset {offset} before start of output {}",
            output.len()
        );
        return Err(CompressionError::XpressBadOffset);
    }

    let remaining = size - output.len();
    let start = output.len() - offset;
    // Matches may overlap the bytes they produce
    for index in 0..length.min(remaining) {
        let value = output[start + index];
        output.push(value);
    }
    Ok(())
}

struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    next_bits: u32,
    extra_bits: i32,
}

impl<'a> BitReader<'a> {
    /// Get the 256 byte table that starts a block
    fn table(&mut self) -> Result<&'a [u8], CompressionError> {
        let end = self.position + TABLE_SIZE;
        match self.data.get(self.position..end) {
            Some(table) => {
                self.position = end;
                Ok(table)
            }
            None => {
                error!(
                    "[compression] Not enough data for xpress huffman table at {}",
                    self.position
                );
                Err(CompressionError::XpressNoMoreData)
            }
        }
    }

    /// Load the first 32 bits of a block
    fn start_block(&mut self) -> Result<(), CompressionError> {
        let high = self.next_word()? as u32;
        let low = self.next_word()? as u32;
        self.next_bits = (high << 16) | low;
        self.extra_bits = 16;
        Ok(())
    }

    /// Little endian u16 from the stream. Reads slightly past the end are zero
    fn next_word(&mut self) -> Result<u16, CompressionError> {
        if self.position + 2 > self.data.len() + READ_SLACK {
            return Err(CompressionError::XpressNoMoreData);
        }
        let low = self.data.get(self.position).copied().unwrap_or_default();
        let high = self.data.get(self.position + 1).copied().unwrap_or_default();
        self.position += 2;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Top `count` bits of the buffer
    fn peek(&self, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        self.next_bits >> (32 - count)
    }

    fn consume(&mut self, count: u32) -> Result<(), CompressionError> {
        self.next_bits = self.next_bits.checked_shl(count).unwrap_or_default();
        self.extra_bits -= count as i32;
        if self.extra_bits < 0 {
            let word = self.next_word()? as u32;
            self.next_bits |= word << (-self.extra_bits) as u32;
            self.extra_bits += 16;
        }
        Ok(())
    }

    /// Raw bytes used by long match lengths. These are never zero filled
    fn take(&mut self, count: usize) -> Result<&'a [u8], CompressionError> {
        let end = self.position + count;
        match self.data.get(self.position..end) {
            Some(value) => {
                self.position = end;
                Ok(value)
            }
            None => Err(CompressionError::XpressNoMoreData),
        }
    }

    fn byte(&mut self) -> Result<u8, CompressionError> {
        let value = self.take(1)?;
        Ok(value[0])
    }

    fn word(&mut self) -> Result<u16, CompressionError> {
        let value = self.take(2)?;
        Ok(u16::from_le_bytes([value[0], value[1]]))
    }

    fn dword(&mut self) -> Result<u32, CompressionError> {
        let value = self.take(4)?;
        Ok(u32::from_le_bytes([value[0], value[1], value[2], value[3]]))
    }
}

struct HuffmanTable {
    lengths: [u8; SYMBOL_COUNT],
    lookup: Vec<u16>,
}

impl HuffmanTable {
    /// Build the canonical code lookup table. Codes are assigned by length then by symbol value
    fn new(table: &[u8]) -> Result<HuffmanTable, CompressionError> {
        let mut lengths = [0; SYMBOL_COUNT];
        for (index, value) in table.iter().enumerate() {
            lengths[index * 2] = value & 0xf;
            lengths[index * 2 + 1] = value >> 4;
        }

        let mut lookup = vec![NO_SYMBOL; LOOKUP_SIZE];
        let mut entry = 0;
        for bit_length in 1..=MAX_CODE_LENGTH {
            for (symbol, length) in lengths.iter().enumerate() {
                if *length as u32 != bit_length {
                    continue;
                }
                let count = 1 << (MAX_CODE_LENGTH - bit_length);
                if entry + count > LOOKUP_SIZE {
                    error!("[compression] Xpress huffman table is oversubscribed");
                    return Err(CompressionError::XpressBadPrefix);
                }
                lookup[entry..entry + count].fill(symbol as u16);
                entry += count;
            }
        }

        if entry == 0 {
            error!("[compression] Xpress huffman table has no symbols");
            return Err(CompressionError::XpressBadPrefix);
        }

        Ok(HuffmanTable { lengths, lookup })
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16, CompressionError> {
        let symbol = self.lookup[reader.peek(MAX_CODE_LENGTH) as usize];
        // Incomplete tables leave some codes unassigned
        if symbol == NO_SYMBOL {
            return Err(CompressionError::XpressBadPrefix);
        }
        reader.consume(self.lengths[symbol as usize] as u32)?;
        Ok(symbol)
    }
}
