/**
 * Prefetch structures are little endian integers sitting at fixed or stored offsets.
 * With nom that is always two steps:
 *   `take X bytes`
 *   `le_uX` to number
 *
 * These helpers keep the parsers free of the repetition and of manual slice indexing
 */
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u64, le_u16, le_u32, le_u64},
};
use std::mem::size_of;

pub(crate) enum Endian {
    /**Little Endian */
    Le,
    /**Big Endian */
    Be,
}

/**
 * Nom two (2) bytes to u16
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_two_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u16> {
    let (input, value_data) = take(size_of::<u16>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u16(value_data)?,
        Endian::Be => be_u16(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom four (4) bytes to u32
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_four_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u32> {
    let (input, value_data) = take(size_of::<u32>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u32(value_data)?,
        Endian::Be => be_u32(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom eight (8) bytes to u64
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_eight_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u64> {
    let (input, value_data) = take(size_of::<u64>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u64(value_data)?,
        Endian::Be => be_u64(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom `size` bytes starting at `offset` from the start of `data`.
 * Returns the bytes after the slice and the slice itself. Fails if the range leaves `data`
 */
pub(crate) fn nom_data_at(data: &[u8], offset: u64, size: u64) -> nom::IResult<&[u8], &[u8]> {
    let (input, _) = take(offset)(data)?;
    let (input, value) = take(size)(input)?;

    Ok((input, value))
}

/// Read a little endian u32 at `offset`
pub(crate) fn nom_u32_at(data: &[u8], offset: u64) -> nom::IResult<&[u8], u32> {
    let (_, value_data) = nom_data_at(data, offset, size_of::<u32>() as u64)?;
    nom_unsigned_four_bytes(value_data, Endian::Le)
}

/// Read a little endian u64 at `offset`
pub(crate) fn nom_u64_at(data: &[u8], offset: u64) -> nom::IResult<&[u8], u64> {
    let (_, value_data) = nom_data_at(data, offset, size_of::<u64>() as u64)?;
    nom_unsigned_eight_bytes(value_data, Endian::Le)
}
