use super::error::PrefetchError;
use crate::utils::{
    nom_helper::{nom_data_at, nom_unsigned_four_bytes, Endian},
    strings::extract_utf16_string,
};
use log::error;
use nom::bytes::complete::take;
use serde::Serialize;

/// Size of the header shared by every prefetch version
pub(crate) const HEADER_SIZE: usize = 84;
const SIGNATURE: &[u8; 4] = b"SCCA";
const COMPRESSED_SIGNATURE: &[u8; 3] = b"MAM";

/// Known prefetch versions. The version decides every layout after the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u32")]
pub enum FormatVersion {
    /**Windows XP and Server 2003 */
    Xp2003 = 17,
    /**Windows Vista and 7 */
    Vista7 = 23,
    /**Windows 8, 8.1 and Server 2012 */
    Win8x = 26,
    /**Early Windows 10 */
    Win10Early = 30,
    /**Windows 11 */
    Win11 = 31,
}

impl FormatVersion {
    pub fn from_value(value: u32) -> Option<FormatVersion> {
        match value {
            17 => Some(FormatVersion::Xp2003),
            23 => Some(FormatVersion::Vista7),
            26 => Some(FormatVersion::Win8x),
            30 => Some(FormatVersion::Win10Early),
            31 => Some(FormatVersion::Win11),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        *self as u32
    }

    /// Size of the file information section that follows the header
    pub(crate) fn section_size(&self) -> usize {
        match self {
            FormatVersion::Xp2003 => 68,
            FormatVersion::Vista7 => 72,
            FormatVersion::Win8x | FormatVersion::Win10Early | FormatVersion::Win11 => 140,
        }
    }

    /// Size of one file metric record
    pub(crate) fn metric_size(&self) -> usize {
        match self {
            FormatVersion::Xp2003 => 20,
            _ => 32,
        }
    }

    /// Size of one trace chain entry
    pub(crate) fn trace_chain_size(&self) -> usize {
        match self {
            FormatVersion::Xp2003 | FormatVersion::Vista7 => 12,
            _ => 16,
        }
    }
}

impl From<FormatVersion> for u32 {
    fn from(version: FormatVersion) -> u32 {
        version.value()
    }
}

/// Header in front of Windows 10+ compressed prefetch files
#[derive(Debug, PartialEq)]
pub(crate) struct CompressedHeader {
    /**4 is Xpress Huffman */
    pub(crate) format: u8,
    pub(crate) uncompressed_size: u32,
}

impl CompressedHeader {
    /// Check for the compressed prefetch signature (MAM)
    pub(crate) fn is_compressed(data: &[u8]) -> bool {
        data.starts_with(COMPRESSED_SIGNATURE)
    }

    /// Parse compressed prefetch header. Returns the compressed payload and the header
    pub(crate) fn parse_compressed_header(data: &[u8]) -> nom::IResult<&[u8], CompressedHeader> {
        let (input, _signature) = take(COMPRESSED_SIGNATURE.len())(data)?;
        let (input, format) = take(1u8)(input)?;
        let (input, uncompressed_size) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let header = CompressedHeader {
            format: format[0],
            uncompressed_size,
        };
        Ok((input, header))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: FormatVersion,
    pub signature: String,
    /**Size of the (uncompressed) prefetch file */
    pub file_size: u32,
    pub executable_name: String,
    /**Path hash as 8 uppercase hex digits */
    pub hash: String,
}

impl Header {
    /// Parse the common 84 byte header
    pub(crate) fn parse_header(data: &[u8]) -> Result<Header, PrefetchError> {
        let signature_result = nom_data_at(data, 4, SIGNATURE.len() as u64);
        match signature_result {
            Ok((_, signature)) if signature == SIGNATURE => {}
            _ => {
                error!("[prefetch] Missing SCCA signature");
                return Err(PrefetchError::InvalidSignature);
            }
        }

        let (_, version_value) = match nom_unsigned_four_bytes(data, Endian::Le) {
            Ok(result) => result,
            Err(_err) => return Err(PrefetchError::InvalidSignature),
        };
        let version = match FormatVersion::from_value(version_value) {
            Some(result) => result,
            None => {
                error!("[prefetch] Unknown prefetch version: {version_value}");
                return Err(PrefetchError::UnknownVersion);
            }
        };

        let header_result = Header::header_fields(data, version);
        match header_result {
            Ok((_, header)) => Ok(header),
            Err(err) => {
                error!(
                    "[prefetch] Header too small ({} bytes): {err:?}",
                    data.len()
                );
                Err(PrefetchError::Header)
            }
        }
    }

    fn header_fields(data: &[u8], version: FormatVersion) -> nom::IResult<&[u8], Header> {
        let (input, _version) = nom_unsigned_four_bytes(data, Endian::Le)?;
        let (input, signature) = take(SIGNATURE.len())(input)?;
        let (input, _unknown) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, file_size) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let filename_size: usize = 60;
        let (input, filename_data) = take(filename_size)(input)?;
        let (input, hash) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, _unknown_flags) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let header = Header {
            version,
            signature: String::from_utf8_lossy(signature).to_string(),
            file_size,
            executable_name: extract_utf16_string(filename_data).trim().to_string(),
            hash: format!("{hash:08X}"),
        };

        Ok((input, header))
    }
}
