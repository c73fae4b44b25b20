use crate::utils::compression::error::CompressionError;
use log::error;
use ntapi::{
    ntrtl::{RtlDecompressBufferEx, RtlGetCompressionWorkSpaceSize},
    winapi::um::winnt::PVOID,
};

/// `COMPRESSION_FORMAT_XPRESS_HUFF`
const XPRESS_HUFFMAN: u16 = 4;

/// Decompress Xpress Huffman data using the Windows API
pub(crate) fn decompress_huffman_api(
    data: &[u8],
    decompress_size: u32,
) -> Result<Vec<u8>, CompressionError> {
    let mut buffer_workspace_size: u32 = 0;
    let mut frag_workspace_size: u32 = 0;
    let mut decom_size = 0;

    let mut compressed = data.to_vec();
    let mut decompress_data = Vec::with_capacity(decompress_size as usize);

    let success = 0;

    // Make two calls to Windows APIs to decompress the data
    #[allow(unsafe_code)]
    unsafe {
        let status = RtlGetCompressionWorkSpaceSize(
            XPRESS_HUFFMAN,
            &mut buffer_workspace_size,
            &mut frag_workspace_size,
        );
        if status != success {
            error!("[compression] Failed to get xpress huffman workspace size: {status}");
            return Err(CompressionError::HuffmanCompression);
        }

        let frag_result = frag_workspace_size.try_into();
        let frag_size: usize = match frag_result {
            Ok(result) => result,
            Err(err) => {
                error!("[compression] Failed to get fragment workspace size data: {err:?}");
                return Err(CompressionError::HuffmanCompression);
            }
        };
        let mut frag_data_size: Vec<PVOID> = Vec::with_capacity(frag_size);

        let status = RtlDecompressBufferEx(
            XPRESS_HUFFMAN,
            decompress_data.as_mut_ptr(),
            decompress_size,
            compressed.as_mut_ptr(),
            compressed.len() as u32,
            &mut decom_size,
            frag_data_size.as_mut_ptr().cast::<std::ffi::c_void>(),
        );
        if status != success {
            error!("[compression] Failed to decompress data: {status}");
            return Err(CompressionError::HuffmanCompression);
        }
        decompress_data.set_len(decom_size as usize);
    }

    Ok(decompress_data)
}
