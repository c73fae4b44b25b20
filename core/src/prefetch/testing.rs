//! Builds synthetic prefetch files for unit tests

use super::header::HEADER_SIZE;
use crate::utils::compression::xpress::huffman::tests::literal_huffman;

pub(crate) const VOLUME_ENTRY_SIZE: usize = 40;

pub(crate) fn utf16(value: &str) -> Vec<u8> {
    value
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

pub(crate) fn patch_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn patch_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Just the 84 byte header
pub(crate) fn header_bytes(version: u32, name: &str, hash: u32, size: u32) -> Vec<u8> {
    let mut data = vec![0; HEADER_SIZE];
    patch_u32(&mut data, 0, version);
    data[4..8].copy_from_slice(b"SCCA");
    patch_u32(&mut data, 8, 0x0f);
    patch_u32(&mut data, 12, size);
    let name_bytes = utf16(name);
    let name_size = name_bytes.len().min(58);
    data[16..16 + name_size].copy_from_slice(&name_bytes[..name_size]);
    patch_u32(&mut data, 76, hash);
    data
}

/// Wrap data in a MAM container using the literal only Huffman encoder
pub(crate) fn mam_compress(data: &[u8]) -> Vec<u8> {
    let mut compressed = b"MAM\x04".to_vec();
    compressed.extend_from_slice(&(data.len() as u32).to_le_bytes());
    compressed.extend(literal_huffman(data));
    compressed
}

pub(crate) struct TestMetric {
    pub(crate) filename: String,
    pub(crate) mft: u64,
    pub(crate) start_time: u32,
    pub(crate) duration: u32,
    pub(crate) flags: u32,
}

pub(crate) struct TestVolume {
    pub(crate) device: String,
    pub(crate) serial: u32,
    pub(crate) created: u64,
    pub(crate) references: Vec<u64>,
    pub(crate) directories: Vec<String>,
}

/// Absolute offsets of the sections written by `PrefetchBuilder::build`
#[derive(Debug, Default)]
pub(crate) struct Layout {
    pub(crate) metrics_offset: usize,
    pub(crate) trace_chains_offset: usize,
    pub(crate) filenames_offset: usize,
    pub(crate) filenames_size: usize,
    pub(crate) volumes_offset: usize,
    pub(crate) volumes_size: usize,
    /**Per volume: (device name, file references, directory strings) relative to `volumes_offset` */
    pub(crate) volume_data: Vec<(usize, usize, usize)>,
}

pub(crate) struct PrefetchBuilder {
    version: u32,
    name: String,
    hash: u32,
    run_times: Vec<u64>,
    run_count: u32,
    metrics_offset: Option<usize>,
    metrics: Vec<TestMetric>,
    extra_filenames: Vec<String>,
    volumes: Vec<TestVolume>,
}

impl PrefetchBuilder {
    pub(crate) fn new(version: u32) -> PrefetchBuilder {
        PrefetchBuilder {
            version,
            name: String::from("NOTEPAD.EXE"),
            hash: 0xAF43252D,
            run_times: Vec::new(),
            run_count: 0,
            metrics_offset: None,
            metrics: Vec::new(),
            extra_filenames: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub(crate) fn name(mut self, name: &str, hash: u32) -> Self {
        self.name = name.to_string();
        self.hash = hash;
        self
    }

    /// Raw FILETIME slots. Zero slots are written as is
    pub(crate) fn run_times(mut self, run_times: &[u64]) -> Self {
        self.run_times = run_times.to_vec();
        self
    }

    pub(crate) fn run_count(mut self, run_count: u32) -> Self {
        self.run_count = run_count;
        self
    }

    pub(crate) fn metrics_offset(mut self, offset: usize) -> Self {
        self.metrics_offset = Some(offset);
        self
    }

    pub(crate) fn metric(mut self, filename: &str, mft: u64) -> Self {
        let index = self.metrics.len() as u32;
        self.metrics.push(TestMetric {
            filename: filename.to_string(),
            mft,
            start_time: index * 10,
            duration: index + 1,
            flags: 0x200,
        });
        self
    }

    /// Filename present in the strings block but not referenced by a metric
    pub(crate) fn filename(mut self, filename: &str) -> Self {
        self.extra_filenames.push(filename.to_string());
        self
    }

    pub(crate) fn volume(mut self, volume: TestVolume) -> Self {
        self.volumes.push(volume);
        self
    }

    fn default_metrics_offset(&self) -> usize {
        match self.version {
            17 => 152,
            23 => 240,
            _ => 304,
        }
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub(crate) fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let mut layout = Layout::default();
        let legacy = self.version == 17;
        let trace_size = if self.version <= 23 { 12 } else { 16 };

        layout.metrics_offset = self.metrics_offset.unwrap_or(self.default_metrics_offset());
        let mut data = header_bytes(self.version, &self.name, self.hash, 0);
        data.resize(layout.metrics_offset, 0);

        // Filename strings block
        let mut strings = Vec::new();
        let mut metric_strings = Vec::new();
        for metric in &self.metrics {
            metric_strings.push((strings.len(), metric.filename.encode_utf16().count()));
            strings.extend(utf16(&metric.filename));
            strings.extend_from_slice(&[0, 0]);
        }
        for filename in &self.extra_filenames {
            strings.extend(utf16(filename));
            strings.extend_from_slice(&[0, 0]);
        }

        for (metric, (string_offset, string_length)) in self.metrics.iter().zip(&metric_strings) {
            let mut record = Vec::new();
            record.extend_from_slice(&metric.start_time.to_le_bytes());
            record.extend_from_slice(&metric.duration.to_le_bytes());
            if !legacy {
                record.extend_from_slice(&(metric.duration * 2).to_le_bytes());
            }
            record.extend_from_slice(&(*string_offset as u32).to_le_bytes());
            record.extend_from_slice(&(*string_length as u32).to_le_bytes());
            record.extend_from_slice(&metric.flags.to_le_bytes());
            if !legacy {
                record.extend_from_slice(&metric.mft.to_le_bytes());
            }
            data.extend(record);
        }

        layout.trace_chains_offset = data.len();
        for (index, _) in self.metrics.iter().enumerate() {
            let next = if index + 1 == self.metrics.len() {
                u32::MAX
            } else {
                index as u32 + 1
            };
            data.extend_from_slice(&next.to_le_bytes());
            data.extend_from_slice(&(index as u32 + 5).to_le_bytes());
            if trace_size == 12 {
                data.extend_from_slice(&0x0003_0001u32.to_le_bytes());
            } else {
                data.extend_from_slice(&1u16.to_le_bytes());
                data.extend_from_slice(&(index as u16 + 2).to_le_bytes());
                data.extend_from_slice(&[0; 4]);
            }
        }

        layout.filenames_offset = data.len();
        layout.filenames_size = strings.len();
        data.extend(strings);

        layout.volumes_offset = data.len();
        let mut volume_data = Vec::new();
        let mut entries = Vec::new();
        let entries_size = self.volumes.len() * VOLUME_ENTRY_SIZE;
        for volume in &self.volumes {
            let device_offset = entries_size + volume_data.len();
            volume_data.extend(utf16(&volume.device));
            volume_data.extend_from_slice(&[0, 0]);

            let references_offset = entries_size + volume_data.len();
            volume_data.extend_from_slice(&(if legacy { 1u32 } else { 3u32 }).to_le_bytes());
            volume_data.extend_from_slice(&(volume.references.len() as u32).to_le_bytes());
            for reference in &volume.references {
                volume_data.extend_from_slice(&reference.to_le_bytes());
            }
            let references_size = 8 + volume.references.len() * 8;

            let directories_offset = entries_size + volume_data.len();
            for directory in &volume.directories {
                let chars = directory.encode_utf16().count() as u16;
                volume_data.extend_from_slice(&chars.to_le_bytes());
                volume_data.extend(utf16(directory));
                volume_data.extend_from_slice(&[0, 0]);
            }

            let mut entry = Vec::new();
            entry.extend_from_slice(&(device_offset as u32).to_le_bytes());
            entry.extend_from_slice(&(volume.device.encode_utf16().count() as u32).to_le_bytes());
            entry.extend_from_slice(&volume.created.to_le_bytes());
            entry.extend_from_slice(&volume.serial.to_le_bytes());
            entry.extend_from_slice(&(references_offset as u32).to_le_bytes());
            entry.extend_from_slice(&(references_size as u32).to_le_bytes());
            entry.extend_from_slice(&(directories_offset as u32).to_le_bytes());
            entry.extend_from_slice(&(volume.directories.len() as u32).to_le_bytes());
            entry.extend_from_slice(&[0; 4]);
            entries.extend(entry);

            layout
                .volume_data
                .push((device_offset, references_offset, directories_offset));
        }
        data.extend(entries);
        data.extend(volume_data);
        layout.volumes_size = data.len() - layout.volumes_offset;

        // File information section
        let section = HEADER_SIZE;
        patch_u32(&mut data, section, layout.metrics_offset as u32);
        patch_u32(&mut data, section + 4, self.metrics.len() as u32);
        patch_u32(&mut data, section + 8, layout.trace_chains_offset as u32);
        patch_u32(&mut data, section + 12, self.metrics.len() as u32);
        patch_u32(&mut data, section + 16, layout.filenames_offset as u32);
        patch_u32(&mut data, section + 20, layout.filenames_size as u32);
        patch_u32(&mut data, section + 24, layout.volumes_offset as u32);
        patch_u32(&mut data, section + 28, self.volumes.len() as u32);
        patch_u32(&mut data, section + 32, layout.volumes_size as u32);

        let (slots_offset, slot_count, run_count_offset) = match self.version {
            17 => (36, 1, 60),
            23 => (44, 8, 108),
            26 => (44, 8, 124),
            _ if layout.metrics_offset == 296 => (44, 8, 116),
            _ => (44, 8, 124),
        };
        if self.version >= 26 {
            let directories: usize = self.volumes.iter().map(|v| v.directories.len()).sum();
            patch_u32(&mut data, section + 36, directories as u32);
        }
        for (index, run_time) in self.run_times.iter().take(slot_count).enumerate() {
            patch_u64(&mut data, section + slots_offset + index * 8, *run_time);
        }
        patch_u32(&mut data, section + run_count_offset, self.run_count);

        let file_size = data.len() as u32;
        patch_u32(&mut data, 12, file_size);
        (data, layout)
    }
}

pub(crate) fn test_volume(device: &str, serial: u32) -> TestVolume {
    TestVolume {
        device: device.to_string(),
        serial,
        created: 131911905826064574,
        references: vec![0x0001_0000_0000_0005, 0x0002_0000_0000_001c],
        directories: vec![
            format!("{device}\\WINDOWS"),
            format!("{device}\\WINDOWS\\SYSTEM32"),
        ],
    }
}
