//! Streaming WAV writer with dummy-then-patch size fields.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::format::WavFormat;
use super::header::{encode_header, parse_header, DATA_SIZE_OFFSET, HEADER_LEN, RIFF_SIZE_OFFSET};
use super::pcm::pcm16_to_bytes;
use crate::error::{WavError, WavResult};

const HEADER_BYTES: u64 = HEADER_LEN as u64;

/// Largest file length whose RIFF size field (`len - 8`) still fits in 32 bits.
const MAX_FILE_LEN: u64 = u32::MAX as u64 + 8;

/// Appends mono 16-bit PCM to a WAV file while keeping it playable.
///
/// The header is written once at creation with placeholder sizes. After every
/// [`append`](Self::append) or [`truncate_tail`](Self::truncate_tail) the RIFF
/// and data size fields are re-derived from the file's actual length, so a
/// reader opening the file between calls always sees a valid WAV.
///
/// The writer is not synchronized. All mutations take `&mut self`; callers
/// sharing one writer across threads must serialize access themselves (see
/// [`Recorder`](crate::recorder::Recorder)).
#[derive(Debug)]
pub struct StreamingWavWriter {
    path: PathBuf,
    format: WavFormat,
    file: Option<File>,
    len: u64,
    poisoned: bool,
}

impl StreamingWavWriter {
    /// Creates (or truncates) the file at `path` and writes the header.
    ///
    /// The parent directory must already exist.
    pub fn create(path: impl AsRef<Path>) -> WavResult<Self> {
        let path = path.as_ref().to_path_buf();
        let format = WavFormat::CAPTURE;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| WavError::Open {
                path: path.clone(),
                source,
            })?;

        file.write_all(&encode_header(&format, 0))?;
        let len = write_size_fields(&mut file)?;
        debug!("created '{}'", path.display());

        Ok(Self {
            path,
            format,
            file: Some(file),
            len,
            poisoned: false,
        })
    }

    /// Reopens a file previously produced by this writer.
    ///
    /// The header must match the capture format. A dangling half sample is
    /// dropped and both size fields are re-derived from the actual length,
    /// which also repairs files whose sizes went stale after a crash.
    pub fn open_existing(path: impl AsRef<Path>) -> WavResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| WavError::Open {
                path: path.clone(),
                source,
            })?;

        let mut header = Vec::with_capacity(HEADER_LEN);
        Read::by_ref(&mut file)
            .take(HEADER_BYTES)
            .read_to_end(&mut header)?;
        let info = parse_header(&header)?;

        let actual = file.metadata()?.len();
        if actual > MAX_FILE_LEN {
            return Err(WavError::DataTooLarge {
                bytes: actual - HEADER_BYTES,
            });
        }

        let len = realign(&mut file)?;
        if !info.sizes_match(len) {
            warn!(
                "'{}' declared {} data bytes, found {}; size fields rewritten",
                path.display(),
                info.data_size,
                len - HEADER_BYTES
            );
        }

        Ok(Self {
            path,
            format: WavFormat::CAPTURE,
            file: Some(file),
            len,
            poisoned: false,
        })
    }

    /// Appends the first `count` samples of `samples`.
    ///
    /// `count == 0` is a valid no-op. On a failed write the file is cut back
    /// to its last whole sample and the size fields are patched to match
    /// before the error is returned.
    pub fn append(&mut self, samples: &[i16], count: usize) -> WavResult<()> {
        if count > samples.len() {
            return Err(WavError::invalid_arg(
                "count",
                format!("{} exceeds buffer length {}", count, samples.len()),
            ));
        }

        let file = self.handle()?;
        let start = file.seek(SeekFrom::End(0))?;
        let end = start + count as u64 * 2;
        if end > MAX_FILE_LEN {
            return Err(WavError::DataTooLarge {
                bytes: end - HEADER_BYTES,
            });
        }

        let pcm = pcm16_to_bytes(&samples[..count]);
        if let Err(err) = file.write_all(&pcm) {
            self.repair_after_failed_write();
            return Err(err.into());
        }

        self.patch_sizes()?;
        debug!(
            "appended {} samples to '{}' ({} data bytes)",
            count,
            self.path.display(),
            self.data_len()
        );
        Ok(())
    }

    /// Appends every sample in `samples`.
    pub fn append_all(&mut self, samples: &[i16]) -> WavResult<()> {
        self.append(samples, samples.len())
    }

    /// Removes `duration_millis` worth of audio from the end of the file.
    ///
    /// The cut is `byte_rate * duration_millis / 1000` bytes, rounded up to a
    /// whole sample. The header is never removed: over-long cuts leave an
    /// empty, header-only file.
    pub fn truncate_tail(&mut self, duration_millis: u64) -> WavResult<()> {
        let format = self.format;
        let file = self.handle()?;

        let current = file.metadata()?.len();
        let cut = format.frame_aligned_up(format.bytes_for_millis(duration_millis));
        let new_len = current.saturating_sub(cut).max(HEADER_BYTES);

        if new_len != current {
            if let Err(err) = file.set_len(new_len) {
                if let Err(patch_err) = self.patch_sizes() {
                    warn!(
                        "could not re-derive sizes of '{}' after failed trim: {}",
                        self.path.display(),
                        patch_err
                    );
                }
                return Err(err.into());
            }
        }

        self.patch_sizes()?;
        debug!(
            "trimmed {} ms ({} bytes) from '{}'",
            duration_millis,
            current - new_len,
            self.path.display()
        );
        Ok(())
    }

    /// Flushes and releases the file handle.
    ///
    /// The handle is released even if the flush fails. Every later call,
    /// including a second `close`, returns [`WavError::Closed`].
    pub fn close(&mut self) -> WavResult<()> {
        let file = self.file.take().ok_or(WavError::Closed)?;
        file.sync_all()?;
        debug!("closed '{}'", self.path.display());
        Ok(())
    }

    /// Path the writer is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format of the file being written.
    pub fn format(&self) -> WavFormat {
        self.format
    }

    /// Number of data bytes after the last completed operation.
    pub fn data_len(&self) -> u64 {
        self.len - HEADER_BYTES
    }

    /// Number of samples after the last completed operation.
    pub fn sample_count(&self) -> u64 {
        self.data_len() / u64::from(self.format.block_align())
    }

    /// Duration of the recorded audio in milliseconds.
    pub fn duration_millis(&self) -> u64 {
        self.format.millis_for_bytes(self.data_len())
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn handle(&mut self) -> WavResult<&mut File> {
        if self.poisoned {
            return Err(WavError::Poisoned);
        }
        self.file.as_mut().ok_or(WavError::Closed)
    }

    fn patch_sizes(&mut self) -> WavResult<()> {
        let file = self.handle()?;
        match write_size_fields(file) {
            Ok(len) => {
                self.len = len;
                Ok(())
            }
            Err(err) => {
                self.poisoned = true;
                Err(err.into())
            }
        }
    }

    fn repair_after_failed_write(&mut self) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        match realign(file) {
            Ok(len) => {
                warn!(
                    "append to '{}' failed; kept {} data bytes",
                    self.path.display(),
                    len - HEADER_BYTES
                );
                self.len = len;
            }
            Err(err) => {
                warn!(
                    "could not repair '{}' after failed append: {}",
                    self.path.display(),
                    err
                );
                self.poisoned = true;
            }
        }
    }
}

impl Drop for StreamingWavWriter {
    fn drop(&mut self) {
        if self.file.is_some() {
            debug!("'{}' dropped without close", self.path.display());
        }
    }
}

/// Drops a trailing half sample, then rewrites both size fields.
fn realign(file: &mut File) -> io::Result<u64> {
    let len = file.metadata()?.len();
    let aligned = if len < HEADER_BYTES {
        len
    } else {
        HEADER_BYTES + (len - HEADER_BYTES) / 2 * 2
    };
    if aligned != len {
        file.set_len(aligned)?;
    }
    write_size_fields(file)
}

/// Rewrites the RIFF and data size fields from the file's current length.
fn write_size_fields(file: &mut File) -> io::Result<u64> {
    let len = file.metadata()?.len();
    let riff_size = size_field(len.saturating_sub(8))?;
    let data_size = size_field(len.saturating_sub(HEADER_BYTES))?;

    file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
    file.write_all(&riff_size.to_le_bytes())?;
    file.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
    file.write_all(&data_size.to_le_bytes())?;

    Ok(len)
}

fn size_field(value: u64) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("size {} does not fit a RIFF size field", value),
        )
    })
}
