//! File export sink
//!
//! Writes each delivered WAV to `<dir>/<stem>.wav`. A delivery replaces the
//! previous file; `release()` removes it.

use bridge_traits::{
    error::{BridgeError, Result},
    sink::{EditedAudioSink, EncodedAudio},
};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Desktop sink that persists edited audio as a WAV file.
pub struct FileExportSink {
    target: PathBuf,
    written: Mutex<bool>,
}

impl FileExportSink {
    /// Export into `dir` under `<stem>.wav`.
    pub fn new(dir: impl Into<PathBuf>, stem: &str) -> Self {
        let target = dir.into().join(format!("{}.wav", stem));
        Self {
            target,
            written: Mutex::new(false),
        }
    }

    /// Export into the user's download directory, falling back to the temp dir.
    pub fn in_downloads(stem: &str) -> Self {
        let dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(dir, stem)
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    fn staging_path(&self) -> PathBuf {
        self.target.with_extension("wav.part")
    }
}

impl EditedAudioSink for FileExportSink {
    fn deliver(&self, audio: EncodedAudio) -> Result<()> {
        if audio.data.is_empty() {
            return Err(BridgeError::SinkRejected("empty audio payload".to_string()));
        }

        let mut written = self.written.lock();

        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent)?;
        }

        // Staged write, then rename into place. A failed step leaves no
        // partial file behind.
        let staging = self.staging_path();
        if let Err(e) = fs::write(&staging, &audio.data)
            .and_then(|()| fs::rename(&staging, &self.target))
        {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging file");
                }
            }
            return Err(e.into());
        }
        *written = true;

        info!(
            bytes = audio.byte_len(),
            frames = audio.frame_count,
            path = %self.target.display(),
            "Exported edited audio"
        );
        Ok(())
    }

    fn release(&self) -> Result<()> {
        let mut written = self.written.lock();
        if !*written {
            return Ok(());
        }

        match fs::remove_file(&self.target) {
            Ok(()) => debug!(path = %self.target.display(), "Removed exported audio"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *written = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voicecut-export-{}-{}", name, std::process::id()))
    }

    fn audio(len: usize) -> EncodedAudio {
        EncodedAudio::wav(Bytes::from(vec![7u8; len]), 8000, 1, 100)
    }

    #[test]
    fn test_deliver_writes_and_replaces() {
        let sink = FileExportSink::new(scratch_dir("replace"), "clip");

        sink.deliver(audio(64)).unwrap();
        assert_eq!(fs::read(sink.path()).unwrap().len(), 64);

        sink.deliver(audio(128)).unwrap();
        assert_eq!(fs::read(sink.path()).unwrap().len(), 128);
        assert!(!sink.staging_path().exists());
    }

    #[test]
    fn test_release_removes_file() {
        let sink = FileExportSink::new(scratch_dir("release"), "clip");

        sink.release().unwrap();
        sink.deliver(audio(64)).unwrap();
        sink.release().unwrap();

        assert!(!sink.path().exists());
        sink.release().unwrap();
    }

    #[test]
    fn test_failed_rename_removes_staging_file() {
        let dir = scratch_dir("blocked");
        let sink = FileExportSink::new(&dir, "clip");
        fs::create_dir_all(sink.path()).unwrap();
        fs::write(sink.path().join("occupied"), b"x").unwrap();

        assert!(sink.deliver(audio(64)).is_err());
        assert!(!sink.staging_path().exists());
        sink.release().unwrap();
        assert!(sink.path().is_dir());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_payload_rejected() {
        let sink = FileExportSink::new(scratch_dir("empty"), "clip");

        let err = sink.deliver(audio(0)).unwrap_err();
        assert!(matches!(err, BridgeError::SinkRejected(_)));
        assert!(!sink.path().exists());
    }
}
