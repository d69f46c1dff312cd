use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use nix::{errno::Errno, sys::stat::Mode, unistd::mkfifo};
use tokio::net::unix::pipe;

use crate::{
    error::{LektorError, LektorResult},
    TrackKind,
};

const READER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The two named pipes of one job, created exclusively. Both are removed when
/// this is dropped.
#[derive(Debug)]
pub struct FifoPair {
    pub video: PathBuf,
    pub audio: PathBuf,
}

impl FifoPair {
    pub fn create<P>(dir: P, index: usize) -> LektorResult<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let video = fifo_path(dir, index, TrackKind::Video);
        let audio = fifo_path(dir, index, TrackKind::Audio);

        create_fifo(&video)?;
        if let Err(e) = create_fifo(&audio) {
            remove_endpoint(&video);
            return Err(e);
        }

        Ok(Self { video, audio })
    }

    pub fn path(&self, kind: TrackKind) -> &Path {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }
}

impl Drop for FifoPair {
    fn drop(&mut self) {
        remove_endpoint(&self.video);
        remove_endpoint(&self.audio);
    }
}

fn remove_endpoint(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::error!("Failed to remove {}: {e}", path.display()),
    }
}

pub fn fifo_path(dir: &Path, index: usize, kind: TrackKind) -> PathBuf {
    dir.join(format!("{index}_{kind}.pipe"))
}

/// An existing path is never replaced: it may be the live endpoint of another job.
fn create_fifo(path: &Path) -> LektorResult<()> {
    match mkfifo(path, Mode::from_bits_truncate(0o666)) {
        Ok(()) => Ok(()),
        Err(Errno::EEXIST) => Err(LektorError::EndpointInUse(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Opens the write end of a FIFO once a reader has attached to it.
///
/// A non-blocking open fails with `ENXIO` while nobody reads, so this polls
/// instead of parking a blocking thread that could never be woken up if the
/// reader dies first. Dropping the future stops the polling.
pub async fn open_fifo_writer(path: &Path) -> LektorResult<pipe::Sender> {
    loop {
        match pipe::OpenOptions::new().open_sender(path) {
            Ok(sender) => return Ok(sender),
            Err(e) if e.raw_os_error() == Some(Errno::ENXIO as i32) => {
                tokio::time::sleep(READER_POLL_INTERVAL).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileTypeExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_create_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let pair = FifoPair::create(dir.path(), 3).unwrap();

        assert_eq!(pair.video, dir.path().join("3_video.pipe"));
        assert_eq!(pair.audio, dir.path().join("3_audio.pipe"));
        for path in [&pair.video, &pair.audio] {
            let file_type = std::fs::metadata(path).unwrap().file_type();
            assert!(file_type.is_fifo());
        }

        let (video, audio) = (pair.video.clone(), pair.audio.clone());
        drop(pair);
        assert!(!video.exists());
        assert!(!audio.exists());
    }

    #[test]
    fn test_endpoints_are_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let first = FifoPair::create(dir.path(), 0).unwrap();

        let second = FifoPair::create(dir.path(), 0);
        assert!(matches!(second, Err(LektorError::EndpointInUse(path)) if path == first.video));
        assert!(first.video.exists());
        assert!(first.audio.exists());

        drop(first);
        let again = FifoPair::create(dir.path(), 0).unwrap();
        assert!(again.video.exists());
    }

    #[test]
    fn test_partial_conflict_keeps_other_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let audio = fifo_path(dir.path(), 1, TrackKind::Audio);
        std::fs::write(&audio, b"owned elsewhere").unwrap();

        let result = FifoPair::create(dir.path(), 1);
        assert!(matches!(result, Err(LektorError::EndpointInUse(path)) if path == audio));
        assert!(!fifo_path(dir.path(), 1, TrackKind::Video).exists());
        assert_eq!(std::fs::read(&audio).unwrap(), b"owned elsewhere");
    }

    #[tokio::test]
    async fn test_writer_waits_for_reader() {
        let dir = tempfile::tempdir().unwrap();
        let pair = FifoPair::create(dir.path(), 0).unwrap();

        let writer = {
            let path = pair.video.clone();
            tokio::spawn(async move {
                let mut sender = open_fifo_writer(&path).await.unwrap();
                sender.write_all(b"init").await.unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!writer.is_finished());

        let mut reader = tokio::fs::File::open(&pair.video).await.unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();
        writer.await.unwrap();

        assert_eq!(data, b"init");
    }
}
