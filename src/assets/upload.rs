//! Single-shot background image reads.
//!
//! Each request spawns one worker that reads and decodes a file, then sends
//! exactly one [`UploadOutcome`] back to the frame thread. There is no
//! cancellation; a late outcome simply replaces whatever slot it targets.

use super::{load_image_file, AssetError, DecodedImage};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    Background,
    Reference,
    BrushTexture,
    Model,
    Shader,
}

impl UploadTarget {
    pub fn label(self) -> &'static str {
        match self {
            Self::Background => "Background Image",
            Self::Reference => "Reference Image",
            Self::BrushTexture => "Brush Texture",
            Self::Model => "Model",
            Self::Shader => "Shader",
        }
    }

    /// Model and shader uploads have no loader behind them.
    pub fn unsupported_notice(self) -> Option<String> {
        match self {
            Self::Model => Some("Model upload functionality not implemented.".to_string()),
            Self::Shader => Some("Shader upload functionality not implemented.".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub target: UploadTarget,
    pub result: Result<DecodedImage, AssetError>,
}

pub struct UploadQueue {
    tx: Sender<UploadOutcome>,
    rx: Receiver<UploadOutcome>,
    in_flight: usize,
}

impl UploadQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, in_flight: 0 }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn_read(&mut self, target: UploadTarget, path: PathBuf) {
        let tx = self.tx.clone();
        self.in_flight += 1;
        log::info!("Reading {} from {}", target.label(), path.display());
        std::thread::spawn(move || {
            let result = load_image_file(&path);
            // receiver only goes away on shutdown
            let _ = tx.send(UploadOutcome { target, result });
        });
    }

    /// Completed reads, without blocking.
    pub fn poll(&mut self) -> Vec<UploadOutcome> {
        let done: Vec<UploadOutcome> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::png_bytes;
    use std::time::Duration;

    impl UploadQueue {
        fn wait(&mut self, timeout: Duration) -> Option<UploadOutcome> {
            let outcome = self.rx.recv_timeout(timeout).ok()?;
            self.in_flight = self.in_flight.saturating_sub(1);
            Some(outcome)
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "scenepaint_upload_{}_{}_{}",
            std::process::id(),
            nonce,
            tag
        ))
    }

    #[test]
    fn reads_and_decodes_in_the_background() {
        let path = temp_path("ok.png");
        std::fs::write(&path, png_bytes([0, 255, 0, 255])).unwrap();

        let mut queue = UploadQueue::new();
        queue.spawn_read(UploadTarget::Background, path.clone());
        assert_eq!(queue.in_flight(), 1);

        let outcome = queue.wait(Duration::from_secs(10)).expect("upload completes");
        assert_eq!(outcome.target, UploadTarget::Background);
        let image = outcome.result.unwrap();
        assert_eq!(image.size, [2, 2]);
        assert_eq!(queue.in_flight(), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_read_error() {
        let mut queue = UploadQueue::new();
        queue.spawn_read(UploadTarget::BrushTexture, temp_path("missing.png"));
        let outcome = queue.wait(Duration::from_secs(10)).expect("upload completes");
        assert!(matches!(outcome.result, Err(AssetError::Read { .. })));
    }

    #[test]
    fn poll_is_empty_without_requests() {
        let mut queue = UploadQueue::new();
        assert!(queue.poll().is_empty());
    }

    #[test]
    fn stub_targets_are_unsupported() {
        assert_eq!(
            UploadTarget::Model.unsupported_notice().as_deref(),
            Some("Model upload functionality not implemented.")
        );
        assert!(UploadTarget::Shader.unsupported_notice().is_some());
        assert!(UploadTarget::Background.unsupported_notice().is_none());
        assert!(UploadTarget::Reference.unsupported_notice().is_none());
    }
}
