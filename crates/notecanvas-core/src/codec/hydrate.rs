//! Generation-tagged image decoding.
//!
//! Every [`ImageHydrator::begin`] starts a new generation. Decodes run on
//! worker threads (or inline) and report back over a channel; results tagged
//! with an older generation are dropped when polled, and workers that are
//! already stale when they start skip the decode entirely.

use super::{CodecResult, ImageRecord};
use crate::entities::{Bitmap, Image};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

/// A finished decode, tagged with the generation that requested it.
#[derive(Debug)]
struct Decoded {
    generation: u64,
    record: ImageRecord,
    result: CodecResult<Bitmap>,
}

/// Decodes image records and hands back ready [`Image`]s.
#[derive(Debug)]
pub struct ImageHydrator {
    generation: Arc<AtomicU64>,
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
    /// Records of the current generation not yet hydrated.
    pending: Vec<ImageRecord>,
    /// Pending records whose decode already failed this generation.
    failed: usize,
    background: bool,
}

impl ImageHydrator {
    /// `background` selects worker threads; otherwise decoding happens
    /// inline inside [`ImageHydrator::begin`] and results wait for the next poll.
    pub fn new(background: bool) -> Self {
        let (tx, rx) = channel();
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
            pending: Vec::new(),
            failed: 0,
            background,
        }
    }

    /// Current generation; bumped by every `begin` and `cancel`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Records still waiting for their bitmap. Failed decodes stay here so
    /// they are not dropped from exports.
    pub fn pending(&self) -> &[ImageRecord] {
        &self.pending
    }

    /// Invalidate all in-flight work and start decoding `records`.
    pub fn begin(&mut self, records: Vec<ImageRecord>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending = records.clone();
        self.failed = 0;
        for record in records {
            self.spawn(generation, record);
        }
        generation
    }

    /// Invalidate in-flight work without starting anything new.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending.clear();
        self.failed = 0;
    }

    fn spawn(&self, generation: u64, record: ImageRecord) {
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let job = move || {
            if current.load(Ordering::SeqCst) != generation {
                log::debug!("Skipping stale decode of {} (generation {})", record.id, generation);
                return;
            }
            let result = record.decode();
            // The hydrator may be gone; nothing to report to then.
            let _ = tx.send(Decoded {
                generation,
                record,
                result,
            });
        };

        if self.background {
            if let Err(e) = thread::Builder::new()
                .name("image-decode".to_string())
                .spawn(job)
            {
                log::error!("Failed to spawn image decode thread: {}", e);
            }
        } else {
            job();
        }
    }

    /// Drain finished decodes without blocking.
    pub fn poll(&mut self) -> Vec<Image> {
        let mut ready = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            if let Some(image) = self.accept(done) {
                ready.push(image);
            }
        }
        ready
    }

    /// Block until every pending record has reported or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Vec<Image> {
        let deadline = Instant::now() + timeout;
        let mut ready = self.poll();
        let mut outstanding = self.pending.len().saturating_sub(self.failed);
        while outstanding > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(done) => {
                    let current = done.generation == self.generation();
                    if let Some(image) = self.accept(done) {
                        ready.push(image);
                    }
                    if current {
                        outstanding -= 1;
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        ready
    }

    fn accept(&mut self, done: Decoded) -> Option<Image> {
        if done.generation != self.generation() {
            log::debug!(
                "Discarding stale decode of {} (generation {}, current {})",
                done.record.id,
                done.generation,
                self.generation()
            );
            return None;
        }
        match done.result {
            Ok(bitmap) => {
                if let Some(pos) = self.pending.iter().position(|r| r.id == done.record.id) {
                    self.pending.remove(pos);
                }
                Some(done.record.into_image(bitmap))
            }
            Err(e) => {
                log::warn!("Failed to decode image {}: {}", done.record.id, e);
                self.failed += 1;
                None
            }
        }
    }
}

impl Default for ImageHydrator {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::data_url;

    fn png_record(id: &str) -> ImageRecord {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 128, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        ImageRecord {
            id: id.to_string(),
            data_url: data_url::encode(out.get_ref()),
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        }
    }

    #[test]
    fn test_inline_decode_hydrates_on_poll() {
        let mut hydrator = ImageHydrator::new(false);
        hydrator.begin(vec![png_record("a"), png_record("b")]);
        assert_eq!(hydrator.pending().len(), 2);
        let ready = hydrator.poll();
        assert_eq!(ready.len(), 2);
        assert!(hydrator.pending().is_empty());
        assert_eq!(ready[0].bitmap.width, 3);
        assert!((ready[0].width - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut hydrator = ImageHydrator::new(false);
        let first = hydrator.begin(vec![png_record("old")]);
        let second = hydrator.begin(vec![png_record("new")]);
        assert!(second > first);
        let ready = hydrator.poll();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, "new");
    }

    #[test]
    fn test_cancel_drops_everything() {
        let mut hydrator = ImageHydrator::new(false);
        hydrator.begin(vec![png_record("a")]);
        hydrator.cancel();
        assert!(hydrator.poll().is_empty());
        assert!(hydrator.pending().is_empty());
    }

    #[test]
    fn test_failed_decode_stays_pending() {
        let mut hydrator = ImageHydrator::new(false);
        let broken = ImageRecord {
            id: "broken".into(),
            data_url: "data:image/png;base64,AAAA".into(),
            ..Default::default()
        };
        hydrator.begin(vec![broken]);
        assert!(hydrator.poll().is_empty());
        assert_eq!(hydrator.pending().len(), 1);
        // Already reported, so waiting returns at once.
        let started = Instant::now();
        assert!(hydrator.wait(Duration::from_secs(5)).is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_background_decode() {
        let mut hydrator = ImageHydrator::new(true);
        hydrator.begin(vec![png_record("a"), png_record("b"), png_record("c")]);
        let ready = hydrator.wait(Duration::from_secs(10));
        assert_eq!(ready.len(), 3);
        assert!(hydrator.pending().is_empty());
    }
}
