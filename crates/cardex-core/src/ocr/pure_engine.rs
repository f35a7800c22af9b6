//! Pure Rust recognizer backed by `pure-onnx-ocr`.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::RecognitionConfig;

use super::Recognizer;

struct Job {
    image: Bytes,
    reply: oneshot::Sender<Result<String, RecognitionError>>,
}

/// Recognizer running a `pure-onnx-ocr` engine on a dedicated worker thread.
///
/// The engine is built on the worker and never leaves it; requests are
/// queued and answered one at a time.
pub struct PureOcrRecognizer {
    jobs: mpsc::Sender<Job>,
}

impl PureOcrRecognizer {
    /// Load models named in `config` and start the worker.
    pub fn from_config(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let dir = &config.model_dir;
        Self::spawn(
            dir.join(&config.detection_model),
            dir.join(&config.recognition_model),
            dir.join(&config.dictionary),
        )
    }

    /// Load the default model file names from a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, RecognitionError> {
        Self::from_config(&RecognitionConfig {
            model_dir: model_dir.to_path_buf(),
            ..RecognitionConfig::default()
        })
    }

    fn spawn(det: PathBuf, rec: PathBuf, dict: PathBuf) -> Result<Self, RecognitionError> {
        for path in [&det, &rec, &dict] {
            if !path.exists() {
                return Err(RecognitionError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let (jobs, queue) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name("cardex-ocr".to_string())
            .spawn(move || {
                let engine = match pure_onnx_ocr::engine::OcrEngineBuilder::new()
                    .det_model_path(&det)
                    .rec_model_path(&rec)
                    .dictionary_path(&dict)
                    .build()
                {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        engine
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(RecognitionError::ModelLoad(format!(
                            "pure-onnx-ocr: {}",
                            e
                        ))));
                        return;
                    }
                };

                for job in queue {
                    let result = decode(&job.image).and_then(|image| run(&engine, &image));
                    let _ = job.reply.send(result);
                }
                debug!("Recognition worker shutting down");
            })
            .map_err(|e| RecognitionError::ModelLoad(format!("failed to start worker: {}", e)))?;

        ready_rx.recv().map_err(|_| RecognitionError::WorkerGone)??;
        info!("Loaded pure-onnx-ocr engine");

        Ok(Self { jobs })
    }
}

#[async_trait]
impl Recognizer for PureOcrRecognizer {
    async fn recognize(&self, image: Bytes, language: &str) -> Result<String, RecognitionError> {
        debug!("Language hint {} is not used by pure-onnx-ocr", language);

        let (reply, answer) = oneshot::channel();
        self.jobs
            .send(Job { image, reply })
            .map_err(|_| RecognitionError::WorkerGone)?;

        answer.await.map_err(|_| RecognitionError::WorkerGone)?
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, RecognitionError> {
    image::load_from_memory(data).map_err(|e| RecognitionError::InvalidImage(e.to_string()))
}

fn run(
    engine: &pure_onnx_ocr::engine::OcrEngine,
    image: &DynamicImage,
) -> Result<String, RecognitionError> {
    let start = Instant::now();
    let (width, height) = image.dimensions();

    let results = engine
        .run_from_image(image)
        .map_err(|e| RecognitionError::Engine(format!("pure-onnx-ocr: {}", e)))?;

    let mut lines: Vec<(f32, f32, String)> = results
        .iter()
        .map(|r| {
            let (x, y) = top_left(&r.bounding_box);
            (x, y, r.text.replace("[UNK]", " "))
        })
        .collect();

    // Reading order: rows of ~20px, then left to right
    lines.sort_by(|a, b| {
        let row_a = (a.1 / 20.0) as i32;
        let row_b = (b.1 / 20.0) as i32;
        row_a
            .cmp(&row_b)
            .then(a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
    });

    debug!(
        "Recognized {} text regions in {}x{} image in {}ms",
        lines.len(),
        width,
        height,
        start.elapsed().as_millis()
    );

    Ok(lines
        .into_iter()
        .map(|(_, _, text)| text)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
