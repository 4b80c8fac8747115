//! Page to PDF export.
//!
//! The element collection is lowered into a [`Scene`](crate::scene::Scene),
//! rasterized off-screen at `export_scale` pixels per page unit, cut into
//! A4-proportioned strips and written as one image per PDF page.
use std::any::Any;
use std::fs;
use std::io::BufWriter;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EditorConfig;
use crate::element::Element;
use crate::error::ExportError;
use crate::scene;
use crate::util::time::timestamp_millis;

mod pdf;
mod raster;

pub use pdf::{A4_HEIGHT_PT, A4_WIDTH_PT, Strip, assemble, slice_strips};
pub use raster::Rasterizer;

/// Build the PDF document in memory
pub fn render_pdf(elements: &[Element], config: &EditorConfig) -> Result<lopdf::Document, ExportError> {
    if elements.is_empty() {
        return Err(ExportError::EmptyDocument);
    }

    let scene = scene::build(elements, config.page_width, config.page_height);
    let rasterizer = Rasterizer::new(config.export_scale)?;
    let pixmap = rasterizer.render(&scene)?;
    log::debug!(
        "Rasterized {} nodes to {}x{}",
        scene.nodes.len(),
        pixmap.width(),
        pixmap.height()
    );

    // a sliver of a couple of page units at the bottom is rounding, not a page
    let min_tail = (2.0 * rasterizer.scale()).ceil() as u32;
    let strips = slice_strips(pixmap.data(), pixmap.width(), pixmap.height(), min_tail);
    assemble(&strips)
}

/// File name for an export started at `millis`
pub fn export_file_name(millis: u128) -> String {
    format!("invoice-{}.pdf", millis)
}

/// Render and write `invoice-<millis>.pdf` into `out_dir`.
///
/// The file is written under a temporary name and renamed into place, so a
/// failed export never leaves a partial PDF behind.
pub fn export_to_pdf(
    elements: &[Element],
    config: &EditorConfig,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let mut doc = render_pdf(elements, config)?;

    fs::create_dir_all(out_dir)?;
    let name = export_file_name(timestamp_millis());
    let path = out_dir.join(&name);
    let partial = out_dir.join(format!(".{}.part", name));

    let written = fs::File::create(&partial).and_then(|file| {
        let mut writer = BufWriter::new(file);
        doc.save_to(&mut writer)?;
        Ok(())
    });
    if let Err(err) = written.and_then(|()| fs::rename(&partial, &path)) {
        let _ = fs::remove_file(&partial);
        return Err(err.into());
    }

    log::info!("Exported {} elements to {}", elements.len(), path.display());
    Ok(path)
}

type JobResult = Result<PathBuf, ExportError>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// An export running on a background thread
#[derive(Debug)]
pub struct ExportJob {
    result: Arc<Mutex<Option<JobResult>>>,
}

impl ExportJob {
    /// Snapshot the elements and start exporting them
    pub fn spawn(elements: Vec<Element>, config: EditorConfig, out_dir: PathBuf) -> Result<Self, ExportError> {
        Self::run(move || export_to_pdf(&elements, &config, &out_dir))
    }

    /// Run `work` on the export thread. A panic inside it becomes
    /// [`ExportError::Crashed`] so the slot is always filled.
    fn run(work: impl FnOnce() -> JobResult + Send + 'static) -> Result<Self, ExportError> {
        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        std::thread::Builder::new()
            .name("pdf-export".to_owned())
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
                    let reason = panic_message(payload.as_ref());
                    log::error!("Export thread panicked: {}", reason);
                    Err(ExportError::Crashed(reason))
                });
                *slot.lock() = Some(outcome);
            })?;
        Ok(Self { result })
    }

    /// The outcome once the thread is done
    pub fn poll(&self) -> Option<JobResult> {
        self.result.lock().take()
    }
}

/// At most one export at a time
#[derive(Debug, Default)]
pub struct Exporter {
    job: Option<ExportJob>,
}

impl Exporter {
    pub fn in_flight(&self) -> bool {
        self.job.is_some()
    }

    pub fn start(&mut self, elements: &[Element], config: &EditorConfig) -> Result<(), ExportError> {
        if self.in_flight() {
            return Err(ExportError::InFlight);
        }
        if elements.is_empty() {
            return Err(ExportError::EmptyDocument);
        }
        let job = ExportJob::spawn(elements.to_vec(), config.clone(), config.export_dir())?;
        self.job = Some(job);
        Ok(())
    }

    /// Finished result, clearing the in-flight flag
    pub fn poll(&mut self) -> Option<JobResult> {
        let outcome = self.job.as_ref()?.poll()?;
        self.job = None;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(job: &ExportJob) -> JobResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = job.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "export thread never reported");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_panicking_export_reports_failure() {
        let job = ExportJob::run(|| panic!("rasterizer blew up")).unwrap();
        match wait(&job) {
            Err(ExportError::Crashed(reason)) => assert!(reason.contains("rasterizer blew up")),
            other => panic!("expected a crash report, got {:?}", other),
        }
    }

    #[test]
    fn test_exporter_usable_after_crash() {
        let mut exporter = Exporter {
            job: Some(ExportJob::run(|| panic!("boom")).unwrap()),
        };
        let deadline = Instant::now() + Duration::from_secs(10);
        let outcome = loop {
            if let Some(outcome) = exporter.poll() {
                break outcome;
            }
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(matches!(outcome, Err(ExportError::Crashed(_))));
        assert!(!exporter.in_flight());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name(1700000000123), "invoice-1700000000123.pdf");
    }
}
