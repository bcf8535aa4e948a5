use base64::{Engine, engine::general_purpose::STANDARD};
use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// A file offered to the intake, along with the media type it declares.
#[derive(Clone, Debug, PartialEq)]
pub struct FileCandidate {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The currently accepted image. Shared with the preview task.
pub type SelectedFile = Arc<FileCandidate>;

impl FileCandidate {
    /// Read a file from disk, declaring its media type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| IntakeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

/// Where the offered files came from. Only the first file of either is
/// considered.
pub enum IntakeSource {
    Drop(Vec<FileCandidate>),
    Picker(Vec<FileCandidate>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub data_url: Option<String>,
    pub visible: bool,
    pub placeholder_visible: bool,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            data_url: None,
            visible: false,
            placeholder_visible: true,
        }
    }
}

/// Owns the drop zone: file selection, the image preview, and the
/// drag-over highlight.
#[derive(Default)]
pub struct FileIntake {
    selected: Option<SelectedFile>,
    latest: Arc<AtomicU64>,
    preview: Arc<Mutex<Preview>>,
    highlighted: bool,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the first offered file if it declares an image media type.
    /// Anything else is ignored without error. The selection is updated
    /// immediately while the preview is decoded in the background; the
    /// returned handle resolves once that preview has been applied.
    pub fn select_file(&mut self, source: IntakeSource) -> Option<JoinHandle<()>> {
        let (origin, candidates) = match source {
            IntakeSource::Drop(candidates) => {
                self.highlighted = false;
                ("drop", candidates)
            }
            IntakeSource::Picker(candidates) => ("picker", candidates),
        };
        let candidate = candidates.into_iter().next()?;
        if !candidate.is_image() {
            debug!(
                origin,
                file_name = candidate.file_name,
                media_type = candidate.media_type,
                "ignoring non-image file"
            );
            return None;
        }

        info!(
            origin,
            file_name = candidate.file_name,
            media_type = candidate.media_type,
            size = candidate.bytes.len(),
            "selected image"
        );
        let file = Arc::new(candidate);
        self.selected = Some(file.clone());
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let latest = self.latest.clone();
        let preview = self.preview.clone();
        Some(tokio::spawn(async move {
            let data_url = file.to_data_url();
            let mut preview = preview.lock().await;
            // A newer selection owns the preview now.
            if latest.load(Ordering::SeqCst) != generation {
                debug!(file_name = file.file_name, "discarding stale preview");
                return;
            }
            preview.data_url = Some(data_url);
            preview.visible = true;
            preview.placeholder_visible = false;
        }))
    }

    pub fn get_selected_file(&self) -> Option<SelectedFile> {
        self.selected.clone()
    }

    pub fn has_selected_file(&self) -> bool {
        self.selected.is_some()
    }

    pub async fn preview(&self) -> Preview {
        self.preview.lock().await.clone()
    }

    /// Highlight the drop zone while something is dragged over it. The
    /// selection is left alone.
    pub fn drag_over(&mut self) {
        self.highlighted = true;
    }

    pub fn drag_leave(&mut self) {
        self.highlighted = false;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
