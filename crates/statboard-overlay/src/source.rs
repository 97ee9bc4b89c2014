use crate::cancellation::CancellationToken;
use statboard_core::{OverlayError, SubjectId, TeamStats};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

pub type FetchFuture<R> = Pin<Box<dyn Future<Output = Result<R, OverlayError>> + Send + 'static>>;

/// The data layer behind a click overlay.
///
/// `fetch` must not touch overlay state; its result is delivered back to the
/// owning [`RequestController`](crate::RequestController), which decides
/// whether it is still wanted. Implementations should stop early once
/// `cancel` fires, but nothing relies on them doing so.
pub trait SubjectSource: Send + Sync + 'static {
    type Raw: Send + 'static;

    fn fetch(&self, subject: SubjectId, cancel: CancellationToken) -> FetchFuture<Self::Raw>;
}

/// Serves team breakdowns from `<dir>/<team id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, subject: SubjectId) -> PathBuf {
        self.dir.join(format!("{subject}.json"))
    }
}

impl SubjectSource for JsonDirSource {
    type Raw = TeamStats;

    fn fetch(&self, subject: SubjectId, cancel: CancellationToken) -> FetchFuture<TeamStats> {
        let path = self.path_for(subject);
        Box::pin(async move {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                OverlayError::fetch(format!("Failed to read {}: {e}", path.display()))
            })?;
            if cancel.is_cancelled() {
                return Err(OverlayError::Aborted);
            }
            serde_json::from_slice(&bytes).map_err(|e| OverlayError::Decode(e.to_string()))
        })
    }
}
