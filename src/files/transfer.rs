// File transfer commands.
//
// Uploads are single-flight: a second upload is rejected until the
// first resolves. Successful mutations trigger an immediate
// reconciliation refresh so quota and file list catch up without
// waiting for the next tick. Downloads never mutate server state and
// never retry.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, UploadResult};
use crate::dashboard::Reconciler;

/// Transient status of the most recent operation of each kind,
/// independent of the polling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransferStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

pub struct FileTransferManager {
    client: ApiClient,
    token: String,
    reconciler: Reconciler,
    upload_busy: AtomicBool,
    upload_status: Mutex<TransferStatus>,
}

impl FileTransferManager {
    pub fn new(client: ApiClient, token: String, reconciler: Reconciler) -> Self {
        Self {
            client,
            token,
            reconciler,
            upload_busy: AtomicBool::new(false),
            upload_status: Mutex::new(TransferStatus::Idle),
        }
    }

    pub fn upload_status(&self) -> TransferStatus {
        self.upload_status.lock().unwrap().clone()
    }

    /// Upload a local file. Rejected if another upload is in flight.
    pub async fn upload(&self, path: &Path) -> Result<UploadResult, ApiError> {
        if self
            .upload_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ApiError::Busy("upload".to_string()));
        }
        *self.upload_status.lock().unwrap() = TransferStatus::InFlight;

        let result = self.upload_inner(path).await;

        *self.upload_status.lock().unwrap() = match &result {
            Ok(_) => TransferStatus::Succeeded,
            Err(e) => TransferStatus::Failed(e.to_string()),
        };
        self.upload_busy.store(false, Ordering::SeqCst);
        result
    }

    async fn upload_inner(&self, path: &Path) -> Result<UploadResult, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::NotFound(format!("invalid file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::NotFound(format!("cannot read {}: {e}", path.display())))?;
        let size = bytes.len();

        match self.client.upload_file(&self.token, &file_name, bytes).await {
            Ok(result) => {
                info!(file_name, size, chunks = result.total_chunks, "upload accepted");
                self.reconciler
                    .activity()
                    .success(format!("File \"{file_name}\" uploaded successfully!"));
                // Immediate refresh so quota and file list reflect it.
                self.reconciler.reconcile_now().await;
                Ok(result)
            }
            Err(e) => {
                warn!(file_name, error = %e, "upload failed");
                self.reconciler
                    .activity()
                    .error(format!("Upload of \"{file_name}\" failed: {e}"));
                Err(e)
            }
        }
    }

    /// Download a stored file into `dest_dir`, named after the
    /// original file name. A non-success response is terminal for this
    /// call — no retry.
    pub async fn download(
        &self,
        file_id: i64,
        file_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ApiError> {
        let dest = dest_dir.join(sanitize_file_name(file_name));

        let resp = self.client.download_file(&self.token, file_id).await?;

        let mut out = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("cannot create {}: {e}", dest.display())))?;
        let mut stream = resp.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ApiError::from)?;
            out.write_all(&chunk)
                .await
                .map_err(|e| ApiError::NetworkFailure(format!("write failed: {e}")))?;
            written += chunk.len() as u64;
        }
        out.flush()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("write failed: {e}")))?;

        info!(file_id, written, dest = %dest.display(), "download complete");
        self.reconciler
            .activity()
            .success(format!("Downloaded \"{file_name}\" ({written} bytes)"));
        Ok(dest)
    }

    /// Delete a stored file. The yes/no confirmation gate lives with
    /// the caller; by the time this runs the user has already agreed.
    pub async fn delete(&self, file_id: i64, file_name: &str) -> Result<(), ApiError> {
        match self.client.delete_file(&self.token, file_id).await {
            Ok(()) => {
                self.reconciler
                    .activity()
                    .success(format!("File \"{file_name}\" deleted"));
                self.reconciler.reconcile_now().await;
                Ok(())
            }
            Err(e) => {
                self.reconciler
                    .activity()
                    .error(format!("Delete of \"{file_name}\" failed: {e}"));
                Err(e)
            }
        }
    }
}

/// Server-supplied names become local paths; keep only the final
/// component so a hostile name cannot escape the download directory.
fn sanitize_file_name(name: &str) -> String {
    let cleaned = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "download.bin".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name(" notes.txt "), "notes.txt");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\evil.exe"), "evil.exe");
        assert_eq!(sanitize_file_name("/"), "download.bin");
        assert_eq!(sanitize_file_name(".."), "download.bin");
        assert_eq!(sanitize_file_name(""), "download.bin");
    }

    #[test]
    fn test_default_status_is_idle() {
        assert_eq!(TransferStatus::default(), TransferStatus::Idle);
    }
}
