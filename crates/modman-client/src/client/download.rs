//! Local download cache: prefix-keyed cache hits and atomic streamed writes.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use futures_util::StreamExt;
use regex::Regex;
use tempfile::NamedTempFile;

use modman_core::Category;

use crate::error::{ClientError, ClientResult};
use crate::http::{ApiRequest, HttpBackend, StreamedResponse};
use crate::url::build_download_url;

use super::{DOWNLOAD_TIMEOUT, ModmanClient, ProgressCallback};

/// Write-buffer capacity for streamed downloads.
const WRITE_BUFFER_BYTES: usize = 8 * 1024 * 1024;

static DISPOSITION_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="?([^";\n]+)"?"#).expect("filename pattern is valid")
});

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-.]").expect("sanitize pattern is valid"));

/// Name used when the server does not say what the file is called.
fn fallback_file_name(model_id: u64) -> String {
    format!("model_{model_id}.safetensors")
}

/// Extract the file name from a Content-Disposition header value.
fn file_name_from_disposition(header: &str) -> Option<String> {
    DISPOSITION_FILENAME
        .captures(header)
        .map(|captures| captures[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Replace everything outside `[\w\-.]` with underscores.
fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// Cache-key prefix for a (model, version) pair.
fn cache_prefix(model_id: u64, version_id: Option<u64>) -> String {
    match version_id {
        Some(version_id) => format!("{model_id}_{version_id}_"),
        None => format!("{model_id}_"),
    }
}

/// First file in `dir` whose name starts with `prefix`.
fn find_cached(dir: &Path, prefix: &str) -> ClientResult<Option<PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Byte total of every file under `root`, recursively.
fn dir_size(root: &Path) -> ClientResult<u64> {
    let mut total = 0;
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}

impl<B: HttpBackend> ModmanClient<B> {
    /// Fetch a model binary into the local cache, returning the cached path.
    ///
    /// Any existing file in the category folder whose name starts with the
    /// (model, version) prefix short-circuits the download; presence is
    /// trusted, contents are not verified. On a miss the body streams into a
    /// temp file next to the final path and is renamed into place only after
    /// the stream finishes cleanly, so a partial download never becomes
    /// visible. The progress callback receives (bytes so far, total) after
    /// each chunk whenever the server announced a Content-Length.
    pub async fn download_model(
        &self,
        model_id: u64,
        category: Category,
        version_id: Option<u64>,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> ClientResult<PathBuf> {
        let folder = self.cache_dir().join(category.folder_name());
        fs::create_dir_all(&folder)?;

        let prefix = cache_prefix(model_id, version_id);
        if let Some(path) = find_cached(&folder, &prefix)? {
            tracing::info!(model_id, ?version_id, path = %path.display(), "Download cache hit");
            return Ok(path);
        }

        let (base, key) = self.credentials()?;
        let url = build_download_url(&base, model_id, version_id)?;
        let response = self
            .send_stream(ApiRequest::get(url, key, DOWNLOAD_TIMEOUT))
            .await?;

        let remote_name = response
            .content_disposition
            .as_deref()
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| fallback_file_name(model_id));
        let final_path = folder.join(format!("{prefix}{}", sanitize_file_name(&remote_name)));

        write_stream_to_cache(response, &final_path, &folder, on_progress).await?;

        tracing::info!(model_id, ?version_id, path = %final_path.display(), "Download completed");
        Ok(final_path)
    }

    /// Byte total currently held in the cache.
    pub fn cache_size(&self) -> ClientResult<u64> {
        if !self.cache_dir().exists() {
            return Ok(0);
        }
        dir_size(self.cache_dir())
    }

    /// Delete the entire cache root and recreate it empty, returning the
    /// number of bytes freed.
    pub fn clear_cache(&self) -> ClientResult<u64> {
        let root = self.cache_dir();
        let freed = if root.exists() {
            let bytes = dir_size(root)?;
            fs::remove_dir_all(root)?;
            bytes
        } else {
            0
        };
        fs::create_dir_all(root)?;

        tracing::info!(freed, "Download cache cleared");
        Ok(freed)
    }
}

/// Stream the response body into a temp file and atomically publish it.
async fn write_stream_to_cache(
    mut response: StreamedResponse,
    final_path: &Path,
    folder: &Path,
    on_progress: Option<ProgressCallback<'_>>,
) -> ClientResult<()> {
    let total = response.content_length.unwrap_or(0);

    // The temp file lives next to the final path so the rename stays on one
    // filesystem. Dropping it on any early return removes the partial file.
    let mut temp = NamedTempFile::new_in(folder)?;

    {
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, temp.as_file_mut());
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response.stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk)?;
            downloaded += chunk.len() as u64;

            if total > 0 {
                if let Some(callback) = on_progress {
                    callback(downloaded, total);
                }
            }
        }

        writer.flush()?;
    }

    temp.persist(final_path)
        .map_err(|e| ClientError::Io(e.error))?;
    Ok(())
}
