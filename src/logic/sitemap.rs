use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::SitemapConfig;
use crate::model::{SitemapRecord, SitemapRunState, TaskStatus};
use crate::store::traits::RecordStore;
use crate::urls::{ApiUrls, RECORD_PAGE, SITEMAP_FILES};

/// How many records one index query fetches while streaming.
const QUERY_BATCH: u64 = 1000;

/// Write sitemap files for all live records into `output_path`: numbered url
/// files capped at `urls_per_file` entries plus a `sitemap_index.xml`
/// referencing them. Returns the produced file names, index first.
pub async fn generate<S: RecordStore>(
    index: &S,
    urls: &ApiUrls,
    config: &SitemapConfig,
    output_path: &Path,
) -> Result<Vec<String>> {
    tokio::fs::create_dir_all(output_path)
        .await
        .with_context(|| format!("Failed to create sitemap directory {}", output_path.display()))?;

    let mut url_files = Vec::new();
    let mut entries: Vec<String> = Vec::new();
    let mut offset = 0u64;
    loop {
        let batch = index.records(offset, QUERY_BATCH).await?;
        if batch.is_empty() {
            break;
        }
        offset += batch.len() as u64;
        for record in &batch {
            entries.push(url_entry(urls, record));
            if entries.len() as u64 >= config.urls_per_file {
                let file_no = url_files.len() + 1;
                url_files.push(write_url_file(output_path, file_no, &entries, config.gzip).await?);
                entries.clear();
            }
        }
        if (batch.len() as u64) < QUERY_BATCH {
            break;
        }
    }
    // Always produce at least one url file, even for an empty index.
    if !entries.is_empty() || url_files.is_empty() {
        let file_no = url_files.len() + 1;
        url_files.push(write_url_file(output_path, file_no, &entries, config.gzip).await?);
    }

    let index_file = write_index_file(output_path, urls, &url_files).await?;

    let mut produced = vec![index_file];
    produced.append(&mut url_files);
    log::info!("Sitemap generation wrote {} files to {}", produced.len(), output_path.display());
    Ok(produced)
}

fn url_entry(urls: &ApiUrls, record: &SitemapRecord) -> String {
    let loc = urls
        .application_path([RECORD_PAGE])
        .params([&record.pi])
        .build();
    match record.last_modified {
        Some(modified) => format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            xml_escape(&loc),
            modified.format("%Y-%m-%d")
        ),
        None => format!("  <url>\n    <loc>{}</loc>\n  </url>\n", xml_escape(&loc)),
    }
}

async fn write_url_file(dir: &Path, file_no: usize, entries: &[String], gzip: bool) -> Result<String> {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        entries.concat()
    );
    let name = if gzip {
        format!("sitemap_{}.xml.gz", file_no)
    } else {
        format!("sitemap_{}.xml", file_no)
    };
    let bytes = if gzip {
        gzip_bytes(body.as_bytes())?
    } else {
        body.into_bytes()
    };
    tokio::fs::write(dir.join(&name), bytes)
        .await
        .with_context(|| format!("Failed to write sitemap file {}", name))?;
    Ok(name)
}

async fn write_index_file(dir: &Path, urls: &ApiUrls, files: &[String]) -> Result<String> {
    let base = urls.path([SITEMAP_FILES]).build();
    let lastmod = Utc::now().format("%Y-%m-%d").to_string();
    let entries: String = files
        .iter()
        .map(|name| {
            format!(
                "  <sitemap>\n    <loc>{}/{}</loc>\n    <lastmod>{}</lastmod>\n  </sitemap>\n",
                xml_escape(&base),
                name,
                lastmod
            )
        })
        .collect();
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</sitemapindex>\n",
        entries
    );
    let name = "sitemap_index.xml".to_string();
    tokio::fs::write(dir.join(&name), body)
        .await
        .context("Failed to write sitemap index")?;
    Ok(name)
}

fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("Failed to gzip sitemap data")?;
    encoder.finish().context("Failed to finish gzip stream")
}

// Sitemap url entries must escape these inside <loc>.
fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Single-flight coordinator for generation runs. At most one run is in
/// progress at a time; later runs overwrite the finished state.
#[derive(Debug, Default)]
pub struct SitemapTasks {
    state: RwLock<SitemapRunState>,
}

impl SitemapTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the task to Running unless a run is already in progress. Returns
    /// the new run id and the state snapshot, or None when busy.
    pub async fn try_begin(&self) -> Option<(Uuid, SitemapRunState)> {
        let mut state = self.state.write().await;
        if state.status == TaskStatus::Running {
            return None;
        }
        let run_id = Uuid::new_v4();
        *state = SitemapRunState {
            status: TaskStatus::Running,
            run_id: Some(run_id),
            started: Some(Utc::now()),
            finished: None,
            files: Vec::new(),
            error: None,
        };
        Some((run_id, state.clone()))
    }

    /// Record a successful run. Ignored when `run_id` is not the current run.
    pub async fn finish_ok(&self, run_id: Uuid, files: Vec<String>) {
        let mut state = self.state.write().await;
        if state.run_id == Some(run_id) {
            state.status = TaskStatus::Done;
            state.finished = Some(Utc::now());
            state.files = files;
            state.error = None;
        }
    }

    /// Record a failed run. Ignored when `run_id` is not the current run.
    pub async fn finish_err(&self, run_id: Uuid, error: String) {
        let mut state = self.state.write().await;
        if state.run_id == Some(run_id) {
            state.status = TaskStatus::Failed;
            state.finished = Some(Utc::now());
            state.error = Some(error);
        }
    }

    pub async fn status(&self) -> SitemapRunState {
        self.state.read().await.clone()
    }
}
