//! Per-instance scrape loop

use crate::output::write_csv;
use crate::scrape::paginator::Paginator;
use crate::{Result, TrawlError};
use std::path::Path;
use std::time::Instant;

/// Instance pages are paginated starting from page 0
pub const INSTANCE_START_INDEX: u32 = 0;

/// Fetches each instance in order and hands it to the caller
#[derive(Clone, Copy)]
pub struct ScrapeDriver<'a> {
    paginator: Paginator<'a>,
    next_page: &'a (dyn Fn(&str, u32) -> String + Send + Sync),
}

impl<'a> ScrapeDriver<'a> {
    pub fn new(
        paginator: Paginator<'a>,
        next_page: &'a (dyn Fn(&str, u32) -> String + Send + Sync),
    ) -> Self {
        Self {
            paginator,
            next_page,
        }
    }

    /// Calls `process(body, url, position)` for every URL, in order
    ///
    /// The record at position `i` of the result always belongs to `urls[i]`.
    /// Instances that could not be fetched are processed with an empty body.
    pub async fn run<F, R>(&self, urls: &[String], mut process: F) -> Result<Vec<R>>
    where
        F: FnMut(&str, &str, usize) -> R,
    {
        self.try_run(urls, |body, url, position| {
            Ok::<_, TrawlError>(process(body, url, position))
        })
        .await
    }

    /// Like [`run`](Self::run), but stops at the first record `process`
    /// fails on
    ///
    /// Nothing after the failing instance is fetched.
    pub async fn try_run<F, R, E>(&self, urls: &[String], mut process: F) -> Result<Vec<R>>
    where
        F: FnMut(&str, &str, usize) -> std::result::Result<R, E>,
        E: Into<TrawlError>,
    {
        let mut records = Vec::with_capacity(urls.len());
        let start_time = Instant::now();

        for (position, url) in urls.iter().enumerate() {
            let body = self
                .paginator
                .accumulate(url, INSTANCE_START_INDEX, self.next_page)
                .await?;

            if body.is_empty() {
                tracing::debug!("Instance {} ({}) has an empty body", position, url);
            }

            match process(&body, url, position) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let e = e.into();
                    tracing::error!("Processing instance {} ({}) failed: {}", position, url, e);
                    return Err(e);
                }
            }

            let done = position + 1;
            if done % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} instances scraped in {:?}",
                    done,
                    urls.len(),
                    start_time.elapsed()
                );
            }
        }

        tracing::info!(
            "Scraped {} instances in {:?}",
            records.len(),
            start_time.elapsed()
        );
        Ok(records)
    }

    /// Same as [`run`](Self::run), then writes one CSV row per record
    pub async fn run_to_table<F>(
        &self,
        urls: &[String],
        process: F,
        destination: &Path,
    ) -> Result<Vec<Vec<String>>>
    where
        F: FnMut(&str, &str, usize) -> Vec<String>,
    {
        let rows = self.run(urls, process).await?;
        write_csv(destination, &rows)?;
        Ok(rows)
    }
}
