use std::time::Duration;

use anyhow::{Result, bail};
use reqwest::StatusCode;
use scraper::{Html, Selector};

use crate::analyzer::{CharacterFilter, PageTextFilter};

/// Text pulled out of a fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub title: String,
    pub text: String,
}

pub struct PageFetcher {
    client: reqwest::Client,
    text_filter: PageTextFilter,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<PageFetcher> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(PageFetcher {
            client,
            text_filter: PageTextFilter,
        })
    }

    /// Fetches `url` and returns its cleaned text. Any failure (transport
    /// error, non-200 status, unreadable body) yields empty text.
    pub async fn fetch_text(&self, url: &str) -> PageText {
        match self.fetch_page(url).await {
            Ok(html) => {
                let page = self.extract(&html);
                log::info!(
                    "fetched {url} (title: {:?}, {} bytes of text)",
                    page.title,
                    page.text.len()
                );
                page
            }
            Err(e) => {
                log::error!("error fetching page {url}, error: {:#}", e);
                PageText::default()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let res = self.client.get(url).send().await?;
        if res.status() != StatusCode::OK {
            bail!("unexpected status {}", res.status());
        }
        let body = res.text().await?;
        Ok(body)
    }

    pub fn extract(&self, html: &str) -> PageText {
        PageText {
            title: Self::parse_title(html),
            text: self.text_filter.filter(html.to_string()),
        }
    }

    fn parse_title(html: &str) -> String {
        let document = Html::parse_document(html);
        let Ok(title_selector) = Selector::parse("title") else {
            return String::new();
        };
        document
            .select(&title_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }
}
