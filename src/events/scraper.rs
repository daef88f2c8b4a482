//! Holvi web shop scraper.
//!
//! Only works when the product description follows the `WHAT:` / `WHERE:` /
//! `WHEN:` / `IN SHORT:` layout the association uses for event tickets.

use async_trait::async_trait;
use select::document::Document;
use select::predicate::{Class, Name, Predicate};
use serde::Deserialize;
use url::Url;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::events::{Event, EventSource};

const ITEM_CLASS: &str = "store-item-wrapper";
const SOLD_OUT_CLASS: &str = "store-item-wrapper-sold-out";
const SUMMARY_MARKER: &str = "IN SHORT:";

#[derive(Deserialize)]
struct CarouselImage {
    url: String,
}

/// Links to every product in the shop listing that is not sold out.
pub fn parse_listing(html: &str, base: &Url) -> Vec<String> {
    let doc = Document::from(html);

    doc.find(Name("a").and(Class(ITEM_CLASS)))
        .filter(|node| !node.attr("class").unwrap_or_default().contains(SOLD_OUT_CLASS))
        .filter_map(|node| node.attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                log::warn!("Skipping product link {:?}: {}", href, e);
                None
            }
        })
        .collect()
}

/// Extracts an event from a product page.
///
/// Returns `None` unless title, location, time and description are all present.
pub fn parse_event_page(html: &str, url: &str) -> Option<Event> {
    let doc = Document::from(html);
    let text = doc.find(Class("product-description")).next()?.text();

    let mut title = "";
    let mut location = "";
    let mut time = "";
    for line in text.lines().map(str::trim_start) {
        if let Some(value) = line.strip_prefix("WHAT:") {
            title = value.trim();
        } else if let Some(value) = line.strip_prefix("WHERE:") {
            location = value.trim();
        } else if let Some(value) = line.strip_prefix("WHEN:") {
            time = value.trim();
        }
    }

    let description = text.split(SUMMARY_MARKER).next().unwrap_or_default().trim();

    if [title, location, time, description].iter().any(|field| field.is_empty()) {
        log::debug!("Product page {} is not an event description", url);
        return None;
    }

    Some(Event {
        title: title.to_string(),
        location: location.to_string(),
        time: time.to_string(),
        description: description.to_string(),
        image_url: first_image(&doc),
        url: url.to_string(),
    })
}

fn first_image(doc: &Document) -> Option<String> {
    let images = doc.find(Name("image-carousel")).next()?.attr("images")?.to_string();
    match serde_json::from_str::<Vec<CarouselImage>>(&images) {
        Ok(images) => images.into_iter().next().map(|image| image.url),
        Err(e) => {
            log::warn!("Unreadable image carousel: {}", e);
            None
        }
    }
}

/// Scrapes events from the shop page at `shop_url`.
pub struct HolviScraper {
    client: reqwest::Client,
    shop_url: Url,
}

impl HolviScraper {
    pub fn new(shop_url: &str) -> AppResult<Self> {
        let shop_url = Url::parse(shop_url)
            .map_err(|e| AppError::Config(format!("invalid events shop URL {:?}: {}", shop_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(config::events::request_timeout())
            .user_agent(concat!("acbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, shop_url })
    }

    async fn fetch_page(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus(status));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl EventSource for HolviScraper {
    async fn fetch_events(&self) -> AppResult<Vec<Event>> {
        let listing = self.fetch_page(self.shop_url.as_str()).await?;
        let links = parse_listing(&listing, &self.shop_url);
        log::info!("Found {} product(s) on sale at {}", links.len(), self.shop_url);

        let mut events = Vec::new();
        for link in links {
            match self.fetch_page(&link).await {
                Ok(page) => events.extend(parse_event_page(&page, &link)),
                Err(e) => log::warn!("Failed to fetch product page {}: {}", link, e),
            }
        }
        Ok(events)
    }
}
