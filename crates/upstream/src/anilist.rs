use std::time::Duration;

use async_trait::async_trait;
use seadex_rss_core::{DisplayMetadata, TrackedId};
use serde::{Deserialize, Serialize};

use crate::{MetadataSource, UpstreamError, build_http_client, truncate};

const MEDIA_QUERY: &str = "
query ($id: Int) {
    Media (id: $id, type: ANIME) {
        id
        title {
            romaji
            english
            native
        }
        coverImage {
            large
        }
    }
}
";

/// Client for the AniList GraphQL API.
#[derive(Debug, Clone)]
pub struct AnilistClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Variables,
}

#[derive(Serialize)]
struct Variables {
    id: u32,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<MediaData>,
}

#[derive(Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Deserialize)]
struct Media {
    title: Option<MediaTitle>,
    #[serde(rename = "coverImage")]
    cover_image: Option<CoverImage>,
}

#[derive(Deserialize)]
struct MediaTitle {
    english: Option<String>,
    romaji: Option<String>,
    native: Option<String>,
}

#[derive(Deserialize)]
struct CoverImage {
    large: Option<String>,
}

impl MediaTitle {
    /// English, then romaji, then native; blank variants are skipped.
    fn preferred(self) -> Option<String> {
        [self.english, self.romaji, self.native]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
    }
}

impl AnilistClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self { client: build_http_client(timeout)?, endpoint: endpoint.to_owned() })
    }

    /// Fallible lookup. Missing fields still resolve to placeholders; only
    /// transport, status and parse failures are errors.
    ///
    /// # Errors
    /// See [`UpstreamError`].
    pub async fn lookup(&self, id: TrackedId) -> Result<DisplayMetadata, UpstreamError> {
        let request = GraphqlRequest { query: MEDIA_QUERY, variables: Variables { id: id.get() } };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, 200).to_owned(),
            });
        }

        let parsed: GraphqlResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed {
                context: format!("AniList media response (body: {})", truncate(&body, 200)),
                source: e,
            })?;

        let media = parsed.data.and_then(|d| d.media);
        let (title, cover_image_url) = match media {
            Some(media) => (
                media.title.and_then(MediaTitle::preferred),
                media.cover_image.and_then(|c| c.large).filter(|u| !u.trim().is_empty()),
            ),
            None => (None, None),
        };

        Ok(DisplayMetadata {
            title: title.unwrap_or_else(|| id.placeholder_title()),
            cover_image_url,
        })
    }
}

#[async_trait]
impl MetadataSource for AnilistClient {
    async fn fetch_display_metadata(&self, id: TrackedId) -> DisplayMetadata {
        match self.lookup(id).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(tracked_id = %id, error = %e, "AniList lookup failed, using placeholder");
                DisplayMetadata::placeholder(id)
            },
        }
    }
}
