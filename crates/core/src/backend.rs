use std::future::Future;

use log::{debug, warn};
use reqwest::StatusCode;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    types::{KeywordsPayload, KeywordsRequest, RawSegment, TranscriptLine, TranscriptPayload},
    video_id::VideoId,
};

/// The transcript/segment service the viewer talks to.
pub trait Backend: Send + Sync + 'static {
    /// Transcript lines of the video; empty when the video has none.
    fn fetch_transcript(
        &self,
        video_id: &VideoId,
    ) -> impl Future<Output = Result<Vec<TranscriptLine>>> + Send;

    /// Stored segments, or `None` while nothing has been generated.
    fn fetch_segments(
        &self,
        video_id: &VideoId,
    ) -> impl Future<Output = Result<Option<Vec<RawSegment>>>> + Send;

    /// Ask for topic keywords. This also kicks off image generation.
    fn request_keywords(
        &self,
        video_id: &VideoId,
        transcript: &str,
    ) -> impl Future<Output = Result<Vec<RawSegment>>> + Send;

    fn image_url(&self, image: &str) -> String;
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base: with_trailing_slash(config.backend_url.clone()),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl Backend for HttpBackend {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<TranscriptLine>> {
        let mut url = self.endpoint("api/transcript/")?;
        url.query_pairs_mut()
            .append_pair("video_id", video_id.as_str());

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let payload = response.json::<TranscriptPayload>().await?;
        Ok(payload.into_lines())
    }

    async fn fetch_segments(&self, video_id: &VideoId) -> Result<Option<Vec<RawSegment>>> {
        let url = self.endpoint(&format!("api/segments/{}", video_id))?;

        let response = self.client.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("no stored segments for {}", video_id);
                Ok(None)
            }
            status if status.is_success() => Ok(Some(response.json::<Vec<RawSegment>>().await?)),
            status => Err(Error::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    async fn request_keywords(&self, video_id: &VideoId, transcript: &str) -> Result<Vec<RawSegment>> {
        let url = self.endpoint("api/topic-keywords")?;

        let response = self
            .client
            .post(url.clone())
            .json(&KeywordsRequest {
                video_id: video_id.as_str(),
                transcript,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Error bodies carry `{"error": ...}` whatever the status is.
        let payload = match serde_json::from_str::<KeywordsPayload>(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(Error::Status {
                    status,
                    url: url.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(message) = payload.error {
            warn!("keyword extraction failed for {}: {}", video_id, message);
            return Err(Error::Backend { message });
        }

        if !status.is_success() {
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(payload.segments.unwrap_or_default())
    }

    fn image_url(&self, image: &str) -> String {
        self.base
            .join(&format!("images/{}", image))
            .map(String::from)
            .unwrap_or_else(|_| format!("/images/{}", image))
    }
}
