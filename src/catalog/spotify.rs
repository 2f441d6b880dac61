use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::trait_def::MusicCatalog;
use super::types::{AudioFeatureScores, CatalogTrack};
use crate::sentiment::Emotion;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh the token this long before its advertised expiry.
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Spotify Web API client using the client-credentials flow.
///
/// The access token is cached until shortly before expiry; a 401 from the
/// API forces a refresh and one retry.
pub struct SpotifyClient {
    client: reqwest::Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<TracksPage>,
}

#[derive(Deserialize)]
struct TracksPage {
    items: Option<Vec<TrackItem>>,
}

#[derive(Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    artists: Vec<ArtistItem>,
    duration_ms: Option<u64>,
    uri: String,
    external_urls: ExternalUrls,
    album: AlbumItem,
    preview_url: Option<String>,
}

#[derive(Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Deserialize)]
struct AlbumItem {
    name: String,
    images: Option<Vec<ImageItem>>,
}

#[derive(Deserialize)]
struct ImageItem {
    url: String,
}

#[derive(Deserialize)]
struct FeaturesResponse {
    energy: Option<f64>,
    danceability: Option<f64>,
    valence: Option<f64>,
}

fn emotion_keywords(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => "happy upbeat",
        Emotion::Sad => "sad emotional",
        Emotion::Energetic => "energetic workout",
        Emotion::Chill => "chill relax",
        Emotion::Angry => "angry rock metal hardcore",
        Emotion::Romantic => "romantic love",
    }
}

impl SpotifyClient {
    pub fn new(
        api_base: String,
        accounts_base: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            accounts_base,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    async fn fetch_token(&self) -> anyhow::Result<CachedToken> {
        let credentials = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .client
            .post(format!("{}/api/token", self.accounts_base))
            .header("Authorization", format!("Basic {}", credentials))
            .form(&[("grant_type", "client_credentials")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_SLACK);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    /// Returns a valid access token, fetching a fresh one if the cached
    /// token is missing or stale. `force` discards the cached token first.
    async fn access_token(&self, force: bool) -> anyhow::Result<String> {
        let mut guard = self.token.lock().await;
        if !force {
            if let Some(cached) = guard.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.value.clone());
                }
            }
        }
        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    /// GET an API path with bearer auth, retrying once with a fresh token
    /// on 401.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let mut force_refresh = false;
        loop {
            let token = self.access_token(force_refresh).await?;
            let response = self
                .client
                .get(format!("{}{}", self.api_base, path))
                .bearer_auth(token)
                .query(query)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;
            if response.status() == reqwest::StatusCode::UNAUTHORIZED && !force_refresh {
                force_refresh = true;
                continue;
            }
            let response = response.error_for_status()?;
            return Ok(response.json().await?);
        }
    }
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn search(&self, emotion: Emotion, genre: &str, limit: usize) -> Vec<CatalogTrack> {
        let query = format!("{} {}", emotion_keywords(emotion), genre);
        let limit_str = limit.to_string();
        let result: anyhow::Result<SearchResponse> = self
            .get_json(
                "/search",
                &[
                    ("q", query.as_str()),
                    ("type", "track"),
                    ("limit", limit_str.as_str()),
                    ("market", "US"),
                ],
            )
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Spotify search failed: {}", e);
                return vec![];
            }
        };

        response
            .tracks
            .and_then(|t| t.items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| CatalogTrack {
                id: item.id,
                title: item.name,
                artist: item
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                duration_ms: item.duration_ms,
                uri: item.uri,
                external_url: item.external_urls.spotify.unwrap_or_default(),
                image_url: item
                    .album
                    .images
                    .and_then(|images| images.into_iter().next())
                    .map(|image| image.url),
                preview_url: item.preview_url,
                album: item.album.name,
            })
            .collect()
    }

    async fn audio_features(&self, track_id: &str) -> Option<AudioFeatureScores> {
        let path = format!("/audio-features/{}", track_id);
        match self.get_json::<FeaturesResponse>(&path, &[]).await {
            Ok(features) => Some(AudioFeatureScores {
                energy: features.energy,
                danceability: features.danceability,
                valence: features.valence,
            }),
            Err(e) => {
                tracing::warn!("Spotify audio features failed for {}: {}", track_id, e);
                None
            }
        }
    }
}
