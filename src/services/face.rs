// src/services/face.rs

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// An opaque comparator: given a captured face embedding, either a
/// matched employee or no match.
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    async fn identify(&self, company_id: Uuid, embedding: &[f64]) -> AppResult<Option<Uuid>>;
}

// ─── Local matcher ────────────────────────────────────────────────────────────

/// Compares the captured embedding against embeddings stored on the
/// company's active employees.
pub struct LocalFaceMatcher {
    db: PgPool,
    threshold: f64,
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl FaceMatcher for LocalFaceMatcher {
    async fn identify(&self, company_id: Uuid, embedding: &[f64]) -> AppResult<Option<Uuid>> {
        let rows = sqlx::query_as::<_, (Uuid, Vec<f64>)>(
            r#"SELECT id, face_embedding FROM employees
               WHERE company_id = $1 AND is_active = TRUE AND face_embedding IS NOT NULL"#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        let mut best: Option<(Uuid, f64)> = None;
        for (id, stored) in &rows {
            let score = cosine_similarity(embedding, stored);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*id, score));
            }
        }

        if let Some((id, score)) = best {
            debug!(%id, score, threshold = self.threshold, "Best local face candidate");
            if score >= self.threshold {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

// ─── Remote provider ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct IdentifyRequest<'a> {
    #[serde(rename = "companyRef")]
    company_ref: Uuid,
    embedding: &'a [f64],
}

#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    #[serde(rename = "requestSuccessful")]
    request_successful: bool,
    #[serde(rename = "responseMessage")]
    response_message: String,
    #[serde(rename = "responseBody")]
    response_body: Option<IdentifyBody>,
}

#[derive(Debug, Deserialize)]
struct IdentifyBody {
    matched: bool,
    #[serde(rename = "employeeRef")]
    employee_ref: Option<Uuid>,
    #[allow(dead_code)]
    confidence: f64,
}

pub struct RemoteFaceProvider {
    client: Client,
    config: Arc<Config>,
}

#[async_trait]
impl FaceMatcher for RemoteFaceProvider {
    async fn identify(&self, company_id: Uuid, embedding: &[f64]) -> AppResult<Option<Uuid>> {
        let credentials = format!(
            "{}:{}",
            self.config.face_provider_api_key, self.config.face_provider_secret_key
        );
        let encoded = general_purpose::STANDARD.encode(credentials);

        let url = format!(
            "{}/api/v1/faces/identify",
            self.config.face_provider_base_url
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", encoded))
            .json(&IdentifyRequest {
                company_ref: company_id,
                embedding,
            })
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let result: IdentifyResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        if !result.request_successful {
            return Err(AppError::Provider(result.response_message));
        }

        let body = result
            .response_body
            .ok_or_else(|| AppError::Provider("No identification body in response".to_string()))?;

        if body.matched {
            Ok(body.employee_ref)
        } else {
            Ok(None)
        }
    }
}

// ─── Fallback chain ───────────────────────────────────────────────────────────

/// Local record match first, then the external provider; when both fail
/// the composed error names both failures.
pub(crate) async fn identify_chain(
    primary: &dyn FaceMatcher,
    secondary: &dyn FaceMatcher,
    company_id: Uuid,
    embedding: &[f64],
) -> AppResult<Uuid> {
    let primary_failure = match primary.identify(company_id, embedding).await {
        Ok(Some(id)) => return Ok(id),
        Ok(None) => "no confident local match".to_string(),
        Err(e) => e.to_string(),
    };

    match secondary.identify(company_id, embedding).await {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(AppError::FaceIdentification {
            primary: primary_failure,
            secondary: "provider found no match".to_string(),
        }),
        Err(e) => Err(AppError::FaceIdentification {
            primary: primary_failure,
            secondary: e.to_string(),
        }),
    }
}

#[derive(Clone)]
pub struct FaceService {
    local: Arc<LocalFaceMatcher>,
    remote: Arc<RemoteFaceProvider>,
}

impl FaceService {
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        Self {
            local: Arc::new(LocalFaceMatcher {
                db,
                threshold: config.face_match_threshold,
            }),
            remote: Arc::new(RemoteFaceProvider {
                client: Client::new(),
                config,
            }),
        }
    }

    pub async fn identify(&self, company_id: Uuid, embedding: &[f64]) -> AppResult<Uuid> {
        identify_chain(
            self.local.as_ref(),
            self.remote.as_ref(),
            company_id,
            embedding,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMatcher(AppResult<Option<Uuid>>);

    #[async_trait]
    impl FaceMatcher for FixedMatcher {
        async fn identify(&self, _company_id: Uuid, _embedding: &[f64]) -> AppResult<Option<Uuid>> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(e) => Err(AppError::Provider(e.to_string())),
            }
        }
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = [0.5, -0.25, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_rejects_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn local_match_short_circuits_the_provider() {
        let id = Uuid::new_v4();
        let primary = FixedMatcher(Ok(Some(id)));
        let secondary = FixedMatcher(Err(AppError::Provider("must not be called".to_string())));
        let got = identify_chain(&primary, &secondary, Uuid::new_v4(), &[1.0])
            .await
            .unwrap();
        assert_eq!(got, id);
    }

    #[tokio::test]
    async fn provider_covers_a_local_miss() {
        let id = Uuid::new_v4();
        let primary = FixedMatcher(Ok(None));
        let secondary = FixedMatcher(Ok(Some(id)));
        let got = identify_chain(&primary, &secondary, Uuid::new_v4(), &[1.0])
            .await
            .unwrap();
        assert_eq!(got, id);
    }

    #[tokio::test]
    async fn both_failures_compose_into_one_error() {
        let primary = FixedMatcher(Err(AppError::Provider("local store offline".to_string())));
        let secondary = FixedMatcher(Err(AppError::Provider("timeout".to_string())));
        let err = identify_chain(&primary, &secondary, Uuid::new_v4(), &[1.0])
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("local store offline"));
        assert!(message.contains("timeout"));
    }

    #[tokio::test]
    async fn two_misses_fail_closed() {
        let primary = FixedMatcher(Ok(None));
        let secondary = FixedMatcher(Ok(None));
        let err = identify_chain(&primary, &secondary, Uuid::new_v4(), &[1.0])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FaceIdentification { .. }));
    }
}
