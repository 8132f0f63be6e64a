//! HTTP client for the PAN verification and postcode lookup endpoints.

use async_trait::async_trait;
use customer_desk_core::lookup::{PostcodeRequest, VerifyPanRequest};
use customer_desk_core::{Pan, PanVerification, Postcode, PostcodeDetails};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{LookupError, LookupService};
use crate::config::LookupConfig;

const VERIFY_PAN_PATH: &str = "verify-pan.php";
const POSTCODE_DETAILS_PATH: &str = "get-postcode-details.php";

/// JSON-over-HTTP lookup client.
#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    client: Client,
    base_url: String,
}

impl HttpLookupClient {
    /// Create a client for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, LookupError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::Response(e.to_string()))
    }
}

#[async_trait]
impl LookupService for HttpLookupClient {
    #[instrument(skip(self, pan), fields(pan = %pan))]
    async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError> {
        let body = VerifyPanRequest {
            pan_number: pan.as_str().to_string(),
        };
        let result: PanVerification = self.post(VERIFY_PAN_PATH, &body).await?;
        debug!(is_valid = result.is_valid, "PAN verified");
        Ok(result)
    }

    #[instrument(skip(self, postcode), fields(postcode = %postcode))]
    async fn postcode_details(&self, postcode: &Postcode) -> Result<PostcodeDetails, LookupError> {
        let body = PostcodeRequest {
            postcode: postcode.as_str().to_string(),
        };
        let result: PostcodeDetails = self.post(POSTCODE_DETAILS_PATH, &body).await?;
        debug!(
            status = %result.status,
            states = result.state.len(),
            cities = result.city.len(),
            "Postcode resolved"
        );
        Ok(result)
    }
}
