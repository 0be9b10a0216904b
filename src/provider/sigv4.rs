//! AWS Signature Version 4 for JSON-protocol POST requests.
//!
//! Only what AWS Translate needs: a POST to "/" with an empty query string
//! and the headers `content-type`, `host`, `x-amz-date`, `x-amz-target`
//! (plus `x-amz-security-token` for temporary credentials).

use crate::error::ProviderError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

type HmacSha256 = Hmac<Sha256>;

/// Credentials and scope for one signature.
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
    pub service: &'a str,
    /// Request time in `YYYYMMDD'T'HHMMSS'Z'` format
    pub amz_date: &'a str,
}

impl SigningParams<'_> {
    fn date_stamp(&self) -> &str {
        self.amz_date.get(..8).unwrap_or(self.amz_date)
    }

    fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            self.date_stamp(),
            self.region,
            self.service
        )
    }
}

/// Headers to attach to the request, `authorization` included.
///
/// `host` is signed but not returned; the HTTP client sets it from the URL.
pub fn sign_json_post(
    params: &SigningParams<'_>,
    host: &str,
    target: &str,
    payload: &[u8],
) -> Result<Vec<(&'static str, String)>, ProviderError> {
    let mut headers: Vec<(&'static str, String)> = vec![
        ("content-type", JSON_CONTENT_TYPE.to_string()),
        ("host", host.to_string()),
        ("x-amz-date", params.amz_date.to_string()),
    ];
    if let Some(token) = params.session_token {
        headers.push(("x-amz-security-token", token.to_string()));
    }
    headers.push(("x-amz-target", target.to_string()));
    headers.sort_by(|a, b| a.0.cmp(b.0));

    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();

    let canonical = canonical_request("POST", "/", "", &canonical_headers, &signed_headers, payload);
    let to_sign = string_to_sign(params.amz_date, &params.credential_scope(), &canonical);
    let key = signing_key(
        params.secret_access_key,
        params.date_stamp(),
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        params.access_key_id,
        params.credential_scope(),
        signed_headers,
        signature
    );

    let mut out: Vec<(&'static str, String)> = headers
        .into_iter()
        .filter(|(name, _)| *name != "host")
        .collect();
    out.push(("authorization", authorization));
    Ok(out)
}

pub(crate) fn canonical_request(
    method: &str,
    uri: &str,
    query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload: &[u8],
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        uri,
        query,
        canonical_headers,
        signed_headers,
        sha256_hex(payload)
    )
}

pub(crate) fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    )
}

pub(crate) fn signing_key(
    secret: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, ProviderError> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| ProviderError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
