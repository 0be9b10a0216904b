//! AWS Translate provider (JSON protocol over HTTPS, SigV4-signed).

use crate::config::Config;
use crate::error::ProviderError;
use crate::i18n::{Language, UNKNOWN_LANGUAGE};
use crate::provider::sigv4::{self, SigningParams};
use crate::provider::{build_http_client, is_blank, is_unknown_language, TranslatedText, TranslationProvider};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SERVICE: &str = "translate";
const TARGET_PREFIX: &str = "AWSShineFrontendService_20170701";
const LIST_LANGUAGES_MAX_PAGES: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextRequest<'a> {
    text: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextResponse {
    translated_text: String,
    #[serde(default)]
    source_language_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListLanguagesRequest {
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListLanguagesResponse {
    #[serde(default)]
    languages: Vec<AwsLanguage>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwsLanguage {
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct AwsErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
}

/// Managed translation via AWS Translate's `TranslateText` API.
pub struct AwsTranslateProvider {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    host: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    target_language: Language,
}

impl AwsTranslateProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let (access_key_id, secret_access_key) = match (
            config.aws_access_key_id.as_ref(),
            config.aws_secret_access_key.as_ref(),
        ) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => {
                return Err(ProviderError::Signing(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY are required".to_string(),
                ))
            }
        };

        let endpoint = reqwest::Url::parse(&config.aws_endpoint()).map_err(|e| {
            ProviderError::Request(format!("invalid AWS Translate endpoint: {}", e))
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ProviderError::Request(
                    "AWS Translate endpoint has no host".to_string(),
                ))
            }
        };

        Ok(Self {
            client: build_http_client(config)?,
            endpoint,
            host,
            region: config.aws_region.clone(),
            access_key_id,
            secret_access_key,
            session_token: config.aws_session_token.clone(),
            target_language: config.target_language,
        })
    }

    /// Issue one signed JSON call for `operation` and decode the response.
    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request)
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to encode request: {}", e)))?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let params = SigningParams {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            session_token: self.session_token.as_deref(),
            region: &self.region,
            service: SERVICE,
            amz_date: &amz_date,
        };
        let headers = sigv4::sign_json_post(&params, &self.host, &target, &payload)?;

        let mut request = self.client.post(self.endpoint.clone()).body(payload);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_type_header = response
                .headers()
                .get("x-amzn-errortype")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            let error_type = serde_json::from_str::<AwsErrorBody>(&body)
                .ok()
                .and_then(|b| b.error_type)
                .or(error_type_header)
                .unwrap_or_default();

            if error_name(&error_type) == "UnsupportedLanguagePairException" {
                return Err(ProviderError::UnsupportedLanguagePair {
                    source_language: UNKNOWN_LANGUAGE.to_string(),
                    target_language: self.target_language.code().to_string(),
                });
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Resp>().await?)
    }
}

/// Record the source code that was actually sent; `call` cannot know it.
fn with_source_language(error: ProviderError, source: &str) -> ProviderError {
    match error {
        ProviderError::UnsupportedLanguagePair {
            target_language, ..
        } => ProviderError::UnsupportedLanguagePair {
            source_language: source.to_string(),
            target_language,
        },
        other => other,
    }
}

/// "com.amazonaws.translate#UnsupportedLanguagePairException" and
/// "UnsupportedLanguagePairException:http://..." both name the same error.
fn error_name(error_type: &str) -> &str {
    let without_namespace = error_type.rsplit('#').next().unwrap_or(error_type);
    without_namespace
        .split(':')
        .next()
        .unwrap_or(without_namespace)
        .trim()
}

#[async_trait]
impl TranslationProvider for AwsTranslateProvider {
    fn name(&self) -> &'static str {
        "aws-translate"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        if is_blank(text) {
            return Ok(UNKNOWN_LANGUAGE.to_string());
        }

        let response: TranslateTextResponse = self
            .call(
                "TranslateText",
                &TranslateTextRequest {
                    text,
                    source_language_code: "auto",
                    target_language_code: self.target_language.code(),
                },
            )
            .await
            .map_err(|e| with_source_language(e, "auto"))?;

        let detected = response
            .source_language_code
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        debug!("Language detected: '{}' -> '{}'", text, detected);
        Ok(detected)
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
    ) -> Result<TranslatedText, ProviderError> {
        if is_blank(text) {
            return Ok(TranslatedText::new(text));
        }

        let source = if is_unknown_language(source_language) {
            "auto"
        } else {
            source_language
        };

        let result: Result<TranslateTextResponse, ProviderError> = self
            .call(
                "TranslateText",
                &TranslateTextRequest {
                    text,
                    source_language_code: source,
                    target_language_code: self.target_language.code(),
                },
            )
            .await;

        match result {
            Ok(response) => {
                info!(
                    "Translation: '{}' -> '{}' (source: {})",
                    text,
                    response.translated_text,
                    response.source_language_code.as_deref().unwrap_or(source)
                );
                Ok(TranslatedText::new(response.translated_text))
            }
            Err(e) => match with_source_language(e, source) {
                e @ ProviderError::UnsupportedLanguagePair { .. } => {
                    warn!("{}, keeping original text", e);
                    Ok(TranslatedText::unsupported_pair(text))
                }
                e => Err(e),
            },
        }
    }

    async fn supported_languages(&self) -> Result<Vec<String>, ProviderError> {
        let mut codes = Vec::new();
        let mut next_token = None;

        for _ in 0..LIST_LANGUAGES_MAX_PAGES {
            let page: ListLanguagesResponse = self
                .call(
                    "ListLanguages",
                    &ListLanguagesRequest {
                        max_results: 500,
                        next_token: next_token.take(),
                    },
                )
                .await?;

            codes.extend(page.languages.into_iter().map(|l| l.language_code));
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        debug!("AWS Translate supports {} languages", codes.len());
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(endpoint: &str) -> Config {
        Config {
            aws_access_key_id: Some("AKIDEXAMPLE".to_string()),
            aws_secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
            aws_translate_endpoint: Some(endpoint.to_string()),
            ..Config::default()
        }
    }

    fn translate_target() -> &'static str {
        "AWSShineFrontendService_20170701.TranslateText"
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = Config::default();
        assert!(AwsTranslateProvider::new(&config).is_err());
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let config = create_test_config("not a url");
        assert!(AwsTranslateProvider::new(&config).is_err());
    }

    #[test]
    fn test_host_includes_non_default_port() {
        let provider =
            AwsTranslateProvider::new(&create_test_config("http://127.0.0.1:4566")).expect("provider");
        assert_eq!(provider.host, "127.0.0.1:4566");

        let provider = AwsTranslateProvider::new(&Config {
            aws_translate_endpoint: None,
            ..create_test_config("unused")
        })
        .expect("provider");
        assert_eq!(provider.host, "translate.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_error_name() {
        assert_eq!(
            error_name("com.amazonaws.translate#UnsupportedLanguagePairException"),
            "UnsupportedLanguagePairException"
        );
        assert_eq!(
            error_name("UnsupportedLanguagePairException:http://internal.amazon.com/coral/"),
            "UnsupportedLanguagePairException"
        );
        assert_eq!(error_name("ThrottlingException"), "ThrottlingException");
        assert_eq!(error_name(""), "");
    }

    #[test]
    fn test_translate_request_serialization() {
        let request = TranslateTextRequest {
            text: "Xin chào",
            source_language_code: "auto",
            target_language_code: "en",
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "Text": "Xin chào",
                "SourceLanguageCode": "auto",
                "TargetLanguageCode": "en"
            })
        );
    }

    #[tokio::test]
    async fn test_detect_language_reads_source_language_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", translate_target()))
            .and(header("content-type", "application/x-amz-json-1.1"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(body_partial_json(serde_json::json!({"SourceLanguageCode": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "TranslatedText": "Hello",
                "SourceLanguageCode": "vi",
                "TargetLanguageCode": "en"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let detected = provider.detect_language("Xin chào").await.expect("detect");

        assert_eq!(detected, "vi");
    }

    #[tokio::test]
    async fn test_translate_passes_detected_source_language() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "Text": "Thông báo quan trọng",
                "SourceLanguageCode": "vi",
                "TargetLanguageCode": "en"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "TranslatedText": "Important notice",
                "SourceLanguageCode": "vi",
                "TargetLanguageCode": "en"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let translated = provider
            .translate("Thông báo quan trọng", "vi")
            .await
            .expect("translate");

        assert_eq!(translated, TranslatedText::new("Important notice"));
    }

    #[tokio::test]
    async fn test_translate_unknown_source_uses_auto() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"SourceLanguageCode": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "TranslatedText": "Hello",
                "SourceLanguageCode": "fr"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let translated = provider.translate("Bonjour", "unknown").await.expect("translate");

        assert_eq!(translated.text, "Hello");
    }

    #[tokio::test]
    async fn test_translate_unsupported_pair_returns_original() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "com.amazonaws.translate#UnsupportedLanguagePairException",
                "Message": "Unsupported language pair: xx to en"
            })))
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let translated = provider.translate("Some text", "xx").await.expect("fallback");

        assert_eq!(translated, TranslatedText::unsupported_pair("Some text"));
    }

    #[tokio::test]
    async fn test_unsupported_pair_from_error_type_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header(
                        "x-amzn-errortype",
                        "UnsupportedLanguagePairException:http://internal.amazon.com/coral/",
                    )
                    .set_body_string("{}"),
            )
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let translated = provider.translate("Some text", "xx").await.expect("fallback");

        assert!(translated.unsupported_pair);
    }

    #[test]
    fn test_with_source_language() {
        let err = ProviderError::UnsupportedLanguagePair {
            source_language: UNKNOWN_LANGUAGE.to_string(),
            target_language: "en".to_string(),
        };
        assert_eq!(
            with_source_language(err, "vi"),
            ProviderError::UnsupportedLanguagePair {
                source_language: "vi".to_string(),
                target_language: "en".to_string(),
            }
        );

        let other = ProviderError::Api {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(with_source_language(other.clone(), "vi"), other);
    }

    #[tokio::test]
    async fn test_detect_unsupported_pair_is_a_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "UnsupportedLanguagePairException"
            })))
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let result = provider.detect_language("Some text").await;

        assert_eq!(
            result,
            Err(ProviderError::UnsupportedLanguagePair {
                source_language: "auto".to_string(),
                target_language: "en".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_translate_other_errors_fail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "com.amazon.coral.service#UnrecognizedClientException",
                "message": "The security token included in the request is invalid."
            })))
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let result = provider.translate("Bonjour", "fr").await;

        match result {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("UnrecognizedClientException"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let result = provider.translate("Bonjour", "fr").await;

        assert!(matches!(result, Err(ProviderError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_translate_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})))
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let result = provider.translate("Bonjour", "fr").await;

        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");

        assert_eq!(provider.detect_language("   ").await.expect("detect"), "unknown");
        assert_eq!(
            provider.translate("  ", "unknown").await.expect("translate"),
            TranslatedText::new("  ")
        );
    }

    #[tokio::test]
    async fn test_supported_languages_follows_pagination() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", "AWSShineFrontendService_20170701.ListLanguages"))
            .and(body_partial_json(serde_json::json!({"NextToken": "page-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Languages": [{"LanguageName": "Vietnamese", "LanguageCode": "vi"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", "AWSShineFrontendService_20170701.ListLanguages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Languages": [
                    {"LanguageName": "English", "LanguageCode": "en"},
                    {"LanguageName": "French", "LanguageCode": "fr"}
                ],
                "NextToken": "page-2"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = AwsTranslateProvider::new(&create_test_config(&mock_server.uri())).expect("provider");
        let languages = provider.supported_languages().await.expect("languages");

        assert_eq!(languages, vec!["en", "fr", "vi"]);
    }
}
