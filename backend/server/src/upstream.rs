//! # 1C
//!
//! Every upstream call carries two credentials at once:
//! - `Authorization`: the service account, standard `Basic base64(login:password)`
//! - `Auth`: the end user, in a shape that differs per endpoint
//!
//! For `GetFile` the user part is `Basic login:password` with the colon left in
//! and no base64. For `GetPerevozki` it is `Basic <base64>` exactly as the
//! browser sent it. 1C rejects anything else, so neither shape gets normalized.
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{
    Client, Response,
    header::{AUTHORIZATION, HeaderName, HeaderValue},
};

use crate::{
    config::{Config, ConfigError, ServiceCredentials},
    error::AppError,
};

pub const AUTH_HEADER: HeaderName = HeaderName::from_static("auth");

pub struct Upstream {
    client: Client,
    base_url: String,
    service_auth: HeaderValue,
    date_from: String,
    date_to: String,
    list_timeout: Duration,
}

impl Upstream {
    /// Failures here are startup errors, nothing has been proxied yet.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: config.upstream_base_url.clone(),
            service_auth: service_auth(&config.service)?,
            date_from: config.date_from.clone(),
            date_to: config.date_to.clone(),
            list_timeout: config.list_timeout,
        })
    }

    pub fn file_url(&self) -> String {
        format!("{}/GetFile", self.base_url)
    }

    pub fn perevozki_url(&self) -> String {
        format!("{}/GetPerevozki", self.base_url)
    }

    /// No timeout here, documents can be large and the body is streamed.
    pub async fn get_file(
        &self,
        caller: HeaderValue,
        metod: &str,
        number: &str,
    ) -> Result<Response, AppError> {
        let response = self
            .client
            .get(self.file_url())
            .query(&[("metod", metod), ("Number", number)])
            .header(AUTH_HEADER, caller)
            .header(AUTHORIZATION, self.service_auth.clone())
            .send()
            .await?;

        Ok(response)
    }

    /// `credential` is the base64 part of the client's Basic header, untouched.
    pub async fn get_perevozki(&self, credential: HeaderValue) -> Result<Response, AppError> {
        let response = self
            .client
            .get(self.perevozki_url())
            .query(&[
                ("DateB", self.date_from.as_str()),
                ("DateE", self.date_to.as_str()),
            ])
            .header(AUTHORIZATION, self.service_auth.clone())
            .header(AUTH_HEADER, credential)
            .timeout(self.list_timeout)
            .send()
            .await?;

        Ok(response)
    }
}

pub fn service_auth(service: &ServiceCredentials) -> Result<HeaderValue, ConfigError> {
    let encoded = STANDARD.encode(format!("{}:{}", service.login, service.password));

    HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|e| ConfigError::Invalid {
        key: "ONEC_SERVICE_LOGIN",
        reason: e.to_string(),
    })
}

/// `Basic login:password`, deliberately not base64.
pub fn caller_auth(login: &str, password: &str) -> Result<HeaderValue, AppError> {
    header_value(format!("Basic {login}:{password}"))
}

pub fn client_credential(encoded: &str) -> Result<HeaderValue, AppError> {
    header_value(format!("Basic {encoded}"))
}

// Non-ASCII logins go out as raw UTF-8 bytes, control characters are refused.
fn header_value(value: String) -> Result<HeaderValue, AppError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|_| {
        AppError::BadRequest("Credentials must not contain control characters".to_string())
    })
}
