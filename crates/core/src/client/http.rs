//! reqwest-backed implementations of the campaign API traits.
//!
//! Two clients, two credential scopes: the announcement client carries the
//! miniapp authorization token and no cookies; each redeem client owns one
//! account's cookie jar so the challenge session issued by the captcha
//! endpoint is automatically carried into the following submission.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::fingerprint::DeviceFingerprint;
use super::traits::{AnnouncementApi, RedeemApi};
use super::types::{AnnouncementDetail, AnnouncementItem, AnnouncementList, ClientError, SubmitResponse};

/// Remote service endpoints. Defaults target the production campaign; tests
/// and staging override them.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub announcement_list_url: String,
    pub announcement_detail_url: String,
    pub redeem_url: String,
    pub captcha_url: String,
    /// Campaign activity id, sent both as query parameter and payload field.
    pub act_id: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            announcement_list_url: "https://morefun.game.qq.com/act/v1/api/v1/gateway".to_string(),
            announcement_detail_url: "https://morefun.game.qq.com/rocom/E80EH8LJ/threadDetail"
                .to_string(),
            redeem_url: "https://comm.ams.game.qq.com/ide/".to_string(),
            captcha_url: "https://ssl.captcha.qq.com/getimage".to_string(),
            act_id: "E80EH8LJ".to_string(),
        }
    }
}

const MINIAPP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 MicroMessenger/7.0.20.1781(0x6700143B) \
     NetType/WIFI MiniProgramEnv/Windows WindowsWechat/WMPF";

/// Session-invalid return code shared by the gateway and redeem endpoints.
const CODE_SESSION_INVALID: i64 = 101;

#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Announcement board client (discovery + detail).
pub struct HttpAnnouncementClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    authorization: String,
}

impl HttpAnnouncementClient {
    pub fn new(
        authorization: impl Into<String>,
        timeout: Duration,
        endpoints: ApiEndpoints,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoints,
            authorization: authorization.into(),
        })
    }

    fn check_code(envelope: &GatewayEnvelope) -> Result<(), ClientError> {
        match envelope.code {
            0 => Ok(()),
            CODE_SESSION_INVALID => Err(ClientError::SessionInvalid(envelope.msg.clone())),
            code => Err(ClientError::Api(format!(
                "gateway returned code {}: {}",
                code, envelope.msg
            ))),
        }
    }
}

#[async_trait]
impl AnnouncementApi for HttpAnnouncementClient {
    async fn fetch_list(&self) -> Result<AnnouncementList, ClientError> {
        let payload = json!({
            "account_type": "wxmini",
            "area_id": 1,
            "plat_id": 1,
            "biz_code": "rocom",
            "act_id": self.endpoints.act_id,
            "server_type": 1,
            "req_path": "/api/home/index",
            "req_type": "POST",
            "req_param": {},
        });

        let response = self
            .http
            .post(format!(
                "{}?X-Mcube-Act-Id={}",
                self.endpoints.announcement_list_url, self.endpoints.act_id
            ))
            .header("authorization", &self.authorization)
            .header("User-Agent", MINIAPP_USER_AGENT)
            .header("xweb_xhr", "1")
            .header("accept-language", "zh-CN,zh;q=0.9")
            .form(&[("data", payload.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let envelope: GatewayEnvelope = response.json().await?;
        Self::check_code(&envelope)?;

        let mut items = Vec::new();
        if let Some(list) = envelope
            .data
            .pointer("/announcementList/list")
            .and_then(|v| v.as_array())
        {
            for entry in list {
                let title = entry
                    .get("title")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string();
                if let Some(id) = entry.get("id").and_then(|i| i.as_u64()) {
                    items.push(AnnouncementItem { id, title });
                }
            }
        }

        debug!("fetched announcement list with {} items", items.len());
        Ok(AnnouncementList { items })
    }

    async fn fetch_detail(&self, thread_id: u64) -> Result<AnnouncementDetail, ClientError> {
        let response = self
            .http
            .post(format!(
                "{}?X-Mcube-Act-Id={}",
                self.endpoints.announcement_detail_url, self.endpoints.act_id
            ))
            .header("User-Agent", MINIAPP_USER_AGENT)
            .header("xweb_xhr", "1")
            .header("accept-language", "zh-CN,zh;q=0.9")
            .json(&json!({ "req_param": { "threadId": thread_id } }))
            .send()
            .await?
            .error_for_status()?;

        let envelope: GatewayEnvelope = response.json().await?;
        Self::check_code(&envelope)?;

        let text = envelope
            .data
            .pointer("/content/text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(AnnouncementDetail { text })
    }
}

/// One account's redemption client. Holds the account cookie jar and a
/// stable randomized fingerprint for the run.
pub struct HttpRedeemClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    fingerprint: DeviceFingerprint,
}

impl HttpRedeemClient {
    pub fn new(
        cookie: &str,
        timeout: Duration,
        proxy: Option<&str>,
        endpoints: ApiEndpoints,
    ) -> Result<Self, ClientError> {
        let jar = Arc::new(reqwest::cookie::Jar::default());

        // Seed the jar with the configured account cookie on both web-side
        // hosts; the captcha endpoint later adds its own challenge session
        // cookie on top.
        for url_str in [&endpoints.captcha_url, &endpoints.redeem_url] {
            if let Ok(url) = url_str.parse::<reqwest::Url>() {
                for pair in cookie.split(';') {
                    let pair = pair.trim();
                    if pair.contains('=') {
                        jar.add_cookie_str(pair, &url);
                    }
                }
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_provider(jar);

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            http: builder.build()?,
            endpoints,
            fingerprint: DeviceFingerprint::random(),
        })
    }
}

#[async_trait]
impl RedeemApi for HttpRedeemClient {
    async fn fetch_captcha(&self) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(format!(
                "{}?aid=210001040.2833479040128887",
                self.endpoints.captcha_url
            ))
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .header("Accept-Language", "zh-CN,zh;q=0.9")
            .header("Referer", "https://rocom.qq.com/")
            .header("User-Agent", &self.fingerprint.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn submit(&self, password: &str, answer: &str) -> Result<SubmitResponse, ClientError> {
        let act_page = "http://rocom.qq.com/act/a20250901certification/";
        let eas_url = urlencoding::encode(act_page).into_owned();

        let form = [
            ("iChartId", "446509"),
            ("iSubChartId", "446509"),
            ("sIdeToken", "AwD3Sx"),
            ("e_code", "0"),
            ("g_code", "0"),
            ("eas_url", eas_url.as_str()),
            ("sMiloTag", "AMS-rocom-1024144641-dRtjMj-25_TyUHAN-0"),
            ("sArea", "200"),
            ("sPlatId", "1"),
            ("realArea", "2"),
            ("realPlatId", "2"),
            ("useMfMini", "0"),
            ("sPassword", password),
            ("sCode", answer),
        ];

        let response = self
            .http
            .post(&self.endpoints.redeem_url)
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "zh-CN,zh;q=0.9")
            .header("origin", "https://rocom.qq.com")
            .header("referer", "https://rocom.qq.com/")
            .header("sec-ch-ua", &self.fingerprint.sec_ch_ua)
            .header("sec-ch-ua-mobile", &self.fingerprint.sec_ch_ua_mobile)
            .header("sec-ch-ua-platform", &self.fingerprint.sec_ch_ua_platform)
            .header("user-agent", &self.fingerprint.user_agent)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let raw: serde_json::Value = response.json().await?;
        let code = raw.get("ret").and_then(|v| v.as_i64()).unwrap_or(-1);
        let message = raw
            .get("sMsg")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown response")
            .to_string();

        if code != 0 {
            warn!("submission rejected with code {}: {}", code, message);
        }

        Ok(SubmitResponse { code, message, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_are_absolute() {
        let endpoints = ApiEndpoints::default();
        for url in [
            &endpoints.announcement_list_url,
            &endpoints.announcement_detail_url,
            &endpoints.redeem_url,
            &endpoints.captcha_url,
        ] {
            assert!(url.starts_with("https://"), "not absolute: {}", url);
        }
    }

    #[test]
    fn test_gateway_code_classification() {
        let ok = GatewayEnvelope {
            code: 0,
            msg: String::new(),
            data: serde_json::Value::Null,
        };
        assert!(HttpAnnouncementClient::check_code(&ok).is_ok());

        let expired = GatewayEnvelope {
            code: CODE_SESSION_INVALID,
            msg: "login expired".to_string(),
            data: serde_json::Value::Null,
        };
        assert!(matches!(
            HttpAnnouncementClient::check_code(&expired),
            Err(ClientError::SessionInvalid(_))
        ));

        let other = GatewayEnvelope {
            code: 5,
            msg: "busy".to_string(),
            data: serde_json::Value::Null,
        };
        assert!(matches!(
            HttpAnnouncementClient::check_code(&other),
            Err(ClientError::Api(_))
        ));
    }

    #[test]
    fn test_redeem_client_accepts_cookie_string() {
        let client = HttpRedeemClient::new(
            "uin=o012345; skey=abcdef",
            Duration::from_secs(5),
            None,
            ApiEndpoints::default(),
        );
        assert!(client.is_ok());
    }
}
