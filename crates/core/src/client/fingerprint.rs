//! Randomized browser fingerprint for web-side requests.
//!
//! Each account's client gets its own fingerprint at construction and keeps
//! it for the whole run, so the captcha fetch and the submission present the
//! same browser identity.

/// A coherent set of browser identification headers.
#[derive(Debug, Clone)]
pub struct DeviceFingerprint {
    pub user_agent: String,
    pub sec_ch_ua: String,
    pub sec_ch_ua_mobile: String,
    pub sec_ch_ua_platform: String,
}

impl DeviceFingerprint {
    /// Generate a random desktop-weighted Chrome fingerprint.
    pub fn random() -> Self {
        let chrome_major = fastrand::u32(120..=141);
        let chrome_version = format!(
            "{}.{}.{}.{}",
            chrome_major,
            fastrand::u32(0..=9),
            fastrand::u32(5000..=6000),
            fastrand::u32(0..=200),
        );

        // Platform split roughly 70/20/10 Windows/macOS/Linux.
        let roll = fastrand::u32(0..100);
        let (platform_str, sec_ch_ua_platform) = if roll < 70 {
            let os_version = if fastrand::bool() { "10.0" } else { "11.0" };
            (
                format!("Windows NT {}; Win64; x64", os_version),
                "\"Windows\"".to_string(),
            )
        } else if roll < 90 {
            let mac_version = ["10_15_7", "11_0_0", "12_0_0", "13_0_0"]
                [fastrand::usize(0..4)];
            (
                format!("Macintosh; Intel Mac OS X {}", mac_version),
                "\"macOS\"".to_string(),
            )
        } else {
            ("X11; Linux x86_64".to_string(), "\"Linux\"".to_string())
        };

        let user_agent = format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            platform_str, chrome_version
        );

        let sec_ch_ua = format!(
            "\"Google Chrome\";v=\"{major}\", \"Not?A_Brand\";v=\"{brand}\", \"Chromium\";v=\"{major}\"",
            major = chrome_major,
            brand = fastrand::u32(8..=99),
        );

        // 1% mobile, matching observed traffic.
        let sec_ch_ua_mobile = if fastrand::u32(0..100) == 0 { "?1" } else { "?0" };

        Self {
            user_agent,
            sec_ch_ua,
            sec_ch_ua_mobile: sec_ch_ua_mobile.to_string(),
            sec_ch_ua_platform,
        }
    }
}
