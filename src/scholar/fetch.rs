use std::time::Duration;

use anyhow::Context;
use url::Url;

/// Scholar serves a stripped-down page (or a captcha) to clients that do not look like a
/// browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const TIMEOUT: Duration = Duration::from_secs(30);

/// URL of one page of a profile's papers, most cited first.
pub fn profile_url(host: &str, user: &str, offset: u32, page_size: u32) -> anyhow::Result<Url> {
    let mut url = Url::parse(&format!("https://{host}/citations"))
        .with_context(|| format!("invalid profile host {host:?}"))?;
    url.query_pairs_mut()
        .append_pair("user", user)
        .append_pair("hl", "en")
        .append_pair("cstart", &offset.to_string())
        .append_pair("pagesize", &page_size.to_string())
        .append_pair("sortby", "cited");
    Ok(url)
}

/// Download the page at `url`. Bytes that are not valid UTF-8 become U+FFFD.
pub fn fetch_profile_page(url: &Url) -> anyhow::Result<String> {
    let cfg = ureq::Agent::config_builder()
        .timeout_global(Some(TIMEOUT))
        .build();
    let agent = ureq::Agent::new_with_config(cfg);
    let mut res = agent
        .get(url.as_str())
        .header("User-Agent", USER_AGENT)
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .call()
        .with_context(|| format!("failed request for URL {url}"))?;
    let body = res
        .body_mut()
        .read_to_vec()
        .context("failed to read profile page body")?;
    Ok(decode_page(&body))
}

/// Page bytes as text, with U+FFFD standing in for anything that is not valid UTF-8.
pub fn decode_page(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
