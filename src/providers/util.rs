use anyhow::{Result, anyhow};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Issues a GET, retrying transport failures and 5xx responses
///
/// # Parameters
/// - `client`: HTTP client to issue the request with
/// - `url`: Target URL
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay`: Pause between attempts
///
/// # Returns
/// The first response that is not a server error (4xx is returned as-is),
/// or the error of the last attempt
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    retries: usize,
    delay: Duration,
) -> Result<Response> {
    let mut attempt = 1;
    loop {
        let err = match client.get(url).send().await {
            Ok(response) if !response.status().is_server_error() => return Ok(response),
            Ok(response) => anyhow!("server returned {}", response.status()),
            Err(e) => anyhow::Error::from(e),
        };

        if attempt > retries {
            return Err(err);
        }
        debug!("Attempt {attempt}/{retries} for {url} failed: {err}. Retrying...");
        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}
