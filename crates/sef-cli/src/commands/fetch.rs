use std::time::Duration;

use sef_core::{Result, SefError};

fn network(e: impl std::fmt::Display) -> SefError {
    SefError::Network(e.to_string())
}

/// Download `url` to `output`. Non-2xx responses are errors; no retry.
pub fn run(url: &str, output: &str, timeout_sec: u64) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_sec))
        .build()
        .map_err(network)?;

    log::info!("fetching {url} (timeout {timeout_sec}s)");
    let response = client.get(url).send().map_err(network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SefError::Network(format!("{url} returned HTTP {status}")));
    }
    let body = response.bytes().map_err(network)?;
    std::fs::write(output, &body).map_err(|e| SefError::io(output, e))?;
    println!("📄 Saved {} bytes from {url} to: {output}", body.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("d.csv");
        // Port 9 on localhost: connection refused without leaving the machine.
        let err = run("http://127.0.0.1:9/data.csv", out.to_str().unwrap(), 2).unwrap_err();
        assert!(matches!(err, SefError::Network(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_malformed_url() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("d.csv");
        assert!(matches!(
            run("not a url", out.to_str().unwrap(), 1),
            Err(SefError::Network(_))
        ));
    }
}
