//! Banner grabbing for open TCP ports.
//!
//! Sends a bare line terminator to nudge line-oriented services, then performs
//! a single bounded read of the reply.

use crate::error::BannerError;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Payload sent to elicit a response from services that wait for input.
const TRIGGER: &[u8] = b"\r\n";

/// Grab a banner from an established connection.
///
/// Returns `Ok(None)` when nothing arrives within `read_timeout`, when the
/// peer closes without sending, or when the reply is only whitespace.
pub async fn grab_banner<S>(
    stream: &mut S,
    read_timeout: Duration,
) -> Result<Option<String>, BannerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(read_timeout, stream.write_all(TRIGGER)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(BannerError::Write(e)),
        Err(_) => return Ok(None),
    }

    let mut buffer = [0u8; MAX_BANNER_SIZE];
    match timeout(read_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) => Ok(decode_banner(&buffer[..n])),
        Ok(Err(e)) => Err(BannerError::Read(e)),
        Err(_) => Ok(None),
    }
}

/// Lossily decode raw banner bytes and trim surrounding whitespace.
///
/// Invalid UTF-8 sequences become U+FFFD rather than failing, since plenty of
/// services answer with binary handshakes.
pub fn decode_banner(data: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(data);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_decode_banner() {
        let data = b"SSH-2.0-OpenSSH_8.9\r\n";
        assert_eq!(decode_banner(data).as_deref(), Some("SSH-2.0-OpenSSH_8.9"));
    }

    #[test]
    fn test_decode_binary_data() {
        let data = b"\xffHello\xfe";
        assert_eq!(
            decode_banner(data).as_deref(),
            Some("\u{fffd}Hello\u{fffd}")
        );
    }

    #[test]
    fn test_decode_whitespace_only() {
        assert_eq!(decode_banner(b" \r\n\t"), None);
        assert_eq!(decode_banner(b""), None);
    }

    #[tokio::test]
    async fn test_grab_sends_trigger_and_reads_reply() {
        let (mut client, mut server) = duplex(4096);

        let service = tokio::spawn(async move {
            let mut trigger = [0u8; 2];
            server.read_exact(&mut trigger).await.unwrap();
            server.write_all(b"  220 ready\r\n").await.unwrap();
            trigger
        });

        let banner = grab_banner(&mut client, Duration::from_secs(1)).await.unwrap();
        assert_eq!(banner.as_deref(), Some("220 ready"));
        assert_eq!(&service.await.unwrap(), b"\r\n");
    }

    #[tokio::test]
    async fn test_grab_caps_banner_size() {
        let (mut client, mut server) = duplex(8192);
        server.write_all(&[b'A'; 4000]).await.unwrap();

        let banner = grab_banner(&mut client, Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert!(banner.len() <= MAX_BANNER_SIZE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grab_silent_peer_times_out() {
        let (mut client, _server) = duplex(64);
        let banner = grab_banner(&mut client, Duration::from_millis(200)).await.unwrap();
        assert_eq!(banner, None);
    }
}
