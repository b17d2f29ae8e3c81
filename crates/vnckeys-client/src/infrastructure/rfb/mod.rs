//! RFB (VNC) network session: TCP connect, handshake, key-event delivery.
//!
//! Implements the minimum client side of RFC 6143 needed to reach the normal
//! protocol phase and send `KeyEvent` messages:
//!
//! ```text
//! → TCP connect (bounded by SessionConfig::connect_timeout)
//! ← ProtocolVersion "RFB 003.008\n"      → our version reply
//! ← security types                       → chosen type (None or VNC auth)
//! ← 16-byte challenge (VNC auth only)    → DES response
//! ← SecurityResult
//! → ClientInit (shared flag)
//! ← ServerInit (geometry + desktop name, logged and otherwise ignored)
//! ```
//!
//! Framebuffer updates, pixel formats, and pointer input are deliberately not
//! handled; this client only types.
//!
//! The handshake is written against generic `AsyncRead + AsyncWrite` streams
//! so the whole exchange can be unit-tested with `tokio_test::io` without a
//! server.

mod auth;

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, info};
use vnckeys_core::wire::encode_key_event;

use crate::application::replay_keys::{RfbSession, SessionConnector, SessionError};

/// Security type: no authentication.
const SECURITY_NONE: u8 = 1;
/// Security type: VNC challenge-response authentication.
const SECURITY_VNC_AUTH: u8 = 2;

/// Everything needed to open one RFB session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server hostname or IP address.
    pub host: String,
    /// Server TCP port.  Display `:0` is port 5900.
    pub port: u16,
    /// Password for VNC authentication, if the server requires one.
    pub password: Option<String>,
    /// Request shared access so an existing viewer is not kicked off.
    pub shared: bool,
    /// Upper bound on TCP connect plus handshake.
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5900,
            password: None,
            shared: true,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// The ServerInit fields we keep (the pixel format is read and discarded).
#[derive(Debug)]
struct ServerInit {
    width: u16,
    height: u16,
    name: String,
}

/// An open RFB session over any async byte stream.
#[derive(Debug)]
pub struct RfbConnection<S> {
    stream: S,
}

#[async_trait]
impl<S> RfbSession for RfbConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_key_event(&mut self, keysym: u32, down: bool) -> Result<(), SessionError> {
        let msg = encode_key_event(keysym, down);
        self.stream
            .write_all(&msg)
            .await
            .map_err(SessionError::Dispatch)?;
        self.stream.flush().await.map_err(SessionError::Dispatch)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.stream.shutdown().await.map_err(SessionError::Close)
    }
}

/// Opens real TCP sessions from a [`SessionConfig`].
pub struct RfbConnector {
    config: SessionConfig,
}

impl RfbConnector {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionConnector for RfbConnector {
    type Session = RfbConnection<TcpStream>;

    async fn connect(&self) -> Result<Self::Session, SessionError> {
        let cfg = &self.config;
        let open = async {
            let stream = TcpStream::connect((cfg.host.as_str(), cfg.port))
                .await
                .map_err(|source| SessionError::Connect {
                    host: cfg.host.clone(),
                    port: cfg.port,
                    source,
                })?;
            // Key events are tiny; never let Nagle batch them.
            let _ = stream.set_nodelay(true);
            handshake(stream, cfg).await
        };

        match time::timeout(cfg.connect_timeout, open).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::ConnectTimeout {
                host: cfg.host.clone(),
                port: cfg.port,
                timeout: cfg.connect_timeout,
            }),
        }
    }
}

// ── Handshake ─────────────────────────────────────────────────────────────────

/// Runs the full RFB handshake and returns the established session.
async fn handshake<S>(mut stream: S, cfg: &SessionConfig) -> Result<RfbConnection<S>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut version_buf = [0u8; 12];
    read_exact(&mut stream, &mut version_buf).await?;
    let (major, minor) = parse_protocol_version(&version_buf)?;
    debug!("server protocol version {major}.{minor}");

    let reply = client_version_reply(major, minor);
    write_all(&mut stream, &reply).await?;

    // 3.7 dropped back to the 3.3-style exchange by our version reply, so
    // only two shapes remain: 3.8 (client picks the type) and 3.3 (server
    // dictates it).
    if (major, minor) >= (3, 8) {
        negotiate_security_v38(&mut stream, cfg).await?;
    } else {
        negotiate_security_v33(&mut stream, cfg).await?;
    }

    // ClientInit: one byte, nonzero requests shared access.
    write_all(&mut stream, &[cfg.shared as u8]).await?;

    let server_init = read_server_init(&mut stream).await?;
    info!(
        width = server_init.width,
        height = server_init.height,
        name = %server_init.name,
        "RFB session established"
    );

    Ok(RfbConnection { stream })
}

/// RFB 3.8 security negotiation: server offers a type list, client picks.
async fn negotiate_security_v38<S>(stream: &mut S, cfg: &SessionConfig) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let count = read_u8(stream).await?;
    if count == 0 {
        let reason = read_string(stream).await?;
        return Err(SessionError::Protocol(format!(
            "server refused connection: {reason}"
        )));
    }

    let mut offered = vec![0u8; count as usize];
    read_exact(stream, &mut offered).await?;
    let chosen = choose_security_type(&offered, cfg.password.is_some())?;
    write_all(stream, &[chosen]).await?;

    if chosen == SECURITY_VNC_AUTH {
        vnc_auth_exchange(stream, cfg).await?;
    }

    // 3.8 always sends a SecurityResult, with a reason string on failure.
    let result = read_u32(stream).await?;
    if result != 0 {
        let reason = read_string(stream).await?;
        return Err(SessionError::Auth(reason));
    }
    Ok(())
}

/// RFB 3.3 security negotiation: the server dictates a single type.
async fn negotiate_security_v33<S>(stream: &mut S, cfg: &SessionConfig) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let dictated = read_u32(stream).await?;
    match dictated {
        0 => {
            let reason = read_string(stream).await?;
            Err(SessionError::Protocol(format!(
                "server refused connection: {reason}"
            )))
        }
        // No authentication; 3.3 sends no SecurityResult for this type.
        t if t == SECURITY_NONE as u32 => Ok(()),
        t if t == SECURITY_VNC_AUTH as u32 => {
            if cfg.password.is_none() {
                return Err(SessionError::Auth(
                    "server requires a password (use --password)".to_string(),
                ));
            }
            vnc_auth_exchange(stream, cfg).await?;
            let result = read_u32(stream).await?;
            if result != 0 {
                return Err(SessionError::Auth(
                    "server rejected the password".to_string(),
                ));
            }
            Ok(())
        }
        other => Err(SessionError::Protocol(format!(
            "server dictated unsupported security type {other}"
        ))),
    }
}

/// Reads the 16-byte challenge and writes the DES response.
async fn vnc_auth_exchange<S>(stream: &mut S, cfg: &SessionConfig) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    // choose_security_type / negotiate_security_v33 only select VNC auth when
    // a password is present.
    let password = cfg.password.as_deref().unwrap_or_default();
    let mut challenge = [0u8; 16];
    read_exact(stream, &mut challenge).await?;
    let response = auth::encrypt_challenge(password, &challenge);
    write_all(stream, &response).await
}

async fn read_server_init<S>(stream: &mut S) -> Result<ServerInit, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    // width (2) + height (2) + pixel format (16)
    let mut head = [0u8; 20];
    read_exact(stream, &mut head).await?;
    let width = u16::from_be_bytes([head[0], head[1]]);
    let height = u16::from_be_bytes([head[2], head[3]]);
    let name = read_string(stream).await?;
    Ok(ServerInit {
        width,
        height,
        name,
    })
}

// ── Pure negotiation helpers ──────────────────────────────────────────────────

/// Parses a 12-byte `RFB xxx.yyy\n` version banner.
fn parse_protocol_version(buf: &[u8; 12]) -> Result<(u32, u32), SessionError> {
    let malformed = || {
        SessionError::Protocol(format!(
            "not an RFB server (version banner {:?})",
            String::from_utf8_lossy(buf)
        ))
    };
    if &buf[0..4] != b"RFB " || buf[7] != b'.' || buf[11] != b'\n' {
        return Err(malformed());
    }
    let parse = |bytes: &[u8]| -> Result<u32, SessionError> {
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(malformed)
    };
    Ok((parse(&buf[4..7])?, parse(&buf[8..11])?))
}

/// The version banner we answer with: 3.8 when the server supports it,
/// otherwise the 3.3 baseline every server must accept.
fn client_version_reply(major: u32, minor: u32) -> [u8; 12] {
    if (major, minor) >= (3, 8) {
        *b"RFB 003.008\n"
    } else {
        *b"RFB 003.003\n"
    }
}

/// Picks a security type from the server's offer.
///
/// VNC auth is preferred when a password was supplied, otherwise None.  A
/// server that only offers VNC auth while we have no password is an
/// authentication error, not a protocol error.
fn choose_security_type(offered: &[u8], has_password: bool) -> Result<u8, SessionError> {
    if has_password && offered.contains(&SECURITY_VNC_AUTH) {
        return Ok(SECURITY_VNC_AUTH);
    }
    if offered.contains(&SECURITY_NONE) {
        return Ok(SECURITY_NONE);
    }
    if offered.contains(&SECURITY_VNC_AUTH) {
        return Err(SessionError::Auth(
            "server requires a password (use --password)".to_string(),
        ));
    }
    Err(SessionError::Protocol(format!(
        "no supported security type offered (server offered {offered:?})"
    )))
}

// ── Small framed-read helpers ─────────────────────────────────────────────────

async fn read_exact<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut [u8]) -> Result<(), SessionError> {
    stream
        .read_exact(buf)
        .await
        .map(|_| ())
        .map_err(SessionError::Handshake)
}

async fn write_all<S: AsyncWrite + Unpin>(stream: &mut S, buf: &[u8]) -> Result<(), SessionError> {
    stream
        .write_all(buf)
        .await
        .map_err(SessionError::Handshake)
}

async fn read_u8<S: AsyncRead + Unpin>(stream: &mut S) -> Result<u8, SessionError> {
    let mut b = [0u8; 1];
    read_exact(stream, &mut b).await?;
    Ok(b[0])
}

async fn read_u32<S: AsyncRead + Unpin>(stream: &mut S) -> Result<u32, SessionError> {
    let mut b = [0u8; 4];
    read_exact(stream, &mut b).await?;
    Ok(u32::from_be_bytes(b))
}

/// Reads an RFB string: u32 length followed by that many bytes.
async fn read_string<S: AsyncRead + Unpin>(stream: &mut S) -> Result<String, SessionError> {
    let len = read_u32(stream).await? as usize;
    let mut bytes = vec![0u8; len];
    read_exact(stream, &mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::replay_keys::RfbSession;
    use tokio_test::io::Builder;

    #[test]
    fn test_parse_protocol_version_accepts_known_banners() {
        assert_eq!(parse_protocol_version(b"RFB 003.008\n").unwrap(), (3, 8));
        assert_eq!(parse_protocol_version(b"RFB 003.003\n").unwrap(), (3, 3));
        assert_eq!(parse_protocol_version(b"RFB 003.007\n").unwrap(), (3, 7));
    }

    #[test]
    fn test_parse_protocol_version_rejects_garbage() {
        assert!(matches!(
            parse_protocol_version(b"HTTP/1.1 200"),
            Err(SessionError::Protocol(_))
        ));
    }

    #[test]
    fn test_client_version_reply_caps_at_38_and_floors_at_33() {
        assert_eq!(&client_version_reply(3, 8), b"RFB 003.008\n");
        assert_eq!(&client_version_reply(4, 0), b"RFB 003.008\n");
        assert_eq!(&client_version_reply(3, 7), b"RFB 003.003\n");
        assert_eq!(&client_version_reply(3, 3), b"RFB 003.003\n");
    }

    #[test]
    fn test_choose_security_prefers_vnc_auth_with_password() {
        assert_eq!(choose_security_type(&[1, 2], true).unwrap(), 2);
        assert_eq!(choose_security_type(&[1, 2], false).unwrap(), 1);
        assert_eq!(choose_security_type(&[1], true).unwrap(), 1);
    }

    #[test]
    fn test_choose_security_without_password_is_an_auth_error() {
        assert!(matches!(
            choose_security_type(&[2], false),
            Err(SessionError::Auth(_))
        ));
        assert!(matches!(
            choose_security_type(&[16, 19], false),
            Err(SessionError::Protocol(_))
        ));
    }

    /// ServerInit for an 800x600 desktop named "test".
    fn server_init_bytes() -> Vec<u8> {
        let mut bytes = vec![0x03, 0x20, 0x02, 0x58];
        bytes.extend_from_slice(&[0u8; 16]); // pixel format, ignored
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(b"test");
        bytes
    }

    #[tokio::test]
    async fn test_handshake_v38_security_none() {
        // Arrange: script the exact byte exchange of a password-less 3.8
        // handshake.  Builder asserts every written byte.
        let stream = Builder::new()
            .read(b"RFB 003.008\n")
            .write(b"RFB 003.008\n")
            .read(&[1, SECURITY_NONE])
            .write(&[SECURITY_NONE])
            .read(&0u32.to_be_bytes()) // SecurityResult: OK
            .write(&[1]) // ClientInit: shared
            .read(&server_init_bytes())
            .build();

        let cfg = SessionConfig::default();
        handshake(stream, &cfg).await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_v38_vnc_auth_success() {
        let challenge = [0x5Au8; 16];
        let response = auth::encrypt_challenge("sesame", &challenge);

        let stream = Builder::new()
            .read(b"RFB 003.008\n")
            .write(b"RFB 003.008\n")
            .read(&[2, SECURITY_NONE, SECURITY_VNC_AUTH])
            .write(&[SECURITY_VNC_AUTH])
            .read(&challenge)
            .write(&response)
            .read(&0u32.to_be_bytes())
            .write(&[1])
            .read(&server_init_bytes())
            .build();

        let cfg = SessionConfig {
            password: Some("sesame".to_string()),
            ..SessionConfig::default()
        };
        handshake(stream, &cfg).await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_v38_rejected_password_surfaces_reason() {
        let challenge = [0u8; 16];
        let response = auth::encrypt_challenge("wrong", &challenge);

        let mut failure = 1u32.to_be_bytes().to_vec();
        failure.extend_from_slice(&11u32.to_be_bytes());
        failure.extend_from_slice(b"bad persist"); // 11 bytes of reason

        let stream = Builder::new()
            .read(b"RFB 003.008\n")
            .write(b"RFB 003.008\n")
            .read(&[1, SECURITY_VNC_AUTH])
            .write(&[SECURITY_VNC_AUTH])
            .read(&challenge)
            .write(&response)
            .read(&failure)
            .build();

        let cfg = SessionConfig {
            password: Some("wrong".to_string()),
            ..SessionConfig::default()
        };
        let err = handshake(stream, &cfg).await.unwrap_err();
        assert!(matches!(err, SessionError::Auth(reason) if reason == "bad persist"));
    }

    #[tokio::test]
    async fn test_handshake_v33_server_dictates_none() {
        // A 3.3 server dictates the security type and sends no
        // SecurityResult for None.
        let stream = Builder::new()
            .read(b"RFB 003.003\n")
            .write(b"RFB 003.003\n")
            .read(&(SECURITY_NONE as u32).to_be_bytes())
            .write(&[1])
            .read(&server_init_bytes())
            .build();

        let cfg = SessionConfig::default();
        handshake(stream, &cfg).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_key_event_writes_wire_bytes() {
        let stream = Builder::new()
            .write(&[4, 1, 0, 0, 0x00, 0x00, 0xFF, 0x0D])
            .write(&[4, 0, 0, 0, 0x00, 0x00, 0xFF, 0x0D])
            .build();

        let mut conn = RfbConnection { stream };
        conn.send_key_event(0xFF0D, true).await.unwrap();
        conn.send_key_event(0xFF0D, false).await.unwrap();
    }
}
