//! Loopback HTTP listener receiving the OAuth authorization redirect.
//!
//! Every connection is served on its own task, so a browser preconnect that
//! never sends a request cannot hold up the real callback.

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use reqwest::Url;
use slides_core::{Error, Result};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;

const CALLBACK_SUCCESS: &str =
    "The authentication flow has completed. You may close this window.";

/// Connections that send no request headers within this window are dropped.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Time given to the confirmation page to reach the browser before shutdown.
const RESPONSE_GRACE: Duration = Duration::from_millis(200);

/// A bound loopback port waiting for one authorization callback.
#[derive(Debug)]
pub struct CallbackListener {
    listener: std::net::TcpListener,
    timeout: Duration,
}

impl CallbackListener {
    /// Bind an ephemeral port on 127.0.0.1.
    ///
    /// `timeout` bounds the whole wait for the user to finish consenting.
    pub fn bind(timeout: Duration) -> Result<Self> {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener, timeout })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The redirect URI to register in the authorization request.
    pub fn redirect_uri(&self) -> Result<String> {
        Ok(format!("http://127.0.0.1:{}/", self.local_addr()?.port()))
    }

    /// Serve requests until one carries the authorization result.
    ///
    /// Requests without a `code` or `error` (such as `/favicon.ico`) get a 404
    /// and the wait continues.
    pub fn wait_for_code(self, expected_state: &str) -> Result<String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        runtime.block_on(serve(self.listener, expected_state.to_string(), self.timeout))
    }
}

async fn serve(
    listener: std::net::TcpListener,
    expected_state: String,
    timeout: Duration,
) -> Result<String> {
    let listener = tokio::net::TcpListener::from_std(listener)?;
    log::debug!("Waiting for authorization callback on {}", listener.local_addr()?);

    let (tx, mut rx) = mpsc::unbounded_channel::<Result<String>>();
    let mut deadline = std::pin::pin!(tokio::time::sleep(timeout));

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log::warn!("Loopback accept failed: {}", e);
                        continue;
                    }
                };
                log::debug!("Loopback connection from {}", peer);

                let tx = tx.clone();
                let expected_state = expected_state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let response = handle(&req, &expected_state, &tx);
                        async move { Ok::<_, Infallible>(response) }
                    });

                    let conn = http1::Builder::new()
                        .timer(TokioTimer::new())
                        .header_read_timeout(HEADER_READ_TIMEOUT)
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                    if let Err(e) = conn {
                        log::debug!("Loopback connection closed: {}", e);
                    }
                });
            }
            Some(result) = rx.recv() => {
                tokio::time::sleep(RESPONSE_GRACE).await;
                return result;
            }
            _ = &mut deadline => {
                return Err(Error::Authorization(format!(
                    "No authorization callback received within {} seconds",
                    timeout.as_secs()
                )));
            }
        }
    }
}

/// Answer one request, forwarding any authorization outcome to the waiter.
fn handle(
    req: &Request<Incoming>,
    expected_state: &str,
    tx: &mpsc::UnboundedSender<Result<String>>,
) -> Response<Full<Bytes>> {
    let target = req.uri().path_and_query().map_or("/", |pq| pq.as_str());

    let (status, body) = match parse_callback(target, expected_state) {
        Ok(Some(code)) => {
            let _ = tx.send(Ok(code));
            (StatusCode::OK, CALLBACK_SUCCESS.to_string())
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Not found".to_string()),
        Err(e) => {
            let body = e.to_string();
            let _ = tx.send(Err(e));
            (StatusCode::BAD_REQUEST, body)
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Inspect the request target of a loopback request.
///
/// Returns `Ok(None)` for unrelated requests.
fn parse_callback(target: &str, expected_state: &str) -> Result<Option<String>> {
    let url = Url::parse(&format!("http://127.0.0.1{}", target))
        .map_err(|e| Error::Authorization(format!("Malformed callback request: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(Error::Authorization(format!("Authorization denied: {}", error)));
    }
    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(Error::Authorization(
            "State mismatch in authorization callback".into(),
        ));
    }
    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;

    fn get(addr: SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            target, addr
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            parse_callback("/?state=abc&code=4%2F0Ab&scope=x", "abc").unwrap(),
            Some("4/0Ab".to_string())
        );
        assert_eq!(parse_callback("/favicon.ico", "abc").unwrap(), None);
        assert!(parse_callback("/?state=evil&code=c", "abc").is_err());
        assert!(parse_callback("/?error=access_denied&state=abc", "abc").is_err());
    }

    #[test]
    fn test_silent_connection_does_not_block_callback() {
        let listener = CallbackListener::bind(Duration::from_secs(10)).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let silent = TcpStream::connect(addr).unwrap();
            let favicon = get(addr, "/favicon.ico");
            let callback = get(addr, "/?state=abc&code=xyz");
            drop(silent);
            (favicon, callback)
        });

        let code = listener.wait_for_code("abc").unwrap();
        let (favicon, callback) = client.join().unwrap();

        assert_eq!(code, "xyz");
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(callback.starts_with("HTTP/1.1 200"));
        assert!(callback.contains(CALLBACK_SUCCESS));
    }

    #[test]
    fn test_state_mismatch_fails_flow() {
        let listener = CallbackListener::bind(Duration::from_secs(10)).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || get(addr, "/?state=forged&code=xyz"));

        let err = listener.wait_for_code("abc").unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
        assert!(client.join().unwrap().starts_with("HTTP/1.1 400"));
    }

    #[test]
    fn test_times_out_without_callback() {
        let listener = CallbackListener::bind(Duration::from_millis(100)).unwrap();
        let err = listener.wait_for_code("abc").unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
    }

    #[test]
    fn test_redirect_uri_uses_bound_port() {
        let listener = CallbackListener::bind(Duration::from_secs(1)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(
            listener.redirect_uri().unwrap(),
            format!("http://127.0.0.1:{}/", port)
        );
    }
}
