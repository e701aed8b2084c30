use std::time::Duration;

use dx_adapters::HttpAnalysisClient;
use dx_core::AnalysisClient;
use dx_domain::{AnalysisError, ImagePayload, InputValidator, MediaType, ValidatedInput};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Servidor HTTP mínimo de una sola petición: captura el cuerpo JSON recibido
/// y responde con `status` y `body` tras `delay`.
async fn one_shot_server(status: u16, body: String, delay: Duration) -> (String, oneshot::Receiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let (header_end, content_length) = loop {
            let n = sock.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let len = head.lines()
                              .find_map(|l| l.strip_prefix("content-length:"))
                              .map(|v| v.trim().parse::<usize>().unwrap())
                              .unwrap_or(0);
                break (pos + 4, len);
            }
        };
        while buf.len() < header_end + content_length {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let received: Value = serde_json::from_slice(&buf[header_end..header_end + content_length]).unwrap();
        let _ = tx.send(received);
        tokio::time::sleep(delay).await;
        let resp = format!("HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                           body.len());
        let _ = sock.write_all(resp.as_bytes()).await;
        let _ = sock.shutdown().await;
    });
    (format!("http://{addr}"), rx)
}

fn input() -> ValidatedInput {
    let img = ImagePayload::new(vec![0x89u8, 0x50, 0x4e, 0x47, 1, 2, 3], MediaType::Png);
    InputValidator::new().validate(Some(&img), "  cough, fever 3 days ").unwrap()
}

#[tokio::test]
async fn success_sends_v1_envelope_and_decodes_result() {
    let body = json!({
        "version": "v1",
        "confidence": 87,
        "findings": ["Right upper lobe opacity"],
        "narrative": "Opacity detected.",
        "annotated_image_base64": "AQID",
        "annotated_media_type": "image/png"
    });
    let (url, received) = one_shot_server(200, body.to_string(), Duration::ZERO).await;
    let client = HttpAnalysisClient::new(&url).unwrap();

    let result = client.analyze(&input(), Duration::from_secs(5)).await.unwrap();
    assert_eq!(result.confidence(), 87);
    assert_eq!(result.findings(), ["Right upper lobe opacity".to_string()]);
    assert_eq!(result.annotated_image().bytes(), &[1u8, 2, 3]);

    let sent = received.await.unwrap();
    assert_eq!(sent["version"], "v1");
    assert_eq!(sent["media_type"], "image/png");
    assert_eq!(sent["report_text"], "cough, fever 3 days");
    assert_eq!(sent["image_sha256"], input().image().sha256_hex());
}

#[tokio::test]
async fn server_error_is_service_unavailable() {
    let (url, _rx) = one_shot_server(503, "{}".to_string(), Duration::ZERO).await;
    let client = HttpAnalysisClient::new(&url).unwrap();
    let err = client.analyze(&input(), Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ServiceUnavailable(_)), "{err:?}");
}

#[tokio::test]
async fn out_of_range_confidence_is_malformed() {
    let body = json!({"version": "v1", "confidence": 140, "findings": []});
    let (url, _rx) = one_shot_server(200, body.to_string(), Duration::ZERO).await;
    let client = HttpAnalysisClient::new(&url).unwrap();
    let err = client.analyze(&input(), Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn slow_server_times_out() {
    let body = json!({"version": "v1", "confidence": 50, "findings": []});
    let (url, _rx) = one_shot_server(200, body.to_string(), Duration::from_secs(3)).await;
    let client = HttpAnalysisClient::new(&url).unwrap();
    let err = client.analyze(&input(), Duration::from_millis(150)).await.unwrap_err();
    assert_eq!(err, AnalysisError::Timeout { after_ms: 150 });
}

#[tokio::test]
async fn refused_connection_is_service_unavailable() {
    // reservar un puerto y liberarlo para que nadie escuche en él
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = HttpAnalysisClient::new(&format!("http://{addr}")).unwrap();
    let err = client.analyze(&input(), Duration::from_secs(2)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ServiceUnavailable(_)), "{err:?}");
}
