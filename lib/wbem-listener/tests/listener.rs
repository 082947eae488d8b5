/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use http::{Method, StatusCode};

use wbem_client::{ClientConfig, WbemClient};
use wbem_http::HeaderBag;
use wbem_http::server::HttpServerRequest;
use wbem_listener::{ContentHandler, HandlerError, ListenerConfig, WbemListener, listen};

const ACK: &str = "<CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\"><MESSAGE ID=\"1\" PROTOCOLVERSION=\"1.0\"><SIMPLEEXPRSP><EXPMETHODRESPONSE NAME=\"ExportIndication\"/></SIMPLEEXPRSP></MESSAGE></CIM>";

struct Indications {
    received: AtomicUsize,
    delay: Duration,
}

impl ContentHandler for Indications {
    fn handle(
        &self,
        request: &HttpServerRequest,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        _peer: SocketAddr,
    ) -> Result<(), HandlerError> {
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        if request.header("CIMExport") != Some("MethodRequest") {
            return Err(HandlerError::cim_error(
                StatusCode::BAD_REQUEST,
                "unsupported-operation",
            ));
        }
        if body.contains("boom") {
            return Err(anyhow::anyhow!("failed to process indication").into());
        }
        if body.contains("panic") {
            panic!("handler panic");
        }
        std::thread::sleep(self.delay);
        self.received.fetch_add(1, Ordering::AcqRel);
        writer.write_all(ACK.as_bytes())?;
        Ok(())
    }
}

fn start(config: ListenerConfig, delay: Duration) -> (wbem_listener::ListenerHandle, Arc<Indications>) {
    let handler = Arc::new(Indications {
        received: AtomicUsize::new(0),
        delay,
    });
    let listener = WbemListener::new(config).start(handler.clone()).unwrap();
    (listener, handler)
}

fn local_config() -> ListenerConfig {
    let mut config = ListenerConfig::default();
    config.set_bind("127.0.0.1:0".parse().unwrap());
    config.set_shutdown_grace(Duration::from_millis(500));
    config
}

fn raw_exchange(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(request).unwrap();
    let mut rsp = Vec::new();
    stream.read_to_end(&mut rsp).unwrap();
    String::from_utf8(rsp).unwrap()
}

fn indication(body: &str) -> Vec<u8> {
    format!(
        "M-POST /cimlistener HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/xml; charset=utf-8\r\nCIMExport: MethodRequest\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

#[test]
fn length_framed_response() {
    let (listener, handler) = start(local_config(), Duration::ZERO);
    let rsp = raw_exchange(listener.local_addr(), &indication("<CIM/>"));
    assert!(rsp.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(rsp.contains("Connection: close\r\n"));
    assert!(rsp.contains(&format!("Content-Length: {}\r\n", ACK.len())));
    assert!(rsp.ends_with(ACK));
    assert_eq!(handler.received.load(Ordering::Acquire), 1);
    assert!(listener.shutdown());
}

#[test]
fn chunked_request_and_response() {
    let (listener, handler) = start(local_config(), Duration::ZERO);
    let req = b"POST /cimlistener HTTP/1.1\r\nCIMExport: MethodRequest\r\nTE: trailers\r\nTransfer-Encoding: chunked\r\n\r\n3\r\n<CI\r\n3\r\nM/>\r\n0\r\n\r\n";
    let rsp = raw_exchange(listener.local_addr(), req);
    assert!(rsp.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(rsp.contains("Transfer-Encoding: chunked\r\n"));
    assert!(!rsp.contains("Content-Length"));
    assert!(rsp.ends_with(&format!("{:x}\r\n{ACK}\r\n0\r\n\r\n", ACK.len())));
    assert_eq!(handler.received.load(Ordering::Acquire), 1);
}

#[test]
fn http10_request() {
    let (listener, _) = start(local_config(), Duration::ZERO);
    let req = b"POST /cimlistener HTTP/1.0\r\nCIMExport: MethodRequest\r\nTE: chunked\r\nContent-Length: 0\r\n\r\n";
    let rsp = raw_exchange(listener.local_addr(), req);
    assert!(rsp.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(rsp.contains("Content-Length: "));
}

#[test]
fn handler_failures() {
    let (listener, handler) = start(local_config(), Duration::ZERO);
    let addr = listener.local_addr();

    let req = b"M-POST /cimlistener HTTP/1.1\r\nContent-Length: 6\r\n\r\n<CIM/>";
    let rsp = raw_exchange(addr, req);
    assert!(rsp.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(rsp.contains("CIMError: unsupported-operation\r\n"));

    let rsp = raw_exchange(addr, &indication("boom"));
    assert!(rsp.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
    assert!(rsp.contains("Content-Length: 0\r\n"));

    let rsp = raw_exchange(addr, &indication("panic"));
    assert!(rsp.starts_with("HTTP/1.1 501 Not Implemented\r\n"));

    // the workers survive
    let rsp = raw_exchange(addr, &indication("<CIM/>"));
    assert!(rsp.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(handler.received.load(Ordering::Acquire), 1);
}

#[test]
fn invalid_requests() {
    let mut config = local_config();
    config.set_max_body_size(16);
    let (listener, handler) = start(config, Duration::ZERO);
    let addr = listener.local_addr();

    let rsp = raw_exchange(addr, b"GET /cimlistener HTTP/1.1\r\n\r\n");
    assert!(rsp.starts_with("HTTP/1.1 501 "));

    let rsp = raw_exchange(addr, b"not a request line\r\n\r\n");
    assert!(rsp.starts_with("HTTP/1.1 400 "));

    let rsp = raw_exchange(addr, &indication(&"x".repeat(17)));
    assert!(rsp.starts_with("HTTP/1.1 413 "));

    let req = b"POST /cimlistener HTTP/1.1\r\nCIMExport: MethodRequest\r\nTransfer-Encoding: chunked\r\n\r\n20\r\n0123456789abcdef0123456789abcdef\r\n0\r\n\r\n";
    let rsp = raw_exchange(addr, req);
    assert!(rsp.starts_with("HTTP/1.1 413 "));

    let req = b"POST /cimlistener HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n";
    let rsp = raw_exchange(addr, req);
    assert!(rsp.starts_with("HTTP/1.1 400 "));

    assert_eq!(handler.received.load(Ordering::Acquire), 0);
}

#[test]
fn client_to_listener() {
    let (listener, handler) = start(local_config(), Duration::ZERO);
    let url = format!("http://{}/cimlistener", listener.local_addr());
    let client = WbemClient::new(&url, &ClientConfig::default()).unwrap();

    let mut headers = HeaderBag::new();
    headers.insert("CIMExport", "MethodRequest");
    headers.insert("CIMExportMethod", "ExportIndication");
    for _ in 0..3 {
        let mut rsp = client.submit(&Method::POST, &headers, b"<CIM/>").unwrap();
        assert_eq!(rsp.code, 200);
        assert_eq!(rsp.header("connection"), Some("close"));
        assert_eq!(rsp.body.read_to_vec().unwrap(), ACK.as_bytes());
    }
    assert_eq!(handler.received.load(Ordering::Acquire), 3);
    // every connection is closed by the listener, one is kept unconnected
    assert_eq!(client.pool().idle_count(), 1);
}

#[test]
fn bounded_workers() {
    let mut config = local_config();
    config.set_workers(0, 2);
    let (listener, handler) = start(config, Duration::from_millis(200));
    let addr = listener.local_addr();

    let clients: Vec<_> = (0..6)
        .map(|_| std::thread::spawn(move || raw_exchange(addr, &indication("<CIM/>"))))
        .collect();
    std::thread::sleep(Duration::from_millis(100));
    let stats = listener.stats();
    assert!(stats.workers <= 2);
    assert!(stats.busy <= 2);

    for c in clients {
        assert!(c.join().unwrap().starts_with("HTTP/1.1 200 OK\r\n"));
    }
    assert_eq!(handler.received.load(Ordering::Acquire), 6);
    assert!(listener.stats().workers <= 2);
}

#[test]
fn idle_workers_exit() {
    let mut config = local_config();
    config.set_workers(1, 4);
    config.set_worker_idle_timeout(Duration::from_millis(100));
    let (listener, _) = start(config, Duration::from_millis(100));
    let addr = listener.local_addr();

    let clients: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(move || raw_exchange(addr, &indication("<CIM/>"))))
        .collect();
    for c in clients {
        c.join().unwrap();
    }
    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(listener.stats().workers, 1);
}

#[test]
fn shutdown_closes_in_flight() {
    let mut config = local_config();
    config.set_shutdown_grace(Duration::from_millis(100));
    let (listener, handler) = start(config, Duration::from_secs(2));
    let addr = listener.local_addr();

    let client = std::thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(&indication("<CIM/>")).unwrap();
        let mut rsp = Vec::new();
        let _ = stream.read_to_end(&mut rsp);
        rsp
    });
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(listener.stats().busy, 1);
    assert!(!listener.shutdown());
    // the handler finished after its socket was closed
    let rsp = client.join().unwrap();
    assert!(rsp.is_empty());
    assert_eq!(handler.received.load(Ordering::Acquire), 0);
    assert!(TcpStream::connect_timeout(&addr, Duration::from_millis(200)).is_err());
}

#[test]
fn listen_on_any() {
    let handler: Arc<dyn ContentHandler> = Arc::new(
        |_: &HttpServerRequest,
         _: &mut dyn Read,
         w: &mut dyn Write,
         _: SocketAddr|
         -> Result<(), HandlerError> {
            w.write_all(b"<CIM/>")?;
            Ok(())
        },
    );
    let listener = listen(0, handler).unwrap();
    let port = listener.local_addr().port();
    assert_ne!(port, 0);
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let rsp = raw_exchange(addr, &indication(""));
    assert!(rsp.ends_with("<CIM/>"));
    assert!(listener.shutdown());
}
