/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#![allow(dead_code)]

use std::io::{BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wbem_http::server::HttpServerRequest;
use wbem_http::{HeaderBag, HttpBodyReader};

pub struct Recorded {
    pub conn: usize,
    pub method: String,
    pub uri: String,
    pub headers: HeaderBag,
    pub body: Vec<u8>,
}

pub struct Ctx<'a> {
    /// Index of the accepted connection
    pub conn: usize,
    /// Index of the request on this connection
    pub nth: usize,
    /// Index of the request on the server
    pub total: usize,
    pub req: &'a HttpServerRequest,
    pub body: &'a [u8],
}

pub enum Reply {
    Send(Vec<u8>),
    SendAndClose(Vec<u8>),
    Close,
    /// Read the request and never answer
    Hang,
}

type Handler = dyn Fn(&Ctx<'_>) -> Reply + Send + Sync;

pub struct TestServer {
    pub port: u16,
    stop: Arc<AtomicBool>,
    accepted: Arc<AtomicUsize>,
    records: Arc<Mutex<Vec<Recorded>>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Ctx<'_>) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();

        let stop = Arc::new(AtomicBool::new(false));
        let accepted = Arc::new(AtomicUsize::new(0));
        let records = Arc::new(Mutex::new(Vec::new()));
        let total = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        let handle = {
            let stop = stop.clone();
            let accepted = accepted.clone();
            let records = records.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            stream.set_nonblocking(false).unwrap();
                            let conn = accepted.fetch_add(1, Ordering::AcqRel);
                            let handler = handler.clone();
                            let records = records.clone();
                            let total = total.clone();
                            thread::spawn(move || {
                                serve_conn(conn, stream, handler, records, total)
                            });
                        }
                        Err(_) => thread::sleep(Duration::from_millis(5)),
                    }
                }
            })
        };

        TestServer {
            port,
            stop,
            accepted,
            records,
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/cimom", self.port)
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Acquire)
    }

    pub fn take_records(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve_conn(
    conn: usize,
    stream: TcpStream,
    handler: Arc<Handler>,
    records: Arc<Mutex<Vec<Recorded>>>,
    total: Arc<AtomicUsize>,
) {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    let mut nth = 0;
    loop {
        let Ok(req) = HttpServerRequest::parse(&mut reader, 65536) else {
            return;
        };
        let mut body = Vec::new();
        {
            let mut body_reader = HttpBodyReader::new(&mut reader, req.body_type(), 65536);
            if body_reader.read_to_end(&mut body).is_err() {
                return;
            }
        }
        let ctx = Ctx {
            conn,
            nth,
            total: total.fetch_add(1, Ordering::AcqRel),
            req: &req,
            body: &body,
        };
        let reply = handler(&ctx);
        records.lock().unwrap().push(Recorded {
            conn,
            method: req.method.to_string(),
            uri: req.uri.clone(),
            headers: req.headers.clone(),
            body: body.clone(),
        });
        nth += 1;

        match reply {
            Reply::Send(data) => {
                if writer.write_all(&data).is_err() {
                    return;
                }
            }
            Reply::SendAndClose(data) => {
                let _ = writer.write_all(&data);
                return;
            }
            Reply::Close => return,
            Reply::Hang => {
                thread::sleep(Duration::from_secs(2));
                return;
            }
        }
    }
}

pub fn ok_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/xml; charset=utf-8\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

pub fn unauthorized(challenge_header: &str, challenge: &str) -> Vec<u8> {
    format!("HTTP/1.1 401 Unauthorized\r\n{challenge_header}: {challenge}\r\nContent-Length: 0\r\n\r\n")
        .into_bytes()
}
