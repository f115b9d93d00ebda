//! Minimal JSON-RPC node stub for integration tests.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// How the stub answers every request
#[derive(Clone, Copy)]
pub enum Reply {
    /// `{"result": "0x<height>"}`
    Height(u64),
    /// `{"result": null}`
    NoHeight,
    /// HTTP 503 with an empty body
    Unavailable,
}

pub struct StubNode {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl StubNode {
    /// Start serving on an ephemeral local port
    pub fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub node");
        let url = format!("http://{}/", listener.local_addr().expect("local addr"));
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = serve(stream, reply);
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn serve(mut stream: TcpStream, reply: Reply) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let (status, payload) = match reply {
        Reply::Height(height) => (
            "200 OK",
            format!(r#"{{"jsonrpc":"2.0","id":1,"result":"0x{:x}"}}"#, height),
        ),
        Reply::NoHeight => ("200 OK", r#"{"jsonrpc":"2.0","id":1,"result":null}"#.to_string()),
        Reply::Unavailable => ("503 Service Unavailable", String::new()),
    };

    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    )?;
    stream.flush()
}
