//! One-shot HTTP server for exercising status handling without a network.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{Receiver, channel};

/// A request as the server saw it.
pub struct Captured {
  pub request_line: String,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Captured {
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

/// Answer exactly one request with `status` and `body`; returns the base URL.
pub fn serve_once(status: &'static str, body: &'static [u8]) -> (String, Receiver<Captured>) {
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();
  let (tx, rx) = channel();

  std::thread::spawn(move || {
    let (stream, _) = listener.accept().unwrap();
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut headers = Vec::new();
    loop {
      let mut line = String::new();
      reader.read_line(&mut line).unwrap();
      let line = line.trim_end();
      if line.is_empty() {
        break;
      }
      if let Some((k, v)) = line.split_once(':') {
        headers.push((k.trim().to_string(), v.trim().to_string()));
      }
    }
    let len = headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
      .and_then(|(_, v)| v.parse::<usize>().ok())
      .unwrap_or(0);
    let mut request_body = vec![0u8; len];
    reader.read_exact(&mut request_body).unwrap();

    let mut stream = reader.into_inner();
    let head = format!(
      "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
      body.len()
    );
    stream.write_all(head.as_bytes()).unwrap();
    stream.write_all(body).unwrap();
    stream.flush().unwrap();

    let _ = tx.send(Captured {
      request_line: request_line.trim_end().to_string(),
      headers,
      body: request_body,
    });
  });

  (format!("http://{addr}"), rx)
}
