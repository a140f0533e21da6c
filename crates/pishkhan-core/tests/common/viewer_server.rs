//! Minimal HTTP/1.1 server standing in for the viewer site in integration
//! tests.
//!
//! Routes on the request path: `/viewer.php` answers according to the
//! configured edition behavior, `/editions/...` serves a small PDF body.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// How the viewer endpoint answers a resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    /// 302 to the edition file, which serves 200 with a PDF body.
    Published,
    /// 200 with a plain page and no redirect.
    Missing,
    /// 200 with a page whose script navigates to the edition file.
    Scripted,
    /// 503 from the viewer endpoint.
    Unavailable,
}

pub const PDF_BODY: &[u8] = b"%PDF-1.4 test edition body";

/// Starts the server in a background thread and returns the viewer base URL
/// (e.g. "http://127.0.0.1:12345/viewer.php"). The server runs until the
/// process exits.
pub fn start(edition: Edition) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream, edition));
        }
    });
    format!("http://127.0.0.1:{}/viewer.php", port)
}

fn handle(mut stream: TcpStream, edition: Edition) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    if path.starts_with("/editions/") {
        respond(&mut stream, "200 OK", "application/pdf", PDF_BODY, &[]);
        return;
    }
    if path.starts_with("/viewer.php") {
        match edition {
            Edition::Published => respond(
                &mut stream,
                "302 Found",
                "text/html",
                b"",
                &["Location: /editions/today.pdf"],
            ),
            Edition::Missing => respond(
                &mut stream,
                "200 OK",
                "text/html",
                b"<html><body>No edition was published on this date.</body></html>",
                &[],
            ),
            Edition::Scripted => respond(
                &mut stream,
                "200 OK",
                "text/html",
                b"<html><script>location.href = '/editions/today.pdf';</script></html>",
                &[],
            ),
            Edition::Unavailable => respond(
                &mut stream,
                "503 Service Unavailable",
                "text/html",
                b"temporarily down",
                &[],
            ),
        }
        return;
    }
    respond(&mut stream, "404 Not Found", "text/html", b"not found", &[]);
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8], extra: &[&str]) {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        content_type,
        body.len()
    );
    for header in extra {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
