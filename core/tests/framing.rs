//! Response framing and shutdown behavior against hand-written peers.
//!
//! Each peer is a plain `std::net::TcpListener` that reads one request head,
//! writes canned bytes and hangs up, so the exact wire form is under test
//! control.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc;
use std::thread;

use oneget_core::{Client, ClientConfig, Error, HttpRequest, PlainTransport, Transport};

/// Serve `reply` to one connection and report the request head it received.
fn one_shot_peer(reply: &'static [u8]) -> (SocketAddr, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 512];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        sock.write_all(reply).unwrap();
        drop(sock);
        let _ = tx.send(head);
    });

    (addr, rx)
}

fn client() -> Client {
    Client::with_config(ClientConfig {
        echo_response: false,
        ..ClientConfig::default()
    })
    .unwrap()
}

#[test]
fn request_wire_format() {
    let (addr, heads) = one_shot_peer(b"HTTP/1.1 204 No Content\r\n\r\n");

    let response = client().get(&format!("http://{addr}/a/b?c=d")).unwrap();
    assert_eq!(response.status, 204);

    let head = heads.recv().unwrap();
    let expected = format!(
        "GET /a/b?c=d HTTP/1.1\r\nHost: {addr}\r\nUser-Agent: Richard-Agent\r\n\r\n"
    );
    assert_eq!(String::from_utf8(head).unwrap(), expected);
}

#[test]
fn chunked_response() {
    let (addr, _) = one_shot_peer(
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
          4\r\nWiki\r\n5\r\npedia\r\nE\r\n in\r\n\r\nchunks.\r\n0\r\n\r\n",
    );

    let response = client().get(&format!("http://{addr}/")).unwrap();

    assert_eq!(response.body_text(), "Wikipedia in\r\n\r\nchunks.");
}

#[test]
fn close_delimited_response() {
    let (addr, _) = one_shot_peer(b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nuntil the end");

    let response = client().get(&format!("http://{addr}/")).unwrap();

    assert_eq!(response.version, 0);
    assert_eq!(response.body, b"until the end");
}

#[test]
fn garbage_reply_is_malformed() {
    let (addr, _) = one_shot_peer(b"this is not http\r\n\r\n");

    let err = client().get(&format!("http://{addr}/")).unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)), "unexpected error: {err}");
}

#[test]
fn hang_up_without_reply_is_malformed() {
    let (addr, _) = one_shot_peer(b"");

    let err = client().get(&format!("http://{addr}/")).unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)), "unexpected error: {err}");
}

#[test]
fn close_after_peer_disconnect_is_tolerated() {
    let (addr, heads) = one_shot_peer(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");

    let mut transport = PlainTransport::new();
    transport.connect("127.0.0.1", &[addr]).unwrap();
    transport
        .write(&HttpRequest::get("/").header("Host", addr.to_string()))
        .unwrap();
    let response = transport.read().unwrap();
    assert_eq!(response.body, b"ok");

    // The peer has hung up by the time its head is reported.
    heads.recv().unwrap();

    transport.close().unwrap();
    transport.close().unwrap();
    assert!(!transport.is_connected());
    assert!(matches!(transport.read(), Err(Error::NotConnected)));
}

#[test]
fn dropping_a_connected_transport_releases_the_socket() {
    let (addr, heads) = one_shot_peer(b"");

    let mut transport = PlainTransport::new();
    transport.connect("127.0.0.1", &[addr]).unwrap();
    transport
        .write(&HttpRequest::get("/").header("Host", addr.to_string()))
        .unwrap();
    drop(transport);

    assert!(heads.recv().unwrap().starts_with(b"GET / HTTP/1.1\r\n"));
}
