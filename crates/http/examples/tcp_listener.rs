//! Accepts TCP connections on 127.0.0.1:42069 and prints every request.
//!
//! ```text
//! cargo run --example tcp_listener
//! curl -d 'hello world!' http://127.0.0.1:42069/coffee
//! ```

use micro_request::protocol::Request;
use micro_request::request_from_async_reader;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 42069, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:42069").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            match request_from_async_reader(tcp_stream).await {
                Ok(request) => print_request(&request),
                Err(e) => error!(%remote_addr, cause = %e, "failed to parse request"),
            }
        });
    }
}

fn print_request(request: &Request) {
    if let Some(line) = request.request_line() {
        println!("Request line:");
        println!("- Method: {}", line.method());
        println!("- Target: {}", line.target());
        println!("- Version: {}", line.version());
    }

    println!("Headers:");
    for (name, value) in request.headers() {
        println!("- {name}: {value}");
    }

    println!("Body:");
    println!("{}", String::from_utf8_lossy(request.body()));
}
