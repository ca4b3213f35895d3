use std::future::Future;
use std::io;

use bytes::BytesMut;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::limits::{MAX_DATAGRAM_LEN, RECV_BUFFER_LEN};
use crate::model::unix_now;
use crate::transport::Transport;
use crate::wire;

/// Serve requests one datagram at a time until `shutdown` resolves.
///
/// A datagram that has been read is always answered (or dropped) before the
/// shutdown signal is looked at again. Transport errors end the loop.
pub async fn serve<T, F>(transport: &T, engine: &mut Engine, shutdown: F) -> io::Result<()>
where
    T: Transport + ?Sized,
    F: Future<Output = ()>,
{
    let mut buf = vec![0u8; RECV_BUFFER_LEN];
    let mut out = BytesMut::with_capacity(MAX_DATAGRAM_LEN);
    tokio::pin!(shutdown);

    loop {
        let (len, peer) = tokio::select! {
            received = transport.recv_from(&mut buf) => received?,
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping receive loop");
                return Ok(());
            }
        };

        let Some(response) = engine.handle_datagram(&buf[..len], unix_now()) else {
            debug!("ignored {len} bytes from {peer}");
            continue;
        };
        out.clear();
        wire::encode_response(&response, &mut out);
        transport.send_to(&out, peer).await?;
        debug!("sent {} bytes to {peer}", out.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::model::CatalogEntry;

    /// In-memory transport: datagrams come from a channel, replies are recorded.
    struct Scripted {
        inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
        sent: Mutex<Vec<Vec<u8>>>,
        fail_sends: bool,
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            match self.inbound.lock().await.recv().await {
                Some(datagram) => {
                    buf[..datagram.len()].copy_from_slice(&datagram);
                    Ok((datagram.len(), peer()))
                }
                None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
            }
        }

        async fn send_to(&self, datagram: &[u8], _target: SocketAddr) -> io::Result<usize> {
            if self.fail_sends {
                return Err(io::Error::other("send failed"));
            }
            self.sent.lock().unwrap().push(datagram.to_vec());
            Ok(datagram.len())
        }
    }

    fn scripted(datagrams: Vec<Vec<u8>>, fail_sends: bool) -> Scripted {
        let (tx, rx) = mpsc::unbounded_channel();
        for d in datagrams {
            tx.send(d).unwrap();
        }
        drop(tx);
        Scripted {
            inbound: tokio::sync::Mutex::new(rx),
            sent: Mutex::new(Vec::new()),
            fail_sends,
        }
    }

    #[tokio::test]
    async fn replies_in_order_and_skips_malformed() {
        let transport = scripted(vec![vec![1], vec![9, 9], vec![3, 0, 0, 0, 7, 0, 1]], false);
        let mut engine = Engine::new(vec![CatalogEntry::new("gig", 2)], 5);

        // Receive fails once the script runs dry.
        let result = serve(&transport, &mut engine, std::future::pending()).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], vec![2, 0, 0, 0, 0, 0, 2, 3, b'g', b'i', b'g']);
        assert_eq!(sent[1], vec![255, 0, 0, 0, 7]);
    }

    #[tokio::test]
    async fn send_errors_are_fatal() {
        let transport = scripted(vec![vec![1], vec![1]], true);
        let mut engine = Engine::new(Vec::new(), 5);
        let result = serve(&transport, &mut engine, std::future::pending()).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::Other);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let transport = Scripted {
            inbound: tokio::sync::Mutex::new(rx),
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
        };
        let mut engine = Engine::new(Vec::new(), 5);
        serve(&transport, &mut engine, async {}).await.unwrap();
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
