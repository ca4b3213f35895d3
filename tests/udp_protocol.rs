use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::net::UdpSocket;

use ticketd::engine::Engine;
use ticketd::limits::{COOKIE_LEN, MAX_DATAGRAM_LEN, RESERVATION_ID_BIAS};
use ticketd::model::CatalogEntry;
use ticketd::server;
use ticketd::wire::{self, Request, Response};

// ── Test infrastructure ──────────────────────────────────────

async fn start_test_server(catalog: Vec<CatalogEntry>, hold_secs: u32) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let mut engine = Engine::new(catalog, hold_secs);
    tokio::spawn(async move {
        let _ = server::serve(&socket, &mut engine, std::future::pending()).await;
    });
    addr
}

async fn client(server: SocketAddr) -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(server).await.unwrap();
    socket
}

async fn send_raw(socket: &UdpSocket, datagram: &[u8]) {
    socket.send(datagram).await.unwrap();
}

/// Wait for a reply with timeout.
async fn recv(socket: &UdpSocket, timeout: Duration) -> Option<Response> {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    let len = tokio::time::timeout(timeout, socket.recv(&mut buf))
        .await
        .ok()?
        .unwrap();
    Some(wire::decode_response(&buf[..len]).unwrap())
}

async fn call(socket: &UdpSocket, request: Request) -> Response {
    let mut buf = BytesMut::new();
    wire::encode_request(&request, &mut buf);
    send_raw(socket, &buf).await;
    recv(socket, Duration::from_secs(2))
        .await
        .expect("server did not answer")
}

fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("Rock concert", 10),
        CatalogEntry::new("Chess simul", 0),
    ]
}

// ── Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn lists_events() {
    let addr = start_test_server(catalog(), 5).await;
    let c = client(addr).await;

    let Response::Events(listings) = call(&c, Request::GetEvents).await else {
        panic!("expected events");
    };
    assert_eq!(listings.len(), 2);
    assert_eq!(&listings[0].description[..], b"Rock concert");
    assert_eq!(listings[0].available, 10);
    assert_eq!(listings[1].event_id, 1);
    assert_eq!(listings[1].available, 0);
}

#[tokio::test]
async fn reserve_and_collect_tickets() {
    let addr = start_test_server(catalog(), 5).await;
    let c = client(addr).await;

    let Response::Reservation {
        reservation_id,
        event_id,
        ticket_count,
        cookie,
        ..
    } = call(
        &c,
        Request::GetReservation {
            event_id: 0,
            ticket_count: 3,
        },
    )
    .await
    else {
        panic!("expected reservation");
    };
    assert_eq!(reservation_id, RESERVATION_ID_BIAS);
    assert_eq!((event_id, ticket_count), (0, 3));

    let Response::Events(listings) = call(&c, Request::GetEvents).await else {
        panic!("expected events");
    };
    assert_eq!(listings[0].available, 7);

    let first = call(
        &c,
        Request::GetTickets {
            reservation_id,
            cookie,
        },
    )
    .await;
    let Response::Tickets { tickets, .. } = &first else {
        panic!("expected tickets");
    };
    assert_eq!(tickets.len(), 3);
    assert!(tickets.iter().all(|t| t.to_string().len() == 7));

    // Redemption is idempotent.
    let second = call(
        &c,
        Request::GetTickets {
            reservation_id,
            cookie,
        },
    )
    .await;
    assert_eq!(first, second);

    assert_eq!(
        call(
            &c,
            Request::GetReservation {
                event_id: 0,
                ticket_count: 20
            }
        )
        .await,
        Response::BadRequest { subject: 0 }
    );
}

#[tokio::test]
async fn bad_requests_name_the_offending_id() {
    let addr = start_test_server(catalog(), 5).await;
    let c = client(addr).await;

    assert_eq!(
        call(
            &c,
            Request::GetReservation {
                event_id: 99,
                ticket_count: 5
            }
        )
        .await,
        Response::BadRequest { subject: 99 }
    );
    assert_eq!(
        call(
            &c,
            Request::GetReservation {
                event_id: 1,
                ticket_count: 1
            }
        )
        .await,
        Response::BadRequest { subject: 1 }
    );
    assert_eq!(
        call(
            &c,
            Request::GetTickets {
                reservation_id: RESERVATION_ID_BIAS,
                cookie: [b'a'; COOKIE_LEN]
            }
        )
        .await,
        Response::BadRequest {
            subject: RESERVATION_ID_BIAS
        }
    );
}

#[tokio::test]
async fn malformed_datagrams_are_ignored() {
    let addr = start_test_server(catalog(), 5).await;
    let c = client(addr).await;

    send_raw(&c, &[1, 0]).await;
    send_raw(&c, &[7]).await;
    send_raw(&c, &[3, 0, 0]).await;
    assert_eq!(recv(&c, Duration::from_millis(300)).await, None);

    // The server is still alive afterwards.
    assert!(matches!(call(&c, Request::GetEvents).await, Response::Events(_)));
}

#[tokio::test]
async fn expired_reservation_is_released() {
    let addr = start_test_server(vec![CatalogEntry::new("gig", 4)], 1).await;
    let c = client(addr).await;

    let Response::Reservation {
        reservation_id,
        cookie,
        ..
    } = call(
        &c,
        Request::GetReservation {
            event_id: 0,
            ticket_count: 4,
        },
    )
    .await
    else {
        panic!("expected reservation");
    };

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    assert_eq!(
        call(
            &c,
            Request::GetTickets {
                reservation_id,
                cookie
            }
        )
        .await,
        Response::BadRequest {
            subject: reservation_id
        }
    );

    // The next reservation reclaims the expired hold first.
    let again = call(
        &c,
        Request::GetReservation {
            event_id: 0,
            ticket_count: 4,
        },
    )
    .await;
    assert!(matches!(again, Response::Reservation { reservation_id: 1_000_001, .. }));
}
