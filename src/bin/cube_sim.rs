//! Simulation of a three-cube network over UDP loopback sockets: node A
//! sends a text message every couple of seconds, node B only forwards,
//! node C listens and prints. Run one role per terminal:
//!
//! ```text
//! cube_sim rx
//! cube_sim relay
//! cube_sim tx
//! ```

use std::env;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::process::exit;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use cubenet::addr::{AddressBook, AddressBookBuilder, RouteTable, RouteTableBuilder};
use cubenet::clock::SystemClock;
use cubenet::layer::network::NetworkBuilder;
use cubenet::layer::transport::TransportBuilder;
use cubenet::protocol::packet_hdr::MAX_PACKET_PAYLOAD_LEN;
use cubenet::trx::{ReceiveError, Timeout, TransmitError, Transceiver, TRX_PAYLOAD_LENGTH};

const UDP_PORT_BASE: u16 = 47000;
const DELAY_BETWEEN_MSG_MS: u64 = 2000;
const LISTEN_TIMEOUT_MS: u16 = 30_000;

// A reaches C only through B, and the other way around.
const NET_A: u8 = 0x0A;
const NET_B: u8 = 0x0B;
const NET_C: u8 = 0x0C;
const PORT_SENDER: u8 = 0x3C;
const PORT_RECEIVER: u8 = 0x0A;
const MESSAGE: &[u8] = b"Hello, cube!\r\n\0";

fn dl_addr_of(net_addr: u8) -> u32 {
    0xA000_0000 | u32::from(net_addr)
}

fn udp_port_of(dl_addr: u32) -> u16 {
    UDP_PORT_BASE + (dl_addr & 0xFF) as u16
}

fn book() -> AddressBook {
    AddressBookBuilder {
        links: vec![
            (NET_A, dl_addr_of(NET_A)),
            (NET_B, dl_addr_of(NET_B)),
            (NET_C, dl_addr_of(NET_C)),
        ],
        ports: vec![(PORT_SENDER, NET_A), (PORT_RECEIVER, NET_C)],
    }
    .build()
    .unwrap()
}

fn routes_for(my_addr: u8) -> RouteTable {
    let hops = match my_addr {
        NET_B => vec![(NET_A, NET_A), (NET_C, NET_C)],
        _ => vec![(NET_A, NET_B), (NET_B, NET_B), (NET_C, NET_B)],
    };
    RouteTableBuilder { hops }.build().unwrap()
}

/// The radio, stood in for by a loopback UDP socket per node. Data-link
/// addresses map onto UDP ports.
struct UdpTrx {
    socket: UdpSocket,
}

impl UdpTrx {
    fn bind(dl_addr: u32) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(("127.0.0.1", udp_port_of(dl_addr)))?;
        Ok(UdpTrx { socket })
    }
}

impl Transceiver for UdpTrx {
    fn transmit(
        &mut self,
        addr: u32,
        payload: &[u8; TRX_PAYLOAD_LENGTH],
    ) -> Result<(), TransmitError> {
        self.socket
            .send_to(payload, ("127.0.0.1", udp_port_of(addr)))
            .map_err(|_e| TransmitError::Device)?;
        Ok(())
    }

    fn receive(
        &mut self,
        out: &mut [u8; TRX_PAYLOAD_LENGTH],
        timeout: Timeout,
    ) -> Result<(), ReceiveError> {
        let timeout = match timeout {
            Timeout::Millis(ms) => Some(Duration::from_millis(u64::from(ms).max(1))),
            Timeout::Indefinite => None,
        };
        self.socket
            .set_read_timeout(timeout)
            .map_err(|_e| ReceiveError::Device)?;
        match self.socket.recv(out) {
            Ok(n) if n == TRX_PAYLOAD_LENGTH => Ok(()),
            Ok(_) => Err(ReceiveError::Device),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Err(ReceiveError::Timeout)
            }
            Err(_) => Err(ReceiveError::Device),
        }
    }
}

fn run_sender() -> std::io::Result<()> {
    let trx = UdpTrx::bind(dl_addr_of(NET_A))?;
    let mut transport = TransportBuilder {
        trx,
        clock: SystemClock,
        my_port: PORT_SENDER,
        my_net_addr: NET_A,
        routes: routes_for(NET_A),
        book: book(),
    }
    .build();

    loop {
        info!(
            "sending {} bytes to port {:#04x}",
            MESSAGE.len(),
            PORT_RECEIVER
        );
        match transport.tx(MESSAGE, PORT_RECEIVER) {
            Ok(()) => info!("message delivered"),
            Err(e) => warn!("send failed: {:?}", e),
        }
        thread::sleep(Duration::from_millis(DELAY_BETWEEN_MSG_MS));
    }
}

fn run_relay() -> std::io::Result<()> {
    let trx = UdpTrx::bind(dl_addr_of(NET_B))?;
    let mut net = NetworkBuilder {
        trx,
        my_addr: NET_B,
        routes: routes_for(NET_B),
        book: book(),
    }
    .build();

    info!("relay up");
    let mut scrap = [0u8; MAX_PACKET_PAYLOAD_LEN];
    loop {
        // forwarding happens inside the receive; nothing is ever addressed
        // to the relay itself
        let _ = net.rx(&mut scrap, Timeout::Indefinite);
    }
}

fn run_receiver() -> std::io::Result<()> {
    let trx = UdpTrx::bind(dl_addr_of(NET_C))?;
    let mut transport = TransportBuilder {
        trx,
        clock: SystemClock,
        my_port: PORT_RECEIVER,
        my_net_addr: NET_C,
        routes: routes_for(NET_C),
        book: book(),
    }
    .build();

    let mut buf = [0u8; 256];
    loop {
        match transport.rx(&mut buf, Timeout::Millis(LISTEN_TIMEOUT_MS)) {
            Ok(msg) => {
                let len = usize::from(msg.message_len).min(buf.len());
                info!(
                    "{} bytes from port {:#04x}: {}",
                    msg.message_len,
                    msg.source_port,
                    String::from_utf8_lossy(&buf[..len])
                );
            }
            Err(e) => warn!("receive failed: {:?}", e),
        }
    }
}

fn main() {
    env_logger::init();

    let role = env::args().nth(1).unwrap_or_default();
    let result = match role.as_str() {
        "tx" => run_sender(),
        "relay" => run_relay(),
        "rx" => run_receiver(),
        _ => {
            eprintln!("usage: cube_sim <tx|relay|rx>");
            exit(2);
        }
    };
    if let Err(e) = result {
        eprintln!("cube_sim {}: {}", role, e);
        exit(1);
    }
}
