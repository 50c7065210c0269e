//! Point-to-point duplex channel between the coordinator and one worker.
//!
//! Each side owns one [`Endpoint`]; messages are opaque byte buffers encoded
//! by the [`protocol`](crate::protocol) module.
use eyre::Result;
use std::sync::mpsc;

/// One side of a duplex channel.
pub struct Endpoint {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

/// Create a connected pair of endpoints.
pub fn duplex() -> (Endpoint, Endpoint) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        Endpoint { tx: a_tx, rx: a_rx },
        Endpoint { tx: b_tx, rx: b_rx },
    )
}

impl Endpoint {
    /// Send a message to the other side.
    pub fn send(&self, data: Vec<u8>) -> Result<()> {
        tracing::trace!(len = data.len(), "channel send");
        self.tx
            .send(data)
            .map_err(|err| eyre::eyre!("Send Error: peer hung up ({} bytes lost)", err.0.len()))
    }

    /// Block until the other side sends a message.
    pub fn recv(&self) -> Result<Vec<u8>> {
        let data = self
            .rx
            .recv()
            .map_err(|err| eyre::eyre!("Receive Error: {:?}", err))?;
        tracing::trace!(len = data.len(), "channel recv");
        Ok(data)
    }
}
