//! The surface a pipeline runtime uses to drive a processing stage.

use crate::Packet;

/// Delivers packets to numbered output ports.
pub trait Output {
    /// Push `pkt` to output `port`. Ports without a consumer drop the packet.
    fn push(&mut self, port: usize, pkt: Packet);
}

impl<T: Output + ?Sized> Output for &mut T {
    #[inline]
    fn push(&mut self, port: usize, pkt: Packet) {
        (**self).push(port, pkt)
    }
}

/// An [`Output`] that queues packets per port.
///
/// Packets pushed to a port index beyond the configured number of ports are
/// dropped.
#[derive(Debug, Default)]
pub struct PortQueues {
    queues: Vec<Vec<Packet>>,
}

impl PortQueues {
    pub fn new(nb_ports: usize) -> Self {
        Self {
            queues: vec![Vec::new(); nb_ports],
        }
    }

    pub fn port(&self, port: usize) -> &[Packet] {
        self.queues.get(port).map(|q| &q[..]).unwrap_or(&[])
    }

    pub fn take(&mut self, port: usize) -> Vec<Packet> {
        self.queues
            .get_mut(port)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Total number of queued packets across all ports.
    pub fn total(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }
}

impl Output for PortQueues {
    fn push(&mut self, port: usize, pkt: Packet) {
        if let Some(queue) = self.queues.get_mut(port) {
            queue.push(pkt);
        }
    }
}

/// A push-driven packet processing stage.
pub trait Element: Send + Sync {
    /// Name of the element class.
    fn class_name(&self) -> &'static str;

    /// Input/output port count, e.g. `"1/4"`.
    fn port_count(&self) -> String;

    /// Process one packet and deliver the results to `out`.
    fn push(&self, pkt: Packet, out: &mut dyn Output);

    /// Read a named counter. Returns `None` for unknown names.
    fn read_handler(&self, name: &str) -> Option<String>;
}
