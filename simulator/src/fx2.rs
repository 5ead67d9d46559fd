//! Behavioral model of the FX2 host-interface controller.
//!
//! Bridges the host side of the bench to the UART under test: bytes queued
//! for transmit go out over the serial TX line, bytes coming back land in an
//! endpoint FIFO. Its register file is what `get_dev` snapshots for the host.

use std::collections::VecDeque;
use std::fmt;

use crate::uart::{BIT_PERIOD, UartRx, UartTx};

/// Device version reported in the register file (major.minor).
const DEV_VERSION: u16 = 0x0201;
/// Cycles per USB frame tick.
const FRAME_INTERVAL: u32 = 64;
/// Byte transmitted once after every reset release.
const SYNC_BYTE: u8 = 0x55;

/// Register layout of the record returned to the host.
pub(crate) const REG_VERSION_LO: usize = 0;
pub(crate) const REG_VERSION_HI: usize = 1;
/// Scratch register.
pub(crate) const REG_SCRATCH: usize = 2;
/// USB frame counter, low/high byte.
pub(crate) const REG_FRAME_LO: usize = 3;
pub(crate) const REG_FRAME_HI: usize = 4;
/// Bytes waiting in the endpoint FIFO (saturating).
pub(crate) const REG_EP_COUNT: usize = 5;
/// Bytes waiting in the transmit FIFO (saturating).
pub(crate) const REG_TX_PENDING: usize = 6;
/// Nonzero once the post-reset sync byte has been queued.
pub(crate) const REG_LINK: usize = 7;

const RECORD_LEN: usize = 8;

/// Opaque snapshot of the FX2 register file.
///
/// The bench hands this out as-is; callers treat it as raw data.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    regs: [u8; RECORD_LEN],
}

impl DeviceRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.regs
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, byte) in self.regs.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceRecord({self})")
    }
}

pub struct Fx2 {
    tx: UartTx,
    rx: UartRx,
    /// Bytes queued for transmission toward the DUT.
    tx_fifo: VecDeque<u8>,
    /// Bytes received from the DUT (endpoint IN FIFO).
    ep_fifo: VecDeque<u8>,
    frame: u16,
    frame_div: u32,
    scratch: u8,
    sync_sent: bool,
}

impl Fx2 {
    pub fn new() -> Self {
        Self {
            tx: UartTx::new(),
            rx: UartRx::new(BIT_PERIOD),
            tx_fifo: VecDeque::new(),
            ep_fifo: VecDeque::new(),
            frame: 0,
            frame_div: 0,
            scratch: 0,
            sync_sent: false,
        }
    }

    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
        self.tx_fifo.clear();
        self.ep_fifo.clear();
        self.frame = 0;
        self.frame_div = 0;
        self.scratch = 0;
        self.sync_sent = false;
    }

    pub fn txd(&self) -> u8 {
        self.tx.line()
    }

    pub fn frame(&self) -> u16 {
        self.frame
    }

    /// Advance one clock cycle with the given RX line level.
    pub fn step(&mut self, rxd: u8) {
        self.frame_div += 1;
        if self.frame_div == FRAME_INTERVAL {
            self.frame_div = 0;
            self.frame = self.frame.wrapping_add(1);
        }

        // First cycle out of reset: announce the link with a sync byte.
        if !self.sync_sent {
            self.tx_fifo.push_back(SYNC_BYTE);
            self.sync_sent = true;
        }

        if self.tx.idle() {
            if let Some(byte) = self.tx_fifo.pop_front() {
                self.tx.load(byte);
            }
        }
        self.tx.step();

        if let Some(byte) = self.rx.process(rxd) {
            self.ep_fifo.push_back(byte);
        }
    }

    pub fn device_record(&self) -> DeviceRecord {
        let mut regs = [0u8; RECORD_LEN];
        regs[REG_VERSION_LO] = (DEV_VERSION & 0xff) as u8;
        regs[REG_VERSION_HI] = (DEV_VERSION >> 8) as u8;
        regs[REG_SCRATCH] = self.scratch;
        regs[REG_FRAME_LO] = (self.frame & 0xff) as u8;
        regs[REG_FRAME_HI] = (self.frame >> 8) as u8;
        regs[REG_EP_COUNT] = self.ep_fifo.len().min(255) as u8;
        regs[REG_TX_PENDING] = self.tx_fifo.len().min(255) as u8;
        regs[REG_LINK] = u8::from(self.sync_sent);
        DeviceRecord { regs }
    }
}

impl Default for Fx2 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_byte_goes_out_after_reset() {
        let mut fx2 = Fx2::new();
        assert_eq!(fx2.device_record().as_bytes()[REG_LINK], 0);

        fx2.step(1);
        // Sync byte loaded straight into the shifter: start bit on the line.
        assert_eq!(fx2.txd(), 0);
        let record = fx2.device_record();
        assert_eq!(record.as_bytes()[REG_LINK], 1);
        assert_eq!(record.as_bytes()[REG_TX_PENDING], 0);
    }

    #[test]
    fn frame_counter_ticks_every_interval() {
        let mut fx2 = Fx2::new();
        for _ in 0..130 {
            fx2.step(1);
        }
        assert_eq!(fx2.frame(), 2);
    }

    #[test]
    fn reset_clears_device_state() {
        let mut fx2 = Fx2::new();
        for _ in 0..100 {
            fx2.step(1);
        }
        fx2.reset();
        let record = fx2.device_record();
        assert_eq!(record.as_bytes()[REG_FRAME_LO], 0);
        assert_eq!(record.as_bytes()[REG_LINK], 0);
        assert_eq!(fx2.txd(), 1);
    }

    #[test]
    fn record_layout_is_stable() {
        let fx2 = Fx2::new();
        let record = fx2.device_record();
        assert_eq!(record.as_bytes().len(), 8);
        assert_eq!(record.as_bytes()[REG_VERSION_LO], 0x01);
        assert_eq!(record.as_bytes()[REG_VERSION_HI], 0x02);
        assert_eq!(format!("{record}"), "01 02 00 00 00 00 00 00");
    }
}
