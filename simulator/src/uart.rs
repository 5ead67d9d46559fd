use std::collections::VecDeque;

/// Clock cycles per serial bit. Both ends of the link run the same divisor.
pub const BIT_PERIOD: u32 = 16;

/// Serial transmitter for 8N1 framing: one start bit (0), 8 data bits LSB
/// first, one stop bit (1). Idle line is high.
pub struct UartTx {
    shift: u16,
    remaining: u8,
    div: u32,
    line: u8,
}

impl UartTx {
    pub fn new() -> Self {
        Self {
            shift: 0,
            remaining: 0,
            div: 0,
            line: 1,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True once the stop bit has run its full period.
    pub fn idle(&self) -> bool {
        self.remaining == 0
    }

    /// Current level of the TX line.
    pub fn line(&self) -> u8 {
        self.line
    }

    /// Begin shifting a byte out. Must only be called while idle.
    pub fn load(&mut self, byte: u8) {
        // Data bits with the stop bit stacked above; the start bit is driven
        // directly and occupies the first slot.
        self.shift = u16::from(byte) | 0x100;
        self.remaining = 10;
        self.div = 0;
        self.line = 0;
    }

    /// Advance one clock cycle.
    pub fn step(&mut self) {
        if self.remaining == 0 {
            return;
        }
        self.div += 1;
        if self.div == BIT_PERIOD {
            self.div = 0;
            self.remaining -= 1;
            if self.remaining > 0 {
                self.line = (self.shift & 1) as u8;
                self.shift >>= 1;
            }
        }
    }
}

impl Default for UartTx {
    fn default() -> Self {
        Self::new()
    }
}

/// Serial receiver and byte decoder.
///
/// Detects the start-bit falling edge, then samples each data bit in the
/// middle of its period and finalizes at the middle of the stop bit so the
/// next falling edge can be caught immediately. Feed it one line sample per
/// clock cycle; it also serves as the console decoder for monitoring a TX
/// line from the driver side.
pub struct UartRx {
    prev: u8,
    in_frame: bool,
    cycles_since_start: u32,
    sampled: u8,
    shift: u8,
    bit_period: u32,
}

impl UartRx {
    pub fn new(bit_period: u32) -> Self {
        Self {
            prev: 1, // Idle is high
            in_frame: false,
            cycles_since_start: 0,
            sampled: 0,
            shift: 0,
            bit_period,
        }
    }

    pub fn reset(&mut self) {
        let bit_period = self.bit_period;
        *self = Self::new(bit_period);
    }

    /// Process one clock cycle of the line.
    /// Returns `Some(byte)` when a complete frame has been received.
    pub fn process(&mut self, line: u8) -> Option<u8> {
        let bit = line & 1;

        if !self.in_frame && self.prev == 1 && bit == 0 {
            self.in_frame = true;
            self.cycles_since_start = 0;
            self.sampled = 0;
            self.shift = 0;
        }

        let mut received = None;
        if self.in_frame {
            self.cycles_since_start += 1;

            let next = u32::from(self.sampled);
            if next < 8 {
                // Data bit n sits (n + 1.5) bit periods after the start edge.
                let sample_at = self.bit_period + self.bit_period / 2 + next * self.bit_period;
                if self.cycles_since_start == sample_at {
                    self.shift |= bit << next;
                    self.sampled += 1;
                }
            } else {
                // Middle of the stop bit: frame done. A low stop bit is a
                // framing error and the byte is dropped.
                let stop_at = self.bit_period * 9 + self.bit_period / 2;
                if self.cycles_since_start >= stop_at {
                    self.in_frame = false;
                    if bit == 1 {
                        received = Some(self.shift);
                    }
                }
            }
        }

        self.prev = bit;
        received
    }
}

/// The device under test: an echo UART. Every byte received on `rxd` is
/// retransmitted on `txd`.
pub struct UartCore {
    tx: UartTx,
    rx: UartRx,
    pending: VecDeque<u8>,
}

impl UartCore {
    pub fn new() -> Self {
        Self {
            tx: UartTx::new(),
            rx: UartRx::new(BIT_PERIOD),
            pending: VecDeque::new(),
        }
    }

    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
        self.pending.clear();
    }

    pub fn txd(&self) -> u8 {
        self.tx.line()
    }

    /// Advance one clock cycle with the given RX line level.
    pub fn step(&mut self, rxd: u8) {
        if let Some(byte) = self.rx.process(rxd) {
            self.pending.push_back(byte);
        }
        if self.tx.idle() {
            if let Some(byte) = self.pending.pop_front() {
                self.tx.load(byte);
            }
        }
        self.tx.step();
    }
}

impl Default for UartCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_frames_a_byte() {
        let mut tx = UartTx::new();
        assert!(tx.idle());
        assert_eq!(tx.line(), 1);

        tx.load(0x55);
        // Start bit is driven immediately.
        assert_eq!(tx.line(), 0);

        // A full frame is 10 bit slots.
        for _ in 0..(BIT_PERIOD * 10) {
            assert!(!tx.idle());
            tx.step();
        }
        assert!(tx.idle());
        assert_eq!(tx.line(), 1);
    }

    #[test]
    fn rx_ignores_idle_line() {
        let mut rx = UartRx::new(BIT_PERIOD);
        for _ in 0..(BIT_PERIOD * 20) {
            assert_eq!(rx.process(1), None);
        }
    }

    #[test]
    fn tx_to_rx_roundtrip() {
        let mut tx = UartTx::new();
        let mut rx = UartRx::new(BIT_PERIOD);
        tx.load(0xa3);

        let mut received = None;
        for _ in 0..(BIT_PERIOD * 12) {
            let line = tx.line();
            tx.step();
            if let Some(byte) = rx.process(line) {
                assert!(received.is_none(), "byte decoded twice");
                received = Some(byte);
            }
        }
        assert_eq!(received, Some(0xa3));
    }

    #[test]
    fn core_echoes_received_bytes() {
        let mut dut = UartCore::new();
        let mut host_tx = UartTx::new();
        let mut host_rx = UartRx::new(BIT_PERIOD);
        host_tx.load(0x42);

        let mut echoed = None;
        for _ in 0..(BIT_PERIOD * 25) {
            let to_dut = host_tx.line();
            let from_dut = dut.txd();
            host_tx.step();
            dut.step(to_dut);
            if let Some(byte) = host_rx.process(from_dut) {
                echoed = Some(byte);
            }
        }
        assert_eq!(echoed, Some(0x42));
    }
}
