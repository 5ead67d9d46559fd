//! The bench session: owns the model handle, the tick counter and the trace
//! sink, and drives the clock.

use std::path::Path;

use tracing::{debug, info};

use crate::error::SimError;
use crate::fx2::DeviceRecord;
use crate::models::{self, ModelId, ModelVariant};
use crate::tb::UartTb;
use crate::vcd::VcdWriter;

/// Ticks per half clock period; a full clock cycle spans `2 * CLK_HALF_PERIOD`
/// ticks in steady state.
pub const CLK_HALF_PERIOD: u64 = 11;

/// Clock cycles the device is held in reset during `init`.
pub const RESET_CYCLES: u32 = 50;

pub struct Bench {
    model_id: ModelId,
    model: Option<ModelVariant>,
    /// Current simulation time, in ticks.
    main_time: u64,
    trace: Option<VcdWriter>,
    /// Last requested reset-line level (active low).
    resetb: u8,
}

impl Bench {
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            model: None,
            main_time: 0,
            trace: None,
            resetb: 1,
        }
    }

    /// List all available models.
    pub fn available_models() -> &'static [&'static str] {
        models::MODELS
    }

    pub fn is_initialized(&self) -> bool {
        self.model.is_some()
    }

    /// Create the model, optionally open a trace sink, and run the reset
    /// sequence: reset asserted for [`RESET_CYCLES`] cycles, then released.
    pub fn init(&mut self, trace_path: Option<&Path>) -> Result<(), SimError> {
        if self.model.is_some() {
            return Err(SimError::AlreadyInitialized);
        }

        self.main_time = 0;
        self.model = Some(models::create_model(self.model_id));
        if let Some(path) = trace_path {
            self.trace(path)?;
        }

        self.set_resetb(0);
        self.advance_clk(RESET_CYCLES)?;
        self.set_resetb(1);

        info!(time = self.main_time, "simulation initialized");
        Ok(())
    }

    /// Open a waveform trace sink. Allowed before `init`: the header comes
    /// from the model type's signal table, and samples flow once a model is
    /// live. At most one sink per session.
    pub fn trace(&mut self, path: &Path) -> Result<(), SimError> {
        if self.trace.is_some() {
            return Err(SimError::TraceAlreadyOpen);
        }
        let defs = self
            .model
            .as_ref()
            .map(|model| model.signals())
            .unwrap_or(UartTb::SIGNALS);
        self.trace = Some(VcdWriter::create(path, defs)?);
        info!(path = %path.display(), "vcd trace opened");
        Ok(())
    }

    /// Advance the clock by `cycles` full cycles.
    pub fn adv(&mut self, cycles: u32) -> Result<(), SimError> {
        if self.model.is_none() {
            return Err(SimError::Uninitialized);
        }
        self.advance_clk(cycles)
    }

    fn advance_clk(&mut self, cycles: u32) -> Result<(), SimError> {
        let Some(model) = self.model.as_mut() else {
            return Err(SimError::Uninitialized);
        };

        let mut cycles = cycles;
        while cycles > 0 {
            // Toggle clock
            if self.main_time % CLK_HALF_PERIOD == 1 {
                if model.clk() != 0 {
                    model.set_clk(0);
                } else {
                    cycles -= 1;
                    model.set_clk(1);
                }
            }

            model.eval();
            if let Some(trace) = self.trace.as_mut() {
                trace.dump(self.main_time, &model.sample())?;
            }
            self.main_time += 1;
        }
        Ok(())
    }

    /// Current simulation time in ticks.
    pub fn time(&self) -> u64 {
        self.main_time
    }

    /// Current reset-line level: read back from the model when one is live,
    /// otherwise the last level requested.
    pub fn resetb(&self) -> u8 {
        self.model
            .as_ref()
            .map(|model| model.resetb())
            .unwrap_or(self.resetb)
    }

    /// Set the reset line. Any nonzero level releases reset.
    pub fn set_resetb(&mut self, level: u8) {
        self.resetb = u8::from(level != 0);
        if let Some(model) = self.model.as_mut() {
            model.set_resetb(self.resetb);
        }
        debug!(resetb = self.resetb, "reset line set");
    }

    /// Snapshot of the FX2 device register state.
    pub fn get_dev(&self) -> Result<DeviceRecord, SimError> {
        self.model
            .as_ref()
            .map(|model| model.device_record())
            .ok_or(SimError::Uninitialized)
    }

    /// TX line of the device under test, for console monitoring.
    pub fn uart_txd(&self) -> Result<u8, SimError> {
        self.model
            .as_ref()
            .map(|model| model.uart_txd())
            .ok_or(SimError::Uninitialized)
    }

    /// Finalize and drop the model, close the trace sink, and leave the
    /// session ready for a fresh `init`.
    pub fn end(&mut self) -> Result<(), SimError> {
        let Some(mut model) = self.model.take() else {
            return Err(SimError::Uninitialized);
        };
        model.final_eval();
        if let Some(trace) = self.trace.take() {
            trace.finish()?;
        }
        info!(time = self.main_time, "simulation ended");
        Ok(())
    }
}
