use crate::fx2::DeviceRecord;
use crate::tb::UartTb;
use crate::vcd::SignalDef;

/// Models known to this driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelId {
    UartFx2,
}

pub(crate) const MODELS: &[&str] = &["uart_fx2"];

/// Internal enum wrapping the available simulation models.
pub(crate) enum ModelVariant {
    UartFx2(UartTb),
    // Future variants will be added here by extending this enum
}

impl ModelVariant {
    // Simulation control
    pub fn eval(&mut self) {
        match self {
            Self::UartFx2(model) => model.eval(),
        }
    }

    pub fn final_eval(&mut self) {
        match self {
            Self::UartFx2(model) => model.final_eval(),
        }
    }

    // Clock and reset
    pub fn clk(&self) -> u8 {
        match self {
            Self::UartFx2(model) => model.clk(),
        }
    }

    pub fn set_clk(&mut self, level: u8) {
        match self {
            Self::UartFx2(model) => model.set_clk(level),
        }
    }

    pub fn resetb(&self) -> u8 {
        match self {
            Self::UartFx2(model) => model.resetb(),
        }
    }

    pub fn set_resetb(&mut self, level: u8) {
        match self {
            Self::UartFx2(model) => model.set_resetb(level),
        }
    }

    // Host-visible state
    pub fn device_record(&self) -> DeviceRecord {
        match self {
            Self::UartFx2(model) => model.device_record(),
        }
    }

    pub fn uart_txd(&self) -> u8 {
        match self {
            Self::UartFx2(model) => model.uart_txd(),
        }
    }

    // Tracing
    pub fn signals(&self) -> &'static [SignalDef] {
        match self {
            Self::UartFx2(_) => UartTb::SIGNALS,
        }
    }

    pub fn sample(&self) -> Vec<u64> {
        match self {
            Self::UartFx2(model) => model.sample(),
        }
    }
}

/// Create an instance of the specified model.
pub(crate) fn create_model(model_id: ModelId) -> ModelVariant {
    match model_id {
        ModelId::UartFx2 => ModelVariant::UartFx2(UartTb::new()),
    }
}
