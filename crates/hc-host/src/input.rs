//! Input values the frontend exposes to cores

use std::collections::HashMap;

use hc_abi::{enums::HcInputType, InputRequest};
use hc_core::{HydraError, Result};

pub const DEFAULT_PORTS: u32 = 4;

/// Latest value per (port, input type). Unset inputs read as 0.
pub struct InputState {
    ports: u32,
    values: HashMap<(u32, HcInputType), i64>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(DEFAULT_PORTS)
    }
}

impl InputState {
    pub fn new(ports: u32) -> Self {
        Self {
            ports,
            values: HashMap::new(),
        }
    }

    pub fn ports(&self) -> u32 {
        self.ports
    }

    pub fn set_ports(&mut self, ports: u32) {
        self.ports = ports;
        self.values.retain(|(port, _), _| *port < ports);
    }

    pub fn set(&mut self, port: u32, input_type: HcInputType, value: i64) -> Result<()> {
        self.check(&InputRequest { port, input_type })?;
        self.values.insert((port, input_type), value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    fn check(&self, request: &InputRequest) -> Result<()> {
        if request.port >= self.ports {
            return Err(HydraError::BadInputRequest(format!(
                "port {} out of range, {} ports available",
                request.port, self.ports
            )));
        }
        if request.input_type == HcInputType::NULL {
            return Err(HydraError::BadInputRequest(format!(
                "null input type on port {}",
                request.port
            )));
        }
        Ok(())
    }

    pub fn read(&self, request: &InputRequest) -> Result<i64> {
        self.check(request)?;
        Ok(self
            .values
            .get(&(request.port, request.input_type))
            .copied()
            .unwrap_or(0))
    }

    /// Answer a batch of requests in order. Nothing is returned unless every
    /// request is valid.
    pub fn read_all(&self, requests: &[InputRequest]) -> Result<Vec<i64>> {
        requests.iter().map(|r| self.read(r)).collect()
    }
}
