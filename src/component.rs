use crate::components::cpu::am2901::Am2901;
use crate::components::memory::register_file::RegisterFile;
use crate::components::pld::gal22v10::Gal22V10;
use crate::components::ttl::ttl_7476::Ttl7476;
use crate::pin::{Bit, PinAccess, PinFrame, PropagationDelay};

/// Per-instance state owned by the host between evaluations.
///
/// Created lazily by the chip on its first evaluation.
pub type InstanceData = RegisterFile;

pub const DEFAULT_DELAY: PropagationDelay = 1;

/// Attributes every component instance carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseComponent {
    pub name: String,
    pub delay: PropagationDelay,
    pub power_pins: bool,
}

impl BaseComponent {
    pub fn new(name: String) -> Self {
        BaseComponent {
            name,
            delay: DEFAULT_DELAY,
            power_pins: false,
        }
    }

    pub fn with_delay(mut self, delay: PropagationDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_power_pins(mut self, power_pins: bool) -> Self {
        self.power_pins = power_pins;
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

// Component trait
pub trait Component: Send {
    fn name(&self) -> &str;
    fn component_type(&self) -> &'static str;
    fn port_count(&self) -> usize;
    fn port_named(&self, name: &str) -> Option<usize>;
    fn port_name(&self, port: usize) -> Option<String>;
    fn is_output_port(&self, port: usize) -> bool;

    /// One settling step: read resolved pins, update `data`, drive outputs
    fn propagate(&self, pins: &mut dyn PinAccess, data: &mut Option<InstanceData>);

    /// Functional form of [`Component::propagate`].
    ///
    /// Missing inputs read as Unknown; extra inputs are ignored.
    fn evaluate(
        &self,
        inputs: &[Bit],
        data: Option<InstanceData>,
    ) -> (PinFrame, Option<InstanceData>) {
        let mut frame = PinFrame::new(self.port_count());
        for (port, &value) in inputs.iter().enumerate().take(self.port_count()) {
            frame.set_input(port, value);
        }

        let mut data = data;
        self.propagate(&mut frame, &mut data);
        (frame, data)
    }
}

/// The chip models this crate knows how to evaluate
#[derive(Debug, Clone)]
pub enum Chip {
    Am2901(Am2901),
    Ttl7476(Ttl7476),
    Gal22V10(Gal22V10),
}

impl Chip {
    fn inner(&self) -> &dyn Component {
        match self {
            Chip::Am2901(chip) => chip,
            Chip::Ttl7476(chip) => chip,
            Chip::Gal22V10(chip) => chip,
        }
    }
}

impl Component for Chip {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn component_type(&self) -> &'static str {
        self.inner().component_type()
    }

    fn port_count(&self) -> usize {
        self.inner().port_count()
    }

    fn port_named(&self, name: &str) -> Option<usize> {
        self.inner().port_named(name)
    }

    fn port_name(&self, port: usize) -> Option<String> {
        self.inner().port_name(port)
    }

    fn is_output_port(&self, port: usize) -> bool {
        self.inner().is_output_port(port)
    }

    fn propagate(&self, pins: &mut dyn PinAccess, data: &mut Option<InstanceData>) {
        self.inner().propagate(pins, data)
    }
}

impl From<Am2901> for Chip {
    fn from(chip: Am2901) -> Self {
        Chip::Am2901(chip)
    }
}

impl From<Ttl7476> for Chip {
    fn from(chip: Ttl7476) -> Self {
        Chip::Ttl7476(chip)
    }
}

impl From<Gal22V10> for Chip {
    fn from(chip: Gal22V10) -> Self {
        Chip::Gal22V10(chip)
    }
}
