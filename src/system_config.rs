//! # JSON Configuration
//!
//! Components are created by name from a [`ComponentConfig`] through the
//! [`ComponentFactory`] registry. A [`BenchConfig`] wraps one component with
//! a list of test vectors; [`Bench`] applies them in order, carrying the
//! instance state from one vector to the next, and reports every output that
//! disagrees with the expectation.
//!
//! ## Bench File Format
//!
//! ```json
//! {
//!   "name": "jk_toggle",
//!   "description": "74x76 flip-flop 1 toggles on each rising edge",
//!   "component": {
//!     "component_type": "ttl_7476",
//!     "name": "U1",
//!     "properties": {"power_pins": false}
//!   },
//!   "vectors": [
//!     {"inputs": {"nPRE1": "1", "nCLR1": "1", "J1": "1", "K1": "1", "CLK1": "0"},
//!      "expect": {"Q1": "0", "nQ1": "1"}},
//!     {"inputs": {"CLK1": "1"}, "expect": {"Q1": "1", "nQ1": "0"}}
//!   ]
//! }
//! ```
//!
//! Levels are single characters: `0`, `1`, `x` (Unknown) and `E` (Error).
//! In `expect`, `Z` means the pin must not be driven. Inputs keep their
//! level until a later vector changes them; pins never set read Unknown.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::component::{BaseComponent, Chip, Component, InstanceData};
use crate::components::cpu::am2901::Am2901;
use crate::components::pld::fuse_map::FuseMap;
use crate::components::pld::gal22v10::Gal22V10;
use crate::components::ttl::ttl_7476::Ttl7476;
use crate::error::ConfigError;
use crate::pin::Bit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn new(component_type: &str, name: &str) -> Self {
        ComponentConfig {
            component_type: component_type.to_string(),
            name: name.to_string(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: serde_json::Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    fn bool_property(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| invalid_property(name, "expected a boolean")),
        }
    }

    fn u32_property(&self, name: &str) -> Result<Option<u32>, ConfigError> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| invalid_property(name, "expected an unsigned 32-bit integer")),
        }
    }

    fn fuse_map_property(&self, name: &str) -> Result<Option<FuseMap>, ConfigError> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(value) => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid_property(name, "expected fuse map text"))?;
                Ok(Some(FuseMap::parse(text)?))
            }
        }
    }

    /// Name, delay and power pin attributes shared by every chip
    fn base(&self) -> Result<BaseComponent, ConfigError> {
        let mut base = BaseComponent::new(self.name.clone());

        if let Some(delay) = self.u32_property("delay")? {
            base = base.with_delay(delay);
        }
        if let Some(power_pins) = self.bool_property("power_pins")? {
            base = base.with_power_pins(power_pins);
        }

        Ok(base)
    }
}

fn invalid_property(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidProperty {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

pub type ComponentCreator = fn(config: &ComponentConfig) -> Result<Chip, ConfigError>;

/// Component factory for creating chips from JSON configuration
#[derive(Debug)]
pub struct ComponentFactory {
    component_registry: HashMap<String, ComponentCreator>,
}

impl Default for ComponentFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentFactory {
    pub fn new() -> Self {
        let mut factory = ComponentFactory {
            component_registry: HashMap::new(),
        };
        factory.register_default_components();
        factory
    }

    fn register_default_components(&mut self) {
        self.register("am2901", |config: &ComponentConfig| {
            Ok(Am2901::with_base(config.base()?).into())
        });

        self.register("ttl_7476", |config: &ComponentConfig| {
            Ok(Ttl7476::with_base(config.base()?).into())
        });

        self.register("gal22v10", |config: &ComponentConfig| {
            let base = config.base()?;
            if base.power_pins {
                return Err(invalid_property(
                    "power_pins",
                    "gal22v10 has no power pin model",
                ));
            }

            let blank = Gal22V10::new(config.name.clone());
            let and_plane = config
                .fuse_map_property("and_plane")?
                .unwrap_or_else(|| blank.array().and_plane().clone());
            let or_plane = config
                .fuse_map_property("or_plane")?
                .unwrap_or_else(|| blank.array().or_plane().clone());

            Ok(Gal22V10::with_fuses(base, and_plane, or_plane)?.into())
        });
    }

    /// Adds or replaces the creator for `component_type`
    pub fn register(&mut self, component_type: &str, creator: ComponentCreator) {
        self.component_registry
            .insert(component_type.to_string(), creator);
    }

    pub fn component_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.component_registry.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn create(&self, config: &ComponentConfig) -> Result<Chip, ConfigError> {
        let creator = self
            .component_registry
            .get(&config.component_type)
            .ok_or_else(|| ConfigError::UnknownComponent(config.component_type.clone()))?;

        debug!("creating {} '{}'", config.component_type, config.name);
        creator(config)
    }

    pub fn create_from_json<P: AsRef<Path>>(&self, path: P) -> Result<Chip, ConfigError> {
        let config: ComponentConfig = load_json(path)?;
        self.create(&config)
    }
}

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// One step of a bench: levels to apply, then levels to check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestVector {
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub expect: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub component: ComponentConfig,
    pub vectors: Vec<TestVector>,
}

impl BenchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_json(path)
    }
}

/// Expected state of an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Driven(Bit),
    Released,
}

impl Expectation {
    pub fn matches(&self, actual: Option<Bit>) -> bool {
        match self {
            Expectation::Driven(bit) => actual == Some(*bit),
            Expectation::Released => actual.is_none(),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expectation::Driven(bit) => write!(f, "{}", bit),
            Expectation::Released => write!(f, "Z"),
        }
    }
}

fn parse_level(pin: &str, value: &str) -> Result<Bit, ConfigError> {
    let mut chars = value.chars();
    match (chars.next().and_then(Bit::from_char), chars.next()) {
        (Some(bit), None) => Ok(bit),
        _ => Err(ConfigError::InvalidLevel {
            pin: pin.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_expectation(pin: &str, value: &str) -> Result<Expectation, ConfigError> {
    match value {
        "Z" | "z" => Ok(Expectation::Released),
        _ => parse_level(pin, value).map(Expectation::Driven),
    }
}

#[derive(Debug, Clone)]
struct PreparedVector {
    inputs: Vec<(usize, Bit)>,
    expect: Vec<(usize, String, Expectation)>,
}

/// Output that disagreed with its expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub vector: usize,
    pub pin: String,
    pub expected: Expectation,
    pub actual: Option<Bit>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let actual = self.actual.map_or('Z', |bit| bit.to_char());
        write!(
            f,
            "vector {}: {} expected {} got {}",
            self.vector, self.pin, self.expected, actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchReport {
    pub name: String,
    pub vectors: usize,
    pub mismatches: Vec<Mismatch>,
}

impl BenchReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Number of vectors with at least one mismatch
    pub fn failed_vectors(&self) -> usize {
        let mut vectors: Vec<usize> = self.mismatches.iter().map(|m| m.vector).collect();
        vectors.dedup();
        vectors.len()
    }
}

/// A component plus the vectors to drive it with
#[derive(Debug, Clone)]
pub struct Bench {
    name: String,
    chip: Chip,
    vectors: Vec<PreparedVector>,
}

impl Bench {
    /// Creates the component and resolves every pin name up front
    pub fn from_config(factory: &ComponentFactory, config: &BenchConfig) -> Result<Self, ConfigError> {
        let chip = factory.create(&config.component)?;
        let port = |pin: &str| {
            chip.port_named(pin).ok_or_else(|| ConfigError::UnknownPin {
                component: chip.name().to_string(),
                pin: pin.to_string(),
            })
        };

        let mut vectors = Vec::with_capacity(config.vectors.len());
        for vector in &config.vectors {
            let mut inputs = Vec::with_capacity(vector.inputs.len());
            for (pin, value) in &vector.inputs {
                inputs.push((port(pin)?, parse_level(pin, value)?));
            }

            let mut expect = Vec::with_capacity(vector.expect.len());
            for (pin, value) in &vector.expect {
                let p = port(pin)?;
                if !chip.is_output_port(p) {
                    return Err(ConfigError::NotAnOutput {
                        component: chip.name().to_string(),
                        pin: pin.clone(),
                    });
                }
                expect.push((p, pin.clone(), parse_expectation(pin, value)?));
            }

            vectors.push(PreparedVector { inputs, expect });
        }

        Ok(Bench {
            name: config.name.clone(),
            chip,
            vectors,
        })
    }

    pub fn load<P: AsRef<Path>>(factory: &ComponentFactory, path: P) -> Result<Self, ConfigError> {
        let config = BenchConfig::from_file(path)?;
        Bench::from_config(factory, &config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chip(&self) -> &Chip {
        &self.chip
    }

    /// Runs every vector against a fresh instance
    pub fn run(&self) -> BenchReport {
        let mut levels = vec![Bit::Unknown; self.chip.port_count()];
        let mut data: Option<InstanceData> = None;
        let mut mismatches = Vec::new();

        info!("{}: running {} vectors", self.name, self.vectors.len());

        for (index, vector) in self.vectors.iter().enumerate() {
            for &(port, value) in &vector.inputs {
                levels[port] = value;
            }

            let (frame, next) = self.chip.evaluate(&levels, data.take());
            data = next;
            debug!("{}: vector {}: {}", self.name, index, frame);

            for (port, pin, expected) in &vector.expect {
                let actual = frame.driven(*port);
                if !expected.matches(actual) {
                    let mismatch = Mismatch {
                        vector: index,
                        pin: pin.clone(),
                        expected: *expected,
                        actual,
                    };
                    warn!("{}: {}", self.name, mismatch);
                    mismatches.push(mismatch);
                }
            }
        }

        BenchReport {
            name: self.name.clone(),
            vectors: self.vectors.len(),
            mismatches,
        }
    }
}
