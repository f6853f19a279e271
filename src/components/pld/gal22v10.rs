//! Sum-of-products logic array and the GAL22V10 built on it.
//!
//! The AND plane has one row per input literal (row `2k` is input `k`,
//! row `2k + 1` its complement) and one column per product term. The OR
//! plane has one row per product term and one column per output.

use log::trace;

use crate::component::{BaseComponent, Component, InstanceData};
use crate::components::pld::fuse_map::FuseMap;
use crate::error::FuseMapError;
use crate::pin::{Bit, PinAccess};

/// Programmable AND/OR array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammableArray {
    inputs: usize,
    terms: usize,
    outputs: usize,
    and_plane: FuseMap,
    or_plane: FuseMap,
}

impl ProgrammableArray {
    /// Unprogrammed array: every output is Zero
    pub fn new(inputs: usize, terms: usize, outputs: usize) -> Self {
        ProgrammableArray {
            inputs,
            terms,
            outputs,
            and_plane: FuseMap::new(2 * inputs, terms),
            or_plane: FuseMap::new(terms, outputs),
        }
    }

    /// Array programmed from two fuse maps of matching dimensions
    pub fn with_planes(
        inputs: usize,
        terms: usize,
        outputs: usize,
        and_plane: FuseMap,
        or_plane: FuseMap,
    ) -> Result<Self, FuseMapError> {
        check_dimensions(&and_plane, 2 * inputs, terms)?;
        check_dimensions(&or_plane, terms, outputs)?;

        Ok(ProgrammableArray {
            inputs,
            terms,
            outputs,
            and_plane,
            or_plane,
        })
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn and_plane(&self) -> &FuseMap {
        &self.and_plane
    }

    pub fn or_plane(&self) -> &FuseMap {
        &self.or_plane
    }

    /// Connects input literal `literal` to product term `term`
    pub fn connect_literal(
        &mut self,
        literal: usize,
        term: usize,
        connected: bool,
    ) -> Result<(), FuseMapError> {
        self.and_plane.set(literal, term, connected)
    }

    /// Connects product term `term` to output `output`
    pub fn connect_term(
        &mut self,
        term: usize,
        output: usize,
        connected: bool,
    ) -> Result<(), FuseMapError> {
        self.or_plane.set(term, output, connected)
    }

    /// Value of one AND-plane row; inputs past the slice read Unknown
    fn literal(inputs: &[Bit], row: usize) -> Bit {
        let value = inputs.get(row / 2).copied().unwrap_or(Bit::Unknown);
        if row % 2 == 0 {
            value
        } else {
            value.not()
        }
    }

    /// AND of the connected literals, Zero when nothing is connected
    pub fn product_term(&self, inputs: &[Bit], term: usize) -> Bit {
        let mut literals = self
            .and_plane
            .rows_in_col(term)
            .map(|row| Self::literal(inputs, row))
            .peekable();

        if literals.peek().is_none() {
            return Bit::Zero;
        }
        literals.fold(Bit::One, |acc, bit| acc & bit)
    }

    /// Output levels for the given input levels
    pub fn evaluate(&self, inputs: &[Bit]) -> Vec<Bit> {
        let products: Vec<Bit> = (0..self.terms)
            .map(|term| self.product_term(inputs, term))
            .collect();

        (0..self.outputs)
            .map(|output| {
                self.or_plane
                    .rows_in_col(output)
                    .map(|term| products[term])
                    .fold(Bit::Zero, |acc, bit| acc | bit)
            })
            .collect()
    }
}

fn check_dimensions(map: &FuseMap, rows: usize, cols: usize) -> Result<(), FuseMapError> {
    if map.rows() != rows || map.cols() != cols {
        return Err(FuseMapError::Dimensions {
            expected_rows: rows,
            expected_cols: cols,
            rows: map.rows(),
            cols: map.cols(),
        });
    }
    Ok(())
}

pub const GAL_INPUTS: usize = 12;
pub const GAL_OUTPUTS: usize = 10;
pub const GAL_TERMS: usize = 132;

/// GAL22V10 in combinational mode: ports IN0..IN11, then IO0..IO9
#[derive(Debug, Clone)]
pub struct Gal22V10 {
    base: BaseComponent,
    array: ProgrammableArray,
}

impl Gal22V10 {
    /// Blank part, every output Zero
    pub fn new(name: String) -> Self {
        Gal22V10 {
            base: BaseComponent::new(name),
            array: ProgrammableArray::new(GAL_INPUTS, GAL_TERMS, GAL_OUTPUTS),
        }
    }

    pub fn with_fuses(
        base: BaseComponent,
        and_plane: FuseMap,
        or_plane: FuseMap,
    ) -> Result<Self, FuseMapError> {
        let array =
            ProgrammableArray::with_planes(GAL_INPUTS, GAL_TERMS, GAL_OUTPUTS, and_plane, or_plane)?;
        Ok(Gal22V10 { base, array })
    }

    pub fn array(&self) -> &ProgrammableArray {
        &self.array
    }

    pub fn array_mut(&mut self) -> &mut ProgrammableArray {
        &mut self.array
    }
}

impl Component for Gal22V10 {
    fn name(&self) -> &str {
        self.base.get_name()
    }

    fn component_type(&self) -> &'static str {
        "gal22v10"
    }

    fn port_count(&self) -> usize {
        GAL_INPUTS + GAL_OUTPUTS
    }

    fn port_named(&self, name: &str) -> Option<usize> {
        if let Some(n) = name.strip_prefix("IN") {
            return n.parse().ok().filter(|&n| n < GAL_INPUTS);
        }
        if let Some(n) = name.strip_prefix("IO") {
            return n
                .parse::<usize>()
                .ok()
                .filter(|&n| n < GAL_OUTPUTS)
                .map(|n| GAL_INPUTS + n);
        }
        None
    }

    fn port_name(&self, port: usize) -> Option<String> {
        if port < GAL_INPUTS {
            Some(format!("IN{}", port))
        } else if port < self.port_count() {
            Some(format!("IO{}", port - GAL_INPUTS))
        } else {
            None
        }
    }

    fn is_output_port(&self, port: usize) -> bool {
        (GAL_INPUTS..self.port_count()).contains(&port)
    }

    fn propagate(&self, pins: &mut dyn PinAccess, _data: &mut Option<InstanceData>) {
        let inputs: Vec<Bit> = (0..self.array.input_count())
            .map(|port| pins.pin_value(port))
            .collect();
        let outputs = self.array.evaluate(&inputs);

        trace!(
            "{}: {} -> {}",
            self.base.name,
            inputs.iter().map(Bit::to_char).collect::<String>(),
            outputs.iter().map(Bit::to_char).collect::<String>()
        );

        for (i, value) in outputs.into_iter().enumerate() {
            pins.set_pin_value(GAL_INPUTS + i, value, self.base.delay);
        }
    }
}
