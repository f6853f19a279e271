//! Am2901 ALU: operand selection, the eight function microcodes and the
//! carry-lookahead flags.
//!
//! Flag equations follow the AMD 2900 family data book. Each function class
//! derives P̄n, Ḡn, Cn+4 and OVR differently from its own propagate (P) and
//! generate (G) terms, so the classes are kept as separate helpers.

use crate::pin::Bit;
use crate::types::Word;

/// Data path width of one slice
pub const REGISTER_WIDTH: usize = 4;

/// A decoded microcode field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Defined(T),
    Unknown,
    Error,
}

impl<T: Copy> Field<T> {
    pub fn defined(&self) -> Option<T> {
        match self {
            Field::Defined(value) => Some(*value),
            Field::Unknown | Field::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Field::Error)
    }
}

/// 3-bit microcode fields of the instruction word
pub trait Microcode: Sized + Copy {
    fn from_code(code: u64) -> Option<Self>;

    /// Error bits win over Unknown bits
    fn decode(field: &Word) -> Field<Self> {
        if field.is_error_value() {
            return Field::Error;
        }

        match field.to_u64().and_then(Self::from_code) {
            Some(value) => Field::Defined(value),
            None => Field::Unknown,
        }
    }
}

/// ALU source operands (I2..I0), named R then S
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluSource {
    AQ,
    AB,
    ZQ,
    ZB,
    ZA,
    DA,
    DQ,
    DZ,
}

impl Microcode for AluSource {
    fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => AluSource::AQ,
            1 => AluSource::AB,
            2 => AluSource::ZQ,
            3 => AluSource::ZB,
            4 => AluSource::ZA,
            5 => AluSource::DA,
            6 => AluSource::DQ,
            7 => AluSource::DZ,
            _ => return None,
        })
    }
}

/// ALU function (I5..I3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluFunction {
    Add,
    SubR,
    SubS,
    Or,
    And,
    NotRS,
    ExOr,
    ExNor,
}

impl Microcode for AluFunction {
    fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => AluFunction::Add,
            1 => AluFunction::SubR,
            2 => AluFunction::SubS,
            3 => AluFunction::Or,
            4 => AluFunction::And,
            5 => AluFunction::NotRS,
            6 => AluFunction::ExOr,
            7 => AluFunction::ExNor,
            _ => return None,
        })
    }
}

/// ALU destination (I8..I6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluDestination {
    QReg,
    Nop,
    RamA,
    RamF,
    RamQD,
    RamD,
    RamQU,
    RamU,
}

impl AluDestination {
    /// Shifts down: Q0 and RAM0 become outputs
    pub fn shifts_down(&self) -> bool {
        matches!(self, AluDestination::RamQD | AluDestination::RamD)
    }

    /// Shifts up: Q3 and RAM3 become outputs
    pub fn shifts_up(&self) -> bool {
        matches!(self, AluDestination::RamQU | AluDestination::RamU)
    }
}

impl Microcode for AluDestination {
    fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => AluDestination::QReg,
            1 => AluDestination::Nop,
            2 => AluDestination::RamA,
            3 => AluDestination::RamF,
            4 => AluDestination::RamQD,
            5 => AluDestination::RamD,
            6 => AluDestination::RamQU,
            7 => AluDestination::RamU,
            _ => return None,
        })
    }
}

/// Output of one ALU evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AluResult {
    pub f: Word,
    pub pn: Bit,        // P̄n
    pub gn: Bit,        // Ḡn
    pub carry_out: Bit, // Cn+4
    pub overflow: Bit,  // OVR
    pub zero: Bit,      // F = 0
}

impl AluResult {
    pub fn filled(width: usize, bit: Bit) -> Self {
        AluResult {
            f: Word::filled(width, bit),
            pn: bit,
            gn: bit,
            carry_out: bit,
            overflow: bit,
            zero: bit,
        }
    }

    pub fn error(width: usize) -> Self {
        AluResult::filled(width, Bit::Error)
    }

    pub fn unknown(width: usize) -> Self {
        AluResult::filled(width, Bit::Unknown)
    }
}

/// Picks (R, S) for a source field given the A, B, D and Q words
pub fn select_operands(source: &Word, a: &Word, b: &Word, d: &Word, q: &Word) -> (Word, Word) {
    let width = a.width();
    let zero = Word::zero(width);

    match AluSource::decode(source) {
        Field::Error => (Word::error(width), Word::error(width)),
        Field::Unknown => (Word::unknown(width), Word::unknown(width)),
        Field::Defined(source) => match source {
            AluSource::AQ => (a.clone(), q.clone()),
            AluSource::AB => (a.clone(), b.clone()),
            AluSource::ZQ => (zero, q.clone()),
            AluSource::ZB => (zero, b.clone()),
            AluSource::ZA => (zero, a.clone()),
            AluSource::DA => (d.clone(), a.clone()),
            AluSource::DQ => (d.clone(), q.clone()),
            AluSource::DZ => (d.clone(), zero),
        },
    }
}

/// Evaluates the ALU for a raw 3-bit function field.
///
/// Any Error bit in R, S, C0 or the function field gives the all-Error
/// result; otherwise any Unknown bit gives the all-Unknown result.
pub fn evaluate(r: &Word, s: &Word, carry_in: Bit, function: &Word) -> AluResult {
    let width = r.width();

    if r.is_error_value() || s.is_error_value() || carry_in == Bit::Error || function.is_error_value()
    {
        return AluResult::error(width);
    }

    match AluFunction::decode(function) {
        Field::Defined(function) => evaluate_function(r, s, carry_in, function),
        Field::Unknown | Field::Error => AluResult::unknown(width),
    }
}

/// Evaluates the ALU for an already decoded function
pub fn evaluate_function(r: &Word, s: &Word, carry_in: Bit, function: AluFunction) -> AluResult {
    let width = r.width();

    if r.is_error_value() || s.is_error_value() || carry_in == Bit::Error {
        return AluResult::error(width);
    }

    compute(r, s, carry_in, function).unwrap_or_else(|| AluResult::unknown(width))
}

fn compute(r: &Word, s: &Word, c0: Bit, function: AluFunction) -> Option<AluResult> {
    let width = r.width();
    if width == 0 || s.width() != width {
        return None;
    }

    let rv = r.to_u64()?;
    let sv = s.to_u64()?;
    let cv = u64::from(c0.to_bool()?);

    let result = match function {
        AluFunction::Add => {
            let f = Word::known(width, rv.wrapping_add(sv).wrapping_add(cv));
            arithmetic_flags(f, &r.or(s), &r.and(s), c0)
        }
        AluFunction::SubR => {
            let f = Word::known(width, sv.wrapping_sub(rv).wrapping_sub(1 - cv));
            arithmetic_flags(f, &r.not().or(s), &r.not().and(s), c0)
        }
        AluFunction::SubS => {
            let f = Word::known(width, rv.wrapping_sub(sv).wrapping_sub(1 - cv));
            arithmetic_flags(f, &r.or(&s.not()), &r.and(&s.not()), c0)
        }
        AluFunction::Or => or_flags(r.or(s), &r.or(s), c0),
        AluFunction::And => and_flags(r.and(s), &r.and(s), c0),
        AluFunction::NotRS => and_flags(r.not().and(s), &r.not().and(s), c0),
        AluFunction::ExOr => xor_flags(r.xor(s), &r.not().or(s), &r.not().and(s), c0),
        AluFunction::ExNor => xor_flags(r.xor(s).not(), &r.not().or(s), &r.not().and(s), c0),
    };

    Some(result)
}

/// Z = /(F3 + F2 + F1 + F0)
fn zero_flag(f: &Word) -> Bit {
    any(f).not()
}

fn any(w: &Word) -> Bit {
    w.bits().iter().fold(Bit::Zero, |acc, &b| acc.or(b))
}

fn all(w: &Word) -> Bit {
    w.bits().iter().fold(Bit::One, |acc, &b| acc.and(b))
}

/// Folds the lookahead chain G(n-1) + P(n-1)(... + P1(start)) from bit 1 upward
fn lookahead(p: &Word, g: &Word, start: Bit) -> Bit {
    (1..p.width()).fold(start, |acc, i| acc.and(p.get(i)).or(g.get(i)))
}

/// Ripple carries C0..Cn with C(i+1) = Gi + Pi·Ci
pub fn carry_chain(p: &Word, g: &Word, c0: Bit) -> Vec<Bit> {
    let mut carries = Vec::with_capacity(p.width() + 1);
    carries.push(c0);
    for i in 0..p.width() {
        let c = carries[i];
        carries.push(g.get(i).or(p.get(i).and(c)));
    }
    carries
}

/// ADD, SUBR and SUBS
fn arithmetic_flags(f: Word, p: &Word, g: &Word, c0: Bit) -> AluResult {
    let n = f.width();
    let carries = carry_chain(p, g, c0);
    let cn = carries[n];
    let cn_1 = carries[n - 1];

    AluResult {
        zero: zero_flag(&f),
        // Pn = /(P3P2P1P0)
        pn: all(p).not(),
        // Gn = /(G3 + P3G2 + P3P2G1 + P3P2P1G0)
        gn: lookahead(p, g, g.get(0)).not(),
        carry_out: cn,
        overflow: cn.xor(cn_1),
        f,
    }
}

/// OR: Gn is repurposed as the AND of the propagate terms
fn or_flags(f: Word, p: &Word, c0: Bit) -> AluResult {
    let gn = all(p);
    let carry_out = gn.not().or(c0);

    AluResult {
        zero: zero_flag(&f),
        pn: Bit::Zero,
        gn,
        carry_out,
        overflow: carry_out,
        f,
    }
}

/// AND and NOTRS
fn and_flags(f: Word, g: &Word, c0: Bit) -> AluResult {
    let gn = any(g).not();
    let carry_out = gn.not().or(c0);

    AluResult {
        zero: zero_flag(&f),
        pn: Bit::Zero,
        gn,
        carry_out,
        overflow: carry_out,
        f,
    }
}

/// EXOR and EXNOR
fn xor_flags(f: Word, p: &Word, g: &Word, c0: Bit) -> AluResult {
    let n = f.width();

    // Cn+4 = G3 + P3(G2 + P2(G1 + P1(P0(G0 + /C0))))
    let carry_out = lookahead(p, g, c0.not().or(g.get(0)).and(p.get(0)));

    // OVR works on inverted P and G:
    // A   = /P2 + /G2(/P1 + /G1(/P0 + /G0 C0))
    // OVR = A ^ (/P3 + /G3 A)
    let a = (0..n - 1).fold(c0, |acc, i| acc.and(g.get(i).not()).or(p.get(i).not()));
    let overflow = a.xor(a.and(g.get(n - 1).not()).or(p.get(n - 1).not()));

    AluResult {
        zero: zero_flag(&f),
        // Pn = G3 + G2 + G1 + G0
        pn: any(g),
        // Gn = G3 + P3(G2 + P2(G1 + P1 P0))
        gn: lookahead(p, g, p.get(0)),
        carry_out,
        overflow,
        f,
    }
}
