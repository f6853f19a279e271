//! Property-based tests for the logic algebra, the Am2901 ALU and fuse maps
//!
//! The ALU is checked exhaustively against integer arithmetic and against
//! the sum-of-products flag equations from the datasheet.

use proptest::prelude::*;
use rusty_chips::components::clock::edge_detector::{ClockSlot, Trigger};
use rusty_chips::components::cpu::am2901_alu::{evaluate_function, AluFunction, REGISTER_WIDTH};
use rusty_chips::components::pld::fuse_map::FuseMap;
use rusty_chips::pin::Bit;
use rusty_chips::types::Word;

mod proptest_helpers {
    use super::*;

    pub fn arb_bit() -> impl Strategy<Value = Bit> {
        prop_oneof![
            Just(Bit::Zero),
            Just(Bit::One),
            Just(Bit::Unknown),
            Just(Bit::Error),
        ]
    }

    pub fn arb_word(width: usize) -> impl Strategy<Value = Word> {
        prop::collection::vec(arb_bit(), width).prop_map(Word::new)
    }

    pub fn arb_fuse_map() -> impl Strategy<Value = FuseMap> {
        (0usize..8, 0usize..8)
            .prop_flat_map(|(rows, cols)| {
                (
                    Just(rows),
                    Just(cols),
                    prop::collection::vec(any::<bool>(), rows * cols),
                )
            })
            .prop_map(|(rows, cols, fuses)| {
                let mut map = FuseMap::new(rows, cols);
                for (i, &fuse) in fuses.iter().enumerate() {
                    map.set(i / cols, i % cols, fuse).unwrap();
                }
                map
            })
    }
}

fn nibble(v: u64) -> Word {
    Word::known(REGISTER_WIDTH, v)
}

fn bit(v: u64, i: usize) -> bool {
    (v >> i) & 1 == 1
}

fn level(b: bool) -> Bit {
    Bit::from_bool(b)
}

fn signed(v: u64) -> i64 {
    if v & 0x8 != 0 {
        v as i64 - 16
    } else {
        v as i64
    }
}

#[cfg(test)]
mod algebra_properties {
    use super::proptest_helpers::*;
    use super::*;

    proptest! {
        #[test]
        fn test_not_is_an_involution(a in arb_bit()) {
            prop_assert_eq!(a.not().not(), a);
        }

        #[test]
        fn test_error_dominates(a in arb_bit()) {
            prop_assert_eq!(a.and(Bit::Error), Bit::Error);
            prop_assert_eq!(Bit::Error.or(a), Bit::Error);
            prop_assert_eq!(a.xor(Bit::Error), Bit::Error);
        }

        #[test]
        fn test_operators_commute(a in arb_bit(), b in arb_bit()) {
            prop_assert_eq!(a & b, b & a);
            prop_assert_eq!(a | b, b | a);
            prop_assert_eq!(a ^ b, b ^ a);
        }

        #[test]
        fn test_de_morgan(a in arb_bit(), b in arb_bit()) {
            prop_assert_eq!(!(a & b), !a | !b);
            prop_assert_eq!(!(a | b), !a & !b);
        }

        #[test]
        fn test_defined_bits_match_bool_logic(a in any::<bool>(), b in any::<bool>()) {
            let (x, y) = (Bit::from_bool(a), Bit::from_bool(b));
            prop_assert_eq!(x & y, Bit::from_bool(a && b));
            prop_assert_eq!(x | y, Bit::from_bool(a || b));
            prop_assert_eq!(x ^ y, Bit::from_bool(a != b));
        }

        #[test]
        fn test_known_words_round_trip(width in 1usize..16, value in any::<u64>()) {
            let word = Word::known(width, value);
            prop_assert_eq!(word.width(), width);
            prop_assert_eq!(word.to_u64(), Some(value & ((1u64 << width) - 1)));
        }

        #[test]
        fn test_word_fault_priority(word in arb_word(6)) {
            let bits = word.bits();
            let expected = if bits.contains(&Bit::Error) {
                Some(Bit::Error)
            } else if bits.contains(&Bit::Unknown) {
                Some(Bit::Unknown)
            } else {
                None
            };
            prop_assert_eq!(word.fault(), expected);
            prop_assert_eq!(word.is_fully_defined(), expected.is_none());
        }
    }
}

#[cfg(test)]
mod clock_properties {
    use super::proptest_helpers::*;
    use super::*;

    proptest! {
        #[test]
        fn test_rising_fires_on_zero_one_pairs(levels in prop::collection::vec(arb_bit(), 0..32)) {
            let mut slot = ClockSlot::new();
            let mut previous = Bit::Unknown;

            for &current in &levels {
                let expected = previous == Bit::Zero && current == Bit::One;
                prop_assert_eq!(slot.update(current, Trigger::Rising), expected);
                previous = current;
            }
        }

        #[test]
        fn test_level_triggers_ignore_history(levels in prop::collection::vec(arb_bit(), 1..16)) {
            let mut high = ClockSlot::new();
            let mut low = ClockSlot::new();

            for &current in &levels {
                prop_assert_eq!(high.update(current, Trigger::High), current == Bit::One);
                prop_assert_eq!(low.update(current, Trigger::Low), current == Bit::Zero);
            }
        }
    }
}

#[cfg(test)]
mod alu_properties {
    use super::*;

    fn all_inputs() -> impl Iterator<Item = (u64, u64, bool)> {
        (0..16u64).flat_map(|r| (0..16u64).flat_map(move |s| [(r, s, false), (r, s, true)]))
    }

    #[test]
    fn test_arithmetic_matches_integer_sums() {
        for (r, s, c0) in all_inputs() {
            let c = c0 as u64;
            let cases = [
                (AluFunction::Add, r + s + c, signed(r) + signed(s) + c as i64),
                (AluFunction::SubR, s + (!r & 0xF) + c, signed(s) - signed(r) - 1 + c as i64),
                (AluFunction::SubS, r + (!s & 0xF) + c, signed(r) - signed(s) - 1 + c as i64),
            ];

            for (function, sum, signed_sum) in cases {
                let result = evaluate_function(&nibble(r), &nibble(s), level(c0), function);
                let context = format!("{:?} r={} s={} c0={}", function, r, s, c0);

                assert_eq!(result.f, nibble(sum), "{}", context);
                assert_eq!(result.carry_out, level(sum > 0xF), "{}", context);
                assert_eq!(
                    result.overflow,
                    level(!(-8..=7).contains(&signed_sum)),
                    "{}",
                    context
                );
                assert_eq!(result.zero, level(sum & 0xF == 0), "{}", context);
            }
        }
    }

    #[test]
    fn test_arithmetic_group_signals() {
        for (r, s, c0) in all_inputs() {
            let result = evaluate_function(&nibble(r), &nibble(s), level(c0), AluFunction::Add);
            let p = |i| bit(r | s, i);
            let g = |i| bit(r & s, i);

            let pn = !(p(0) && p(1) && p(2) && p(3));
            let gn = !(g(3)
                || p(3) && g(2)
                || p(3) && p(2) && g(1)
                || p(3) && p(2) && p(1) && g(0));

            assert_eq!(result.pn, level(pn), "r={} s={}", r, s);
            assert_eq!(result.gn, level(gn), "r={} s={}", r, s);
        }
    }

    #[test]
    fn test_logic_results() {
        for (r, s, c0) in all_inputs() {
            let cases = [
                (AluFunction::Or, r | s),
                (AluFunction::And, r & s),
                (AluFunction::NotRS, !r & s),
                (AluFunction::ExOr, r ^ s),
                (AluFunction::ExNor, !(r ^ s)),
            ];

            for (function, f) in cases {
                let result = evaluate_function(&nibble(r), &nibble(s), level(c0), function);
                assert_eq!(result.f, nibble(f), "{:?} r={} s={}", function, r, s);
                assert_eq!(result.zero, level(f & 0xF == 0));
            }
        }
    }

    #[test]
    fn test_or_and_flags() {
        for (r, s, c0) in all_inputs() {
            let or = evaluate_function(&nibble(r), &nibble(s), level(c0), AluFunction::Or);
            let gn = (r | s) & 0xF == 0xF;
            assert_eq!(or.pn, Bit::Zero);
            assert_eq!(or.gn, level(gn));
            assert_eq!(or.carry_out, level(!gn || c0));
            assert_eq!(or.overflow, or.carry_out);

            let and = evaluate_function(&nibble(r), &nibble(s), level(c0), AluFunction::And);
            let gn = r & s == 0;
            assert_eq!(and.pn, Bit::Zero);
            assert_eq!(and.gn, level(gn));
            assert_eq!(and.carry_out, level(!gn || c0));
            assert_eq!(and.overflow, and.carry_out);
        }
    }

    /// Datasheet sum-of-products equations for EXOR and EXNOR, with
    /// P = /R + S and G = /R S
    #[test]
    fn test_xor_class_flags_match_sum_of_products() {
        for (r, s, c0) in all_inputs() {
            let p = |i| bit(!r | s, i);
            let g = |i| bit(!r & s, i);
            let np = |i| !p(i);
            let ng = |i| !g(i);

            let pn = g(3) || g(2) || g(1) || g(0);
            let gn = g(3) || p(3) && g(2) || p(3) && p(2) && g(1) || p(3) && p(2) && p(1) && p(0);
            let carry = g(3)
                || p(3) && g(2)
                || p(3) && p(2) && g(1)
                || p(3) && p(2) && p(1) && p(0) && (g(0) || !c0);
            let a = np(2)
                || ng(2) && np(1)
                || ng(2) && ng(1) && np(0)
                || ng(2) && ng(1) && ng(0) && c0;
            let overflow = a ^ (np(3) || ng(3) && a);

            for function in [AluFunction::ExOr, AluFunction::ExNor] {
                let result = evaluate_function(&nibble(r), &nibble(s), level(c0), function);
                let context = format!("{:?} r={} s={} c0={}", function, r, s, c0);

                assert_eq!(result.pn, level(pn), "{}", context);
                assert_eq!(result.gn, level(gn), "{}", context);
                assert_eq!(result.carry_out, level(carry), "{}", context);
                assert_eq!(result.overflow, level(overflow), "{}", context);
            }
        }
    }

    #[test]
    fn test_undefined_operands() {
        let mut r = nibble(5);
        r.set(1, Bit::Unknown);

        for function in [AluFunction::Add, AluFunction::And, AluFunction::ExNor] {
            let result = evaluate_function(&r, &nibble(3), Bit::Zero, function);
            assert_eq!(result.f, Word::unknown(4));
            assert_eq!(result.carry_out, Bit::Unknown);

            let result = evaluate_function(&r, &nibble(3), Bit::Error, function);
            assert_eq!(result.f, Word::error(4));
            assert_eq!(result.overflow, Bit::Error);
        }
    }
}

#[cfg(test)]
mod fuse_map_properties {
    use super::proptest_helpers::*;
    use super::*;

    proptest! {
        #[test]
        fn test_text_round_trip(map in arb_fuse_map()) {
            let text = map.to_string();
            prop_assert_eq!(FuseMap::parse(&text), Ok(map));
        }

        #[test]
        fn test_out_of_range_reads_blown(map in arb_fuse_map(), row in 8usize..16, col in 0usize..16) {
            prop_assert!(!map.get(row, col));
            prop_assert!(!map.get(col, row));
        }
    }
}
