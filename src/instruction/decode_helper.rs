//! Decoding helper functions.
//! Turn one line of assembly text into an [`Instruction`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::Attributes;
use super::Format;
use super::Function;
use super::Instruction;
use crate::cpu::REGISTER_COUNT;
use crate::error::LoadError;

static REGISTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:r|x|\$)(?P<index>\d+)$").unwrap());
static MEMORY_OPERAND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<offset>[-+]?(?:0[xX][0-9a-fA-F]+|\d+))?\s*\(\s*(?P<base>[^()\s]+)\s*\)$")
        .unwrap()
});

/// Label name to instruction index
pub type LabelTable = HashMap<String, usize>;

/// Decodes the instruction text found on source line `line`
pub fn parse(text: &str, line: usize, labels: &LabelTable) -> Result<Instruction, LoadError> {
    let text = text.trim();
    let (mnemonic, rest) = match text.split_once(char::is_whitespace) {
        Some((mnemonic, rest)) => (mnemonic, rest.trim()),
        None => (text, ""),
    };

    let function = mnemonic.parse::<Function>().map_err(|_| {
        LoadError::UnknownMnemonic { line, mnemonic: mnemonic.to_owned() }
    })?;

    let operands: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(str::trim).collect()
    };

    let expected = match function.format() {
        Format::R | Format::Branch => 3,
        Format::I if function.is_memory_access() => 2,
        Format::I => 3,
        Format::Jump => 1,
        Format::Nop => 0,
    };
    if operands.len() != expected {
        return Err(LoadError::ParseError {
            line,
            text: text.to_owned(),
            reason: format!("expected {} operand(s), found {}", expected, operands.len()),
        });
    }

    let mut attributes = Attributes::default();
    match function.format() {
        Format::R => {
            attributes.rd = Some(parse_register(operands[0], line)?);
            attributes.rs = Some(parse_register(operands[1], line)?);
            attributes.rt = Some(parse_register(operands[2], line)?);
        }
        Format::I if function.is_memory_access() => {
            attributes.rt = Some(parse_register(operands[0], line)?);
            let caps = MEMORY_OPERAND_REGEX.captures(operands[1]).ok_or_else(|| {
                LoadError::ParseError {
                    line,
                    text: text.to_owned(),
                    reason: format!("expected 'offset(base)', found '{}'", operands[1]),
                }
            })?;
            attributes.imm = Some(match caps.name("offset") {
                Some(offset) => parse_immediate(offset.as_str(), line)?,
                None => 0,
            });
            attributes.rs = Some(parse_register(&caps["base"], line)?);
        }
        Format::I => {
            attributes.rt = Some(parse_register(operands[0], line)?);
            attributes.rs = Some(parse_register(operands[1], line)?);
            attributes.imm = Some(parse_immediate(operands[2], line)?);
        }
        Format::Branch => {
            attributes.rs = Some(parse_register(operands[0], line)?);
            attributes.rt = Some(parse_register(operands[1], line)?);
            attributes.target = Some(parse_target(operands[2], line, labels)?);
        }
        Format::Jump => {
            attributes.target = Some(parse_target(operands[0], line, labels)?);
        }
        Format::Nop => {}
    }

    Ok(Instruction::new(function, attributes))
}

/// Parses `r7`, `x7` or `$7`, rejecting indices past the register file
pub fn parse_register(operand: &str, line: usize) -> Result<u8, LoadError> {
    let invalid = || LoadError::InvalidRegister { line, register: operand.to_owned() };
    let caps = REGISTER_REGEX.captures(operand).ok_or_else(invalid)?;
    let index: usize = caps["index"].parse().map_err(|_| invalid())?;
    if index >= REGISTER_COUNT {
        return Err(invalid());
    }
    u8::try_from(index).map_err(|_| invalid())
}

/// Parses a signed decimal or `0x` hexadecimal immediate
pub fn parse_immediate(operand: &str, line: usize) -> Result<i64, LoadError> {
    let invalid = || LoadError::InvalidImmediate { line, value: operand.to_owned() };
    let (negative, digits) = match operand.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, operand.strip_prefix('+').unwrap_or(operand)),
    };

    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| invalid())?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses a branch or jump target: an instruction index or a label
fn parse_target(operand: &str, line: usize, labels: &LabelTable) -> Result<usize, LoadError> {
    let unsigned = operand.trim_start_matches(['-', '+']);
    if unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        // Signed numbers are never indices
        return operand
            .parse()
            .map_err(|_| LoadError::InvalidImmediate { line, value: operand.to_owned() });
    }
    labels
        .get(operand)
        .copied()
        .ok_or_else(|| LoadError::UndefinedLabel { line, label: operand.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Result<Instruction, LoadError> {
        parse(text, 1, &LabelTable::new())
    }

    #[test]
    fn decodes_r_type() {
        let inst = decode("add r3, r1, r2").unwrap();
        assert_eq!(inst.function, Function::ADD);
        assert_eq!(inst.attributes.rd, Some(3));
        assert_eq!(inst.attributes.rs, Some(1));
        assert_eq!(inst.attributes.rt, Some(2));
    }

    #[test]
    fn accepts_register_spellings() {
        let inst = decode("SUB $4, x5, R6").unwrap();
        assert_eq!(inst.to_string(), "R-TYPE sub r4, r5, r6");
    }

    #[test]
    fn decodes_memory_operands() {
        let inst = decode("lw r4, 0x10(r2)").unwrap();
        assert_eq!(inst.attributes.imm, Some(16));
        assert_eq!(inst.attributes.rs, Some(2));

        let inst = decode("sw r4, (r29)").unwrap();
        assert_eq!(inst.to_string(), "I-TYPE sw r4, 0(r29)");

        let inst = decode("lw r1, -4( r2 )").unwrap();
        assert_eq!(inst.attributes.imm, Some(-4));
    }

    #[test]
    fn decodes_immediates() {
        let inst = decode("addi r1, r0, -12").unwrap();
        assert_eq!(inst.attributes.imm, Some(-12));
        assert!(matches!(
            decode("addi r1, r0, twelve"),
            Err(LoadError::InvalidImmediate { .. })
        ));
    }

    #[test]
    fn resolves_branch_targets() {
        let mut labels = LabelTable::new();
        labels.insert("loop".to_owned(), 2);
        let inst = parse("bne r1, r0, loop", 4, &labels).unwrap();
        assert_eq!(inst.attributes.target, Some(2));

        let inst = parse("j 9", 4, &labels).unwrap();
        assert_eq!(inst.attributes.target, Some(9));

        assert!(matches!(
            parse("j done", 4, &labels),
            Err(LoadError::UndefinedLabel { line: 4, .. })
        ));
    }

    #[test]
    fn signed_target_is_an_invalid_immediate() {
        for text in ["beq r1, r2, -1", "bne r1, r2, +3", "j -12"] {
            match decode(text) {
                Err(LoadError::InvalidImmediate { line: 1, value }) => {
                    assert!(value.starts_with(['-', '+']), "{}", value)
                }
                other => panic!("{}: unexpected {:?}", text, other),
            }
        }
    }

    #[test]
    fn rejects_register_out_of_range() {
        assert!(matches!(
            decode("add r32, r1, r2"),
            Err(LoadError::InvalidRegister { .. })
        ));
        assert!(matches!(
            decode("add t0, r1, r2"),
            Err(LoadError::InvalidRegister { .. })
        ));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(decode("jal r1"), Err(LoadError::UnknownMnemonic { .. })));
        assert!(matches!(decode("add r1, r2"), Err(LoadError::ParseError { .. })));
        assert!(matches!(decode("nop r1"), Err(LoadError::ParseError { .. })));
        assert!(matches!(decode("lw r1, r2"), Err(LoadError::ParseError { .. })));
    }
}
