//! Utility functions for turning a program file into decoded instructions

use std::fs;
use std::path::Path;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LoadError;
use crate::error::SimulatorResult;
use crate::instruction::decode_helper::{self, LabelTable};
use crate::instruction::Instruction;

/// Program file used when none is given on the command line
pub const DEFAULT_PROGRAM_PATH: &str = "test.asm";

const COMMENT_MARKERS: &[&str] = &["#", ";", "//"];

static LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<label>[A-Za-z_][\w.]*)\s*:").unwrap());

/// Reads and decodes the program at `path`
pub fn load_program(path: impl AsRef<Path>) -> SimulatorResult<Vec<Instruction>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|e| LoadError::FileReadError(path.to_path_buf(), e))?;
    let program = parse_program(&source)?;
    info!("Loaded {} instruction(s) from {}", program.len(), path.display());
    Ok(program)
}

/// Decodes a whole program, one instruction per line
pub fn parse_program(source: &str) -> SimulatorResult<Vec<Instruction>> {
    let mut labels = LabelTable::new();
    let mut label_lines: Vec<(String, usize)> = Vec::new();
    let mut pending: Vec<(usize, &str)> = Vec::new();

    // First pass: strip comments and record labels
    for (line_num, raw) in source.lines().enumerate() {
        let line_num = line_num + 1;
        let mut text = strip_comment(raw).trim();

        while let Some(caps) = LABEL_REGEX.captures(text) {
            let label = caps["label"].to_owned();
            if let Some((_, previous)) = label_lines.iter().find(|(l, _)| *l == label) {
                return Err(LoadError::DuplicateLabel {
                    line: line_num,
                    label,
                    previous: *previous,
                }
                .into());
            }
            debug!("Label {} -> instruction {}", label, pending.len());
            labels.insert(label.clone(), pending.len());
            label_lines.push((label, line_num));
            text = text[caps[0].len()..].trim();
        }

        if !text.is_empty() {
            pending.push((line_num, text));
        }
    }

    // Second pass: decode with every label known
    let program = pending
        .into_iter()
        .map(|(line_num, text)| decode_helper::parse(text, line_num, &labels))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(program)
}

/// Drops everything from the first comment marker on
fn strip_comment(line: &str) -> &str {
    let end = COMMENT_MARKERS
        .iter()
        .filter_map(|marker| line.find(marker))
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;

    #[test]
    fn skips_blank_lines_and_comments() {
        let source = "\n# header\n  add r1, r2, r3 ; trailing\n\n// done\nnop\n";
        let program = parse_program(source).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].to_string(), "R-TYPE add r1, r2, r3");
        assert_eq!(program[1].to_string(), "NOP nop");
    }

    #[test]
    fn resolves_forward_and_backward_labels() {
        let source = "start:\n  beq r1, r2, end\nloop: addi r1, r1, 1\n  j loop\nend: j start\n";
        let program = parse_program(source).unwrap();
        let targets: Vec<_> = program.iter().map(|i| i.attributes.target).collect();
        assert_eq!(targets, vec![Some(3), None, Some(1), Some(0)]);
    }

    #[test]
    fn reports_duplicate_labels() {
        let err = parse_program("a: nop\na: nop\n").unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::LoadError(LoadError::DuplicateLabel { line: 2, previous: 1, .. })
        ));
    }

    #[test]
    fn reports_failing_line_number() {
        let err = parse_program("nop\n\nbogus r1\n").unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::LoadError(LoadError::UnknownMnemonic { line: 3, .. })
        ));
    }

    #[test]
    fn empty_source_is_an_empty_program() {
        assert!(parse_program("").unwrap().is_empty());
        assert!(parse_program("# nothing\n\n").unwrap().is_empty());
    }

    #[test]
    fn strip_comment_takes_earliest_marker() {
        assert_eq!(strip_comment("nop // a # b"), "nop ");
        assert_eq!(strip_comment("nop"), "nop");
    }
}
