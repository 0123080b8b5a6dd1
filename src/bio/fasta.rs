use crate::{GenofileError, Result};
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::fs;
use std::path::Path;

/// One record from a FASTA file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        tag(b" "),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = line_ending(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], String> {
    let mut sequence = String::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase() as char);
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], FastaRecord> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    Ok((
        input,
        FastaRecord {
            id: id.to_string(),
            description: description.map(str::to_string),
            sequence,
        },
    ))
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut input = data;

    while !input.is_empty() {
        // Skip empty lines and whitespace
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        match parse_record(input) {
            Ok((remaining, record)) => {
                if !record.sequence.is_empty() {
                    records.push(record);
                }
                input = remaining;
            }
            Err(e) => {
                return Err(GenofileError::Validation(format!(
                    "Failed to parse FASTA: {:?}",
                    e
                )));
            }
        }
    }

    Ok(records)
}

/// Parse a FASTA file into records
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let data = fs::read(path)?;
    parse_fasta_from_bytes(&data)
}
