//! Packet trace: flow weights and packet arrivals.
//!
//! Text format consists of whitespace-separated tokens, each directive is a single character.
//! Text after a complete record up to the end of its line is ignored, a directive starting
//! with `c` comments out the rest of its line:
//!
//! ```text
//! c comment until the end of line
//! f 3 neq            # number of flows and weight mode (`eq` or `neq`)
//! w 1 2 0.5          # flow weights, only for `neq`, may span several lines
//! p 1 1 0 100        # flow id, packet id, arrival time, length
//! ```

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::flow::DEFAULT_FLOW_WEIGHT;
use crate::packet::Packet;

/// Error returned by trace parsing.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Trace file can not be read.
    #[error("can't read trace file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Trace content violates the format.
    #[error("line {line}: {message}")]
    Parse {
        /// Line number starting from 1.
        line: usize,
        /// Error description.
        message: String,
    },
    /// Trace has no flow declaration.
    #[error("missing flow declaration")]
    MissingFlows,
    /// Trace has no packets.
    #[error("missing packet descriptions")]
    MissingPackets,
}

/// Flow weights together with packets sorted by arrival time.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    flow_weights: Vec<f64>,
    packets: Vec<Packet>,
}

impl Trace {
    /// Creates trace from the given weights and packets.
    ///
    /// Packets are sorted by arrival time, packets with equal arrival times keep their order.
    pub fn new(flow_weights: Vec<f64>, mut packets: Vec<Packet>) -> Self {
        packets.sort_by_key(|p| p.arrival_time);
        Self { flow_weights, packets }
    }

    /// Creates trace with `flow_count` flows of default weight.
    pub fn with_equal_weights(flow_count: usize, packets: Vec<Packet>) -> Self {
        Self::new(vec![DEFAULT_FLOW_WEIGHT; flow_count], packets)
    }

    /// Reads trace from the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        text.parse()
    }

    /// Returns flow weights ordered by flow id.
    pub fn flow_weights(&self) -> &[f64] {
        &self.flow_weights
    }

    /// Returns the number of flows.
    pub fn flow_count(&self) -> usize {
        self.flow_weights.len()
    }

    /// Returns packets sorted by arrival time.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Returns mutable packets, e.g. to let the engine fill in virtual finish times.
    pub fn packets_mut(&mut self) -> &mut [Packet] {
        &mut self.packets
    }

    /// Consumes the trace and returns its parts.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Packet>) {
        (self.flow_weights, self.packets)
    }
}

impl FromStr for Trace {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse()
    }
}

#[derive(Clone, Copy)]
struct Token<'a> {
    line: usize,
    text: &'a str,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let mut tokens = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            tokens.extend(line.split_whitespace().map(|text| Token { line: idx + 1, text }));
        }
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Trace, TraceError> {
        let (flow_count, equal_weights) = self.parse_flows()?;
        let flow_weights = if equal_weights {
            vec![DEFAULT_FLOW_WEIGHT; flow_count]
        } else {
            self.parse_weights(flow_count)?
        };

        let mut packets = Vec::new();
        while let Some(token) = self.next_directive() {
            match token.text {
                "p" => {
                    let line = token.line;
                    let flow_id = self.expect_value(line, "flow id")?;
                    let packet_id = self.expect_value(line, "packet id")?;
                    let arrival_time = self.expect_value(line, "arrival time")?;
                    let length: u64 = self.expect_value(line, "packet length")?;
                    if length == 0 {
                        return Err(parse_error(line, "packet length must be positive"));
                    }
                    packets.push(Packet::new(flow_id, packet_id, length, arrival_time));
                    self.skip_rest_of_line();
                }
                other => return Err(unknown_directive(token.line, other)),
            }
        }
        if packets.is_empty() {
            return Err(TraceError::MissingPackets);
        }
        Ok(Trace::new(flow_weights, packets))
    }

    fn parse_flows(&mut self) -> Result<(usize, bool), TraceError> {
        let token = self.next_directive().ok_or(TraceError::MissingFlows)?;
        if token.text != "f" {
            return Err(unknown_directive(token.line, token.text));
        }
        let line = token.line;
        let flow_count: usize = self.expect_value(line, "flow number")?;
        if flow_count == 0 {
            return Err(parse_error(line, "flow number must be positive"));
        }
        let mode = self
            .next_token()
            .ok_or_else(|| parse_error(line, "missing flow weight configuration"))?;
        let equal_weights = match mode.text {
            "eq" => true,
            "neq" => false,
            other => {
                return Err(parse_error(
                    mode.line,
                    &format!("unknown flow weight configuration '{}'", other),
                ))
            }
        };
        self.skip_rest_of_line();
        Ok((flow_count, equal_weights))
    }

    fn parse_weights(&mut self, flow_count: usize) -> Result<Vec<f64>, TraceError> {
        let token = self
            .next_directive()
            .ok_or_else(|| parse_error(self.last_line(), "missing flow weights"))?;
        if token.text != "w" {
            return Err(unknown_directive(token.line, token.text));
        }
        let mut weights = Vec::with_capacity(flow_count);
        while weights.len() < flow_count {
            weights.push(self.expect_value(token.line, "flow weight")?);
        }
        self.skip_rest_of_line();
        Ok(weights)
    }

    /// Returns the next directive token, skipping comment lines.
    fn next_directive(&mut self) -> Option<Token<'a>> {
        while let Some(token) = self.next_token() {
            if !token.text.starts_with('c') {
                return Some(token);
            }
            self.skip_line(token.line);
        }
        None
    }

    fn skip_line(&mut self, line: usize) {
        while self.tokens.get(self.pos).map_or(false, |t| t.line == line) {
            self.pos += 1;
        }
    }

    /// Drops tokens following the last consumed one on its line.
    fn skip_rest_of_line(&mut self) {
        if let Some(line) = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)).map(|t| t.line) {
            self.skip_line(line);
        }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    fn expect_value<T: FromStr>(&mut self, line: usize, what: &str) -> Result<T, TraceError> {
        let token = self
            .next_token()
            .ok_or_else(|| parse_error(line, &format!("missing {}", what)))?;
        token
            .text
            .parse()
            .map_err(|_| parse_error(token.line, &format!("wrong {} '{}'", what, token.text)))
    }
}

fn parse_error(line: usize, message: &str) -> TraceError {
    TraceError::Parse {
        line,
        message: message.to_string(),
    }
}

fn unknown_directive(line: usize, directive: &str) -> TraceError {
    parse_error(line, &format!("unknown declaration '{}'", directive))
}
