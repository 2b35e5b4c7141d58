//! Telnet option negotiation (RFC 854/855), client side.
//!
//! Negotiation is not mandatory: the parser strips every command sequence
//! from the data stream and queues the minimal replies a line-mode client
//! needs. Server `WILL ECHO` and `WILL SUPPRESS-GO-AHEAD` are accepted;
//! everything else is refused. Each option is answered at most once, which
//! breaks the negotiation loops some devices run into.

use crate::error::TransportError;

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

pub const OPT_ECHO: u8 = 1;
pub const OPT_SGA: u8 = 3;

/// Sub-negotiation payloads longer than this are treated as garbage.
const MAX_SUBNEGOTIATION: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Verb(u8),
    Sub,
    SubIac,
}

/// Incremental telnet command parser.
#[derive(Debug)]
pub struct TelnetParser {
    state: State,
    sub_len: usize,
    answered: [bool; 256],
    replies: Vec<u8>,
    /// First application bytes, kept until the banner check has run.
    greeting: Option<Vec<u8>>,
}

impl TelnetParser {
    pub fn new() -> Self {
        Self {
            state: State::Data,
            sub_len: 0,
            answered: [false; 256],
            replies: Vec::new(),
            greeting: Some(Vec::with_capacity(4)),
        }
    }

    /// Feed raw bytes from the wire, appending application data to `data`.
    pub fn feed(&mut self, input: &[u8], data: &mut Vec<u8>) -> Result<(), TransportError> {
        let start = data.len();
        for &byte in input {
            match self.state {
                State::Data => {
                    if byte == IAC {
                        self.state = State::Iac;
                    } else if byte != 0 {
                        data.push(byte);
                    }
                }
                State::Iac => {
                    self.state = match byte {
                        IAC => {
                            data.push(IAC);
                            State::Data
                        }
                        DO | DONT | WILL | WONT => State::Verb(byte),
                        SB => {
                            self.sub_len = 0;
                            State::Sub
                        }
                        // NOP, GA, AYT and friends carry no payload
                        _ => State::Data,
                    };
                }
                State::Verb(verb) => {
                    self.reply(verb, byte);
                    self.state = State::Data;
                }
                State::Sub => {
                    if byte == IAC {
                        self.state = State::SubIac;
                    } else {
                        self.sub_len += 1;
                        if self.sub_len > MAX_SUBNEGOTIATION {
                            return Err(TransportError::Handshake(format!(
                                "sub-negotiation exceeds {} bytes",
                                MAX_SUBNEGOTIATION
                            )));
                        }
                    }
                }
                State::SubIac => {
                    self.state = match byte {
                        SE => State::Data,
                        _ => State::Sub,
                    };
                }
            }
        }

        self.check_greeting(&data[start..])
    }

    fn check_greeting(&mut self, fresh: &[u8]) -> Result<(), TransportError> {
        let Some(greeting) = self.greeting.as_mut() else {
            return Ok(());
        };
        let wanted = 4 - greeting.len();
        greeting.extend(fresh.iter().take(wanted));
        if greeting.len() < 4 {
            return Ok(());
        }
        let is_ssh = greeting.as_slice() == b"SSH-";
        self.greeting = None;
        if is_ssh {
            return Err(TransportError::Handshake(
                "peer sent an SSH banner, not telnet".to_string(),
            ));
        }
        Ok(())
    }

    /// Take the replies queued since the last call.
    pub fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.replies)
    }

    fn reply(&mut self, verb: u8, option: u8) {
        let answer = match verb {
            WILL if option == OPT_ECHO || option == OPT_SGA => DO,
            WILL => DONT,
            DO => WONT,
            // We never enable anything, so DONT/WONT need no answer
            _ => return,
        };
        if self.answered[option as usize] {
            return;
        }
        self.answered[option as usize] = true;
        self.replies.extend_from_slice(&[IAC, answer, option]);
    }
}

impl Default for TelnetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape outgoing application data (0xFF is doubled).
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        if byte == IAC {
            out.push(IAC);
        }
        out.push(byte);
    }
    out
}
