// Copyright (c) 2025 - Cowboy AI, Inc.
//! Switch Identity Matching
//!
//! Switches report a name of the form
//!
//! ```text
//! <fabric>_<replica>_<role>
//! ```
//!
//! where `replica` is a positive integer without leading zeros and `role` is
//! `[a-zA-Z]*-[1-9]` (letters, a hyphen, then exactly one digit 1-9).
//!
//! The name is split into tokens first and the token stream is then
//! validated, so every way a name can be malformed maps to its own
//! [`IdentityError`] variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

/// Reason a reported switch name does not fit the naming grammar
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Switch name is empty")]
    Empty,

    #[error("Switch name does not start with fabric prefix '{0}_'")]
    MissingFabricPrefix(String),

    #[error("Replica index is missing")]
    MissingReplica,

    #[error("Replica index cannot start with zero: {0}")]
    LeadingZero(String),

    #[error("Replica index out of range: {0}")]
    ReplicaOutOfRange(String),

    #[error("Expected '_' after replica index")]
    MissingRoleSeparator,

    #[error("Role token is empty")]
    EmptyRole,

    #[error("Invalid character in role token: {0:?}")]
    InvalidRoleCharacter(char),

    #[error("Role token must end with '-' and a digit 1-9: {0}")]
    MissingRoleIndex(String),

    #[error("Role index must be a single digit 1-9: {0}")]
    InvalidRoleIndex(String),
}

/// Position of a switch inside a fabric: which replica, which topology role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchSlot {
    /// Replica (instance) index, starting at 1
    pub replica: u32,

    /// Role token, e.g. `spine-1`
    pub role: String,
}

impl SwitchSlot {
    /// Render the canonical switch name for this slot within `fabric`
    pub fn switch_name(&self, fabric: &str) -> String {
        format_switch_name(fabric, self.replica, &self.role)
    }
}

impl fmt::Display for SwitchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.replica, self.role)
    }
}

/// Build `<fabric>_<replica>_<role>`
pub fn format_switch_name(fabric: &str, replica: u32, role: &str) -> String {
    format!("{}_{}_{}", fabric, replica, role)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Digits(String),
    Letters(String),
    Underscore,
    Hyphen,
    Other(char),
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            let mut run = String::new();
            while let Some(&d) = chars.peek().filter(|c| c.is_ascii_digit()) {
                run.push(d);
                chars.next();
            }
            tokens.push(Token::Digits(run));
        } else if ch.is_ascii_alphabetic() {
            let mut run = String::new();
            while let Some(&l) = chars.peek().filter(|c| c.is_ascii_alphabetic()) {
                run.push(l);
                chars.next();
            }
            tokens.push(Token::Letters(run));
        } else {
            chars.next();
            tokens.push(match ch {
                '_' => Token::Underscore,
                '-' => Token::Hyphen,
                other => Token::Other(other),
            });
        }
    }

    tokens
}

/// Parses reported switch names for one fabric
#[derive(Debug, Clone)]
pub struct IdentityMatcher<'a> {
    fabric_name: &'a str,
}

impl<'a> IdentityMatcher<'a> {
    pub fn new(fabric_name: &'a str) -> Self {
        Self { fabric_name }
    }

    pub fn fabric_name(&self) -> &str {
        self.fabric_name
    }

    /// Extract `(replica, role)` from a reported switch name
    pub fn match_name(&self, reported_name: &str) -> Result<SwitchSlot, IdentityError> {
        if reported_name.is_empty() {
            return Err(IdentityError::Empty);
        }

        let rest = reported_name
            .strip_prefix(self.fabric_name)
            .and_then(|r| r.strip_prefix('_'))
            .ok_or_else(|| IdentityError::MissingFabricPrefix(self.fabric_name.to_string()))?;

        let mut tokens = tokenize(rest).into_iter().peekable();

        let replica = Self::replica(&mut tokens)?;

        if tokens.next() != Some(Token::Underscore) {
            return Err(IdentityError::MissingRoleSeparator);
        }

        let role = Self::role(&mut tokens)?;

        Ok(SwitchSlot { replica, role })
    }

    fn replica(tokens: &mut Peekable<IntoIter<Token>>) -> Result<u32, IdentityError> {
        let digits = match tokens.next() {
            Some(Token::Digits(digits)) => digits,
            _ => return Err(IdentityError::MissingReplica),
        };

        if digits.starts_with('0') {
            return Err(IdentityError::LeadingZero(digits));
        }

        digits
            .parse::<u32>()
            .map_err(|_| IdentityError::ReplicaOutOfRange(digits))
    }

    fn role(tokens: &mut Peekable<IntoIter<Token>>) -> Result<String, IdentityError> {
        let mut role = String::new();

        if tokens.peek().is_none() {
            return Err(IdentityError::EmptyRole);
        }

        if matches!(tokens.peek(), Some(Token::Letters(_))) {
            if let Some(Token::Letters(letters)) = tokens.next() {
                role.push_str(&letters);
            }
        }

        match tokens.next() {
            Some(Token::Hyphen) => role.push('-'),
            Some(Token::Underscore) => return Err(IdentityError::InvalidRoleCharacter('_')),
            Some(Token::Other(ch)) => return Err(IdentityError::InvalidRoleCharacter(ch)),
            // Letters directly followed by digits, or nothing after the letters
            _ => return Err(IdentityError::MissingRoleIndex(role)),
        }

        match tokens.next() {
            Some(Token::Digits(d)) if d.len() == 1 && d != "0" => role.push_str(&d),
            Some(Token::Digits(d)) => return Err(IdentityError::InvalidRoleIndex(d)),
            Some(Token::Other(ch)) => return Err(IdentityError::InvalidRoleCharacter(ch)),
            Some(Token::Underscore) => return Err(IdentityError::InvalidRoleCharacter('_')),
            Some(Token::Hyphen) => return Err(IdentityError::InvalidRoleCharacter('-')),
            Some(Token::Letters(_)) | None => return Err(IdentityError::MissingRoleIndex(role)),
        }

        match tokens.next() {
            None => Ok(role),
            Some(Token::Digits(d)) => Err(IdentityError::InvalidRoleIndex(d)),
            Some(Token::Letters(l)) => Err(IdentityError::InvalidRoleCharacter(
                l.chars().next().unwrap_or('?'),
            )),
            Some(Token::Underscore) => Err(IdentityError::InvalidRoleCharacter('_')),
            Some(Token::Hyphen) => Err(IdentityError::InvalidRoleCharacter('-')),
            Some(Token::Other(ch)) => Err(IdentityError::InvalidRoleCharacter(ch)),
        }
    }
}
