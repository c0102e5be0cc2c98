//! Console password generation

use aws_lc_rs::rand::{SecureRandom, SystemRandom};

use crate::error::{IamToolkitError, IamToolkitResult};

pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|";

const CLASSES: [&[u8]; 4] = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];

/// Generate a random password of `length` characters containing at least one
/// lowercase letter, uppercase letter, digit and symbol.
pub fn generate_password(length: usize) -> IamToolkitResult<String> {
    if length < CLASSES.len() {
        return Err(IamToolkitError::configuration(format!(
            "Password length must be at least {}, got {length}",
            CLASSES.len()
        )));
    }

    let alphabet: Vec<u8> = CLASSES.concat();
    // Bytes at or above this bound are discarded to keep the draw uniform.
    let bound = 256 - (256 % alphabet.len());
    let rng = SystemRandom::new();

    loop {
        let mut password = String::with_capacity(length);
        let mut buffer = [0u8; 64];
        while password.len() < length {
            rng.fill(&mut buffer)
                .map_err(|_| IamToolkitError::PasswordGeneration)?;
            for &byte in &buffer {
                let value = usize::from(byte);
                if value < bound && password.len() < length {
                    password.push(char::from(alphabet[value % alphabet.len()]));
                }
            }
        }

        if covers_all_classes(&password) {
            return Ok(password);
        }
    }
}

fn covers_all_classes(password: &str) -> bool {
    CLASSES
        .iter()
        .all(|class| password.bytes().any(|b| class.contains(&b)))
}
