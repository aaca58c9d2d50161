pub mod auth;
pub mod expenses;
pub mod overview;

use std::io::{self, BufRead, Write};

use paywise_utils::SecretString;

/// Password from the flag, else one line read from stdin.
pub fn password_or_prompt(flag: Option<&str>) -> anyhow::Result<SecretString> {
    if let Some(password) = flag {
        return Ok(SecretString::from(password));
    }

    let mut stderr = io::stderr().lock();
    write!(stderr, "Password: ")?;
    stderr.flush()?;

    let mut line = zeroize::Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!password.is_empty(), "password must not be empty");
    Ok(SecretString::from(password))
}
