//! Utility functions for the portal-login crate.

use std::io::Write;
use std::path::Path;

/// Mask a token for safe display.
pub fn safe_format_token(token: &str) -> String {
    if token.chars().count() <= 13 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    let suffix: String = token
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{prefix}***{suffix}")
}

/// Mask a phone number for logs, keeping the first three and last three digits.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 6))
}

/// Write a file readable only by the owner (0600 on Unix).
pub fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;

    // The mode above only applies on creation.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_format_token_long() {
        let token = "eyJhbGciOiJIUzI1NiJ9.payload";
        assert_eq!(safe_format_token(token), "eyJhbGci***yload");
    }

    #[test]
    fn test_safe_format_token_short() {
        assert_eq!(safe_format_token("abc"), "***");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("0938123456"), "093****456");
        assert_eq!(mask_phone("12345"), "*****");
    }

    #[test]
    fn test_write_private_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("secret.json");
        write_private_file(&path, b"{}").expect("write");
        assert_eq!(std::fs::read(&path).expect("read"), b"{}");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).expect("meta").permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
