//! Single-line OpenSSH public key format: `<name> <base64(blob)>[ <comment>]`.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use kagi::decoder::{DecodableFrom, Decoder};
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::space1,
    combinator::{opt, rest},
    sequence::preceded,
};

use crate::blob::PublicKeyBlob;
use crate::error::{Error, Result};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-')
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

fn parse_line(input: &str) -> IResult<&str, (&str, &str, Option<&str>)> {
    (
        take_while1(is_name_char),
        preceded(space1, take_while1(is_base64_char)),
        opt(preceded(space1, rest)),
    )
        .parse(input)
}

/// True when the first line of `text` reads `<token> <base64>[ <comment>]`.
pub fn sniff(text: &str) -> bool {
    let line = text.trim_start().lines().next().unwrap_or_default();
    match parse_line(line.trim_end()) {
        Ok(("", (name, data, _))) => {
            name.starts_with(|c: char| c.is_ascii_alphanumeric())
                && data.len() >= 4
                && data.len() % 4 == 0
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSshPublicKey {
    blob: PublicKeyBlob,
    comment: Option<String>,
}

impl OpenSshPublicKey {
    pub fn new(blob: PublicKeyBlob, comment: Option<String>) -> Self {
        OpenSshPublicKey { blob, comment }
    }

    pub fn blob(&self) -> &PublicKeyBlob {
        &self.blob
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn into_parts(self) -> (PublicKeyBlob, Option<String>) {
        (self.blob, self.comment)
    }
}

impl Display for OpenSshPublicKey {
    /// Writes the line as ssh-keygen does, newline included.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.blob.name(),
            STANDARD.encode(self.blob.as_bytes())
        )?;
        if let Some(comment) = &self.comment {
            write!(f, " {}", comment)?;
        }
        writeln!(f)
    }
}

impl FromStr for OpenSshPublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim_start();
        let (line, rest) = text.split_once('\n').unwrap_or((text, ""));
        if !rest.trim().is_empty() {
            return Err(Error::TrailingLines);
        }

        let (remaining, (name, data, comment)) =
            parse_line(line.trim_end()).map_err(|_| Error::InvalidLine)?;
        if !remaining.is_empty() {
            return Err(Error::InvalidLine);
        }

        let blob = PublicKeyBlob::try_from(STANDARD.decode(data)?)?;
        if blob.name() != name {
            return Err(Error::AlgorithmNameMismatch {
                line: name.to_string(),
                blob: blob.name().to_string(),
            });
        }

        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(OpenSshPublicKey { blob, comment })
    }
}

impl DecodableFrom<&str> for OpenSshPublicKey {}

impl Decoder<&str, OpenSshPublicKey> for &str {
    type Error = Error;

    fn decode(&self) -> Result<OpenSshPublicKey> {
        OpenSshPublicKey::from_str(self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use std::str::FromStr;

    use super::{OpenSshPublicKey, sniff};
    use kagi::ErrorKind;

    const RSA_1024: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAAAgQDBiSyWjTrRZJA0jfwgrOJ0Rey3uYj00Xl+9lGhwzBH3QmZz50V++Iz2Fl5pEKntYXCtWv8CSvO3Ow0tNP8p+cRSaOxDBGSSmPdO9IaZuQ9GU0a5DUHNMICTY3t6O+xWtmQ9NMLv+EOBVp9r9/6QyYkc9IZz0PqMQznl9EhPiT2Cw== dblevins@mingus.lan\n";

    const EC_P256: &str = "ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBGBLQU9MOx3EvYhh2mV8paxhG9tWqPrsNy4efKFbvVTX5vx3IVSla7oOqm94893I4ByDdxI3c+BUFPUAqUnOnRw= dblevins@mingus.lan\n";

    #[rstest(
        input,
        name,
        case(RSA_1024, "ssh-rsa"),
        case(EC_P256, "ecdsa-sha2-nistp256")
    )]
    fn test_parse_and_reproduce(input: &str, name: &str) {
        let key = OpenSshPublicKey::from_str(input).unwrap();
        assert_eq!(key.blob().name(), name);
        assert_eq!(key.comment(), Some("dblevins@mingus.lan"));
        assert_eq!(key.to_string(), input);
    }

    #[test]
    fn test_without_comment() {
        let line = RSA_1024.trim_end().trim_end_matches(" dblevins@mingus.lan");
        let key = OpenSshPublicKey::from_str(line).unwrap();
        assert_eq!(key.comment(), None);
        assert_eq!(key.to_string(), format!("{}\n", line));
    }

    #[test]
    fn test_comment_with_spaces() {
        let line = RSA_1024.replace("dblevins@mingus.lan", "work laptop  key");
        let key = OpenSshPublicKey::from_str(&line).unwrap();
        assert_eq!(key.comment(), Some("work laptop  key"));
    }

    #[test]
    fn test_leading_whitespace_and_crlf() {
        let line = format!("  \n{}", RSA_1024.replace('\n', "\r\n"));
        let key = OpenSshPublicKey::from_str(&line).unwrap();
        assert_eq!(key.comment(), Some("dblevins@mingus.lan"));
    }

    #[rstest(
        input,
        kind,
        case("ssh-rsa", ErrorKind::UnknownFormat),
        case("ssh-rsa AAAA!", ErrorKind::UnknownFormat),
        case("ssh-rsa AAAAB3NzaC1yc2E", ErrorKind::MalformedBase64),
        // token says ssh-dss, blob says ssh-rsa
        case("ssh-dss AAAAB3NzaC1yc2EAAAADAQABAAAAAQE=", ErrorKind::UnknownAlgorithmName),
        case("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAAAAQE= a\nssh-rsa AAAA", ErrorKind::TrailingBytes)
    )]
    fn test_parse_error(input: &str, kind: ErrorKind) {
        assert_eq!(OpenSshPublicKey::from_str(input).unwrap_err().kind(), kind);
    }

    #[rstest(
        input,
        expected,
        case(RSA_1024, true),
        case("  ssh-ed25519 AAAAC3NzaC1lZDI1NTE5", true),
        case("-----BEGIN PUBLIC KEY-----", false),
        case("---- BEGIN SSH2 PUBLIC KEY ----", false),
        case("hello", false)
    )]
    fn test_sniff(input: &str, expected: bool) {
        assert_eq!(expected, sniff(input));
    }
}
