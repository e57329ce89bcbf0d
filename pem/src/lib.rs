pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use error::{Error, Result};
use kagi::decoder::{DecodableFrom, Decoder};
use regex::Regex;

/// RFC 7468: generators wrap base64 text at 64 characters.
pub const PEM_LINE_WIDTH: usize = 64;

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const DSA_PRIVATE_KEY_LABEL: &str = "DSA PRIVATE KEY";
const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

const PROC_TYPE_HEADER: &str = "Proc-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// PKCS#8 private key (non-encrypted)
    PrivateKey,
    /// PKCS#8 encrypted private key
    EncryptedPrivateKey,
    /// PKCS#1 RSA private key
    RsaPrivateKey,
    /// OpenSSL traditional DSA private key
    DsaPrivateKey,
    /// SEC1 EC private key
    EcPrivateKey,
    /// X.509 SubjectPublicKeyInfo
    PublicKey,
    /// PKCS#1 RSA public key
    RsaPublicKey,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::PrivateKey => PRIVATE_KEY_LABEL,
            Label::EncryptedPrivateKey => ENCRYPTED_PRIVATE_KEY_LABEL,
            Label::RsaPrivateKey => RSA_PRIVATE_KEY_LABEL,
            Label::DsaPrivateKey => DSA_PRIVATE_KEY_LABEL,
            Label::EcPrivateKey => EC_PRIVATE_KEY_LABEL,
            Label::PublicKey => PUBLIC_KEY_LABEL,
            Label::RsaPublicKey => RSA_PUBLIC_KEY_LABEL,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            PRIVATE_KEY_LABEL => Ok(Label::PrivateKey),
            ENCRYPTED_PRIVATE_KEY_LABEL => Ok(Label::EncryptedPrivateKey),
            RSA_PRIVATE_KEY_LABEL => Ok(Label::RsaPrivateKey),
            DSA_PRIVATE_KEY_LABEL => Ok(Label::DsaPrivateKey),
            EC_PRIVATE_KEY_LABEL => Ok(Label::EcPrivateKey),
            PUBLIC_KEY_LABEL => Ok(Label::PublicKey),
            RSA_PUBLIC_KEY_LABEL => Ok(Label::RsaPublicKey),
            _ => Err(Error::UnsupportedLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Begin,
    End,
}

/// Recognizes `-----BEGIN <label>-----` / `-----END <label>-----` lines.
fn parse_boundary(line: &str) -> Result<Option<(Marker, &str)>> {
    let re = Regex::new(r"^-----(BEGIN|END) ([A-Z0-9 ]+)-----\s*$")
        .map_err(|_| Error::InvalidEncapsulationBoundary)?;
    let Some(captured) = re.captures(line.trim_start()) else {
        return Ok(None);
    };
    let (Some(marker), Some(label)) = (captured.get(1), captured.get(2)) else {
        return Err(Error::InvalidEncapsulationBoundary);
    };
    let marker = if marker.as_str() == "BEGIN" {
        Marker::Begin
    } else {
        Marker::End
    };
    Ok(Some((marker, label.as_str())))
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
     https://www.rfc-editor.org/rfc/rfc1421.html#section-4.6 (headers)
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    headers: Vec<(String, String)>,
    base64_data: String, // base64 encoded data, whitespace removed
}

impl Pem {
    pub fn new(label: Label, base64_data: String) -> Self {
        Pem {
            label,
            headers: Vec::new(),
            base64_data,
        }
    }

    pub fn from_bytes(label: Label, data: &[u8]) -> Self {
        Pem::new(label, STANDARD.encode(data))
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Looks up a header value; names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }

    /// True for PKCS#8 `ENCRYPTED PRIVATE KEY` blocks and for traditional
    /// blocks carrying `Proc-Type: 4,ENCRYPTED`.
    pub fn is_encrypted(&self) -> bool {
        self.label == Label::EncryptedPrivateKey
            || self
                .header(PROC_TYPE_HEADER)
                .is_some_and(|v| v.split(',').any(|p| p.trim() == "ENCRYPTED"))
    }

    /// Renders the block with base64 lines wrapped at `line_width` columns.
    pub fn to_string_wrapped(&self, line_width: usize) -> String {
        let line_width = line_width.max(4);
        let mut out = String::with_capacity(self.base64_data.len() * 2);
        out.push_str(&format!("-----BEGIN {}-----\n", self.label));
        if !self.headers.is_empty() {
            for (name, value) in &self.headers {
                out.push_str(&format!("{}: {}\n", name, value));
            }
            out.push('\n');
        }
        // base64 output is ASCII, so splitting on byte boundaries is safe
        let mut rest = self.base64_data.as_str();
        while !rest.is_empty() {
            let (line, tail) = rest.split_at(line_width.min(rest.len()));
            out.push_str(line);
            out.push('\n');
            rest = tail;
        }
        out.push_str(&format!("-----END {}-----\n", self.label));
        out
    }
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_wrapped(PEM_LINE_WIDTH))
    }
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>> {
        // This discards label and header information from the Pem.
        Ok(STANDARD.decode(self.data())?)
    }
}

impl DecodableFrom<String> for Pem {}

impl Decoder<String, Pem> for String {
    type Error = Error;

    fn decode(&self) -> Result<Pem> {
        Pem::from_str(self)
    }
}

impl DecodableFrom<&str> for Pem {}

impl Decoder<&str, Pem> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Pem> {
        Pem::from_str(self)
    }
}

/*
* explanatory text -> pre-eb -> headers -> blank -> base64 -> post-eb
*                            |______________________^
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum PemParsingState {
    #[default]
    Init,
    Headers,
    Base64,
    PostEncapsulationBoundary,
}

impl FromStr for Pem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut state = PemParsingState::default();
        let mut begin_label = "";
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut base64_data = String::new();

        for line in s.lines() {
            match state {
                PemParsingState::Init => {
                    // explanatory text before the boundary is ignored
                    if let Some((Marker::Begin, label)) = parse_boundary(line)? {
                        begin_label = label;
                        state = PemParsingState::Headers;
                    }
                }
                PemParsingState::Headers => {
                    if line.trim().is_empty() {
                        if !headers.is_empty() {
                            state = PemParsingState::Base64;
                        }
                        continue;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        headers.push((name.trim().to_string(), value.trim().to_string()));
                        continue;
                    }
                    if line.starts_with([' ', '\t']) {
                        if let Some((_, value)) = headers.last_mut() {
                            value.push_str(line.trim());
                            continue;
                        }
                    }
                    state = PemParsingState::Base64;
                    if Self::take_body_line(line, begin_label, &mut base64_data)? {
                        state = PemParsingState::PostEncapsulationBoundary;
                    }
                }
                PemParsingState::Base64 => {
                    if Self::take_body_line(line, begin_label, &mut base64_data)? {
                        state = PemParsingState::PostEncapsulationBoundary;
                    }
                }
                PemParsingState::PostEncapsulationBoundary => break,
            }
        }

        match state {
            PemParsingState::Init => return Err(Error::MissingPreEncapsulationBoundary),
            PemParsingState::Headers | PemParsingState::Base64 => {
                return Err(Error::MissingPostEncapsulationBoundary);
            }
            PemParsingState::PostEncapsulationBoundary => {}
        }

        if base64_data.is_empty() {
            return Err(Error::MissingData);
        }

        let label = Label::from_str(begin_label)?;
        Ok(Pem {
            label,
            headers,
            base64_data,
        })
    }
}

impl Pem {
    /// Appends a body line; returns true when the line closes the block.
    fn take_body_line(line: &str, begin_label: &str, body: &mut String) -> Result<bool> {
        match parse_boundary(line)? {
            Some((Marker::End, label)) if label == begin_label => Ok(true),
            Some((Marker::End, label)) => Err(Error::LabelMismatch {
                begin: begin_label.to_string(),
                end: label.to_string(),
            }),
            // a second BEGIN before END means this block was never closed
            Some((Marker::Begin, _)) => Err(Error::MissingPostEncapsulationBoundary),
            None => {
                body.extend(line.chars().filter(|c| !c.is_whitespace()));
                Ok(false)
            }
        }
    }
}
