// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal reader for the primary HDU of the FITS files MCFOST writes.

use crate::errors::LoadError;
use flate2::read::MultiGzDecoder;
use std::fs::OpenOptions;
use std::io::{BufReader, Read, Write};
use std::path::Path;

pub const BLOCK_LEN: usize = 2880;
pub const CARD_LEN: usize = 80;

#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Commentary cards and keys with no value.
    Empty,
}

impl HeaderValue {
    fn parse(raw: &str) -> HeaderValue {
        let raw = raw.trim_start();
        if let Some(rest) = raw.strip_prefix('\'') {
            // Quotes inside strings are doubled.
            let mut s = String::new();
            let mut chars = rest.chars().peekable();
            while let Some(c) = chars.next() {
                if c == '\'' {
                    if chars.peek() == Some(&'\'') {
                        s.push('\'');
                        chars.next();
                    } else {
                        break;
                    }
                } else {
                    s.push(c);
                }
            }
            return HeaderValue::Str(s.trim_end().to_string());
        }
        let v = raw.split('/').next().unwrap_or("").trim();
        match v {
            "" => HeaderValue::Empty,
            "T" => HeaderValue::Bool(true),
            "F" => HeaderValue::Bool(false),
            _ => {
                if let Ok(i) = v.parse::<i64>() {
                    HeaderValue::Int(i)
                } else if let Ok(x) = v.replace('D', "E").parse::<f64>() {
                    HeaderValue::Float(x)
                } else {
                    HeaderValue::Str(v.to_string())
                }
            }
        }
    }

    fn render(&self) -> String {
        match self {
            HeaderValue::Str(s) => {
                format!("'{:<8}'", s.replace('\'', "''"))
            }
            HeaderValue::Int(i) => format!("{:>20}", i),
            HeaderValue::Float(x) => format!("{:>20}", format!("{:E}", x)),
            HeaderValue::Bool(b) => {
                format!("{:>20}", if *b { "T" } else { "F" })
            }
            HeaderValue::Empty => String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    cards: Vec<(String, HeaderValue)>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            HeaderValue::Float(x) => Some(*x),
            HeaderValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            HeaderValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, LoadError> {
        self.get_f64(key)
            .ok_or_else(|| LoadError::MissingKey(key.to_string()))
    }

    fn require_i64(&self, key: &str) -> Result<i64, LoadError> {
        self.get_i64(key)
            .ok_or_else(|| LoadError::MissingKey(key.to_string()))
    }
}

/// A header/data unit. `shape[0]` is `NAXIS1`, the fastest varying
/// axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Hdu {
    pub header: Header,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// Read the primary HDU of `path`, decompressing `.gz` files.
pub fn read_primary(path: &Path) -> Result<Hdu, LoadError> {
    let f = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
    let f = BufReader::new(f);
    let gz = path.extension().map_or(false, |ext| ext == "gz");
    let r = if gz {
        parse_primary(MultiGzDecoder::new(f))
    } else {
        parse_primary(f)
    };
    r.map_err(|e| match e {
        LoadError::Io(_, e) => LoadError::Io(path.to_path_buf(), e),
        e => e,
    })
}

fn read_header<R: Read>(r: &mut R) -> Result<Header, LoadError> {
    let mut header = Header::default();
    let mut block = [0u8; BLOCK_LEN];
    loop {
        r.read_exact(&mut block)
            .map_err(|e| LoadError::Io(Default::default(), e))?;
        for card in block.chunks(CARD_LEN) {
            let key = String::from_utf8_lossy(&card[..8]).trim().to_string();
            if key == "END" {
                return Ok(header);
            }
            let value = if &card[8..10] == b"= " {
                HeaderValue::parse(&String::from_utf8_lossy(&card[10..]))
            } else {
                HeaderValue::Empty
            };
            if header.cards.is_empty() && key != "SIMPLE" {
                return Err(LoadError::BadHeader(format!(
                    "first keyword is {}, not SIMPLE",
                    key
                )));
            }
            header.cards.push((key, value));
        }
    }
}

/// Parse a primary HDU from a stream positioned at its start.
pub fn parse_primary<R: Read>(mut r: R) -> Result<Hdu, LoadError> {
    let header = read_header(&mut r)?;
    let bitpix = header.require_i64("BITPIX")?;
    let naxis = header.require_i64("NAXIS")?;
    let mut shape = Vec::with_capacity(naxis as usize);
    for ax in 1..=naxis {
        let n = header.require_i64(&format!("NAXIS{}", ax))?;
        if n < 0 {
            return Err(LoadError::BadHeader(format!(
                "NAXIS{} = {}",
                ax, n
            )));
        }
        shape.push(n as usize);
    }
    let count = if shape.is_empty() {
        0
    } else {
        shape.iter().product()
    };
    let width = match bitpix {
        8 | 16 | 32 | 64 | -32 | -64 => (bitpix.abs() / 8) as usize,
        b => return Err(LoadError::UnsupportedBitpix(b)),
    };
    let mut raw = vec![0u8; count * width];
    r.read_exact(&mut raw)
        .map_err(|e| LoadError::Io(Default::default(), e))?;

    let bscale = header.get_f64("BSCALE").unwrap_or(1.0);
    let bzero = header.get_f64("BZERO").unwrap_or(0.0);
    let data = raw
        .chunks(width)
        .map(|b| {
            let v = match bitpix {
                8 => b[0] as f64,
                16 => i16::from_be_bytes([b[0], b[1]]) as f64,
                32 => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
                64 => {
                    let mut a = [0u8; 8];
                    a.copy_from_slice(b);
                    i64::from_be_bytes(a) as f64
                }
                -32 => f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
                _ => {
                    let mut a = [0u8; 8];
                    a.copy_from_slice(b);
                    f64::from_be_bytes(a)
                }
            };
            bzero + bscale * v
        })
        .collect();
    Ok(Hdu {
        header,
        shape,
        data,
    })
}

/// Write a primary HDU of 32 bit floats. Extra cards follow the
/// mandatory ones.
pub fn write_primary<W: Write>(
    mut w: W,
    shape: &[usize],
    data: &[f32],
    cards: &[(&str, HeaderValue)],
) -> std::io::Result<()> {
    let mut lines = vec![
        ("SIMPLE".to_string(), HeaderValue::Bool(true)),
        ("BITPIX".to_string(), HeaderValue::Int(-32)),
        ("NAXIS".to_string(), HeaderValue::Int(shape.len() as i64)),
    ];
    for (ix, n) in shape.iter().enumerate() {
        lines.push((format!("NAXIS{}", ix + 1), HeaderValue::Int(*n as i64)));
    }
    lines.extend(cards.iter().map(|(k, v)| (k.to_string(), v.clone())));

    let mut header = String::new();
    for (k, v) in lines.iter() {
        let card = format!("{:<8}= {}", k, v.render());
        header.push_str(&format!("{:<80.80}", card));
    }
    header.push_str(&format!("{:<80}", "END"));
    while header.len() % BLOCK_LEN != 0 {
        header.push(' ');
    }
    w.write_all(header.as_bytes())?;

    let mut bytes = data
        .iter()
        .flat_map(|x| x.to_be_bytes().to_vec())
        .collect::<Vec<u8>>();
    while bytes.len() % BLOCK_LEN != 0 {
        bytes.push(0);
    }
    w.write_all(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn sample(w: impl Write) {
        write_primary(
            w,
            &[3, 2],
            &[1.0, 2.0, 3.0, 4.0, 5.0, -6.5],
            &[
                ("BUNIT", HeaderValue::Str("W.m-2.pixel-1".into())),
                ("CDELT2", HeaderValue::Float(1.5e-6)),
                ("OBJECT", HeaderValue::Str("it's".into())),
            ],
        )
        .unwrap();
    }

    #[test]
    fn reads_what_it_writes() {
        let mut buf = vec![];
        sample(&mut buf);
        assert_eq!(buf.len() % BLOCK_LEN, 0);
        let hdu = parse_primary(&buf[..]).unwrap();
        assert_eq!(hdu.shape, vec![3, 2]);
        assert_eq!(hdu.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, -6.5]);
        assert_eq!(hdu.header.get_str("BUNIT"), Some("W.m-2.pixel-1"));
        assert_eq!(hdu.header.get_str("OBJECT"), Some("it's"));
        let cdelt = hdu.header.get_f64("CDELT2").unwrap();
        assert!((cdelt - 1.5e-6).abs() < 1e-18);
    }

    #[test]
    fn reads_gzipped_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("RT.fits.gz");
        let f = std::fs::File::create(&path).unwrap();
        let mut enc = GzEncoder::new(f, Compression::default());
        sample(&mut enc);
        enc.finish().unwrap();
        let hdu = read_primary(&path).unwrap();
        assert_eq!(hdu.data.len(), 6);
    }

    #[test]
    fn parses_values() {
        assert_eq!(HeaderValue::parse("  42 / comment"), HeaderValue::Int(42));
        assert_eq!(HeaderValue::parse(" 1.0D-3"), HeaderValue::Float(1.0e-3));
        assert_eq!(HeaderValue::parse("  T"), HeaderValue::Bool(true));
        assert_eq!(
            HeaderValue::parse("'km/s    ' / unit"),
            HeaderValue::Str("km/s".into())
        );
    }

    #[test]
    fn rejects_garbage() {
        let buf = vec![b' '; BLOCK_LEN];
        assert!(matches!(
            parse_primary(&buf[..]),
            Err(LoadError::BadHeader(_))
        ));
    }
}
