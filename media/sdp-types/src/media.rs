use crate::not_whitespace;
use crate::parser::{IResult, ws};
use crate::slash_num;
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::character::complete::digit1;
use nom::combinator::{map, map_res, opt};
use nom::error::context;
use std::fmt;
use std::str::FromStr;

/// Media field (`m=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.14)
#[derive(Debug, Clone)]
pub struct Media {
    pub media_type: MediaType,
    pub port: u16,
    pub ports_num: Option<u32>,
    pub proto: TransportProtocol,
    pub fmts: Vec<BytesStr>,
}

impl Media {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            let (i, (media_type, port, ports_num, proto)) = context(
                "parsing media",
                ws((
                    map(take_while1(not_whitespace), |t| MediaType::from_parse(src, t)),
                    map_res(digit1, FromStr::from_str),
                    opt(slash_num),
                    map(take_while1(not_whitespace), |p| {
                        TransportProtocol::from_parse(src, p)
                    }),
                )),
            )(i)?;

            let fmts = i
                .split_ascii_whitespace()
                .map(|fmt| BytesStr::from_parse(src, fmt))
                .collect();

            Ok(("", Media {
                media_type,
                port,
                ports_num,
                proto,
                fmts,
            }))
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.media_type, self.port)?;

        if let Some(num) = self.ports_num {
            write!(f, "/{num}")?;
        }

        write!(f, " {}", self.proto)?;

        for fmt in &self.fmts {
            write!(f, " {fmt}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    Video,
    Application,
    Other(BytesStr),
}

impl MediaType {
    fn from_parse(src: &Bytes, i: &str) -> Self {
        match i {
            "audio" => MediaType::Audio,
            "video" => MediaType::Video,
            "application" => MediaType::Application,
            _ => MediaType::Other(BytesStr::from_parse(src, i)),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaType::Audio => f.write_str("audio"),
            MediaType::Video => f.write_str("video"),
            MediaType::Application => f.write_str("application"),
            MediaType::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportProtocol {
    /// RTP over UDP, the only protocol the ICE media transport negotiates
    RtpAvp,
    Other(BytesStr),
}

impl TransportProtocol {
    fn from_parse(src: &Bytes, i: &str) -> Self {
        if i.eq_ignore_ascii_case("RTP/AVP") {
            TransportProtocol::RtpAvp
        } else {
            TransportProtocol::Other(BytesStr::from_parse(src, i))
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportProtocol::RtpAvp => f.write_str("RTP/AVP"),
            TransportProtocol::Other(other) => f.write_str(other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn media() {
        let input = BytesStr::from_static("audio 49170 RTP/AVP 0 8 97");

        let (rem, media) = Media::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(media.media_type, MediaType::Audio);
        assert_eq!(media.port, 49170);
        assert_eq!(media.ports_num, None);
        assert_eq!(media.proto, TransportProtocol::RtpAvp);
        assert_eq!(media.fmts, ["0", "8", "97"]);
        assert_eq!(media.to_string(), "audio 49170 RTP/AVP 0 8 97");
    }

    #[test]
    fn media_other_proto() {
        let input = BytesStr::from_static("application 5000/2 UDP/DTLS 120");

        let (rem, media) = Media::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(media.media_type, MediaType::Application);
        assert_eq!(media.ports_num, Some(2));
        assert_eq!(media.proto, TransportProtocol::Other("UDP/DTLS".into()));
    }
}
