use crate::parser::IResult;
use crate::tagged_address::TaggedAddress;
use bytes::Bytes;
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res, opt};
use nom::error::context;
use nom::sequence::{preceded, tuple};
use std::fmt;
use std::str::FromStr;

/// Rtcp attribute (`a=rtcp`)
///
/// Media level attribute
///
/// [RFC3605](https://www.rfc-editor.org/rfc/rfc3605#section-2.1)
#[derive(Debug, Clone, PartialEq)]
pub struct Rtcp {
    pub port: u16,

    /// Optional address, the connection address applies when absent
    pub address: Option<TaggedAddress>,
}

impl Rtcp {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing rtcp",
                map(
                    tuple((
                        map_res(digit1, FromStr::from_str),
                        opt(preceded(char(' '), TaggedAddress::parse(src))),
                    )),
                    |(port, address)| Rtcp { port, address },
                ),
            )(i)
        }
    }
}

impl fmt::Display for Rtcp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.port)?;

        if let Some(address) = &self.address {
            write!(f, " {address}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytesstr::BytesStr;
    use std::net::Ipv4Addr;

    #[test]
    fn rtcp_port_only() {
        let input = BytesStr::from_static("4001");

        let (rem, rtcp) = Rtcp::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(rtcp.port, 4001);
        assert_eq!(rtcp.address, None);
    }

    #[test]
    fn rtcp_with_address() {
        let input = BytesStr::from_static("4001 IN IP4 10.0.0.1");

        let (rem, rtcp) = Rtcp::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(rtcp.port, 4001);
        assert_eq!(
            rtcp.address,
            Some(TaggedAddress::IP4(Ipv4Addr::new(10, 0, 0, 1)))
        );
        assert_eq!(rtcp.to_string(), "4001 IN IP4 10.0.0.1");
    }
}
