use crate::parser::IResult;
use crate::{probe_host, probe_host6};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::combinator::map;
use nom::error::context;
use nom::sequence::preceded;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address in the `IN IP4`/`IN IP6` notation used by `o=`, `c=` and `a=rtcp`
/// lines. Hostnames are kept as-is since they may only be resolved by the
/// application.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedAddress {
    IP4(Ipv4Addr),
    IP4FQDN(BytesStr),

    IP6(Ipv6Addr),
    IP6FQDN(BytesStr),
}

impl TaggedAddress {
    /// Returns the address as [`IpAddr`] if it is an IP literal
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self {
            TaggedAddress::IP4(ip) => Some(IpAddr::V4(*ip)),
            TaggedAddress::IP6(ip) => Some(IpAddr::V6(*ip)),
            TaggedAddress::IP4FQDN(_) | TaggedAddress::IP6FQDN(_) => None,
        }
    }

    /// Returns true if the address is tagged `IN IP4`
    pub fn is_ip4(&self) -> bool {
        matches!(self, TaggedAddress::IP4(_) | TaggedAddress::IP4FQDN(_))
    }

    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing tagged address",
                alt((
                    preceded(
                        tag("IN IP4 "),
                        map(take_while(probe_host), |ip4_host: &str| {
                            if let Ok(addr) = ip4_host.parse() {
                                TaggedAddress::IP4(addr)
                            } else {
                                TaggedAddress::IP4FQDN(BytesStr::from_parse(src, ip4_host))
                            }
                        }),
                    ),
                    preceded(
                        tag("IN IP6 "),
                        map(take_while(probe_host6), |ip6_host: &str| {
                            if let Ok(addr) = ip6_host.parse() {
                                TaggedAddress::IP6(addr)
                            } else {
                                TaggedAddress::IP6FQDN(BytesStr::from_parse(src, ip6_host))
                            }
                        }),
                    ),
                )),
            )(i)
        }
    }
}

impl From<IpAddr> for TaggedAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(ip) => Self::IP4(ip),
            IpAddr::V6(ip) => Self::IP6(ip),
        }
    }
}

impl fmt::Display for TaggedAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaggedAddress::IP4(addr) => write!(f, "IN IP4 {addr}"),
            TaggedAddress::IP4FQDN(fqdn) => write!(f, "IN IP4 {fqdn}"),
            TaggedAddress::IP6(addr) => write!(f, "IN IP6 {addr}"),
            TaggedAddress::IP6FQDN(fqdn) => write!(f, "IN IP6 {fqdn}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_ip4() {
        let input = BytesStr::from_static("IN IP4 192.168.123.222");

        let (rem, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(addr, TaggedAddress::IP4(Ipv4Addr::new(192, 168, 123, 222)));
        assert_eq!(addr.to_string(), "IN IP4 192.168.123.222");
    }

    #[test]
    fn address_ip4_fqdn() {
        let input = BytesStr::from_static("IN IP4 example.com");

        let (rem, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(addr, TaggedAddress::IP4FQDN("example.com".into()));
        assert_eq!(addr.ip_addr(), None);
    }

    #[test]
    fn address_ip6() {
        let input = BytesStr::from_static("IN IP6 ::1");

        let (rem, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(addr, TaggedAddress::IP6(Ipv6Addr::LOCALHOST));
        assert!(!addr.is_ip4());
        assert_eq!(addr.to_string(), "IN IP6 ::1");
    }
}
