use crate::parser::IResult;
use crate::slash_num;
use crate::tagged_address::TaggedAddress;
use bytes::Bytes;
use nom::combinator::{map, opt};
use nom::error::context;
use nom::sequence::tuple;
use std::fmt;

/// Connection field (`c=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.7)
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub address: TaggedAddress,

    /// TTL when `address` is a multicast address
    pub ttl: Option<u32>,

    /// Number of addresses starting from `address`
    pub num: Option<u32>,
}

impl Connection {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing connection",
                map(
                    tuple((TaggedAddress::parse(src), opt(slash_num), opt(slash_num))),
                    |(address, ttl, num)| Connection { address, ttl, num },
                ),
            )(i)
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.address)?;

        if let Some(ttl) = self.ttl {
            write!(f, "/{ttl}")?;
        }

        if let Some(num) = self.num {
            write!(f, "/{num}")?;
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
    fn connection() {
        let input = BytesStr::from_static("IN IP4 10.10.2.99");

        let (rem, conn) = Connection::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(conn.address, TaggedAddress::IP4(Ipv4Addr::new(10, 10, 2, 99)));
        assert_eq!(conn.ttl, None);
        assert_eq!(conn.num, None);
    }

    #[test]
    fn connection_multicast() {
        let input = BytesStr::from_static("IN IP4 224.2.36.42/127/3");

        let (rem, conn) = Connection::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(conn.ttl, Some(127));
        assert_eq!(conn.num, Some(3));
        assert_eq!(conn.to_string(), "IN IP4 224.2.36.42/127/3");
    }
}
