use crate::not_whitespace;
use crate::parser::{IResult, ws};
use crate::tagged_address::TaggedAddress;
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::combinator::map;
use nom::error::context;
use std::fmt;

/// Origin field (`o=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.2)
#[derive(Debug, Clone)]
pub struct Origin {
    pub username: BytesStr,
    pub session_id: BytesStr,
    pub session_version: BytesStr,
    pub address: TaggedAddress,
}

impl Origin {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing origin",
                map(
                    ws((
                        map(take_while1(not_whitespace), |v| BytesStr::from_parse(src, v)),
                        map(take_while1(not_whitespace), |v| BytesStr::from_parse(src, v)),
                        map(take_while1(not_whitespace), |v| BytesStr::from_parse(src, v)),
                        TaggedAddress::parse(src),
                    )),
                    |(username, session_id, session_version, address)| Origin {
                        username,
                        session_id,
                        session_version,
                        address,
                    },
                ),
            )(i)
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.username, self.session_id, self.session_version, self.address
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn origin() {
        let input = BytesStr::from_static("- 3933064763 3933064763 IN IP4 192.168.178.2");

        let (rem, origin) = Origin::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(origin.username, "-");
        assert_eq!(origin.session_id, "3933064763");
        assert_eq!(origin.session_version, "3933064763");
        assert_eq!(origin.to_string(), "- 3933064763 3933064763 IN IP4 192.168.178.2");
    }
}
