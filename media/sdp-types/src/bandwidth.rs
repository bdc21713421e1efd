use crate::parser::IResult;
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res};
use nom::error::context;
use nom::sequence::{preceded, tuple};
use std::fmt;
use std::str::FromStr;

/// Bandwidth field (`b=`), e.g. `b=RS:0`
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.8)
#[derive(Debug, Clone, PartialEq)]
pub struct Bandwidth {
    pub modifier: BytesStr,
    pub value: u32,
}

impl Bandwidth {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing bandwidth",
                map(
                    tuple((
                        map(take_while1(|c| c != ':'), |modifier| {
                            BytesStr::from_parse(src, modifier)
                        }),
                        preceded(char(':'), map_res(digit1, FromStr::from_str)),
                    )),
                    |(modifier, value)| Bandwidth { modifier, value },
                ),
            )(i)
        }
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.modifier, self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bandwidth() {
        let input = BytesStr::from_static("RS:0");

        let (rem, bw) = Bandwidth::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(bw.modifier, "RS");
        assert_eq!(bw.value, 0);
        assert_eq!(bw.to_string(), "RS:0");
    }
}
