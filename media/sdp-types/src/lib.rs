#![warn(unreachable_pub)]

use nom::character::complete::{char, digit1};
use nom::combinator::map_res;
use nom::sequence::preceded;
use parser::IResult;
use std::str::FromStr;

mod attributes;
mod bandwidth;
mod connection;
mod media;
mod media_description;
mod origin;
mod parser;
mod session_description;
mod tagged_address;
mod time;

pub use attributes::{
    CandidateKind, CandidateTransport, Direction, IceCandidate, IcePassword,
    IceUsernameFragment, InvalidCandidateParamError, RemoteCandidate, RemoteCandidates, Rtcp,
    TcpType, UnknownAttribute, format_timestamp, parse_timestamp, zero_timestamp,
};
pub use bandwidth::Bandwidth;
pub use connection::Connection;
pub use media::{Media, MediaType, TransportProtocol};
pub use media_description::MediaDescription;
pub use origin::Origin;
pub use parser::ParseSessionDescriptionError;
pub use session_description::SessionDescription;
pub use tagged_address::TaggedAddress;
pub use time::Time;

fn slash_num(i: &str) -> IResult<&str, u32> {
    preceded(char('/'), map_res(digit1, FromStr::from_str))(i)
}

fn not_whitespace(c: char) -> bool {
    !c.is_ascii_whitespace()
}

fn probe_host(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn probe_host6(c: char) -> bool {
    probe_host(c) || c == ':'
}
