use crate::attributes::{
    IceCandidate, IcePassword, IceUsernameFragment, RemoteCandidates, Rtcp, UnknownAttribute,
};
use crate::bandwidth::Bandwidth;
use crate::connection::Connection;
use crate::media::Media;
use crate::media_description::MediaDescription;
use crate::origin::Origin;
use crate::session_description::SessionDescription;
use crate::time::Time;
use crate::Direction;
use bytesstr::BytesStr;
use nom::Finish;
use nom::bytes::complete::take_while;
use nom::error::VerboseError;

pub(crate) type IResult<I, O> = nom::IResult<I, O, VerboseError<I>>;

/// Tuple of parsers, each applied after skipping any leading whitespace
pub(crate) trait WsTuple<'i, O> {
    fn parse(&mut self, i: &'i str) -> IResult<&'i str, O>;
}

pub(crate) fn ws<'i, O, T: WsTuple<'i, O>>(
    mut tuple: T,
) -> impl FnMut(&'i str) -> IResult<&'i str, O> {
    move |i| tuple.parse(i)
}

macro_rules! impl_ws_tuple {
    ($($o:ident $p:ident),+) => {
        impl<'i, $($o,)+ $($p,)+> WsTuple<'i, ($($o,)+)> for ($($p,)+)
        where
            $($p: FnMut(&'i str) -> IResult<&'i str, $o>,)+
        {
            #[allow(non_snake_case)]
            fn parse(&mut self, i: &'i str) -> IResult<&'i str, ($($o,)+)> {
                let ($($p,)+) = self;

                $(
                let (i, _) = take_while(|c: char| c.is_ascii_whitespace())(i)?;
                let (i, $o) = ($p)(i)?;
                )+

                Ok((i, ($($o,)+)))
            }
        }
    };
}

impl_ws_tuple!(A PA);
impl_ws_tuple!(A PA, B PB);
impl_ws_tuple!(A PA, B PB, C PC);
impl_ws_tuple!(A PA, B PB, C PC, D PD);
impl_ws_tuple!(A PA, B PB, C PC, D PD, E PE);
impl_ws_tuple!(A PA, B PB, C PC, D PD, E PE, F PF);

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseSessionDescriptionError {
    #[error("sdp is missing its {0}= line")]
    MissingLine(char),
    #[error("invalid {line}= line")]
    InvalidLine {
        line: char,
        error: VerboseError<String>,
    },
    #[error("sdp contains a line without a `=` separator")]
    MissingEquals,
}

fn complete<O>(
    line: char,
    result: IResult<&str, O>,
) -> Result<O, ParseSessionDescriptionError> {
    match result.finish() {
        Ok((_, o)) => Ok(o),
        Err(e) => Err(ParseSessionDescriptionError::InvalidLine {
            line,
            error: VerboseError {
                errors: e
                    .errors
                    .into_iter()
                    .map(|(i, kind)| (i.into(), kind))
                    .collect(),
            },
        }),
    }
}

pub(crate) fn parse_session_description(
    src: &BytesStr,
) -> Result<SessionDescription, ParseSessionDescriptionError> {
    let mut origin = None;
    let mut name = None;
    let mut connection = None;
    let mut bandwidth = vec![];
    let mut time = None;
    let mut ice_lite = false;
    let mut ice_ufrag = None;
    let mut ice_pwd = None;
    let mut attributes = vec![];
    let mut media_descriptions: Vec<MediaDescription> = vec![];

    for line in src.split('\n') {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            continue;
        }

        let (ty, value) = line
            .split_once('=')
            .ok_or(ParseSessionDescriptionError::MissingEquals)?;

        match ty {
            "v" => {
                // version is always 0, nothing to keep
            }
            "o" => origin = Some(complete('o', Origin::parse(src.as_ref())(value))?),
            "s" => name = Some(BytesStr::from_parse(src.as_ref(), value)),
            "c" => {
                let conn = complete('c', Connection::parse(src.as_ref())(value))?;

                if let Some(media) = media_descriptions.last_mut() {
                    media.connection = Some(conn);
                } else {
                    connection = Some(conn);
                }
            }
            "b" => {
                let bw = complete('b', Bandwidth::parse(src.as_ref())(value))?;

                if let Some(media) = media_descriptions.last_mut() {
                    media.bandwidth.push(bw);
                } else {
                    bandwidth.push(bw);
                }
            }
            "t" => time = Some(complete('t', Time::parse(value))?),
            "m" => {
                let media = complete('m', Media::parse(src.as_ref())(value))?;
                media_descriptions.push(MediaDescription::new(media));
            }
            "a" => {
                let (attr_name, attr_value) = match value.split_once(':') {
                    Some((name, value)) => (name, Some(value)),
                    None => (value, None),
                };

                if let Some(media) = media_descriptions.last_mut() {
                    parse_media_attribute(src, media, attr_name, attr_value, value);
                } else {
                    match (attr_name, attr_value) {
                        ("ice-lite", _) => ice_lite = true,
                        ("ice-ufrag", Some(ufrag)) => {
                            ice_ufrag = Some(IceUsernameFragment {
                                ufrag: BytesStr::from_parse(src.as_ref(), ufrag),
                            });
                        }
                        ("ice-pwd", Some(pwd)) => {
                            ice_pwd = Some(IcePassword {
                                pwd: BytesStr::from_parse(src.as_ref(), pwd),
                            });
                        }
                        _ => attributes.push(UnknownAttribute::parse(src.as_ref(), value)),
                    }
                }
            }
            _ => {
                // ignore all other line types
            }
        }
    }

    Ok(SessionDescription {
        origin: origin.ok_or(ParseSessionDescriptionError::MissingLine('o'))?,
        name: name.ok_or(ParseSessionDescriptionError::MissingLine('s'))?,
        connection,
        bandwidth,
        time: time.ok_or(ParseSessionDescriptionError::MissingLine('t'))?,
        ice_lite,
        ice_ufrag,
        ice_pwd,
        attributes,
        media_descriptions,
    })
}

/// Media level attributes which fail to parse are demoted to an
/// [`UnknownAttribute`] instead of failing the surrounding session, so a
/// single bad candidate line never invalidates the whole description.
fn parse_media_attribute(
    src: &BytesStr,
    media: &mut MediaDescription,
    name: &str,
    value: Option<&str>,
    raw: &str,
) {
    match (name, value) {
        ("candidate", Some(candidate)) => match IceCandidate::parse(src.as_ref(), candidate) {
            Ok(candidate) => media.ice_candidates.push(candidate),
            Err(_) => media.attributes.push(UnknownAttribute::parse(src.as_ref(), raw)),
        },
        ("ice-ufrag", Some(ufrag)) => {
            media.ice_ufrag = Some(IceUsernameFragment {
                ufrag: BytesStr::from_parse(src.as_ref(), ufrag),
            });
        }
        ("ice-pwd", Some(pwd)) => {
            media.ice_pwd = Some(IcePassword {
                pwd: BytesStr::from_parse(src.as_ref(), pwd),
            });
        }
        ("ice-mismatch", _) => media.ice_mismatch = true,
        ("remote-candidates", Some(candidates)) => match RemoteCandidates::parse(candidates) {
            Ok(candidates) => media.remote_candidates = Some(candidates),
            Err(_) => media.attributes.push(UnknownAttribute::parse(src.as_ref(), raw)),
        },
        ("rtcp", Some(rtcp)) => match Rtcp::parse(src.as_ref())(rtcp).finish() {
            Ok((_, rtcp)) => media.rtcp = Some(rtcp),
            Err(_) => media.attributes.push(UnknownAttribute::parse(src.as_ref(), raw)),
        },
        ("sendrecv", None) => media.direction = Direction::SendRecv,
        ("sendonly", None) => media.direction = Direction::SendOnly,
        ("recvonly", None) => media.direction = Direction::RecvOnly,
        ("inactive", None) => media.direction = Direction::Inactive,
        _ => media.attributes.push(UnknownAttribute::parse(src.as_ref(), raw)),
    }
}
