use crate::bandwidth::Bandwidth;
use crate::connection::Connection;
use crate::media_description::MediaDescription;
use crate::origin::Origin;
use crate::parser::{ParseSessionDescriptionError, parse_session_description};
use crate::time::Time;
use crate::{IcePassword, IceUsernameFragment, UnknownAttribute};
use bytesstr::BytesStr;
use std::fmt;

/// A complete SDP session description
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5)
#[derive(Debug, Clone)]
pub struct SessionDescription {
    /// Origin (o field)
    pub origin: Origin,

    /// Session name (s field)
    pub name: BytesStr,

    /// Optional connection (c field)
    pub connection: Option<Connection>,

    /// Bandwidth (b fields)
    pub bandwidth: Vec<Bandwidth>,

    /// Session start/stop time (t field)
    pub time: Time,

    /// Peer is only using ice-lite
    pub ice_lite: bool,

    /// ICE username fragment, can also be set at media level
    pub ice_ufrag: Option<IceUsernameFragment>,

    /// ICE password, can also be set at media level
    pub ice_pwd: Option<IcePassword>,

    /// All attributes not parsed directly
    pub attributes: Vec<UnknownAttribute>,

    /// Media descriptions
    pub media_descriptions: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn parse(src: &BytesStr) -> Result<Self, ParseSessionDescriptionError> {
        parse_session_description(src)
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v=0\r\n")?;
        write!(f, "o={}\r\n", self.origin)?;
        write!(f, "s={}\r\n", self.name)?;

        if let Some(conn) = &self.connection {
            write!(f, "c={conn}\r\n")?;
        }

        for bw in &self.bandwidth {
            write!(f, "b={bw}\r\n")?;
        }

        write!(f, "t={}\r\n", self.time)?;

        if self.ice_lite {
            write!(f, "a=ice-lite\r\n")?;
        }

        if let Some(ufrag) = &self.ice_ufrag {
            write!(f, "a=ice-ufrag:{}\r\n", ufrag.ufrag)?;
        }

        if let Some(pwd) = &self.ice_pwd {
            write!(f, "a=ice-pwd:{}\r\n", pwd.pwd)?;
        }

        for attr in &self.attributes {
            write!(f, "{attr}\r\n")?;
        }

        for media_description in &self.media_descriptions {
            write!(f, "{media_description}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CandidateKind, Direction, MediaType, TaggedAddress, TransportProtocol};
    use std::net::{IpAddr, Ipv4Addr};

    const SDP: &str = "\
v=0\r
o=- 3933064763 3933064763 IN IP4 192.168.2.1\r
s=brine\r
c=IN IP4 192.168.2.1\r
t=0 0\r
m=audio 4000 RTP/AVP 0 8\r
a=sendrecv\r
a=rtcp:4001 IN IP4 192.168.2.1\r
a=ice-ufrag:8hhY\r
a=ice-pwd:asd88fgpdd777uzjYhagZg\r
a=candidate:Hc0a80201 1 UDP 1694498815 192.168.2.1 4000 typ host Enabled START:2013-05-04_10:20:30.100 END:2013-05-04_10:50:30.100\r
a=candidate:bogus line which cannot be parsed\r
a=X-adapter1:some-user\r
";

    #[test]
    fn parse_sdp() {
        let sdp = SessionDescription::parse(&BytesStr::from_static(SDP)).unwrap();

        assert_eq!(sdp.name, "brine");
        assert_eq!(
            sdp.connection.as_ref().unwrap().address,
            TaggedAddress::IP4(Ipv4Addr::new(192, 168, 2, 1))
        );
        assert!(!sdp.ice_lite);

        let media = &sdp.media_descriptions[0];

        assert_eq!(media.media.media_type, MediaType::Audio);
        assert_eq!(media.media.port, 4000);
        assert_eq!(media.media.proto, TransportProtocol::RtpAvp);
        assert_eq!(media.direction, Direction::SendRecv);
        assert_eq!(media.rtcp.as_ref().unwrap().port, 4001);
        assert_eq!(media.ice_ufrag.as_ref().unwrap().ufrag, "8hhY");
        assert_eq!(media.ice_pwd.as_ref().unwrap().pwd, "asd88fgpdd777uzjYhagZg");

        // the malformed candidate must not invalidate the parse, it is
        // demoted to an unknown attribute instead
        assert_eq!(media.ice_candidates.len(), 1);
        assert_eq!(media.ice_candidates[0].kind, CandidateKind::Host);
        assert_eq!(
            media.ice_candidates[0].address,
            IpAddr::V4(Ipv4Addr::new(192, 168, 2, 1))
        );

        assert_eq!(media.attributes.len(), 2);
        assert_eq!(media.attributes[0].name, "candidate");
        assert_eq!(media.attributes[1].name, "X-adapter1");
        assert_eq!(media.attributes[1].value.as_ref().unwrap(), "some-user");
    }

    #[test]
    fn parse_print_parse() {
        let sdp = SessionDescription::parse(&BytesStr::from_static(SDP)).unwrap();

        let printed = BytesStr::from(sdp.to_string());
        let reparsed = SessionDescription::parse(&printed).unwrap();

        assert_eq!(reparsed.media_descriptions[0].ice_candidates.len(), 1);
        assert_eq!(reparsed.to_string(), printed.as_str());
    }

    #[test]
    fn parse_session_level_ice() {
        let sdp = "\
v=0\r
o=- 1 1 IN IP4 10.0.0.1\r
s=-\r
c=IN IP4 10.0.0.1\r
t=0 0\r
a=ice-lite\r
a=ice-ufrag:u1\r
a=ice-pwd:p1\r
m=audio 5000 RTP/AVP 0\r
a=ice-mismatch\r
";

        let sdp = SessionDescription::parse(&BytesStr::from_static(sdp)).unwrap();

        assert!(sdp.ice_lite);
        assert_eq!(sdp.ice_ufrag.unwrap().ufrag, "u1");
        assert_eq!(sdp.ice_pwd.unwrap().pwd, "p1");
        assert!(sdp.media_descriptions[0].ice_mismatch);
    }
}
