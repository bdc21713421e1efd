use crate::bandwidth::Bandwidth;
use crate::connection::Connection;
use crate::media::Media;
use crate::{
    Direction, IceCandidate, IcePassword, IceUsernameFragment, RemoteCandidates, Rtcp,
    UnknownAttribute,
};
use std::fmt;

/// Part of the [`SessionDescription`](crate::SessionDescription) which
/// describes a single media stream
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.14)
#[derive(Debug, Clone)]
pub struct MediaDescription {
    /// Media description's media field (m=)
    pub media: Media,

    /// Optional connection (c field)
    pub connection: Option<Connection>,

    /// Optional bandwidths (b fields)
    pub bandwidth: Vec<Bandwidth>,

    /// Media direction attribute
    pub direction: Direction,

    /// rtcp attribute
    pub rtcp: Option<Rtcp>,

    /// ICE username fragment
    pub ice_ufrag: Option<IceUsernameFragment>,

    /// ICE password
    pub ice_pwd: Option<IcePassword>,

    /// ICE candidates
    pub ice_candidates: Vec<IceCandidate>,

    /// ICE a=ice-mismatch attribute
    pub ice_mismatch: bool,

    /// ICE a=remote-candidates attribute
    pub remote_candidates: Option<RemoteCandidates>,

    /// Additional attributes
    pub attributes: Vec<UnknownAttribute>,
}

impl MediaDescription {
    /// Create an empty media description from its `m=` line
    pub fn new(media: Media) -> Self {
        MediaDescription {
            media,
            connection: None,
            bandwidth: vec![],
            direction: Direction::default(),
            rtcp: None,
            ice_ufrag: None,
            ice_pwd: None,
            ice_candidates: vec![],
            ice_mismatch: false,
            remote_candidates: None,
            attributes: vec![],
        }
    }

    /// Mark the media stream as unusable, keeping the m= line in place
    pub fn deactivate(&mut self) {
        self.media.port = 0;
        self.direction = Direction::Inactive;
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m={}\r\n", self.media)?;

        if let Some(conn) = &self.connection {
            write!(f, "c={conn}\r\n")?;
        }

        for bw in &self.bandwidth {
            write!(f, "b={bw}\r\n")?;
        }

        write!(f, "a={}\r\n", self.direction)?;

        if let Some(rtcp) = &self.rtcp {
            write!(f, "a=rtcp:{rtcp}\r\n")?;
        }

        if let Some(ufrag) = &self.ice_ufrag {
            write!(f, "a=ice-ufrag:{}\r\n", ufrag.ufrag)?;
        }

        if let Some(pwd) = &self.ice_pwd {
            write!(f, "a=ice-pwd:{}\r\n", pwd.pwd)?;
        }

        for candidate in &self.ice_candidates {
            write!(f, "a=candidate:{candidate}\r\n")?;
        }

        if self.ice_mismatch {
            write!(f, "a=ice-mismatch\r\n")?;
        }

        if let Some(remote_candidates) = &self.remote_candidates {
            write!(f, "a=remote-candidates:{remote_candidates}\r\n")?;
        }

        for attr in &self.attributes {
            write!(f, "{attr}\r\n")?;
        }

        Ok(())
    }
}
