use crate::strans::{IceRole, IceStreamTransport};
use bytesstr::BytesStr;
use sdp_types::{
    CandidateKind, CandidateTransport, IceCandidate, MediaDescription, SessionDescription,
    TaggedAddress,
};
use std::net::SocketAddr;

/// Address family this side's sockets are bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    fn matches(self, address: &TaggedAddress) -> bool {
        match self {
            AddressFamily::V4 => address.is_ip4(),
            AddressFamily::V6 => !address.is_ip4(),
        }
    }
}

/// Result of verifying a remote offer or answer against the local stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteOfferState {
    /// Components whose default destination was covered by a candidate.
    /// Zero means the remote did not advertise ICE at all.
    pub match_comp_cnt: u32,

    /// Default destination does not correspond to any candidate
    pub ice_mismatch: bool,

    /// Remote changed its credentials, requesting a fresh check round
    pub ice_restart: bool,

    /// Role this side should take
    pub local_role: IceRole,
}

impl Default for RemoteOfferState {
    fn default() -> Self {
        RemoteOfferState {
            match_comp_cnt: 0,
            ice_mismatch: false,
            ice_restart: false,
            local_role: IceRole::Controlled,
        }
    }
}

/// Protocol level problems in a remote session description.
///
/// These are never fatal to the call, the controller reacts by disabling
/// ICE for the stream.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("remote sdp has no connection line for the media stream")]
    MissingConnection,

    #[error("remote connection address family does not match the local transport")]
    AddressFamilyMismatch,

    #[error("remote connection address is not an ip literal")]
    UnresolvedAddress,
}

/// Media level ufrag/pwd falling back to the session level
pub(crate) fn ice_credentials<'s>(
    sdp: &'s SessionDescription,
    media: &'s MediaDescription,
) -> Option<(&'s BytesStr, &'s BytesStr)> {
    let ufrag = media
        .ice_ufrag
        .as_ref()
        .or(sdp.ice_ufrag.as_ref())
        .map(|u| &u.ufrag)?;

    let pwd = media
        .ice_pwd
        .as_ref()
        .or(sdp.ice_pwd.as_ref())
        .map(|p| &p.pwd)?;

    Some((ufrag, pwd))
}

fn connection_address(
    af: AddressFamily,
    sdp: &SessionDescription,
    media: &MediaDescription,
) -> Result<SocketAddr, VerifyError> {
    let conn = media
        .connection
        .as_ref()
        .or(sdp.connection.as_ref())
        .ok_or(VerifyError::MissingConnection)?;

    if !af.matches(&conn.address) {
        return Err(VerifyError::AddressFamilyMismatch);
    }

    let ip = conn
        .address
        .ip_addr()
        .ok_or(VerifyError::UnresolvedAddress)?;

    Ok(SocketAddr::new(ip, media.media.port))
}

/// Default destination of the RTCP component, either from the rtcp
/// attribute or rtp address with port + 1
fn rtcp_address(
    af: AddressFamily,
    media: &MediaDescription,
    rtp: SocketAddr,
) -> Result<SocketAddr, VerifyError> {
    match &media.rtcp {
        Some(rtcp) => {
            let ip = match &rtcp.address {
                Some(address) => {
                    if !af.matches(address) {
                        return Err(VerifyError::AddressFamilyMismatch);
                    }

                    address.ip_addr().ok_or(VerifyError::UnresolvedAddress)?
                }
                None => rtp.ip(),
            };

            Ok(SocketAddr::new(ip, rtcp.port))
        }
        // port 65535 wraps to 0, an address no candidate will match
        None => Ok(SocketAddr::new(rtp.ip(), rtp.port().wrapping_add(1))),
    }
}

/// The port of a TCP based candidate is not predictive of the default
/// destination, so it passes the match test unconditionally
fn is_tcp_based(candidate: &IceCandidate) -> bool {
    candidate.transport == CandidateTransport::Tcp || candidate.kind == CandidateKind::RelayedTcp
}

/// Verify a remote session description, computing how many components can
/// be matched against its advertised candidates, whether the remote
/// requests an ICE restart and the role this side should take.
pub(crate) fn verify_ice_sdp<T: IceStreamTransport>(
    strans: &T,
    af: AddressFamily,
    comp_cnt: u32,
    sdp: &SessionDescription,
    media_index: usize,
    current_role: IceRole,
) -> Result<RemoteOfferState, VerifyError> {
    let media = &sdp.media_descriptions[media_index];

    let mut state = RemoteOfferState::default();

    let Some((ufrag, pwd)) = ice_credentials(sdp, media) else {
        // remote does not support ICE, not an error
        return Ok(state);
    };

    let rtp_dest = connection_address(af, sdp, media)?;

    let rtcp_dest = if comp_cnt > 1 {
        Some(rtcp_address(af, media, rtp_dest)?)
    } else {
        None
    };

    let mut comp1_found = false;
    let mut comp2_found = false;
    let mut comp2_cand_seen = false;

    for candidate in &media.ice_candidates {
        let addr = SocketAddr::new(candidate.address, candidate.port);

        match candidate.component {
            1 => comp1_found |= is_tcp_based(candidate) || addr == rtp_dest,
            2 => {
                comp2_cand_seen = true;
                comp2_found |= is_tcp_based(candidate) || Some(addr) == rtcp_dest;
            }
            _ => {}
        }
    }

    let has_rtcp = media.rtcp.is_some() || comp2_cand_seen;

    if comp1_found && (comp_cnt == 1 || !has_rtcp) {
        state.match_comp_cnt = 1;
        state.ice_mismatch = false;
    } else if comp1_found && comp2_found {
        state.match_comp_cnt = 2;
        state.ice_mismatch = false;
    } else {
        state.match_comp_cnt = if comp_cnt > 1 && has_rtcp { 2 } else { 1 };
        state.ice_mismatch = true;
    }

    // restart is only meaningful for a session that already negotiated
    // credentials with the peer
    if strans.has_session() && (strans.session_is_running() || strans.session_is_complete()) {
        if let Some(remote) = strans.remote_credentials() {
            state.ice_restart = remote.ufrag != ufrag.as_str() || remote.pwd != pwd.as_str();
        }
    }

    state.local_role = if current_role == IceRole::Controlling {
        // never give up the controlling role once taken
        IceRole::Controlling
    } else if sdp.ice_lite {
        IceRole::Controlling
    } else {
        IceRole::Controlled
    };

    log::debug!(
        "verified remote sdp: match_comp_cnt={}, ice_mismatch={}, ice_restart={}, local_role={:?}",
        state.match_comp_cnt,
        state.ice_mismatch,
        state.ice_restart,
        state.local_role
    );

    Ok(state)
}
