use crate::NegotiationError;
use crate::strans::{Component, IceCredentials, IceRole, IceStreamTransport};
use sdp_types::{
    Bandwidth, Connection, IcePassword, IceUsernameFragment, MediaType, RemoteCandidate,
    RemoteCandidates, Rtcp, SessionDescription,
};
use std::net::SocketAddr;

/// Mark the media stream as rejected for ICE purposes
pub(crate) fn encode_ice_mismatch(sdp: &mut SessionDescription, media_index: usize) {
    sdp.media_descriptions[media_index].ice_mismatch = true;
}

fn set_credentials(
    sdp: &mut SessionDescription,
    media_index: usize,
    credentials: &IceCredentials,
) {
    let media = &mut sdp.media_descriptions[media_index];

    media.ice_ufrag = Some(IceUsernameFragment {
        ufrag: credentials.ufrag.clone().into(),
    });
    media.ice_pwd = Some(IcePassword {
        pwd: credentials.pwd.clone().into(),
    });
}

/// Emit the ICE attributes for the media stream.
///
/// A completed, non restarting session is compacted down to the nominated
/// candidate per component with the default destination rewritten to it
/// (RFC 5245 9.1.2.2). In every other case all local candidates are
/// listed, with fresh credentials when the remote requested a restart.
pub(crate) fn encode_session<T: IceStreamTransport>(
    strans: &mut T,
    sdp: &mut SessionDescription,
    media_index: usize,
    comp_cnt: u32,
    restart_session: bool,
    role: IceRole,
) -> Result<(), NegotiationError> {
    if !strans.has_session() {
        return Err(NegotiationError::NoIceSession);
    }

    if !restart_session && strans.session_is_complete() && !strans.session_has_failed() {
        let credentials = strans
            .local_credentials()
            .cloned()
            .ok_or(NegotiationError::NoIceSession)?;
        set_credentials(sdp, media_index, &credentials);

        let mut remote_candidates = Vec::new();

        for component in Component::up_to(comp_cnt) {
            let Some(pair) = strans.nominated_pair(component) else {
                if component == Component::Rtp {
                    // transport claims completion but has no pair, the
                    // controller and engine state have diverged
                    return Err(NegotiationError::NominatedPairMissing {
                        component: component.id(),
                    });
                }

                log::warn!("completed session has no nominated pair for RTCP, skipping");
                continue;
            };

            let local_addr = SocketAddr::new(pair.local.address, pair.local.port);

            let media = &mut sdp.media_descriptions[media_index];

            match component {
                Component::Rtp => {
                    // the default destination must be the nominated pair
                    media.connection = Some(Connection {
                        address: local_addr.ip().into(),
                        ttl: None,
                        num: None,
                    });
                    media.media.port = local_addr.port();
                }
                Component::Rtcp => {
                    if media.rtcp.is_some() {
                        media.rtcp = Some(Rtcp {
                            port: local_addr.port(),
                            address: Some(local_addr.ip().into()),
                        });
                    }
                }
            }

            media.ice_candidates.push(pair.local.clone());

            remote_candidates.push(RemoteCandidate {
                component: component.id(),
                address: pair.remote.ip(),
                port: pair.remote.port(),
            });
        }

        if role == IceRole::Controlling {
            sdp.media_descriptions[media_index].remote_candidates = Some(RemoteCandidates {
                candidates: remote_candidates,
            });
        }
    } else if !strans.session_has_failed() {
        let credentials = if restart_session {
            IceCredentials::random()
        } else {
            strans
                .local_credentials()
                .cloned()
                .ok_or(NegotiationError::NoIceSession)?
        };
        set_credentials(sdp, media_index, &credentials);

        for component in Component::up_to(comp_cnt) {
            for candidate in strans.local_candidates(component) {
                log::debug!("encoding candidate {candidate}");
                sdp.media_descriptions[media_index]
                    .ice_candidates
                    .push(candidate);
            }
        }
    } else {
        // session failed, the application should have torn the call down
    }

    if comp_cnt == 1 {
        let media = &mut sdp.media_descriptions[media_index];

        media.rtcp = None;

        // RTCP is off entirely, so RS:0/RR:0 must be announced
        if matches!(media.media.media_type, MediaType::Audio | MediaType::Video) {
            media.bandwidth.push(Bandwidth {
                modifier: "RS".into(),
                value: 0,
            });
            media.bandwidth.push(Bandwidth {
                modifier: "RR".into(),
                value: 0,
            });
        }
    }

    Ok(())
}
