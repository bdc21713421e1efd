//! ICE offer/answer negotiation for a single SIP media stream.
//!
//! [`IceMediaTransport`] sits between the SIP signaling layer and a
//! connectivity check engine (the [`IceStreamTransport`] implementation).
//! Per offer/answer round the signaling layer calls `media_create` →
//! `encode_sdp` → `media_start`, and the transport decides whether ICE is
//! usable, emits/consumes the ICE SDP attributes and drives the check
//! engine through init/start/stop.
//!
//! When ICE is unusable the transport falls back to sending to the plain
//! `c=`/`m=` addresses, with NAT rebinding source address learning on the
//! receive path.

#![warn(unreachable_pub)]

use bytesstr::BytesStr;
use sdp_types::{
    SessionDescription, TransportProtocol, UnknownAttribute, format_timestamp,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::PrimitiveDateTime;

mod encode;
mod relay;
mod strans;
mod verify;

use relay::{PacketRelay, RxDecision};

pub use strans::{
    Component, IceCredentials, IceRole, IceStreamTransport, NominatedPair, TransportError,
};
pub use verify::{AddressFamily, RemoteOfferState, VerifyError};

/// Answerer may use the offerer's relay server
pub const RELAY_FLAG_PEER_SERVER: u32 = 0x1;

/// Relay allocations are made over TCP
pub const RELAY_FLAG_TCP: u32 = 0x2;

/// Port assumed when the peer's relay server attribute carries no port
const DEFAULT_RELAY_PORT: u16 = 3479;

#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("media index {0} is out of range")]
    InvalidMediaIndex(usize),

    #[error("media transport protocol is not RTP/AVP")]
    IncompatibleTransportProtocol,

    #[error("no ice session")]
    NoIceSession,

    #[error("local sdp is missing the ice credentials placed in the answer")]
    MissingLocalCredentials,

    #[error("no nominated pair for component {component} on a completed session")]
    NominatedPairMissing { component: u8 },

    #[error("transport is not attached to a call leg")]
    NotAttached,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Behavior switches of the media transport
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportOptions {
    /// Disable source address learning on the fallback receive path
    pub no_src_addr_checking: bool,

    /// Accept media lines with a transport protocol other than RTP/AVP
    pub no_transport_checking: bool,
}

/// Local values placed into the vendor `X-adapter*` attributes
#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    pub user_id: String,
    pub device_id: String,

    /// `host:port` of the relay server offered to the peer
    pub relay_server: String,
    pub relay_credential: String,

    /// Bitmask of `RELAY_FLAG_*` values, announced only when
    /// [`RELAY_FLAG_TCP`] is set
    pub relay_flags: u32,

    /// When the INVITE carrying the remote sdp was received
    pub invite_received_at: Option<PrimitiveDateTime>,

    pub nat_type: String,
}

/// Vendor `X-adapter*` values captured from the peer's sdp
#[derive(Debug, Clone, Default)]
pub struct PeerAdapterInfo {
    pub user_id: Option<BytesStr>,
    pub device_id: Option<BytesStr>,
    pub relay_server: Option<BytesStr>,
    pub relay_credential: Option<BytesStr>,
}

impl PeerAdapterInfo {
    /// Relay server of the peer split into host and port
    pub fn relay_server_host_port(&self) -> Option<(&str, u16)> {
        let raw = self.relay_server.as_ref()?;

        match raw.rsplit_once(':') {
            Some((host, port)) => Some((host, port.parse().ok()?)),
            None => Some((raw.as_str(), DEFAULT_RELAY_PORT)),
        }
    }
}

/// Asynchronous notification from the check engine, returned by
/// [`IceMediaTransport::poll_event`]
#[derive(Debug)]
pub enum IceTransportEvent {
    /// Connectivity checks finished for all components
    ChecksCompleted(Result<(), TransportError>),
}

/// Callbacks of the attached call leg
pub struct StreamAttachment {
    pub remote_rtp: SocketAddr,
    pub remote_rtcp: SocketAddr,
    pub on_rtp: Box<dyn FnMut(&[u8]) + Send>,
    pub on_rtcp: Box<dyn FnMut(&[u8]) + Send>,
}

/// Direction(s) affected by [`MediaTransport::simulate_packet_loss`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossDirection {
    Outgoing,
    Incoming,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OaRole {
    None,
    Offerer,
    Answerer,
}

/// State shared between the signaling context and the transport's own
/// receive/notification context. Guarded by a single mutex which is never
/// held across a call into the check engine.
#[derive(Default)]
struct SharedState {
    use_ice: bool,

    remote_rtp: Option<SocketAddr>,
    remote_rtcp: Option<SocketAddr>,

    relay: PacketRelay,
    no_src_addr_checking: bool,
    rx_drop_pct: u32,

    events: VecDeque<IceTransportEvent>,
    nominated: Vec<Option<NominatedPair>>,
}

#[derive(Default)]
struct Callbacks {
    rtp: Option<Box<dyn FnMut(&[u8]) + Send>>,
    rtcp: Option<Box<dyn FnMut(&[u8]) + Send>>,
}

struct Inner {
    state: Mutex<SharedState>,
    callbacks: Mutex<Callbacks>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn callbacks(&self) -> MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle given to the check engine to report received packets and check
/// completion back into the transport.
///
/// Packets are relayed to the attached callbacks inline, completion
/// notifications are queued and consumed by
/// [`IceMediaTransport::poll_event`] on the signaling context.
#[derive(Clone)]
pub struct TransportEventSink {
    inner: Arc<Inner>,
}

impl TransportEventSink {
    pub fn checks_completed(&self, result: Result<(), TransportError>) {
        self.inner
            .state()
            .events
            .push_back(IceTransportEvent::ChecksCompleted(result));
    }

    pub fn packet_received(&self, component: Component, source: SocketAddr, data: &[u8]) {
        let decision = {
            let state = &mut *self.inner.state();

            if state.rx_drop_pct > 0 && rand::random_range(0..100) < state.rx_drop_pct {
                return;
            }

            if state.use_ice || state.no_src_addr_checking {
                // the check engine already verified the peer identity
                RxDecision::Deliver
            } else {
                match component {
                    Component::Rtp => state.relay.on_rtp(
                        source,
                        &mut state.remote_rtp,
                        &mut state.remote_rtcp,
                    ),
                    Component::Rtcp => state.relay.on_rtcp(source, &mut state.remote_rtcp),
                }
            }
        };

        if decision != RxDecision::Deliver {
            return;
        }

        // the state mutex is released here, the callback may call back
        // into the transport
        let mut callbacks = self.inner.callbacks();

        let callback = match component {
            Component::Rtp => &mut callbacks.rtp,
            Component::Rtcp => &mut callbacks.rtcp,
        };

        if let Some(callback) = callback {
            callback(data);
        }
    }
}

/// ICE negotiation state machine and packet relay of one media stream
pub struct IceMediaTransport<T: IceStreamTransport> {
    strans: T,

    options: TransportOptions,
    component_count: u32,
    address_family: AddressFamily,

    initial_round: bool,
    oa_role: OaRole,
    current_role: IceRole,
    rem_offer_state: RemoteOfferState,

    adapter: AdapterInfo,
    peer: PeerAdapterInfo,

    tx_drop_pct: u32,

    inner: Arc<Inner>,
}

/// Entry points invoked by the media session layer.
///
/// `media_create`, `encode_sdp`, `media_start` and `media_stop` must be
/// called sequentially from the signaling context, once per offer/answer
/// round.
pub trait MediaTransport {
    /// Prepare for a new initial offer/answer round
    fn media_create(
        &mut self,
        remote_sdp: Option<&SessionDescription>,
        media_index: usize,
    ) -> Result<(), NegotiationError>;

    /// Put this side's ICE attributes into the local sdp
    fn encode_sdp(
        &mut self,
        local_sdp: &mut SessionDescription,
        remote_sdp: Option<&SessionDescription>,
        media_index: usize,
    ) -> Result<(), NegotiationError>;

    /// Start connectivity checks once the final sdp pair of the round is
    /// known
    fn media_start(
        &mut self,
        local_sdp: &SessionDescription,
        remote_sdp: &SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError>;

    /// Stop connectivity checks, idempotent
    fn media_stop(&mut self);

    fn attach(&mut self, attachment: StreamAttachment);

    fn detach(&mut self);

    fn send_rtp(&mut self, data: &[u8]) -> Result<(), NegotiationError>;

    /// Send RTCP, to the learned remote RTCP address unless `dest` is given
    fn send_rtcp(
        &mut self,
        data: &[u8],
        dest: Option<SocketAddr>,
    ) -> Result<(), NegotiationError>;

    /// Diagnostic hook dropping a percentage of packets
    fn simulate_packet_loss(&mut self, direction: LossDirection, percent: u32);

    /// Synchronously stop the check engine before the stream is released
    fn close(&mut self);
}

impl<T: IceStreamTransport> IceMediaTransport<T> {
    pub fn new(
        strans: T,
        component_count: u32,
        address_family: AddressFamily,
        options: TransportOptions,
    ) -> Self {
        let component_count = component_count.clamp(1, 2);

        IceMediaTransport {
            strans,
            options,
            component_count,
            address_family,
            initial_round: true,
            oa_role: OaRole::None,
            current_role: IceRole::Controlled,
            rem_offer_state: RemoteOfferState::default(),
            adapter: AdapterInfo::default(),
            peer: PeerAdapterInfo::default(),
            tx_drop_pct: 0,
            inner: Arc::new(Inner {
                state: Mutex::new(SharedState {
                    no_src_addr_checking: options.no_src_addr_checking,
                    ..SharedState::default()
                }),
                callbacks: Mutex::new(Callbacks::default()),
            }),
        }
    }

    /// Handle for the check engine to deliver packets and notifications
    pub fn event_sink(&self) -> TransportEventSink {
        TransportEventSink {
            inner: self.inner.clone(),
        }
    }

    /// Process the next queued notification from the check engine
    pub fn poll_event(&mut self) -> Option<IceTransportEvent> {
        let event = self.inner.state().events.pop_front()?;

        match &event {
            IceTransportEvent::ChecksCompleted(Ok(())) => {
                let nominated = Component::up_to(self.component_count)
                    .map(|component| self.strans.nominated_pair(component))
                    .collect();

                self.inner.state().nominated = nominated;
            }
            IceTransportEvent::ChecksCompleted(Err(e)) => {
                log::warn!("ICE negotiation failed: {e}");
                self.set_no_ice("connectivity checks failed");
            }
        }

        Some(event)
    }

    pub fn is_using_ice(&self) -> bool {
        self.inner.state().use_ice
    }

    pub fn remote_offer_state(&self) -> RemoteOfferState {
        self.rem_offer_state
    }

    /// Nominated pair cached by the last successful checks completion
    pub fn nominated_pair(&self, component: Component) -> Option<NominatedPair> {
        let state = self.inner.state();

        state
            .nominated
            .get(component.id() as usize - 1)
            .cloned()
            .flatten()
    }

    pub fn adapter_info_mut(&mut self) -> &mut AdapterInfo {
        &mut self.adapter
    }

    pub fn peer_info(&self) -> &PeerAdapterInfo {
        &self.peer
    }

    pub fn stream_transport(&self) -> &T {
        &self.strans
    }

    fn set_no_ice(&mut self, reason: &str) {
        log::info!("stopping ICE, reason: {reason}");

        self.strans.stop_checks();
        self.inner.state().use_ice = false;
    }

    fn capture_peer_info(&mut self, remote_sdp: &SessionDescription) {
        let Some(media) = remote_sdp.media_descriptions.first() else {
            return;
        };

        let find = |name: &str| {
            media
                .attributes
                .iter()
                .find(|attr| attr.name == name)
                .and_then(|attr| attr.value.clone())
        };

        self.peer = PeerAdapterInfo {
            user_id: find("X-adapter1"),
            device_id: find("X-adapter2"),
            relay_server: find("X-adapter3"),
            relay_credential: find("X-adapter4"),
        };
    }

    fn append_adapter_attrs(&self, sdp: &mut SessionDescription, media_index: usize) {
        let media = &mut sdp.media_descriptions[media_index];

        let mut push = |name: &'static str, value: String| {
            media.attributes.push(UnknownAttribute {
                name: BytesStr::from_static(name),
                value: Some(value.into()),
            });
        };

        if !self.adapter.user_id.is_empty() {
            push("X-adapter1", self.adapter.user_id.clone());
        }

        if !self.adapter.device_id.is_empty() {
            push("X-adapter2", self.adapter.device_id.clone());
        }

        if !self.adapter.relay_server.is_empty() {
            push("X-adapter3", self.adapter.relay_server.clone());
        }

        if !self.adapter.relay_credential.is_empty() {
            push("X-adapter4", self.adapter.relay_credential.clone());
        }

        if self.adapter.relay_flags & RELAY_FLAG_TCP != 0 {
            push("X-adapter5", self.adapter.relay_flags.to_string());
        }

        if let Some(received_at) = self.adapter.invite_received_at {
            if let Ok(timestamp) = format_timestamp(received_at) {
                push("inv-time", timestamp);
            }
        }

        if !self.adapter.nat_type.is_empty() {
            push("nat-type", self.adapter.nat_type.clone());
        }
    }

    fn create_initial_answer(
        &mut self,
        local_sdp: &mut SessionDescription,
        remote_sdp: &SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        if remote_sdp.media_descriptions[media_index].media.port == 0 {
            // remote rejected the stream
            return Ok(());
        }

        let state = match verify::verify_ice_sdp(
            &self.strans,
            self.address_family,
            self.component_count,
            remote_sdp,
            media_index,
            self.current_role,
        ) {
            Ok(state) => state,
            Err(e) => {
                self.rem_offer_state = RemoteOfferState::default();
                self.set_no_ice(&format!("invalid SDP offer: {e}"));
                return Ok(());
            }
        };

        self.rem_offer_state = state;

        if state.match_comp_cnt == 0 {
            // no ICE in the offer, answer without ICE attributes
            return Ok(());
        }

        if state.ice_mismatch {
            encode::encode_ice_mismatch(local_sdp, media_index);
            return Ok(());
        }

        encode::encode_session(
            &mut self.strans,
            local_sdp,
            media_index,
            state.match_comp_cnt,
            state.ice_restart,
            state.local_role,
        )
    }

    fn create_subsequent_offer(
        &mut self,
        local_sdp: &mut SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        if !self.strans.has_session() {
            // ICE was not used in the previous round, offer without it
            return Ok(());
        }

        let comp_cnt = self.strans.running_component_count();

        encode::encode_session(
            &mut self.strans,
            local_sdp,
            media_index,
            comp_cnt,
            false,
            self.current_role,
        )
    }

    fn create_subsequent_answer(
        &mut self,
        local_sdp: &mut SessionDescription,
        remote_sdp: &SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        let state = match verify::verify_ice_sdp(
            &self.strans,
            self.address_family,
            self.component_count,
            remote_sdp,
            media_index,
            self.current_role,
        ) {
            Ok(state) => state,
            Err(e) => {
                self.rem_offer_state = RemoteOfferState::default();
                self.set_no_ice(&format!("invalid SDP offer: {e}"));
                return Ok(());
            }
        };

        self.rem_offer_state = state;

        if state.match_comp_cnt == 0 {
            return Ok(());
        }

        if state.ice_mismatch {
            encode::encode_ice_mismatch(local_sdp, media_index);
            return Ok(());
        }

        if !self.strans.has_session() {
            // remote added ICE mid-call
            self.strans.init_ice(IceRole::Controlled, None)?;

            return encode::encode_session(
                &mut self.strans,
                local_sdp,
                media_index,
                state.match_comp_cnt,
                false,
                state.local_role,
            );
        }

        encode::encode_session(
            &mut self.strans,
            local_sdp,
            media_index,
            state.match_comp_cnt,
            state.ice_restart,
            state.local_role,
        )
    }

    fn start_checks(
        &mut self,
        remote_sdp: &SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        let media = &remote_sdp.media_descriptions[media_index];

        let Some((ufrag, pwd)) = verify::ice_credentials(remote_sdp, media) else {
            self.set_no_ice("remote has no ICE credentials");
            return Ok(());
        };

        let credentials = IceCredentials {
            ufrag: ufrag.to_string(),
            pwd: pwd.to_string(),
        };

        self.strans
            .start_checks(&credentials, &media.ice_candidates)?;

        self.inner.state().use_ice = true;

        Ok(())
    }
}

impl<T: IceStreamTransport> MediaTransport for IceMediaTransport<T> {
    fn media_create(
        &mut self,
        remote_sdp: Option<&SessionDescription>,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        if let Some(remote_sdp) = remote_sdp {
            if media_index >= remote_sdp.media_descriptions.len() {
                return Err(NegotiationError::InvalidMediaIndex(media_index));
            }
        }

        self.oa_role = OaRole::None;
        self.initial_round = true;

        // tentative role from the offer/answer position, re-checked once
        // the remote's sdp has been verified
        let role = if remote_sdp.is_some() {
            IceRole::Controlled
        } else {
            IceRole::Controlling
        };

        self.current_role = role;
        self.strans.init_ice(role, None)?;

        Ok(())
    }

    fn encode_sdp(
        &mut self,
        local_sdp: &mut SessionDescription,
        remote_sdp: Option<&SessionDescription>,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        if media_index >= local_sdp.media_descriptions.len() {
            return Err(NegotiationError::InvalidMediaIndex(media_index));
        }

        if let Some(remote_sdp) = remote_sdp {
            if media_index >= remote_sdp.media_descriptions.len() {
                return Err(NegotiationError::InvalidMediaIndex(media_index));
            }
        }

        if !self.options.no_transport_checking {
            let local_ok = local_sdp.media_descriptions[media_index].media.proto
                == TransportProtocol::RtpAvp;

            let remote_ok = remote_sdp.is_none_or(|remote_sdp| {
                remote_sdp.media_descriptions[media_index].media.proto
                    == TransportProtocol::RtpAvp
            });

            if !local_ok || !remote_ok {
                local_sdp.media_descriptions[media_index].deactivate();
                return Err(NegotiationError::IncompatibleTransportProtocol);
            }
        }

        if let Some(remote_sdp) = remote_sdp {
            self.capture_peer_info(remote_sdp);
        }

        self.append_adapter_attrs(local_sdp, media_index);

        if self.initial_round {
            match remote_sdp {
                Some(remote_sdp) => {
                    self.create_initial_answer(local_sdp, remote_sdp, media_index)?
                }
                None => encode::encode_session(
                    &mut self.strans,
                    local_sdp,
                    media_index,
                    self.component_count,
                    false,
                    self.current_role,
                )?,
            }
        } else {
            match remote_sdp {
                Some(remote_sdp) => {
                    self.create_subsequent_answer(local_sdp, remote_sdp, media_index)?
                }
                None => self.create_subsequent_offer(local_sdp, media_index)?,
            }
        }

        self.oa_role = if remote_sdp.is_some() {
            OaRole::Answerer
        } else {
            OaRole::Offerer
        };

        Ok(())
    }

    fn media_start(
        &mut self,
        local_sdp: &SessionDescription,
        remote_sdp: &SessionDescription,
        media_index: usize,
    ) -> Result<(), NegotiationError> {
        if media_index >= remote_sdp.media_descriptions.len() {
            return Err(NegotiationError::InvalidMediaIndex(media_index));
        }

        let initial_round = self.initial_round;
        let mut oa_role = self.oa_role;

        // the round is negotiated
        self.initial_round = false;
        self.oa_role = OaRole::None;

        if !self.strans.has_session() {
            return Ok(());
        }

        // A session refresh (e.g. by a session timer) skips encode_sdp
        // entirely, treat it like an offer we just got answered.
        if oa_role == OaRole::None {
            oa_role = OaRole::Offerer;
        }

        if oa_role == OaRole::Offerer {
            // first time this remote sdp is seen, verify the answer
            let state = match verify::verify_ice_sdp(
                &self.strans,
                self.address_family,
                self.component_count,
                remote_sdp,
                media_index,
                IceRole::Controlling,
            ) {
                Ok(state) => state,
                Err(e) => {
                    self.set_no_ice(&format!("invalid SDP answer: {e}"));
                    return Ok(());
                }
            };

            if state.match_comp_cnt == 0 {
                self.set_no_ice("remote answer does not support ICE");
                return Ok(());
            }

            if remote_sdp.media_descriptions[media_index].ice_mismatch {
                self.set_no_ice("remote answer contains the ice-mismatch attribute");
                return Ok(());
            }

            if state.ice_restart {
                log::warn!(
                    "remote signalled an ICE restart in an SDP answer, which is \
                     disallowed; remote negotiation may fail"
                );
            }

            if state.ice_mismatch {
                // a middlebox rewrote the answer without rejecting the
                // offer via ice-mismatch
                log::warn!("remote answer is mismatched but did not reject the offer");
            }

            if self.strans.session_is_running() || self.strans.session_is_complete() {
                log::debug!("ignoring offer/answer, ICE session unchanged");
                return Ok(());
            }

            self.current_role = state.local_role;
        } else {
            // answering, the offer verification result is already in
            // rem_offer_state
            let state = self.rem_offer_state;

            if state.match_comp_cnt == 0 {
                self.set_no_ice("remote no longer offers ICE");
                return Ok(());
            }

            if state.ice_mismatch {
                self.set_no_ice("mismatch in remote offer");
                return Ok(());
            }

            if !initial_round && !state.ice_restart {
                log::debug!("ICE session unchanged");
                return Ok(());
            }

            if !initial_round {
                // restarting: a fresh ufrag/pwd pair was put into the
                // answer, recreate the session with it
                self.set_no_ice("restarting by remote request");

                let local_media = local_sdp
                    .media_descriptions
                    .get(media_index)
                    .ok_or(NegotiationError::InvalidMediaIndex(media_index))?;

                let (ufrag, pwd) = verify::ice_credentials(local_sdp, local_media)
                    .ok_or(NegotiationError::MissingLocalCredentials)?;

                let credentials = IceCredentials {
                    ufrag: ufrag.to_string(),
                    pwd: pwd.to_string(),
                };

                self.strans
                    .init_ice(state.local_role, Some(&credentials))?;
            }

            // turns out this side must control, e.g. the peer is ice-lite
            if state.local_role == IceRole::Controlling && self.strans.has_session() {
                self.strans.change_role(IceRole::Controlling);
            }

            self.current_role = state.local_role;
        }

        self.start_checks(remote_sdp, media_index)
    }

    fn media_stop(&mut self) {
        self.set_no_ice("media stop requested");
    }

    fn attach(&mut self, attachment: StreamAttachment) {
        {
            let state = &mut *self.inner.state();

            state.remote_rtp = Some(attachment.remote_rtp);
            state.remote_rtcp = Some(attachment.remote_rtcp);
            state.relay.reset();
        }

        let mut callbacks = self.inner.callbacks();
        callbacks.rtp = Some(attachment.on_rtp);
        callbacks.rtcp = Some(attachment.on_rtcp);
    }

    fn detach(&mut self) {
        {
            let state = &mut *self.inner.state();

            state.remote_rtp = None;
            state.remote_rtcp = None;
            state.relay.reset();
        }

        let mut callbacks = self.inner.callbacks();
        callbacks.rtp = None;
        callbacks.rtcp = None;
    }

    fn send_rtp(&mut self, data: &[u8]) -> Result<(), NegotiationError> {
        if self.tx_drop_pct > 0 && rand::random_range(0..100) < self.tx_drop_pct {
            return Ok(());
        }

        let dest = self
            .inner
            .state()
            .remote_rtp
            .ok_or(NegotiationError::NotAttached)?;

        self.strans.send(Component::Rtp, dest, data)?;

        Ok(())
    }

    fn send_rtcp(
        &mut self,
        data: &[u8],
        dest: Option<SocketAddr>,
    ) -> Result<(), NegotiationError> {
        if self.component_count < 2 {
            // RTCP shares the RTP component, nothing separate to send on
            return Ok(());
        }

        let dest = match dest {
            Some(dest) => dest,
            None => self
                .inner
                .state()
                .remote_rtcp
                .ok_or(NegotiationError::NotAttached)?,
        };

        self.strans.send(Component::Rtcp, dest, data)?;

        Ok(())
    }

    fn simulate_packet_loss(&mut self, direction: LossDirection, percent: u32) {
        let percent = percent.min(100);

        match direction {
            LossDirection::Outgoing => self.tx_drop_pct = percent,
            LossDirection::Incoming => self.inner.state().rx_drop_pct = percent,
            LossDirection::Both => {
                self.tx_drop_pct = percent;
                self.inner.state().rx_drop_pct = percent;
            }
        }
    }

    fn close(&mut self) {
        self.set_no_ice("transport closed");
    }
}

impl<T: IceStreamTransport> Drop for IceMediaTransport<T> {
    fn drop(&mut self) {
        // stop_checks blocks until no further callbacks can be delivered,
        // so no late notification observes a released stream
        self.strans.stop_checks();
    }
}
