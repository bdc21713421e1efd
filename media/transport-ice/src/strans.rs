use rand::distr::{Alphanumeric, SampleString};
use sdp_types::IceCandidate;
use std::borrow::Cow;
use std::net::SocketAddr;

/// Agent role in an ICE session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceRole {
    Controlling,
    Controlled,
}

/// RTP/RTCP component of a media stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Rtp = 1,
    Rtcp = 2,
}

impl Component {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Components of a stream with the given component count
    pub(crate) fn up_to(count: u32) -> impl Iterator<Item = Component> {
        [Component::Rtp, Component::Rtcp]
            .into_iter()
            .take(count as usize)
    }
}

/// ufrag/pwd pair identifying one side of an ICE session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCredentials {
    pub ufrag: String,
    pub pwd: String,
}

impl IceCredentials {
    pub fn random() -> Self {
        let mut rng = rand::rng();

        IceCredentials {
            ufrag: Alphanumeric.sample_string(&mut rng, 8),
            pwd: Alphanumeric.sample_string(&mut rng, 32),
        }
    }
}

/// Highest priority nominated candidate pair of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatedPair {
    /// Local candidate of the pair, also used to rewrite the default
    /// destination when re-encoding a completed session
    pub local: IceCandidate,

    /// Transport address of the remote candidate of the pair
    pub remote: SocketAddr,
}

/// Error returned by the connectivity check engine
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no ice session")]
    NoSession,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(Cow<'static, str>),
}

/// Interface of the connectivity check engine driven by
/// [`IceMediaTransport`](crate::IceMediaTransport).
///
/// Implementations run their own check scheduling on a separate execution
/// context and report back through the
/// [`TransportEventSink`](crate::TransportEventSink) handed to them.
pub trait IceStreamTransport {
    /// Create a fresh ICE session with the given role.
    ///
    /// When `credentials` is `None` the session generates its own.
    fn init_ice(
        &mut self,
        role: IceRole,
        credentials: Option<&IceCredentials>,
    ) -> Result<(), TransportError>;

    /// Begin connectivity checks against the remote candidates
    fn start_checks(
        &mut self,
        remote_credentials: &IceCredentials,
        remote_candidates: &[IceCandidate],
    ) -> Result<(), TransportError>;

    /// Stop all running checks, keeping the transport itself usable.
    ///
    /// Blocks until no more check callbacks can be delivered.
    fn stop_checks(&mut self);

    /// Switch the role of the running session in place
    fn change_role(&mut self, role: IceRole);

    fn has_session(&self) -> bool;

    fn session_is_running(&self) -> bool;

    fn session_is_complete(&self) -> bool;

    fn session_has_failed(&self) -> bool;

    fn local_credentials(&self) -> Option<&IceCredentials>;

    /// Remote credentials accepted by the last `start_checks` call
    fn remote_credentials(&self) -> Option<&IceCredentials>;

    fn local_candidates(&self, component: Component) -> Vec<IceCandidate>;

    fn nominated_pair(&self, component: Component) -> Option<NominatedPair>;

    /// Number of components negotiated by the running session
    fn running_component_count(&self) -> u32;

    /// Send a datagram, routed through the nominated pair when one exists
    fn send(
        &self,
        component: Component,
        dest: SocketAddr,
        data: &[u8],
    ) -> Result<(), TransportError>;
}
