//! Source address learning for the non-ICE fallback path.
//!
//! While ICE is not in use, packets from an unknown source address are
//! only trusted after a run of consecutive packets from that same address,
//! so a NAT rebinding moves the configured remote address without letting
//! a single stray packet hijack the stream.

use std::net::SocketAddr;

/// Consecutive RTP packets required before switching the remote address
const RTP_PROBATION_CNT: u32 = 10;

/// Consecutive RTCP packets required before switching the remote address
const RTCP_PROBATION_CNT: u32 = 3;

/// Verdict for a received packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RxDecision {
    Deliver,
    /// Source is still in probation, drop the packet
    Probation,
}

#[derive(Debug, Default)]
pub(crate) struct PacketRelay {
    rtp_src: Option<SocketAddr>,
    rtp_src_cnt: u32,

    rtcp_src: Option<SocketAddr>,
    rtcp_src_cnt: u32,
}

impl PacketRelay {
    /// Counters restart whenever the configured remote address changes
    pub(crate) fn reset(&mut self) {
        *self = PacketRelay::default();
    }

    pub(crate) fn on_rtp(
        &mut self,
        src: SocketAddr,
        remote_rtp: &mut Option<SocketAddr>,
        remote_rtcp: &mut Option<SocketAddr>,
    ) -> RxDecision {
        if *remote_rtp == Some(src) {
            self.rtp_src_cnt = 0;
            return RxDecision::Deliver;
        }

        self.rtp_src_cnt += 1;

        if self.rtp_src != Some(src) {
            // a different new source restarts probation from scratch
            self.rtp_src = Some(src);
            self.rtp_src_cnt = 0;
            return RxDecision::Probation;
        }

        if self.rtp_src_cnt < RTP_PROBATION_CNT {
            return RxDecision::Probation;
        }

        log::info!("remote RTP address switched to {src} after NAT rebinding probation");

        *remote_rtp = Some(src);
        self.rtp_src_cnt = 0;

        // Speculatively move RTCP along as long as no actual RTCP traffic
        // has been seen yet.
        if self.rtcp_src.is_none() && self.rtcp_src_cnt == 0 {
            *remote_rtcp = Some(SocketAddr::new(src.ip(), src.port().wrapping_add(1)));
        }

        RxDecision::Deliver
    }

    pub(crate) fn on_rtcp(
        &mut self,
        src: SocketAddr,
        remote_rtcp: &mut Option<SocketAddr>,
    ) -> RxDecision {
        if *remote_rtcp == Some(src) {
            self.rtcp_src_cnt = 0;
            return RxDecision::Deliver;
        }

        self.rtcp_src_cnt += 1;

        if self.rtcp_src != Some(src) {
            self.rtcp_src = Some(src);
            self.rtcp_src_cnt = 0;
            return RxDecision::Probation;
        }

        if self.rtcp_src_cnt < RTCP_PROBATION_CNT {
            return RxDecision::Probation;
        }

        log::info!("remote RTCP address switched to {src} after NAT rebinding probation");

        *remote_rtcp = Some(src);
        self.rtcp_src_cnt = 0;

        RxDecision::Deliver
    }
}
