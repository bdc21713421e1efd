//! Candidate attribute (`a=candidate`)
//!
//! The wire format is the RFC 5245 grammar extended with a trailer: an
//! optional bare `TCP` token marking a relay allocated over TCP, an
//! `Enabled`/`Disabled` token and `START:`/`END:` lifetime timestamps.

use bytes::Bytes;
use bytesstr::BytesStr;
use std::fmt;
use std::net::IpAddr;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::{datetime, format_description};

/// Timestamp layout used by the candidate trailer and the `inv-time` attribute
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]_[hour]:[minute]:[second].[subsecond digits:3]"
);

/// Unrecognized tokens tolerated in the candidate trailer before parsing
/// gives up on the rest of the line
const MAX_TRAILER_SKIP: u32 = 5;

pub fn format_timestamp(timestamp: PrimitiveDateTime) -> Result<String, time::error::Format> {
    timestamp.format(TIMESTAMP_FORMAT)
}

pub fn parse_timestamp(i: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(i, TIMESTAMP_FORMAT)
}

/// Timestamp placed in candidates whose line carried no `START:`/`END:` tokens
pub fn zero_timestamp() -> PrimitiveDateTime {
    datetime!(1970-01-01 00:00)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateTransport {
    Udp,
    Tcp,
}

impl fmt::Display for CandidateTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CandidateTransport::Udp => f.write_str("UDP"),
            CandidateTransport::Tcp => f.write_str("TCP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Host,
    HostTcp,
    ServerReflexive,
    ServerReflexiveTcp,
    PeerReflexive,
    Relayed,
    RelayedTcp,
}

impl CandidateKind {
    pub fn is_host(self) -> bool {
        matches!(self, CandidateKind::Host | CandidateKind::HostTcp)
    }

    pub fn is_relayed(self) -> bool {
        matches!(self, CandidateKind::Relayed | CandidateKind::RelayedTcp)
    }

    fn type_literal(self) -> &'static str {
        match self {
            CandidateKind::Host | CandidateKind::HostTcp => "host",
            CandidateKind::ServerReflexive | CandidateKind::ServerReflexiveTcp => "srflx",
            CandidateKind::PeerReflexive => "prflx",
            CandidateKind::Relayed | CandidateKind::RelayedTcp => "relay",
        }
    }
}

/// Connection role of a TCP candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpType {
    Active,
    Passive,
    SimultaneousOpen,
}

impl fmt::Display for TcpType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TcpType::Active => f.write_str("active"),
            TcpType::Passive => f.write_str("passive"),
            TcpType::SimultaneousOpen => f.write_str("so"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid or missing candidate param `{param}`")]
pub struct InvalidCandidateParamError {
    pub param: &'static str,
}

/// Candidate attribute (`a=candidate`)
///
/// Media level attribute
///
/// [RFC5245](https://www.rfc-editor.org/rfc/rfc5245#section-15.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub foundation: BytesStr,

    /// Component id, 1 for RTP and 2 for RTCP
    pub component: u8,

    pub transport: CandidateTransport,

    pub priority: u32,

    pub address: IpAddr,
    pub port: u16,

    pub kind: CandidateKind,

    /// Base address, set for all non-host kinds
    pub related_address: Option<IpAddr>,
    pub related_port: Option<u16>,

    pub tcp_type: Option<TcpType>,

    pub enabled: bool,

    pub added_at: PrimitiveDateTime,
    pub expires_at: PrimitiveDateTime,
}

impl IceCandidate {
    pub fn parse(src: &Bytes, i: &str) -> Result<Self, InvalidCandidateParamError> {
        let err = |param| InvalidCandidateParamError { param };

        let mut tokens = i.split_ascii_whitespace();

        let foundation = tokens.next().ok_or(err("foundation"))?;

        let component = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(err("component"))?;

        let transport = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("UDP") => CandidateTransport::Udp,
            Some(t) if t.eq_ignore_ascii_case("TCP") => CandidateTransport::Tcp,
            _ => return Err(err("transport")),
        };

        let priority = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(err("priority"))?;

        let address: IpAddr = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(err("address"))?;

        let port = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(err("port"))?;

        match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("typ") => {}
            _ => return Err(err("typ")),
        }

        let tcp = transport == CandidateTransport::Tcp;
        let mut kind = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("host") => {
                if tcp {
                    CandidateKind::HostTcp
                } else {
                    CandidateKind::Host
                }
            }
            Some(t) if t.eq_ignore_ascii_case("srflx") => {
                if tcp {
                    CandidateKind::ServerReflexiveTcp
                } else {
                    CandidateKind::ServerReflexive
                }
            }
            Some(t) if t.eq_ignore_ascii_case("prflx") => CandidateKind::PeerReflexive,
            Some(t) if t.eq_ignore_ascii_case("relay") => CandidateKind::Relayed,
            _ => return Err(err("type")),
        };

        let mut related_address = None;
        let mut related_port = None;

        if !kind.is_host() {
            if tokens.next() != Some("raddr") {
                return Err(err("raddr"));
            }

            related_address = Some(
                tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or(err("raddr"))?,
            );

            if tokens.next() != Some("rport") {
                return Err(err("rport"));
            }

            related_port = Some(
                tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or(err("rport"))?,
            );
        }

        let mut tcp_type = None;
        let mut enabled = true;
        let mut added_at = zero_timestamp();
        let mut expires_at = zero_timestamp();

        // The trailer carries vendor tokens in no fixed order, scan it
        // tolerantly with a bounded skip budget.
        let mut skipped = 0;

        while let Some(token) = tokens.next() {
            if token == "tcptype" {
                tcp_type = match tokens.next() {
                    Some(t) if t.eq_ignore_ascii_case("active") => Some(TcpType::Active),
                    Some(t) if t.eq_ignore_ascii_case("passive") => Some(TcpType::Passive),
                    Some(t) if t.eq_ignore_ascii_case("so") => Some(TcpType::SimultaneousOpen),
                    _ => return Err(err("tcptype")),
                };
            } else if token == "generation" {
                tokens.next();
            } else if token == "TCP" {
                if kind == CandidateKind::Relayed {
                    kind = CandidateKind::RelayedTcp;
                }
            } else if token == "Enabled" {
                enabled = true;
            } else if token == "Disabled" {
                enabled = false;
            } else if let Some(ts) = token.strip_prefix("START:") {
                if let Ok(ts) = parse_timestamp(ts) {
                    added_at = ts;
                }
            } else if let Some(ts) = token.strip_prefix("END:") {
                if let Ok(ts) = parse_timestamp(ts) {
                    expires_at = ts;
                }
            } else {
                skipped += 1;

                if skipped > MAX_TRAILER_SKIP {
                    break;
                }
            }
        }

        Ok(Self {
            foundation: BytesStr::from_parse(src, foundation),
            component,
            transport,
            priority,
            address,
            port,
            kind,
            related_address,
            related_port,
            tcp_type,
            enabled,
            added_at,
            expires_at,
        })
    }
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.address,
            self.port,
            self.kind.type_literal()
        )?;

        if !self.kind.is_host() {
            if let (Some(address), Some(port)) = (self.related_address, self.related_port) {
                write!(f, " raddr {address} rport {port}")?;
            }
        }

        if let Some(tcp_type) = self.tcp_type {
            write!(f, " tcptype {tcp_type}")?;
        }

        if self.kind == CandidateKind::RelayedTcp {
            f.write_str(" TCP")?;
        }

        if self.enabled {
            f.write_str(" Enabled")?;
        } else {
            f.write_str(" Disabled")?;
        }

        let start = format_timestamp(self.added_at).map_err(|_| fmt::Error)?;
        let end = format_timestamp(self.expires_at).map_err(|_| fmt::Error)?;

        write!(f, " START:{start} END:{end}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::Ipv4Addr;

    fn host_candidate() -> IceCandidate {
        IceCandidate {
            foundation: "Hc0a80201".into(),
            component: 1,
            transport: CandidateTransport::Udp,
            priority: 1694498815,
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 2, 1)),
            port: 4000,
            kind: CandidateKind::Host,
            related_address: None,
            related_port: None,
            tcp_type: None,
            enabled: true,
            added_at: datetime!(2013-05-04 10:20:30.100),
            expires_at: datetime!(2013-05-04 10:50:30.100),
        }
    }

    #[test]
    fn candidate_print_host() {
        assert_eq!(
            host_candidate().to_string(),
            "Hc0a80201 1 UDP 1694498815 192.168.2.1 4000 typ host Enabled \
             START:2013-05-04_10:20:30.100 END:2013-05-04_10:50:30.100"
        );
    }

    #[test]
    fn candidate_roundtrip_host() {
        let candidate = host_candidate();
        let line = BytesStr::from(candidate.to_string());

        assert_eq!(IceCandidate::parse(line.as_ref(), &line).unwrap(), candidate);
    }

    #[test]
    fn candidate_roundtrip_relayed_tcp() {
        let candidate = IceCandidate {
            foundation: "Rd5e76a19".into(),
            component: 2,
            transport: CandidateTransport::Udp,
            priority: 16777215,
            address: IpAddr::V4(Ipv4Addr::new(213, 94, 78, 1)),
            port: 41382,
            kind: CandidateKind::RelayedTcp,
            related_address: Some(IpAddr::V4(Ipv4Addr::new(192, 168, 2, 1))),
            related_port: Some(4001),
            tcp_type: None,
            enabled: false,
            added_at: datetime!(2013-05-04 10:20:30.100),
            expires_at: datetime!(2013-05-04 10:50:30.100),
        };

        let line = BytesStr::from(candidate.to_string());

        assert!(line.contains(" relay "));
        assert!(line.contains(" TCP Disabled "));
        assert_eq!(IceCandidate::parse(line.as_ref(), &line).unwrap(), candidate);
    }

    #[test]
    fn candidate_roundtrip_srflx_tcp() {
        let candidate = IceCandidate {
            foundation: "Sd5e76a19".into(),
            component: 1,
            transport: CandidateTransport::Tcp,
            priority: 1862270975,
            address: IpAddr::V4(Ipv4Addr::new(213, 94, 78, 1)),
            port: 41382,
            kind: CandidateKind::ServerReflexiveTcp,
            related_address: Some(IpAddr::V4(Ipv4Addr::new(192, 168, 2, 1))),
            related_port: Some(4000),
            tcp_type: Some(TcpType::Passive),
            enabled: true,
            added_at: datetime!(2013-05-04 10:20:30.100),
            expires_at: datetime!(2013-05-04 10:50:30.100),
        };

        let line = BytesStr::from(candidate.to_string());

        assert_eq!(IceCandidate::parse(line.as_ref(), &line).unwrap(), candidate);
    }

    #[test]
    fn candidate_without_trailer() {
        // plain RFC 5245 line from a non-vendor peer
        let line = BytesStr::from_static(
            "Hc0a80201 1 UDP 1694498815 192.168.2.1 4000 typ host",
        );

        let candidate = IceCandidate::parse(line.as_ref(), &line).unwrap();

        assert!(candidate.enabled);
        assert_eq!(candidate.added_at, zero_timestamp());
        assert_eq!(candidate.expires_at, zero_timestamp());
    }

    #[test]
    fn candidate_trailer_skips_vendor_tokens() {
        let line = BytesStr::from_static(
            "Rd5e76a19 1 UDP 16777215 213.94.78.1 41382 typ relay \
             raddr 192.168.2.1 rport 4000 x1 x2 generation 0 TCP Enabled",
        );

        let candidate = IceCandidate::parse(line.as_ref(), &line).unwrap();

        assert_eq!(candidate.kind, CandidateKind::RelayedTcp);
        assert!(candidate.enabled);
    }

    #[test]
    fn candidate_case_insensitive_literals() {
        let line = BytesStr::from_static(
            "Hc0a80201 1 udp 1694498815 192.168.2.1 4000 TYP HOST",
        );

        let candidate = IceCandidate::parse(line.as_ref(), &line).unwrap();

        assert_eq!(candidate.transport, CandidateTransport::Udp);
        assert_eq!(candidate.kind, CandidateKind::Host);
    }

    #[test]
    fn candidate_missing_token() {
        let line = BytesStr::from_static("Hc0a80201 1 UDP 1694498815 192.168.2.1");

        assert_eq!(
            IceCandidate::parse(line.as_ref(), &line),
            Err(InvalidCandidateParamError { param: "port" })
        );
    }

    #[test]
    fn candidate_invalid_transport() {
        let line = BytesStr::from_static("Hc0a80201 1 SCTP 1694498815 192.168.2.1 4000 typ host");

        assert_eq!(
            IceCandidate::parse(line.as_ref(), &line),
            Err(InvalidCandidateParamError {
                param: "transport"
            })
        );
    }
}
