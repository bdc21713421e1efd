use super::candidate::InvalidCandidateParamError;
use bytesstr::BytesStr;
use std::fmt;
use std::net::IpAddr;

/// Ice username fragment attribute (`a=ice-ufrag`)
///
/// Session and media level attribute
///
/// [RFC5245](https://www.rfc-editor.org/rfc/rfc5245#section-15.4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceUsernameFragment {
    pub ufrag: BytesStr,
}

/// Ice password attribute (`a=ice-pwd`)
///
/// Session and media level attribute
///
/// [RFC5245](https://www.rfc-editor.org/rfc/rfc5245#section-15.4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcePassword {
    pub pwd: BytesStr,
}

/// One entry of the [`RemoteCandidates`] attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCandidate {
    pub component: u8,
    pub address: IpAddr,
    pub port: u16,
}

/// Remote candidates attribute (`a=remote-candidates`), emitted by the
/// controlling agent once its check lists have completed
///
/// Media level attribute
///
/// [RFC5245](https://www.rfc-editor.org/rfc/rfc5245#section-9.1.2.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCandidates {
    pub candidates: Vec<RemoteCandidate>,
}

impl RemoteCandidates {
    pub fn parse(i: &str) -> Result<Self, InvalidCandidateParamError> {
        let err = |param| InvalidCandidateParamError { param };

        let mut tokens = i.split_ascii_whitespace();
        let mut candidates = vec![];

        while let Some(component) = tokens.next() {
            let component = component.parse().map_err(|_| err("component"))?;
            let address = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or(err("address"))?;
            let port = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or(err("port"))?;

            candidates.push(RemoteCandidate {
                component,
                address,
                port,
            });
        }

        Ok(Self { candidates })
    }
}

impl fmt::Display for RemoteCandidates {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            write!(
                f,
                "{} {} {}",
                candidate.component, candidate.address, candidate.port
            )?;
        }

        Ok(())
    }
}
