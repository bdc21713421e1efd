use std::fmt;

/// Direction attribute (`a=sendrecv` etc.)
///
/// Session and media level attribute
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::SendRecv => f.write_str("sendrecv"),
            Direction::SendOnly => f.write_str("sendonly"),
            Direction::RecvOnly => f.write_str("recvonly"),
            Direction::Inactive => f.write_str("inactive"),
        }
    }
}
