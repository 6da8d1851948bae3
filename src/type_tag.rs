//! The message type registry: an external lookup table indexed by the
//! single-byte type code of a framed message, keyed to the standard
//! PostgreSQL v3 *backend* (server-to-client) message formats.
//!
//! https://www.postgresql.org/docs/current/protocol-message-formats.html
//!
//! Only backend codes are registered. This codec never decodes frontend
//! messages, and several single-letter codes are reused between the two
//! directions (`'D'` is frontend `Describe` and backend `DataRow`, `'C'`
//! is frontend `Close` and backend `CommandComplete`, and so on), so a
//! direction-agnostic table would be ambiguous.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TypeTag {
    Authentication,
    BackendKeyData,
    BindComplete,
    CloseComplete,
    CommandComplete,
    CopyBothResponse,
    CopyData,
    CopyDone,
    CopyInResponse,
    CopyOutResponse,
    DataRow,
    EmptyQueryResponse,
    ErrorResponse,
    FunctionCallResponse,
    NegotiateProtocolVersion,
    NoData,
    NoticeResponse,
    NotificationResponse,
    ParameterDescription,
    ParameterStatus,
    ParseComplete,
    PortalSuspended,
    ReadyForQuery,
    RowDescription,
}

impl TypeTag {
    /// The wire byte this tag was decoded from.
    pub fn byte(self) -> u8 {
        match self {
            TypeTag::Authentication => b'R',
            TypeTag::BackendKeyData => b'K',
            TypeTag::BindComplete => b'2',
            TypeTag::CloseComplete => b'3',
            TypeTag::CommandComplete => b'C',
            TypeTag::CopyBothResponse => b'W',
            TypeTag::CopyData => b'd',
            TypeTag::CopyDone => b'c',
            TypeTag::CopyInResponse => b'G',
            TypeTag::CopyOutResponse => b'H',
            TypeTag::DataRow => b'D',
            TypeTag::EmptyQueryResponse => b'I',
            TypeTag::ErrorResponse => b'E',
            TypeTag::FunctionCallResponse => b'V',
            TypeTag::NegotiateProtocolVersion => b'v',
            TypeTag::NoData => b'n',
            TypeTag::NoticeResponse => b'N',
            TypeTag::NotificationResponse => b'A',
            TypeTag::ParameterDescription => b't',
            TypeTag::ParameterStatus => b'S',
            TypeTag::ParseComplete => b'1',
            TypeTag::PortalSuspended => b's',
            TypeTag::ReadyForQuery => b'Z',
            TypeTag::RowDescription => b'T',
        }
    }
}

/// Look up the type tag for a single-byte message type code.
///
/// Returns `None` if the byte has no registry entry, which callers treat
/// as a decode failure (`Error::UnknownMessageType`).
pub fn message_type_of(byte: u8) -> Option<TypeTag> {
    Some(match byte {
        b'R' => TypeTag::Authentication,
        b'K' => TypeTag::BackendKeyData,
        b'2' => TypeTag::BindComplete,
        b'3' => TypeTag::CloseComplete,
        b'C' => TypeTag::CommandComplete,
        b'W' => TypeTag::CopyBothResponse,
        b'd' => TypeTag::CopyData,
        b'c' => TypeTag::CopyDone,
        b'G' => TypeTag::CopyInResponse,
        b'H' => TypeTag::CopyOutResponse,
        b'D' => TypeTag::DataRow,
        b'I' => TypeTag::EmptyQueryResponse,
        b'E' => TypeTag::ErrorResponse,
        b'V' => TypeTag::FunctionCallResponse,
        b'v' => TypeTag::NegotiateProtocolVersion,
        b'n' => TypeTag::NoData,
        b'N' => TypeTag::NoticeResponse,
        b'A' => TypeTag::NotificationResponse,
        b't' => TypeTag::ParameterDescription,
        b'S' => TypeTag::ParameterStatus,
        b'1' => TypeTag::ParseComplete,
        b's' => TypeTag::PortalSuspended,
        b'Z' => TypeTag::ReadyForQuery,
        b'T' => TypeTag::RowDescription,

        _ => return None,
    })
}
