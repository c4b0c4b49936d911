//! MTP container implementation

use bytes::Bytes;

use super::{
    ContainerHeader, ContainerKind, Error, HEADER_SIZE, MAX_PARAMETERS, PARAMETER_SIZE,
    ResponseCode, Result, code_name,
};

/// Container body: parameters for command/response/event frames, raw bytes otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Up to five 32-bit parameters
    Parameters(Vec<u32>),
    /// Opaque dataset or object bytes
    Payload(Bytes),
}

/// MTP container (one protocol frame)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    header: ContainerHeader,
    body: Body,
}

impl Container {
    /// Create a parameter-carrying container (command, response or event)
    pub fn with_parameters(
        kind: ContainerKind,
        code: u16,
        transaction_id: u32,
        parameters: &[u32],
    ) -> Result<Self> {
        if parameters.len() > MAX_PARAMETERS {
            return Err(Error::TooManyParameters {
                count: parameters.len(),
                max: MAX_PARAMETERS,
            });
        }

        // at most 12 + 5 * 4 bytes, always fits
        let length = (HEADER_SIZE + PARAMETER_SIZE * parameters.len()) as u32;
        let header = ContainerHeader::new(length, kind, code, transaction_id);

        Ok(Self {
            header,
            body: Body::Parameters(parameters.to_vec()),
        })
    }

    /// Create a command container
    pub fn command(code: u16, transaction_id: u32, parameters: &[u32]) -> Result<Self> {
        Self::with_parameters(ContainerKind::Command, code, transaction_id, parameters)
    }

    /// Create a data container; the declared length covers the whole payload
    pub fn data(code: u16, transaction_id: u32, payload: impl Into<Bytes>) -> Result<Self> {
        Self::with_payload(ContainerKind::Data, code, transaction_id, payload)
    }

    /// Create a payload-carrying container of any kind
    pub fn with_payload(
        kind: ContainerKind,
        code: u16,
        transaction_id: u32,
        payload: impl Into<Bytes>,
    ) -> Result<Self> {
        let payload = payload.into();
        let max = u32::MAX as usize - HEADER_SIZE;
        if payload.len() > max {
            return Err(Error::ObjectTooLarge {
                size: payload.len(),
                max,
            });
        }

        let length = (HEADER_SIZE + payload.len()) as u32;
        let header = ContainerHeader::new(length, kind, code, transaction_id);

        Ok(Self {
            header,
            body: Body::Payload(payload),
        })
    }

    /// Assemble from an already-parsed header and body
    #[must_use]
    pub fn from_parts(header: ContainerHeader, body: Body) -> Self {
        Self { header, body }
    }

    /// Get header
    #[must_use]
    pub const fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Get body
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Container kind
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.header.kind()
    }

    /// Raw code value
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.header.code()
    }

    /// Display name of the code (`"unknown"` when unmapped)
    #[must_use]
    pub fn code_name(&self) -> &'static str {
        code_name(self.header.code())
    }

    /// Code interpreted as a response code
    #[must_use]
    pub const fn response_code(&self) -> ResponseCode {
        ResponseCode::from_u16(self.header.code())
    }

    /// Transaction id
    #[must_use]
    pub const fn transaction_id(&self) -> u32 {
        self.header.transaction_id()
    }

    /// Declared length including the header
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.header.length()
    }

    /// Parameters (empty for payload containers)
    #[must_use]
    pub fn parameters(&self) -> &[u32] {
        match &self.body {
            Body::Parameters(params) => params,
            Body::Payload(_) => &[],
        }
    }

    /// Payload bytes (empty for parameter containers)
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match &self.body {
            Body::Payload(payload) => payload,
            Body::Parameters(_) => &[],
        }
    }

    /// Consume the container and return the payload
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        match self.body {
            Body::Payload(payload) => payload,
            Body::Parameters(_) => Bytes::new(),
        }
    }

    /// Check whether this is a Response carrying OK
    #[must_use]
    pub const fn is_ok_response(&self) -> bool {
        matches!(self.header.kind(), ContainerKind::Response) && self.response_code().is_ok()
    }

    /// Encode container to bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.header.length() as usize);
        bytes.extend_from_slice(&self.header.to_bytes());

        match &self.body {
            Body::Parameters(params) => {
                for param in params {
                    bytes.extend_from_slice(&param.to_le_bytes());
                }
            }
            Body::Payload(payload) => bytes.extend_from_slice(payload),
        }

        bytes
    }
}
