//! Operation, property and response codes
//!
//! Codes travel as raw `u16` values inside containers; the tables here are
//! only used for classification and display.

use std::fmt;

/// Operation codes issued by the initiator.
pub mod operation {
    /// GetDeviceInfo
    pub const GET_DEVICE_INFO: u16 = 0x1001;
    /// OpenSession
    pub const OPEN_SESSION: u16 = 0x1002;
    /// CloseSession
    pub const CLOSE_SESSION: u16 = 0x1003;
    /// GetStorageIDs
    pub const GET_STORAGE_IDS: u16 = 0x1004;
    /// GetStorageInfo
    pub const GET_STORAGE_INFO: u16 = 0x1005;
    /// GetObjectHandles
    pub const GET_OBJECT_HANDLES: u16 = 0x1007;
    /// GetObject
    pub const GET_OBJECT: u16 = 0x1009;
    /// DeleteObject
    pub const DELETE_OBJECT: u16 = 0x100B;
    /// SendObjectInfo
    pub const SEND_OBJECT_INFO: u16 = 0x100C;
    /// SendObject
    pub const SEND_OBJECT: u16 = 0x100D;
    /// GetObjectPropValue (MTP extension)
    pub const GET_OBJECT_PROP_VALUE: u16 = 0x9803;
}

/// Object property codes.
pub mod property {
    /// Object file name
    pub const OBJECT_FILE_NAME: u16 = 0xDC07;
}

macro_rules! response_codes {
    ($( $(#[$doc:meta])* $variant:ident = $value:literal => $name:literal, )*) => {
        /// Response code carried by a Response container.
        ///
        /// Unrecognized values are kept as [`ResponseCode::Unknown`]; mapping
        /// never fails.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ResponseCode {
            $( $(#[$doc])* $variant, )*
            /// Code outside the known table
            Unknown(u16),
        }

        impl ResponseCode {
            /// Convert from the wire value
            #[must_use]
            pub const fn from_u16(value: u16) -> Self {
                match value {
                    $( $value => Self::$variant, )*
                    other => Self::Unknown(other),
                }
            }

            /// Convert to the wire value
            #[must_use]
            pub const fn as_u16(self) -> u16 {
                match self {
                    $( Self::$variant => $value, )*
                    Self::Unknown(value) => value,
                }
            }

            /// Symbolic display name, `"unknown"` for unmapped codes
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                    Self::Unknown(_) => "unknown",
                }
            }
        }
    };
}

response_codes! {
    /// Operation completed
    Ok = 0x2001 => "OK",
    /// Unspecified device failure
    GeneralError = 0x2002 => "General Error",
    /// No session is open
    SessionNotOpen = 0x2003 => "Session Not Open",
    /// Transaction id out of sequence
    InvalidTransactionId = 0x2004 => "Invalid TransactionID",
    /// Operation code not supported
    OperationNotSupported = 0x2005 => "Operation Not Supported",
    /// A parameter value is not supported
    ParameterNotSupported = 0x2006 => "Parameter Not Supported",
    /// Data phase ended early
    IncompleteTransfer = 0x2007 => "Incomplete Transfer",
    /// Storage id does not exist
    InvalidStorageId = 0x2008 => "Invalid StorageID",
    /// Object handle does not exist
    InvalidObjectHandle = 0x2009 => "Invalid ObjectHandle",
    /// Device property not supported
    DevicePropNotSupported = 0x200A => "DeviceProp Not Supported",
    /// Object format code invalid
    InvalidObjectFormatCode = 0x200B => "Invalid ObjectFormatCode",
    /// Storage is full
    StoreFull = 0x200C => "Store Full",
    /// Object is write-protected
    ObjectWriteProtected = 0x200D => "Object Write-Protected",
    /// Storage is read-only
    StoreReadOnly = 0x200E => "Store Read-Only",
    /// Access denied
    AccessDenied = 0x200F => "Access Denied",
    /// Object has no thumbnail
    NoThumbnailPresent = 0x2010 => "No Thumbnail Present",
    /// Device self test failed
    SelfTestFailed = 0x2011 => "Self Test Failed",
    /// Only some objects were deleted
    PartialDeletion = 0x2012 => "Partial Deletion",
    /// Storage is not available
    StoreNotAvailable = 0x2013 => "Store Not Available",
    /// Format-scoped queries not supported
    SpecificationByFormatUnsupported = 0x2014 => "Specification By Format Unsupported",
    /// SendObject issued without a valid SendObjectInfo
    NoValidObjectInfo = 0x2015 => "No Valid ObjectInfo",
    /// Malformed code value
    InvalidCodeFormat = 0x2016 => "Invalid Code Format",
    /// Vendor code not recognized
    UnknownVendorCode = 0x2017 => "Unknown Vendor Code",
    /// Capture already terminated
    CaptureAlreadyTerminated = 0x2018 => "Capture Already Terminated",
    /// Device is busy
    DeviceBusy = 0x2019 => "Device Busy",
    /// Parent object is invalid
    InvalidParentObject = 0x201A => "Invalid ParentObject",
    /// Device property format invalid
    InvalidDevicePropFormat = 0x201B => "Invalid DeviceProp Format",
    /// Device property value invalid
    InvalidDevicePropValue = 0x201C => "Invalid DeviceProp Value",
    /// A parameter is invalid
    InvalidParameter = 0x201D => "Invalid parameter",
    /// A session is already open
    SessionAlreadyOpen = 0x201E => "Session Already Open",
    /// Transaction was cancelled
    TransactionCancelled = 0x201F => "Transaction Cancelled",
    /// Destination-scoped requests not supported
    SpecificationOfDestinationUnsupported = 0x2020 => "Specification of Destination Unsupported",
    /// Object property code invalid
    InvalidObjectPropCode = 0xA801 => "Invalid_ObjectPropCode",
    /// Object property format invalid
    InvalidObjectPropFormat = 0xA802 => "Invalid_ObjectProp_Format",
    /// Object property value invalid
    InvalidObjectPropValue = 0xA803 => "Invalid_ObjectProp_Value",
    /// Object reference invalid
    InvalidObjectReference = 0xA804 => "Invalid_ObjectReference",
    /// Property group not supported
    GroupNotSupported = 0xA805 => "Group_Not_Supported",
    /// Dataset invalid
    InvalidDataset = 0xA806 => "Invalid_Dataset",
    /// Group-scoped requests not supported
    SpecificationByGroupUnsupported = 0xA807 => "Specification_By_Group_Unsupported",
    /// Depth-scoped requests not supported
    SpecificationByDepthUnsupported = 0xA808 => "Specification_By_Depth_Unsupported",
    /// Object exceeds what the storage accepts
    ObjectTooLarge = 0xA809 => "Object_Too_Large",
    /// Object property not supported
    ObjectPropNotSupported = 0xA80A => "ObjectProp_Not_Supported",
}

impl ResponseCode {
    /// Check if the code reports success
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<u16> for ResponseCode {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.as_u16())
    }
}

/// Display name for any container code: operation, response or property.
///
/// Returns `"unknown"` for values outside the tables.
#[must_use]
pub fn code_name(code: u16) -> &'static str {
    match code {
        operation::GET_DEVICE_INFO => "GetDeviceInfo",
        operation::OPEN_SESSION => "OpenSession",
        operation::CLOSE_SESSION => "CloseSession",
        operation::GET_STORAGE_IDS => "GetStorageIDs",
        operation::GET_STORAGE_INFO => "GetStorageInfo",
        operation::GET_OBJECT_HANDLES => "GetObjectHandles",
        operation::GET_OBJECT => "GetObject",
        operation::DELETE_OBJECT => "DeleteObject",
        operation::SEND_OBJECT_INFO => "SendObjectInfo",
        operation::SEND_OBJECT => "SendObject",
        operation::GET_OBJECT_PROP_VALUE => "GetObjectPropValue",
        property::OBJECT_FILE_NAME => "Object file name",
        other => ResponseCode::from_u16(other).name(),
    }
}
