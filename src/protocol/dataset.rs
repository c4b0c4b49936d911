//! Typed datasets carried in Data container payloads

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};

use super::fields::{DATE_FIELD_LEN, DatasetReader, DatasetWriter, string_field_len};
use super::{Error, Result};

/// Object format codes used when creating objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectFormat {
    /// Generic file (format 0x3000)
    Undefined,
    /// Folder (format 0x3001)
    Association,
    /// Any other format code
    Other(u16),
}

impl ObjectFormat {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0x3000 => Self::Undefined,
            0x3001 => Self::Association,
            other => Self::Other(other),
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Undefined => 0x3000,
            Self::Association => 0x3001,
            Self::Other(value) => value,
        }
    }
}

/// Association type marking an object as a plain file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssociationType {
    /// Not an association (0x0000)
    None,
    /// Generic folder (0x0001)
    GenericFolder,
    /// Any other association type
    Other(u16),
}

impl AssociationType {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => Self::None,
            0x0001 => Self::GenericFolder,
            other => Self::Other(other),
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::None => 0x0000,
            Self::GenericFolder => 0x0001,
            Self::Other(value) => value,
        }
    }
}

/// `StorageInfo` dataset returned by `GetStorageInfo`.
///
/// ```text
/// storageType:u16 filesystemType:u16 accessCapability:u16
/// maxCapacity:u64 freeSpaceBytes:u64 freeSpaceObjects:u32
/// description:String volumeId:String
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageInfo {
    /// Storage type (fixed ROM, removable RAM, ...)
    pub storage_type: u16,
    /// Filesystem type (flat, hierarchical, DCF)
    pub filesystem_type: u16,
    /// Access capability (read-write, read-only, ...)
    pub access_capability: u16,
    /// Capacity in bytes
    pub max_capacity: u64,
    /// Free space in bytes
    pub free_space_bytes: u64,
    /// Free space in objects (`0xFFFF_FFFF` when unused)
    pub free_space_objects: u32,
    /// Human-readable description
    pub description: Option<String>,
    /// Volume label
    pub volume_id: Option<String>,
}

impl StorageInfo {
    /// Decode from a Data payload
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut reader = DatasetReader::new(payload);
        Ok(Self {
            storage_type: reader.read_u16()?,
            filesystem_type: reader.read_u16()?,
            access_capability: reader.read_u16()?,
            max_capacity: reader.read_u64()?,
            free_space_bytes: reader.read_u64()?,
            free_space_objects: reader.read_u32()?,
            description: reader.read_string()?,
            volume_id: reader.read_string()?,
        })
    }
}

/// `DeviceInfo` dataset returned by `GetDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    /// PTP standard version (e.g. 100 for 1.00)
    pub standard_version: u16,
    /// Vendor extension id (6 for MTP)
    pub vendor_extension_id: u32,
    /// Vendor extension version
    pub vendor_extension_version: u16,
    /// Vendor extension description
    pub vendor_extension_desc: Option<String>,
    /// Functional mode
    pub functional_mode: u16,
    /// Supported operation codes
    pub operations_supported: Vec<u16>,
    /// Supported event codes
    pub events_supported: Vec<u16>,
    /// Supported device property codes
    pub device_properties_supported: Vec<u16>,
    /// Formats the device can capture
    pub capture_formats: Vec<u16>,
    /// Formats the device can play back
    pub playback_formats: Vec<u16>,
    /// Manufacturer name
    pub manufacturer: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Firmware version
    pub device_version: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Decode from a Data payload
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut reader = DatasetReader::new(payload);
        Ok(Self {
            standard_version: reader.read_u16()?,
            vendor_extension_id: reader.read_u32()?,
            vendor_extension_version: reader.read_u16()?,
            vendor_extension_desc: reader.read_string()?,
            functional_mode: reader.read_u16()?,
            operations_supported: reader.read_u16_array()?,
            events_supported: reader.read_u16_array()?,
            device_properties_supported: reader.read_u16_array()?,
            capture_formats: reader.read_u16_array()?,
            playback_formats: reader.read_u16_array()?,
            manufacturer: reader.read_string()?,
            model: reader.read_string()?,
            device_version: reader.read_string()?,
            serial_number: reader.read_string()?,
        })
    }

    /// Check whether the device advertises an operation
    #[must_use]
    pub fn supports_operation(&self, code: u16) -> bool {
        self.operations_supported.contains(&code)
    }
}

/// Width of every fixed field in an `ObjectInfo` dataset, reserved bytes included.
pub const OBJECT_INFO_FIXED_LEN: usize = 4 + 2 + 2 + 4 + THUMB_AND_IMAGE_RESERVED + 4 + 2 + 4 + 4;

/// Thumbnail (14 bytes) and image geometry (12 bytes) fields, always zero on upload.
const THUMB_AND_IMAGE_RESERVED: usize = 14 + 12;

/// Sequence number field, always zero on upload.
const SEQUENCE_RESERVED: usize = 4;

fn default_modification_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| date.and_hms_opt(20, 11, 30))
        .unwrap_or_default()
}

/// `ObjectInfo` dataset sent by `SendObjectInfo` to create a file or folder.
///
/// ```text
/// storageId:u32 objectFormat:u16 protectionStatus:u16 objectSize:u32
/// [26 reserved] parentHandle:u32 associationType:u16 associationDesc:u32
/// [4 reserved] filename:String captureDate:String(empty) modDate:Date
/// keywords:String
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectInfo {
    /// Destination storage
    pub storage_id: u32,
    /// Object format
    pub object_format: ObjectFormat,
    /// Size of the object content in bytes
    pub object_size: u32,
    /// Parent folder handle (`0xFFFF_FFFF` for the storage root)
    pub parent_handle: u32,
    /// File or folder marker
    pub association_type: AssociationType,
    /// Association description
    pub association_desc: u32,
    /// Object file name
    pub filename: String,
    /// Keywords
    pub keywords: String,
    /// Date written to the modification date field
    pub modification_date: NaiveDateTime,
}

impl ObjectInfo {
    /// Describe a plain file of `size` bytes
    pub fn file(
        storage_id: u32,
        parent_handle: u32,
        filename: impl Into<String>,
        size: usize,
    ) -> Result<Self> {
        let object_size = u32::try_from(size).map_err(|_| Error::ObjectTooLarge {
            size,
            max: u32::MAX as usize,
        })?;

        Ok(Self {
            storage_id,
            object_format: ObjectFormat::Undefined,
            object_size,
            parent_handle,
            association_type: AssociationType::None,
            association_desc: 0,
            filename: filename.into(),
            keywords: String::new(),
            modification_date: default_modification_date(),
        })
    }

    /// Describe a folder
    #[must_use]
    pub fn folder(storage_id: u32, parent_handle: u32, name: impl Into<String>) -> Self {
        Self {
            storage_id,
            object_format: ObjectFormat::Association,
            object_size: 0,
            parent_handle,
            association_type: AssociationType::GenericFolder,
            association_desc: 0,
            filename: name.into(),
            keywords: String::new(),
            modification_date: default_modification_date(),
        }
    }

    /// Set the keywords field
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Set the modification date field
    #[must_use]
    pub fn with_modification_date(mut self, date: NaiveDateTime) -> Self {
        self.modification_date = date;
        self
    }

    /// Exact encoded size, computed from the field widths
    pub fn encoded_len(&self) -> Result<usize> {
        Ok(OBJECT_INFO_FIXED_LEN
            + string_field_len(&self.filename)?
            + 1
            + DATE_FIELD_LEN
            + string_field_len(&self.keywords)?)
    }

    /// Encode to a Data payload
    ///
    /// Fails before anything is sent if a string is too long or the written
    /// size drifts from [`ObjectInfo::encoded_len`].
    pub fn encode(&self) -> Result<Bytes> {
        let expected = self.encoded_len()?;
        let mut writer = DatasetWriter::with_capacity(expected);

        writer.put_u32(self.storage_id);
        writer.put_u16(self.object_format.as_u16());
        writer.put_u16(0x0000);
        writer.put_u32(self.object_size);
        writer.put_reserved(THUMB_AND_IMAGE_RESERVED);
        writer.put_u32(self.parent_handle);
        writer.put_u16(self.association_type.as_u16());
        writer.put_u32(self.association_desc);
        writer.put_reserved(SEQUENCE_RESERVED);
        writer.put_string(&self.filename)?;
        writer.put_string("")?;
        writer.put_date(&self.modification_date);
        writer.put_string(&self.keywords)?;

        if writer.len() != expected {
            return Err(Error::DatasetLengthMismatch {
                expected,
                written: writer.len(),
            });
        }

        Ok(writer.finish())
    }

    /// Decode from a Data payload; unparsable dates fall back to the default
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut reader = DatasetReader::new(payload);

        let storage_id = reader.read_u32()?;
        let object_format = ObjectFormat::from_u16(reader.read_u16()?);
        let _protection_status = reader.read_u16()?;
        let object_size = reader.read_u32()?;
        reader.skip(THUMB_AND_IMAGE_RESERVED)?;
        let parent_handle = reader.read_u32()?;
        let association_type = AssociationType::from_u16(reader.read_u16()?);
        let association_desc = reader.read_u32()?;
        reader.skip(SEQUENCE_RESERVED)?;
        let filename = reader.read_string()?.unwrap_or_default();
        let _capture_date = reader.read_string()?;
        let modification_date = reader.read_date()?.unwrap_or_else(default_modification_date);
        let keywords = reader.read_string()?.unwrap_or_default();

        Ok(Self {
            storage_id,
            object_format,
            object_size,
            parent_handle,
            association_type,
            association_desc,
            filename,
            keywords,
            modification_date,
        })
    }
}
